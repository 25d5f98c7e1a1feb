mod bugzilla;
mod cache;
mod config;
mod error;
mod pipeline;

use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use bugzilla::client::HttpFetcher;
use bugzilla::query::{QueryParams, StatusCategory};

#[derive(Parser, Debug)]
#[command(name = "bzgrab")]
#[command(about = "Harvest Bugzilla bug documents into a local file cache")]
#[command(version)]
struct Args {
  /// Free-text filter matched against bug summaries
  #[arg(short, long)]
  description: String,

  /// Product version the bugs are filed against
  #[arg(short = 'v', long)]
  product_version: String,

  /// Status category of bugs to harvest
  #[arg(short, long, value_enum, default_value_t = StatusCategory::Closed)]
  status: StatusCategory,

  /// Path to config file (default: $XDG_CONFIG_HOME/bzgrab/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Concurrent detail fetches, overriding the configured value
  #[arg(long)]
  concurrency: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_writer(std::io::stderr)
    .init();

  let args = Args::parse();

  let mut config = config::Config::load(args.config.as_deref())?;
  if let Some(concurrency) = args.concurrency {
    config.fetch.concurrency = concurrency;
  }

  let params = QueryParams {
    filter: args.description,
    version: args.product_version,
    status: args.status,
  };

  let fetcher = HttpFetcher::new(&config.remote)?;
  pipeline::run(&fetcher, &config, &params).await?;

  Ok(())
}
