//! One end-to-end harvesting run.
//!
//! Resolves the bug list for the query, then fans out over the listed bugs
//! with bounded concurrency, populating the detail cache. The list being
//! unavailable is the only fatal condition; every per-bug failure is folded
//! into the run summary and the batch keeps going.

use std::collections::HashSet;

use color_eyre::{eyre::eyre, Result};
use futures::stream::{self, StreamExt};
use tracing::{error, info};

use crate::bugzilla::buglist;
use crate::bugzilla::client::RemoteFetcher;
use crate::bugzilla::query::{Endpoints, QueryParams};
use crate::cache::{DetailCache, DetailOutcome, ListCache};
use crate::config::Config;

/// Tally of per-bug outcomes for one run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
  pub written: usize,
  pub hits: usize,
  pub excluded: usize,
  pub skipped_excluded: usize,
  pub failed: usize,
}

impl RunSummary {
  fn record(&mut self, outcome: DetailOutcome) {
    match outcome {
      DetailOutcome::Hit => self.hits += 1,
      DetailOutcome::Written => self.written += 1,
      DetailOutcome::Excluded => self.excluded += 1,
      DetailOutcome::SkippedExcluded => self.skipped_excluded += 1,
      DetailOutcome::Failed(_) => self.failed += 1,
    }
  }
}

/// Execute one harvesting run for `params`.
///
/// Returns an error only when the bug list could not be materialized; a run
/// where every single detail fetch failed still returns `Ok` with the
/// failures counted in the summary.
pub async fn run<F: RemoteFetcher>(
  fetcher: &F,
  config: &Config,
  params: &QueryParams,
) -> Result<RunSummary> {
  let endpoints = Endpoints::new(&config.remote.base_url)?;
  let list_cache = ListCache::new(&config.cache, &endpoints);
  let detail_cache = DetailCache::new(&config.cache, &endpoints, &config.fetch);

  let list_path = list_cache
    .ensure_cached(fetcher, params)
    .await?
    .ok_or_else(|| {
      eyre!(
        "Bug list for version {} ({}) could not be retrieved",
        params.version,
        params.status
      )
    })?;

  let ids = buglist::parse(&list_path)?;

  // Drop repeated identifiers so every artifact has exactly one writer,
  // keeping the first occurrence's position
  let mut seen = HashSet::new();
  let ids: Vec<String> = ids
    .into_iter()
    .filter(|id| seen.insert(id.clone()))
    .collect();
  info!(bugs = ids.len(), "bug list resolved");

  let concurrency = config.fetch.concurrency.max(1);
  let mut summary = RunSummary::default();

  let mut outcomes = stream::iter(ids.iter())
    .map(|id| {
      let detail_cache = &detail_cache;
      let version = params.version.as_str();
      async move { (id, detail_cache.ensure_cached(fetcher, version, id).await) }
    })
    .buffer_unordered(concurrency);

  while let Some((id, outcome)) = outcomes.next().await {
    if let DetailOutcome::Failed(kind) = outcome {
      error!(bug_id = %id, kind = %kind, "bug left unfetched");
    }
    summary.record(outcome);
  }

  info!(
    written = summary.written,
    hits = summary.hits,
    excluded = summary.excluded,
    skipped = summary.skipped_excluded,
    failed = summary.failed,
    "harvest complete"
  );

  Ok(summary)
}
