//! URL construction for the two remote queries.
//!
//! Pure construction: nothing here touches the network. The `url` crate's
//! query serializer percent-encodes the free-text filter, so spaces, commas,
//! and punctuation never corrupt the query string.

use clap::ValueEnum;
use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use url::Url;

/// Parameters for one harvesting run, supplied by the CLI layer.
#[derive(Debug, Clone)]
pub struct QueryParams {
  /// Free-text filter matched against bug summaries
  pub filter: String,
  /// Product version the bugs are filed against
  pub version: String,
  pub status: StatusCategory,
}

/// Status category of bugs to query.
///
/// The remote has no notion of the category itself; each variant expands to
/// a fixed set of remote status codes and resolution codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StatusCategory {
  /// Bugs closed with a released fix
  Closed,
  /// Everything still moving through the workflow
  Open,
}

impl StatusCategory {
  /// Remote status codes queried for this category.
  pub fn status_codes(self) -> &'static [&'static str] {
    match self {
      StatusCategory::Closed => &["CLOSED"],
      StatusCategory::Open => &[
        "NEW",
        "ASSIGNED",
        "ON_DEV",
        "POST",
        "MODIFIED",
        "ON_QA",
        "VERIFIED",
        "RELEASE_PENDING",
      ],
    }
  }

  /// Remote resolution codes queried for this category.
  pub fn resolution_codes(self) -> &'static [&'static str] {
    match self {
      StatusCategory::Closed => &["CURRENTRELEASE", "RAWHIDE", "ERRATA", "NEXTRELEASE"],
      StatusCategory::Open => &[],
    }
  }

  /// Stable lowercase label used in cache file names and logs.
  pub fn label(self) -> &'static str {
    match self {
      StatusCategory::Closed => "closed",
      StatusCategory::Open => "open",
    }
  }
}

impl std::fmt::Display for StatusCategory {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.label())
  }
}

/// Resolved query endpoints of one Bugzilla instance.
///
/// Built once from the configured base URL so per-item URL construction is
/// infallible.
#[derive(Debug, Clone)]
pub struct Endpoints {
  list: Url,
  detail: Url,
}

impl Endpoints {
  pub fn new(base_url: &str) -> Result<Self> {
    let base =
      Url::parse(base_url).map_err(|e| eyre!("Invalid base URL {}: {}", base_url, e))?;

    let list = base
      .join("buglist.cgi")
      .map_err(|e| eyre!("Failed to resolve list endpoint under {}: {}", base_url, e))?;
    let detail = base
      .join("show_bug.cgi")
      .map_err(|e| eyre!("Failed to resolve detail endpoint under {}: {}", base_url, e))?;

    Ok(Self { list, detail })
  }

  /// Advanced-query URL returning the CSV bug list for `params`.
  pub fn list_url(&self, params: &QueryParams) -> Url {
    let mut url = self.list.clone();
    {
      let mut query = url.query_pairs_mut();
      for status in params.status.status_codes() {
        query.append_pair("bug_status", status);
      }
      query.append_pair("classification", "Fedora");
      query.append_pair("product", "Fedora");
      query.append_pair("query_format", "advanced");
      for resolution in params.status.resolution_codes() {
        query.append_pair("resolution", resolution);
      }
      query.append_pair("short_desc", &params.filter);
      query.append_pair("short_desc_type", "allwordssubstr");
      query.append_pair("version", &params.version);
      query.append_pair("ctype", "csv");
      query.append_pair("human", "1");
    }
    url
  }

  /// URL returning one bug's XML detail document.
  pub fn detail_url(&self, bug_id: &str) -> Url {
    let mut url = self.detail.clone();
    url
      .query_pairs_mut()
      .append_pair("ctype", "xml")
      .append_pair("id", bug_id);
    url
  }
}
