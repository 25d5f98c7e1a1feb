//! The per-bug detail cache with exclusion filtering.

use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::bugzilla::client::RemoteFetcher;
use crate::bugzilla::detail::has_keyword;
use crate::bugzilla::query::Endpoints;
use crate::config::{CacheConfig, ExclusionPolicy, FetchConfig};
use crate::error::FetchErrorKind;

use super::store;

/// How one identifier's cache-populate attempt resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailOutcome {
  /// Artifact already present; no network call was made
  Hit,
  /// Artifact fetched and written
  Written,
  /// Document fetched but carrying the exclusion keyword; nothing written
  Excluded,
  /// A persisted exclusion marker short-circuited the fetch
  SkippedExcluded,
  /// Fetch or write failed; the batch continues without this bug
  Failed(FetchErrorKind),
}

/// File-backed cache of per-bug detail documents.
///
/// The persistence key is (version, bugId): runs with different filters or
/// statuses share the same detail cache for a version, because a bug's
/// detail does not depend on how it was discovered.
pub struct DetailCache<'a> {
  cache: &'a CacheConfig,
  endpoints: &'a Endpoints,
  fetch: &'a FetchConfig,
}

impl<'a> DetailCache<'a> {
  pub fn new(cache: &'a CacheConfig, endpoints: &'a Endpoints, fetch: &'a FetchConfig) -> Self {
    Self {
      cache,
      endpoints,
      fetch,
    }
  }

  /// Final artifact path for `(version, bug_id)`.
  pub fn artifact_path(&self, version: &str, bug_id: &str) -> PathBuf {
    self
      .cache
      .detail_dir
      .join(version)
      .join(format!("{}.xml", bug_id))
  }

  /// Marker recording a fetched-but-excluded bug under `persist-skip`.
  pub fn marker_path(&self, version: &str, bug_id: &str) -> PathBuf {
    self
      .cache
      .detail_dir
      .join(version)
      .join(format!("{}.excluded", bug_id))
  }

  /// Ensure the detail artifact for `(version, bug_id)` exists, fetching on
  /// a miss and filtering excluded documents before they reach disk.
  ///
  /// Every failure is logged here and folded into the returned outcome;
  /// nothing raises, so one bad bug never aborts the batch.
  pub async fn ensure_cached<F: RemoteFetcher>(
    &self,
    fetcher: &F,
    version: &str,
    bug_id: &str,
  ) -> DetailOutcome {
    let path = self.artifact_path(version, bug_id);
    if path.is_file() {
      debug!(bug_id, "bug detail already cached");
      return DetailOutcome::Hit;
    }

    if self.fetch.exclusion_policy == ExclusionPolicy::PersistSkip
      && self.marker_path(version, bug_id).is_file()
    {
      debug!(bug_id, "bug previously excluded, skipping");
      return DetailOutcome::SkippedExcluded;
    }

    let version_dir = self.cache.detail_dir.join(version);
    if let Err(e) = store::ensure_dir(&version_dir) {
      warn!(bug_id, error = %e, "failed to create detail cache directory");
      return DetailOutcome::Failed(FetchErrorKind::Filesystem);
    }

    let url = self.endpoints.detail_url(bug_id);
    info!(bug_id, version, "retrieving bug detail");

    let body = match fetcher.fetch_detail(&url).await {
      Ok(body) => body,
      Err(e) => {
        warn!(bug_id, error = %e, "failed to retrieve bug detail");
        return DetailOutcome::Failed(FetchErrorKind::Transient);
      }
    };

    match has_keyword(&body, &self.fetch.exclusion_keyword) {
      Ok(true) => {
        info!(
          bug_id,
          keyword = %self.fetch.exclusion_keyword,
          "bug excluded, not persisting"
        );
        if self.fetch.exclusion_policy == ExclusionPolicy::PersistSkip {
          if let Err(e) = store::write_atomic(&self.marker_path(version, bug_id), &[]) {
            warn!(bug_id, error = %e, "failed to write exclusion marker");
          }
        }
        DetailOutcome::Excluded
      }
      Ok(false) => match store::write_atomic(&path, &body) {
        Ok(()) => DetailOutcome::Written,
        Err(e) => {
          warn!(bug_id, error = %e, "failed to write bug detail");
          DetailOutcome::Failed(FetchErrorKind::Filesystem)
        }
      },
      Err(e) => {
        warn!(bug_id, error = %e, "unparsable bug detail document");
        DetailOutcome::Failed(FetchErrorKind::MalformedResponse)
      }
    }
  }
}
