//! The bug-list cache: one CSV artifact per (version, status) pair.

use std::path::PathBuf;

use color_eyre::Result;
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::bugzilla::client::RemoteFetcher;
use crate::bugzilla::query::{Endpoints, QueryParams};
use crate::config::CacheConfig;

use super::store;

/// File-backed cache of bug-list documents.
///
/// The cache key is (version, status) only: two runs with different
/// free-text filters but the same version and status resolve to the same
/// artifact, so the second run reads whatever the first one fetched. That
/// collision is deliberate (it matches the historical layout);
/// `strict_list_key` opts into filter-scoped keys instead.
pub struct ListCache<'a> {
  cache: &'a CacheConfig,
  endpoints: &'a Endpoints,
}

impl<'a> ListCache<'a> {
  pub fn new(cache: &'a CacheConfig, endpoints: &'a Endpoints) -> Self {
    Self { cache, endpoints }
  }

  /// Cache path for `params`, derived from (version, status).
  pub fn artifact_path(&self, params: &QueryParams) -> PathBuf {
    let mut stem = format!("{}_{}", params.version, params.status);
    if self.cache.strict_list_key {
      stem.push('_');
      stem.push_str(&filter_digest(&params.filter));
    }
    self.cache.list_dir.join(format!("{}.csv", stem))
  }

  /// Ensure a list artifact exists for `params`, fetching it on a miss.
  ///
  /// A pre-existing artifact is returned as-is with zero network calls; the
  /// cache never expires. Fetch and write failures are logged and reported
  /// as `Ok(None)`: the list is unavailable and the caller should abort the
  /// run cleanly.
  pub async fn ensure_cached<F: RemoteFetcher>(
    &self,
    fetcher: &F,
    params: &QueryParams,
  ) -> Result<Option<PathBuf>> {
    let path = self.artifact_path(params);

    if path.is_file() {
      info!(path = %path.display(), "bug list already cached");
      return Ok(Some(path));
    }

    if let Err(e) = store::ensure_dir(&self.cache.list_dir) {
      warn!(error = %e, "failed to create list cache directory");
      return Ok(None);
    }

    let url = self.endpoints.list_url(params);
    info!(
      version = %params.version,
      status = %params.status,
      filter = %params.filter,
      "retrieving bug list"
    );

    let body = match fetcher.fetch_list(&url).await {
      Ok(body) => body,
      Err(e) => {
        warn!(
          version = %params.version,
          status = %params.status,
          error = %e,
          "failed to retrieve bug list"
        );
        return Ok(None);
      }
    };

    if let Err(e) = store::write_atomic(&path, &body) {
      warn!(path = %path.display(), error = %e, "failed to write bug list");
      return Ok(None);
    }

    Ok(Some(path))
  }
}

/// Short digest of the normalized filter, used by the strict cache key.
fn filter_digest(filter: &str) -> String {
  let mut hasher = Sha256::new();
  hasher.update(filter.trim().to_lowercase().as_bytes());
  let digest = hex::encode(hasher.finalize());
  digest[..8].to_string()
}
