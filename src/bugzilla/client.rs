//! HTTP access to the remote Bugzilla instance.

use std::time::Duration;

use color_eyre::{eyre::eyre, Result};
use tracing::warn;
use url::Url;

use crate::config::RemoteConfig;

/// Network seam for the caches and the pipeline.
///
/// Production code talks to the remote through [`HttpFetcher`]; tests swap
/// in an in-memory implementation that serves canned bodies and counts the
/// calls it receives.
#[allow(async_fn_in_trait)]
pub trait RemoteFetcher {
  /// Retrieve the CSV bug-list document at `url`.
  async fn fetch_list(&self, url: &Url) -> Result<Vec<u8>>;

  /// Retrieve one bug's XML detail document at `url`.
  async fn fetch_detail(&self, url: &Url) -> Result<Vec<u8>>;
}

/// Reqwest-backed fetcher with a per-request timeout and bounded retry.
#[derive(Clone)]
pub struct HttpFetcher {
  client: reqwest::Client,
  max_attempts: u32,
  retry_backoff: Duration,
}

impl HttpFetcher {
  pub fn new(config: &RemoteConfig) -> Result<Self> {
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self {
      client,
      max_attempts: config.max_attempts.max(1),
      retry_backoff: Duration::from_millis(config.retry_backoff_ms),
    })
  }

  /// GET `url`, retrying failures with exponential backoff up to the
  /// configured attempt cap.
  ///
  /// Retrying never widens the at-most-once cache contract: callers only
  /// request URLs whose artifacts are still missing.
  async fn get_with_retry(&self, url: &Url) -> Result<Vec<u8>> {
    let mut backoff = self.retry_backoff;
    let mut last_err = None;

    for attempt in 1..=self.max_attempts {
      match self.get_once(url).await {
        Ok(body) => return Ok(body),
        Err(e) => {
          warn!(%url, attempt, max_attempts = self.max_attempts, error = %e, "request failed");
          last_err = Some(e);
          if attempt < self.max_attempts {
            tokio::time::sleep(backoff).await;
            backoff *= 2;
          }
        }
      }
    }

    Err(last_err.unwrap_or_else(|| eyre!("Request to {} failed", url)))
  }

  async fn get_once(&self, url: &Url) -> Result<Vec<u8>> {
    let response = self
      .client
      .get(url.clone())
      .send()
      .await
      .map_err(|e| eyre!("Request to {} failed: {}", url, e))?
      .error_for_status()
      .map_err(|e| eyre!("Request to {} failed: {}", url, e))?;

    let body = response
      .bytes()
      .await
      .map_err(|e| eyre!("Failed to read response body from {}: {}", url, e))?;

    Ok(body.to_vec())
  }
}

impl RemoteFetcher for HttpFetcher {
  async fn fetch_list(&self, url: &Url) -> Result<Vec<u8>> {
    self.get_with_retry(url).await
  }

  async fn fetch_detail(&self, url: &Url) -> Result<Vec<u8>> {
    self.get_with_retry(url).await
  }
}

#[cfg(test)]
pub(crate) mod testing {
  use std::collections::HashMap;
  use std::sync::atomic::{AtomicUsize, Ordering};

  use color_eyre::{eyre::eyre, Result};
  use url::Url;

  use super::RemoteFetcher;

  /// In-memory fetcher serving canned bodies and counting calls.
  ///
  /// A detail identifier with no scripted body fails its fetch, which is how
  /// tests simulate a transient network failure for one bug.
  pub struct ScriptedFetcher {
    list_body: Option<Vec<u8>>,
    details: HashMap<String, Vec<u8>>,
    pub list_calls: AtomicUsize,
    pub detail_calls: AtomicUsize,
  }

  impl ScriptedFetcher {
    pub fn new() -> Self {
      Self {
        list_body: None,
        details: HashMap::new(),
        list_calls: AtomicUsize::new(0),
        detail_calls: AtomicUsize::new(0),
      }
    }

    pub fn with_list(mut self, body: &str) -> Self {
      self.list_body = Some(body.as_bytes().to_vec());
      self
    }

    pub fn with_detail(mut self, bug_id: &str, body: &str) -> Self {
      self.details.insert(bug_id.to_string(), body.as_bytes().to_vec());
      self
    }

    pub fn list_calls(&self) -> usize {
      self.list_calls.load(Ordering::SeqCst)
    }

    pub fn detail_calls(&self) -> usize {
      self.detail_calls.load(Ordering::SeqCst)
    }
  }

  impl RemoteFetcher for ScriptedFetcher {
    async fn fetch_list(&self, _url: &Url) -> Result<Vec<u8>> {
      self.list_calls.fetch_add(1, Ordering::SeqCst);
      self
        .list_body
        .clone()
        .ok_or_else(|| eyre!("scripted list failure"))
    }

    async fn fetch_detail(&self, url: &Url) -> Result<Vec<u8>> {
      self.detail_calls.fetch_add(1, Ordering::SeqCst);
      let id = url
        .query_pairs()
        .find(|(k, _)| k == "id")
        .map(|(_, v)| v.into_owned())
        .ok_or_else(|| eyre!("detail url without id: {}", url))?;
      self
        .details
        .get(&id)
        .cloned()
        .ok_or_else(|| eyre!("scripted detail failure for {}", id))
    }
  }
}
