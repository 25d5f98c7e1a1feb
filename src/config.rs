use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
  pub remote: RemoteConfig,
  pub cache: CacheConfig,
  pub fetch: FetchConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
  /// Base URL of the Bugzilla instance
  pub base_url: String,
  /// Per-request timeout in seconds
  pub timeout_secs: u64,
  /// Attempts per request before giving up (minimum 1)
  pub max_attempts: u32,
  /// Initial backoff between attempts, doubled per retry
  pub retry_backoff_ms: u64,
}

impl Default for RemoteConfig {
  fn default() -> Self {
    Self {
      base_url: "https://bugzilla.redhat.com".to_string(),
      timeout_secs: 30,
      max_attempts: 3,
      retry_backoff_ms: 500,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
  /// Directory holding one list artifact per (version, status) pair
  pub list_dir: PathBuf,
  /// Directory holding per-version subdirectories of detail artifacts
  pub detail_dir: PathBuf,
  /// Include a digest of the free-text filter in the list cache key.
  ///
  /// Off by default: two runs with the same (version, status) but different
  /// filters share one cached list, matching the historical layout.
  pub strict_list_key: bool,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      list_dir: PathBuf::from("./buglist"),
      detail_dir: PathBuf::from("./bugs"),
      strict_list_key: false,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
  /// Concurrent detail fetches; 1 reproduces strictly sequential behavior
  pub concurrency: usize,
  /// Keyword marking a bug detail as not to be persisted
  pub exclusion_keyword: String,
  pub exclusion_policy: ExclusionPolicy,
}

impl Default for FetchConfig {
  fn default() -> Self {
    Self {
      concurrency: 4,
      exclusion_keyword: "SecurityTracking".to_string(),
      exclusion_policy: ExclusionPolicy::default(),
    }
  }
}

/// What to do when a fetched detail document carries the exclusion keyword.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ExclusionPolicy {
  /// Leave no trace; every run re-fetches and re-checks the bug, so a later
  /// un-excluded state on the remote side is picked up automatically
  #[default]
  Recheck,
  /// Persist a marker next to the would-be artifact and skip the fetch on
  /// later runs
  PersistSkip,
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./bzgrab.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/bzgrab/config.yaml
  ///
  /// Falls back to built-in defaults when no file is found; the tool is
  /// usable with zero setup.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Ok(Self::default()),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("bzgrab.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("bzgrab").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    let config: Config = serde_yaml::from_str(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))?;

    Ok(config)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_match_historical_layout() {
    let config = Config::default();

    assert_eq!(config.cache.list_dir, PathBuf::from("./buglist"));
    assert_eq!(config.cache.detail_dir, PathBuf::from("./bugs"));
    assert!(!config.cache.strict_list_key);
    assert_eq!(config.fetch.exclusion_keyword, "SecurityTracking");
    assert_eq!(config.fetch.exclusion_policy, ExclusionPolicy::Recheck);
  }

  #[test]
  fn partial_config_keeps_defaults_for_missing_sections() {
    let config: Config = serde_yaml::from_str(
      "cache:\n  strict_list_key: true\nfetch:\n  exclusion_policy: persist-skip\n",
    )
    .unwrap();

    assert!(config.cache.strict_list_key);
    assert_eq!(config.fetch.exclusion_policy, ExclusionPolicy::PersistSkip);
    // Untouched sections keep their defaults
    assert_eq!(config.remote.max_attempts, 3);
    assert_eq!(config.cache.list_dir, PathBuf::from("./buglist"));
  }

  #[test]
  fn load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "remote:\n  base_url: https://bz.example.org\n").unwrap();

    let config = Config::load(Some(&path)).unwrap();
    assert_eq!(config.remote.base_url, "https://bz.example.org");
  }

  #[test]
  fn explicit_missing_path_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.yaml");

    assert!(Config::load(Some(&missing)).is_err());
  }
}
