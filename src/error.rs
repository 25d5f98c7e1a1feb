//! Failure classification for per-item fetch operations.

use std::fmt;

/// Why a single cache-populate operation failed.
///
/// The orchestrator inspects this instead of letting failures propagate:
/// transient trouble leaves the cache key absent and is worth re-attempting
/// on a later run, malformed payloads are not, and filesystem trouble points
/// at the local environment rather than the remote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
  /// Network, timeout, or HTTP-level failure
  Transient,
  /// The remote payload could not be decoded
  MalformedResponse,
  /// Directory creation or artifact write failed
  Filesystem,
}

impl fmt::Display for FetchErrorKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let label = match self {
      FetchErrorKind::Transient => "transient fetch failure",
      FetchErrorKind::MalformedResponse => "malformed response",
      FetchErrorKind::Filesystem => "filesystem failure",
    };
    f.write_str(label)
  }
}
