//! Decoding of the cached bug-list artifact.

use std::path::Path;

use color_eyre::{eyre::eyre, Result};
use tracing::warn;

/// Parse the CSV list artifact at `path` into bug identifiers.
///
/// The first row is the column header and is never data; the first field of
/// every subsequent row is the identifier. Row order is preserved because it
/// determines fetch order. Rows without an identifier are logged and
/// skipped so one bad row cannot take down the batch.
pub fn parse(path: &Path) -> Result<Vec<String>> {
  let mut reader = csv::ReaderBuilder::new()
    .has_headers(true)
    .flexible(true)
    .from_path(path)
    .map_err(|e| eyre!("Failed to open bug list {}: {}", path.display(), e))?;

  let mut ids = Vec::new();
  for (index, record) in reader.records().enumerate() {
    // 1-based row number counting the header, for diagnostics
    let row = index + 2;

    let record = match record {
      Ok(record) => record,
      Err(e) => {
        warn!(path = %path.display(), row, error = %e, "malformed list row, skipping");
        continue;
      }
    };

    match record.get(0) {
      Some(id) if !id.trim().is_empty() => ids.push(id.trim().to_string()),
      _ => warn!(path = %path.display(), row, "list row has no identifier, skipping"),
    }
  }

  Ok(ids)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn write_list(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("list.csv");
    std::fs::write(&path, contents).unwrap();
    (dir, path)
  }

  #[test]
  fn preserves_row_order() {
    let (_dir, path) = write_list("bug_id,short_desc\nB,second\nA,first\nC,third\n");

    assert_eq!(parse(&path).unwrap(), vec!["B", "A", "C"]);
  }

  #[test]
  fn header_row_is_never_data() {
    let (_dir, path) = write_list("bug_id,short_desc\n1001,something broke\n");

    assert_eq!(parse(&path).unwrap(), vec!["1001"]);
  }

  #[test]
  fn rows_without_identifier_are_skipped() {
    let (_dir, path) = write_list("bug_id,short_desc\n1001,x\n,orphaned summary\n1002,y\n");

    assert_eq!(parse(&path).unwrap(), vec!["1001", "1002"]);
  }

  #[test]
  fn quoted_fields_with_commas_do_not_shift_the_identifier() {
    let (_dir, path) = write_list("bug_id,short_desc\n1001,\"hangs, then crashes\"\n");

    assert_eq!(parse(&path).unwrap(), vec!["1001"]);
  }

  #[test]
  fn header_only_artifact_yields_no_identifiers() {
    let (_dir, path) = write_list("bug_id,short_desc\n");

    assert!(parse(&path).unwrap().is_empty());
  }

  #[test]
  fn missing_artifact_is_an_error() {
    let dir = tempfile::tempdir().unwrap();

    assert!(parse(&dir.path().join("absent.csv")).is_err());
  }
}
