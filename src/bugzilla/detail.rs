//! Inspection of fetched bug detail documents.

use quick_xml::events::Event;
use quick_xml::Reader;

/// Whether the detail document's keyword set carries `keyword`.
///
/// Keywords arrive as a comma-separated token list inside the document's
/// `keywords` element; matching is per-token and case-insensitive, so a
/// keyword never matches a substring of a longer one. The document is not
/// otherwise validated. An unparsable document is an error for the caller
/// to classify.
pub fn has_keyword(document: &[u8], keyword: &str) -> Result<bool, quick_xml::Error> {
  let wanted = keyword.trim().to_lowercase();

  let mut reader = Reader::from_reader(document);
  let mut in_keywords = false;
  let mut buf = Vec::new();

  loop {
    match reader.read_event_into(&mut buf)? {
      Event::Start(e) if e.local_name().as_ref() == b"keywords" => in_keywords = true,
      Event::End(e) if e.local_name().as_ref() == b"keywords" => in_keywords = false,
      Event::Text(text) if in_keywords => {
        let text = text.unescape()?;
        if text
          .split(',')
          .any(|token| token.trim().to_lowercase() == wanted)
        {
          return Ok(true);
        }
      }
      Event::Eof => return Ok(false),
      _ => {}
    }
    buf.clear();
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn bug_xml(keywords: &str) -> String {
    format!(
      "<bugzilla><bug><bug_id>1002</bug_id><keywords>{}</keywords>\
       <short_desc>kernel panic</short_desc></bug></bugzilla>",
      keywords
    )
  }

  #[test]
  fn finds_the_exclusion_keyword() {
    let doc = bug_xml("Triaged, SecurityTracking");

    assert!(has_keyword(doc.as_bytes(), "SecurityTracking").unwrap());
  }

  #[test]
  fn matching_is_case_insensitive() {
    let doc = bug_xml("securitytracking");

    assert!(has_keyword(doc.as_bytes(), "SecurityTracking").unwrap());
  }

  #[test]
  fn tokens_do_not_match_by_substring() {
    let doc = bug_xml("SecurityTrackingAudit, Triaged");

    assert!(!has_keyword(doc.as_bytes(), "SecurityTracking").unwrap());
  }

  #[test]
  fn absent_keywords_element_means_untagged() {
    let doc = "<bugzilla><bug><bug_id>1001</bug_id></bug></bugzilla>";

    assert!(!has_keyword(doc.as_bytes(), "SecurityTracking").unwrap());
  }

  #[test]
  fn keyword_text_outside_the_keywords_element_does_not_count() {
    let doc =
      "<bugzilla><bug><short_desc>SecurityTracking regression</short_desc></bug></bugzilla>";

    assert!(!has_keyword(doc.as_bytes(), "SecurityTracking").unwrap());
  }

  #[test]
  fn mismatched_markup_is_an_error() {
    let doc = "<bugzilla><bug></wrong></bugzilla>";

    assert!(has_keyword(doc.as_bytes(), "SecurityTracking").is_err());
  }
}
