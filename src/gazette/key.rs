use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Path-like identifier for one document: `source/date/document-id`
///
/// The key doubles as the dedup handle checked before a fetch and as the
/// relative storage location for the raw document and its metadata sidecar.
/// Once raw content exists at a key it is treated as authoritative and is
/// not fetched again.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelativeKey(String);

impl RelativeKey {
    /// Key prefix for one source and day (`source/YYYY-MM-DD`)
    ///
    /// The sync driver hands this to the site adapter, which joins the
    /// per-document ids it discovers onto it.
    pub fn for_day(source: &str, date: NaiveDate) -> Self {
        RelativeKey(format!("{}/{}", source, date))
    }

    /// Full key for one document of one source and day
    pub fn for_doc(source: &str, date: NaiveDate, doc_id: &str) -> Self {
        Self::for_day(source, date).join(doc_id)
    }

    /// Appends a segment to the key
    ///
    /// Newlines are stripped from the segment; keys are written one per
    /// line into ledger files.
    pub fn join(&self, segment: &str) -> Self {
        let clean: String = segment
            .chars()
            .filter(|c| *c != '\n' && *c != '\r')
            .collect();
        RelativeKey(format!("{}/{}", self.0, clean))
    }

    /// The key as a relative path string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RelativeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RelativeKey {
    fn from(path: &str) -> Self {
        RelativeKey(path.to_string())
    }
}

impl From<String> for RelativeKey {
    fn from(path: String) -> Self {
        RelativeKey(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_for_day_format() {
        let key = RelativeKey::for_day("bihar", date(2020, 3, 7));
        assert_eq!(key.as_str(), "bihar/2020-03-07");
    }

    #[test]
    fn test_for_doc_joins_id() {
        let key = RelativeKey::for_doc("bihar", date(2020, 3, 7), "216636");
        assert_eq!(key.as_str(), "bihar/2020-03-07/216636");
    }

    #[test]
    fn test_join_accumulates() {
        let key = RelativeKey::for_day("andhra", date(2019, 12, 1)).join("docs").join("17");
        assert_eq!(key.as_str(), "andhra/2019-12-01/docs/17");
    }

    #[test]
    fn test_join_strips_newlines() {
        let key = RelativeKey::for_day("andhra", date(2019, 12, 1)).join("doc\n17\r");
        assert_eq!(key.as_str(), "andhra/2019-12-01/doc17");
    }

    #[test]
    fn test_display_matches_as_str() {
        let key = RelativeKey::for_doc("goa", date(2021, 1, 2), "g-5");
        assert_eq!(format!("{}", key), key.as_str());
    }

    #[test]
    fn test_from_str_roundtrip() {
        let key = RelativeKey::from("goa/2021-01-02/g-5");
        assert_eq!(key.as_str(), "goa/2021-01-02/g-5");
    }
}
