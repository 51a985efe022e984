use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Structured metadata for one gazette document
///
/// Canonical fields cover what nearly every source publishes; anything
/// source-specific (issue numbers, departments, district names) goes into
/// the ordered extension list. The record is owned by the site adapter and
/// handed to the storage gate for persistence next to the raw document.
///
/// String values are scrubbed of XML-illegal characters on insertion, so a
/// record can always be re-serialized into XML-based archive formats.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metainfo {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    date: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    href: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    subject: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    ministry: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    gztype: Option<String>,

    /// Source-specific fields, kept in insertion order
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    extra: Vec<(String, String)>,
}

impl Metainfo {
    pub fn new() -> Self {
        Metainfo::default()
    }

    pub fn set_date(&mut self, date: NaiveDate) {
        self.date = Some(date);
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn set_url(&mut self, url: impl Into<String>) {
        self.url = Some(replace_xml_illegal_chars(&url.into()));
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn set_href(&mut self, href: impl Into<String>) {
        self.href = Some(replace_xml_illegal_chars(&href.into()));
    }

    pub fn href(&self) -> Option<&str> {
        self.href.as_deref()
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(replace_xml_illegal_chars(&title.into()));
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn set_subject(&mut self, subject: impl Into<String>) {
        self.subject = Some(replace_xml_illegal_chars(&subject.into()));
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    pub fn set_ministry(&mut self, ministry: impl Into<String>) {
        self.ministry = Some(replace_xml_illegal_chars(&ministry.into()));
    }

    pub fn ministry(&self) -> Option<&str> {
        self.ministry.as_deref()
    }

    pub fn set_gztype(&mut self, gztype: impl Into<String>) {
        self.gztype = Some(replace_xml_illegal_chars(&gztype.into()));
    }

    pub fn gztype(&self) -> Option<&str> {
        self.gztype.as_deref()
    }

    /// Sets a field by name
    ///
    /// Canonical string fields route to their typed slots; any other name
    /// lands in the extension list. Setting an existing extension field
    /// replaces its value in place, keeping its original position.
    pub fn set_field(&mut self, field: &str, value: impl Into<String>) {
        let value = replace_xml_illegal_chars(&value.into());
        match field {
            "url" => self.url = Some(value),
            "href" => self.href = Some(value),
            "title" => self.title = Some(value),
            "subject" => self.subject = Some(value),
            "ministry" => self.ministry = Some(value),
            "gztype" => self.gztype = Some(value),
            _ => {
                if let Some(entry) = self.extra.iter_mut().find(|(k, _)| k == field) {
                    entry.1 = value;
                } else {
                    self.extra.push((field.to_string(), value));
                }
            }
        }
    }

    /// Gets a string field by name, canonical or extension
    pub fn get_field(&self, field: &str) -> Option<&str> {
        match field {
            "url" => self.url(),
            "href" => self.href(),
            "title" => self.title(),
            "subject" => self.subject(),
            "ministry" => self.ministry(),
            "gztype" => self.gztype(),
            _ => self
                .extra
                .iter()
                .find(|(k, _)| k == field)
                .map(|(_, v)| v.as_str()),
        }
    }

    /// Extension fields in insertion order
    pub fn extras(&self) -> &[(String, String)] {
        &self.extra
    }
}

/// Replaces characters that are illegal in XML 1.0 with a space
///
/// Covers the C0 controls other than tab/newline/carriage-return and the
/// non-characters U+FFFE/U+FFFF.
pub fn replace_xml_illegal_chars(value: &str) -> String {
    fn illegal(c: char) -> bool {
        matches!(c,
            '\u{00}'..='\u{08}'
            | '\u{0b}'
            | '\u{0c}'
            | '\u{0e}'..='\u{1f}'
            | '\u{fffe}'
            | '\u{ffff}')
    }

    if value.chars().any(illegal) {
        value
            .chars()
            .map(|c| if illegal(c) { ' ' } else { c })
            .collect()
    } else {
        value.to_string()
    }
}
