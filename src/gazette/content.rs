/// Document type sniffed from a fetched body
///
/// Gazette sites are careless with Content-Type headers; an "application/pdf"
/// response is frequently an HTML error page. The sniffer inspects the bytes
/// themselves so the store names files by what they are, and adapters can
/// reject masquerading documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    Html,
    Postscript,
    Pdf,
    Text,
    Png,
    MsWord,
    Rtf,
    Excel,
    Unknown,
}

impl ContentKind {
    /// Classifies a document by its leading bytes
    pub fn sniff(bytes: &[u8]) -> ContentKind {
        if bytes.starts_with(b"%PDF") {
            return ContentKind::Pdf;
        }
        if bytes.starts_with(b"%!PS") {
            return ContentKind::Postscript;
        }
        if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]) {
            return ContentKind::Png;
        }
        if bytes.starts_with(b"{\\rtf") {
            return ContentKind::Rtf;
        }
        // OLE compound document; gazette archives only ship Word files in it
        if bytes.starts_with(&[0xd0, 0xcf, 0x11, 0xe0, 0xa1, 0xb1, 0x1a, 0xe1]) {
            return ContentKind::MsWord;
        }

        let trimmed = skip_ascii_whitespace(bytes);
        if starts_with_ignore_case(trimmed, "<!doctype html")
            || starts_with_ignore_case(trimmed, "<html")
        {
            return ContentKind::Html;
        }

        let sample = &bytes[..bytes.len().min(512)];
        if looks_textual(sample) {
            return ContentKind::Text;
        }

        ContentKind::Unknown
    }

    /// Classifies from an HTTP Content-Type header value
    ///
    /// Used as a fallback when sniffing comes up Unknown; matches on the
    /// media-type prefix so parameters like charset are ignored.
    pub fn from_content_type(value: &str) -> ContentKind {
        let value = value.trim().to_ascii_lowercase();
        if value.starts_with("text/html") {
            ContentKind::Html
        } else if value.starts_with("application/postscript") {
            ContentKind::Postscript
        } else if value.starts_with("application/pdf") {
            ContentKind::Pdf
        } else if value.starts_with("text/plain") {
            ContentKind::Text
        } else if value.starts_with("image/png") {
            ContentKind::Png
        } else if value.starts_with("application/msword") {
            ContentKind::MsWord
        } else if value.starts_with("text/rtf") {
            ContentKind::Rtf
        } else if value.starts_with("application/vnd.ms-excel") {
            ContentKind::Excel
        } else {
            ContentKind::Unknown
        }
    }

    /// File extension used when storing a document of this kind
    pub fn extension(&self) -> &'static str {
        match self {
            ContentKind::Html => "html",
            ContentKind::Postscript => "ps",
            ContentKind::Pdf => "pdf",
            ContentKind::Text => "txt",
            ContentKind::Png => "png",
            ContentKind::MsWord => "doc",
            ContentKind::Rtf => "rtf",
            ContentKind::Excel => "xls",
            ContentKind::Unknown => "unkwn",
        }
    }
}

/// Sniffs a document and returns its storage extension
pub fn file_extension(bytes: &[u8]) -> &'static str {
    ContentKind::sniff(bytes).extension()
}

fn skip_ascii_whitespace(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    &bytes[start..]
}

fn starts_with_ignore_case(bytes: &[u8], prefix: &str) -> bool {
    bytes.len() >= prefix.len() && bytes[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

/// Printable text heuristic: no NULs, no control bytes outside tab/newline
fn looks_textual(sample: &[u8]) -> bool {
    !sample.is_empty()
        && sample
            .iter()
            .all(|b| matches!(b, b'\t' | b'\n' | b'\r') || *b >= 0x20)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_pdf() {
        assert_eq!(ContentKind::sniff(b"%PDF-1.4 rest"), ContentKind::Pdf);
    }

    #[test]
    fn test_sniff_postscript() {
        assert_eq!(
            ContentKind::sniff(b"%!PS-Adobe-3.0\n"),
            ContentKind::Postscript
        );
    }

    #[test]
    fn test_sniff_png() {
        let bytes = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0x00];
        assert_eq!(ContentKind::sniff(&bytes), ContentKind::Png);
    }

    #[test]
    fn test_sniff_rtf() {
        assert_eq!(ContentKind::sniff(b"{\\rtf1\\ansi"), ContentKind::Rtf);
    }

    #[test]
    fn test_sniff_ole_as_word() {
        let bytes = [0xd0, 0xcf, 0x11, 0xe0, 0xa1, 0xb1, 0x1a, 0xe1, 0x00];
        assert_eq!(ContentKind::sniff(&bytes), ContentKind::MsWord);
    }

    #[test]
    fn test_sniff_html_doctype() {
        assert_eq!(
            ContentKind::sniff(b"\n  <!DOCTYPE HTML><html>"),
            ContentKind::Html
        );
    }

    #[test]
    fn test_sniff_html_tag() {
        assert_eq!(ContentKind::sniff(b"<html lang=\"en\">"), ContentKind::Html);
    }

    #[test]
    fn test_sniff_plain_text() {
        assert_eq!(
            ContentKind::sniff("Gazette notification no. 12\n".as_bytes()),
            ContentKind::Text
        );
    }

    #[test]
    fn test_sniff_binary_garbage_unknown() {
        let bytes = [0x00, 0x01, 0x02, 0xff, 0xfe];
        assert_eq!(ContentKind::sniff(&bytes), ContentKind::Unknown);
    }

    #[test]
    fn test_sniff_empty_unknown() {
        assert_eq!(ContentKind::sniff(b""), ContentKind::Unknown);
    }

    #[test]
    fn test_from_content_type() {
        assert_eq!(
            ContentKind::from_content_type("text/html; charset=utf-8"),
            ContentKind::Html
        );
        assert_eq!(
            ContentKind::from_content_type("application/pdf"),
            ContentKind::Pdf
        );
        assert_eq!(
            ContentKind::from_content_type("application/vnd.ms-excel"),
            ContentKind::Excel
        );
        assert_eq!(
            ContentKind::from_content_type("application/zip"),
            ContentKind::Unknown
        );
    }

    #[test]
    fn test_extensions() {
        assert_eq!(ContentKind::Pdf.extension(), "pdf");
        assert_eq!(ContentKind::MsWord.extension(), "doc");
        assert_eq!(ContentKind::Unknown.extension(), "unkwn");
    }

    #[test]
    fn test_file_extension_helper() {
        assert_eq!(file_extension(b"%PDF-1.7"), "pdf");
        assert_eq!(file_extension(&[0x00, 0xff]), "unkwn");
    }
}
