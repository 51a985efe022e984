//! File-backed persistence store
//!
//! Implements the `RawStore` contract on the local filesystem under a
//! configured data directory:
//! - raw documents at `<data_dir>/raw/<key>.<ext>`, extension chosen by
//!   content sniffing with the response Content-Type as fallback
//! - metadata sidecars at `<data_dir>/meta/<key>.json`

use crate::gazette::{ContentKind, Metainfo, RelativeKey};
use crate::storage::traits::{RawStore, StorageError, StorageResult};
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use std::path::{Component, Path, PathBuf};
use url::Url;

/// Filesystem-backed document store
#[derive(Debug)]
pub struct FileStore {
    raw_dir: PathBuf,
    meta_dir: PathBuf,
}

impl FileStore {
    /// Creates a store rooted at `data_dir`
    ///
    /// No directories are created until the first write.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        FileStore {
            raw_dir: data_dir.join("raw"),
            meta_dir: data_dir.join("meta"),
        }
    }

    /// Directory holding raw documents
    pub fn raw_dir(&self) -> &Path {
        &self.raw_dir
    }

    /// Directory holding metadata sidecars
    pub fn meta_dir(&self) -> &Path {
        &self.meta_dir
    }

    /// Resolves `key` under `base`, rejecting keys that escape it
    fn key_path(&self, base: &Path, key: &RelativeKey) -> StorageResult<PathBuf> {
        let rel = Path::new(key.as_str());
        let well_formed = !rel.as_os_str().is_empty()
            && rel.components().all(|c| matches!(c, Component::Normal(_)));
        if !well_formed {
            return Err(StorageError::InvalidKey(key.as_str().to_string()));
        }
        Ok(base.join(rel))
    }

    /// True when a raw file already exists for `key` under any extension
    fn raw_exists(&self, key: &RelativeKey) -> bool {
        let path = match self.key_path(&self.raw_dir, key) {
            Ok(path) => path,
            Err(_) => return false,
        };
        let parent = match path.parent() {
            Some(parent) => parent,
            None => return false,
        };
        let stem = match path.file_name().and_then(|name| name.to_str()) {
            Some(stem) => stem,
            None => return false,
        };
        let entries = match std::fs::read_dir(parent) {
            Ok(entries) => entries,
            Err(_) => return false,
        };

        for entry in entries.flatten() {
            let name = entry.file_name();
            let name = match name.to_str() {
                Some(name) => name,
                None => continue,
            };
            // In-flight temp files are not saved content.
            if name.ends_with(".tmp") {
                continue;
            }
            match name.strip_prefix(stem) {
                Some("") => return true,
                Some(rest) if rest.starts_with('.') => return true,
                _ => {}
            }
        }
        false
    }
}

impl RawStore for FileStore {
    fn should_download_raw(&self, key: &RelativeKey, url: &str, validate_url: bool) -> bool {
        if validate_url && Url::parse(url).is_err() {
            tracing::warn!("Unusable url {} for {}", url, key);
            return false;
        }
        if self.key_path(&self.raw_dir, key).is_err() {
            tracing::warn!("Unusable key {}", key);
            return false;
        }
        !self.raw_exists(key)
    }

    fn save_raw_doc(
        &self,
        source: &str,
        key: &RelativeKey,
        headers: &HeaderMap,
        body: &[u8],
    ) -> StorageResult<bool> {
        if self.raw_exists(key) {
            tracing::debug!("Raw content already present for {} ({})", key, source);
            return Ok(false);
        }

        let base = self.key_path(&self.raw_dir, key)?;
        let path = append_extension(&base, extension_for(headers, body));
        atomic_write(&path, body)?;
        tracing::debug!("Wrote {} bytes to {}", body.len(), path.display());
        Ok(true)
    }

    fn save_metainfo(
        &self,
        source: &str,
        key: &RelativeKey,
        metainfo: &Metainfo,
    ) -> StorageResult<bool> {
        let base = self.key_path(&self.meta_dir, key)?;
        let path = append_extension(&base, "json");
        let bytes = serde_json::to_vec_pretty(metainfo)?;
        atomic_write(&path, &bytes)?;
        tracing::debug!("Wrote metainfo for {} ({})", key, source);
        Ok(true)
    }
}

/// Picks a filename extension from sniffed content, falling back to the
/// response Content-Type
fn extension_for(headers: &HeaderMap, body: &[u8]) -> &'static str {
    let mut kind = ContentKind::sniff(body);
    if kind == ContentKind::Unknown {
        if let Some(content_type) = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) {
            kind = ContentKind::from_content_type(content_type);
        }
    }
    kind.extension()
}

/// Appends `.extension` to the full filename
///
/// `Path::with_extension` would clobber trailing dot-segments of document
/// ids ("notification.3" and "notification.7" must stay distinct files).
fn append_extension(path: &Path, extension: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}

/// Writes via a temp file and rename so a crash mid-write never leaves
/// partial content at the final path
fn atomic_write(path: &Path, bytes: &[u8]) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| StorageError::Io {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let tmp_path = append_extension(path, "tmp");
    std::fs::write(&tmp_path, bytes).map_err(|e| StorageError::Io {
        path: tmp_path.clone(),
        source: e,
    })?;
    std::fs::rename(&tmp_path, path).map_err(|e| StorageError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    const PDF_BYTES: &[u8] = b"%PDF-1.4 fake gazette body";

    fn test_store() -> (tempfile::TempDir, FileStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        (dir, store)
    }

    #[test]
    fn test_should_download_when_absent() {
        let (_dir, store) = test_store();
        let key = RelativeKey::from("goa/2020-01-01/doc1");
        assert!(store.should_download_raw(&key, "http://example.com/doc1.pdf", true));
    }

    #[test]
    fn test_save_then_dedup() {
        let (dir, store) = test_store();
        let key = RelativeKey::from("goa/2020-01-01/doc1");

        let saved = store
            .save_raw_doc("goa", &key, &HeaderMap::new(), PDF_BYTES)
            .unwrap();
        assert!(saved);
        assert!(dir.path().join("raw/goa/2020-01-01/doc1.pdf").is_file());

        // Existing content is authoritative.
        assert!(!store.should_download_raw(&key, "http://example.com/doc1.pdf", true));
        let saved_again = store
            .save_raw_doc("goa", &key, &HeaderMap::new(), PDF_BYTES)
            .unwrap();
        assert!(!saved_again);
    }

    #[test]
    fn test_unusable_url_rejected_when_validating() {
        let (_dir, store) = test_store();
        let key = RelativeKey::from("goa/2020-01-01/doc1");
        assert!(!store.should_download_raw(&key, "not a url", true));
        assert!(store.should_download_raw(&key, "not a url", false));
    }

    #[test]
    fn test_extension_falls_back_to_content_type() {
        let (dir, store) = test_store();
        let key = RelativeKey::from("goa/2020-01-01/doc2");

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/pdf"));

        let saved = store
            .save_raw_doc("goa", &key, &headers, &[0x01, 0x02, 0x03])
            .unwrap();
        assert!(saved);
        assert!(dir.path().join("raw/goa/2020-01-01/doc2.pdf").is_file());
    }

    #[test]
    fn test_unsniffable_body_without_headers_is_unkwn() {
        let (dir, store) = test_store();
        let key = RelativeKey::from("goa/2020-01-01/doc3");

        store
            .save_raw_doc("goa", &key, &HeaderMap::new(), &[0x01, 0x02, 0x03])
            .unwrap();
        assert!(dir.path().join("raw/goa/2020-01-01/doc3.unkwn").is_file());
    }

    #[test]
    fn test_metainfo_sidecar_roundtrip() {
        let (dir, store) = test_store();
        let key = RelativeKey::from("goa/2020-01-01/doc1");

        let mut metainfo = Metainfo::new();
        metainfo.set_title("Weekly Gazette");

        let saved = store.save_metainfo("goa", &key, &metainfo).unwrap();
        assert!(saved);

        let path = dir.path().join("meta/goa/2020-01-01/doc1.json");
        let text = std::fs::read_to_string(path).unwrap();
        let read_back: Metainfo = serde_json::from_str(&text).unwrap();
        assert_eq!(read_back.title(), Some("Weekly Gazette"));
    }

    #[test]
    fn test_traversal_key_rejected() {
        let (_dir, store) = test_store();
        let key = RelativeKey::from("../evil");

        assert!(!store.should_download_raw(&key, "http://example.com/x", false));
        let result = store.save_raw_doc("goa", &key, &HeaderMap::new(), PDF_BYTES);
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }

    #[test]
    fn test_existence_requires_whole_stem() {
        let (_dir, store) = test_store();
        let key = RelativeKey::from("goa/2020-01-01/doc1");
        store
            .save_raw_doc("goa", &key, &HeaderMap::new(), PDF_BYTES)
            .unwrap();

        // doc1.pdf must not shadow the distinct document doc10.
        let longer = RelativeKey::from("goa/2020-01-01/doc10");
        assert!(store.should_download_raw(&longer, "http://example.com/doc10.pdf", true));
    }

    #[test]
    fn test_leftover_tmp_does_not_suppress_download() {
        let (dir, store) = test_store();
        let key = RelativeKey::from("goa/2020-01-01/doc1");

        let parent = dir.path().join("raw/goa/2020-01-01");
        std::fs::create_dir_all(&parent).unwrap();
        std::fs::write(parent.join("doc1.pdf.tmp"), b"partial").unwrap();

        assert!(store.should_download_raw(&key, "http://example.com/doc1.pdf", true));
    }
}
