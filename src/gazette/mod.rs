//! Gazette document model
//!
//! This module holds the records shared between adapters and the storage
//! layer: the structured metadata for one document, the path-like key that
//! identifies and locates it, and content-kind sniffing for fetched bytes.

mod content;
mod key;
mod metainfo;

pub use content::{file_extension, ContentKind};
pub use key::RelativeKey;
pub use metainfo::{replace_xml_illegal_chars, Metainfo};
