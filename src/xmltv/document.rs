//! Guide document framing, encoding and persistence

use std::io::Write;
use std::path::Path;

use tracing::{debug, info};

use super::element::XmlElement;
use super::parser::parse_document;
use crate::errors::AppResult;
use crate::utils::latin1;

pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="ISO-8859-1"?>"#;
pub const DOCTYPE: &str = r#"<!DOCTYPE tv SYSTEM "xmltv.dtd">"#;

pub const SOURCE_INFO_NAME: &str = "Schedules Direct";
pub const SOURCE_INFO_URL: &str = "https://www.schedulesdirect.org";
pub const GENERATOR_INFO_NAME: &str = "sd-xmltv";

/// An XMLTV document: `<tv>` holding channels followed by programmes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuideDocument {
    pub root: XmlElement,
}

impl Default for GuideDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl GuideDocument {
    /// Empty `<tv>` root carrying source and generator identity
    pub fn new() -> Self {
        let root = XmlElement::new("tv")
            .with_attr("source-info-name", SOURCE_INFO_NAME)
            .with_attr("source-info-url", SOURCE_INFO_URL)
            .with_attr("generator-info-name", GENERATOR_INFO_NAME)
            .with_attr("generator-info-version", env!("CARGO_PKG_VERSION"));
        Self { root }
    }

    pub fn push(&mut self, element: XmlElement) {
        self.root.push(element);
    }

    pub fn channels(&self) -> impl Iterator<Item = &XmlElement> {
        self.root.child_elements().filter(|e| e.name == "channel")
    }

    pub fn programmes(&self) -> impl Iterator<Item = &XmlElement> {
        self.root.child_elements().filter(|e| e.name == "programme")
    }

    /// Full document text: declaration, doctype and pretty-printed root
    pub fn to_markup(&self) -> String {
        let mut out = String::with_capacity(64 * 1024);
        out.push_str(XML_DECLARATION);
        out.push('\n');
        out.push_str(DOCTYPE);
        out.push('\n');
        self.root.write_pretty(&mut out, 0);
        out
    }

    /// Encoded document bytes as written to disk
    pub fn to_bytes(&self) -> Vec<u8> {
        latin1::encode(&self.to_markup())
    }

    /// Parse a document from raw bytes, honouring its declared encoding
    pub fn from_bytes(bytes: &[u8]) -> AppResult<Self> {
        let content = latin1::decode_document(bytes);
        let root = parse_document(&content)?;
        Ok(Self { root })
    }

    /// Read a previously written guide; `None` when the file does not exist
    pub fn read(path: &Path) -> AppResult<Option<Self>> {
        if !path.exists() {
            debug!("No prior guide document at {}", path.display());
            return Ok(None);
        }
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes).map(Some)
    }

    /// Write to a temporary file beside `path` and rename it into place.
    ///
    /// An interrupted run leaves the previous guide untouched.
    pub fn write_atomic(&self, path: &Path) -> AppResult<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let bytes = self.to_bytes();

        let mut temp = tempfile::NamedTempFile::new_in(dir)?;
        temp.write_all(&bytes)?;
        temp.as_file().sync_all()?;
        temp.persist(path).map_err(|e| e.error)?;

        info!("Wrote guide document {} ({} bytes)", path.display(), bytes.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> GuideDocument {
        let mut document = GuideDocument::new();
        document.push(
            XmlElement::new("channel")
                .with_attr("id", "I0.1.schedulesdirect.org")
                .with_child(XmlElement::new("display-name").with_text("2 KOMO")),
        );
        document.push(
            XmlElement::new("programme")
                .with_attr("channel", "I0.1.schedulesdirect.org")
                .with_child(XmlElement::new("title").with_text("Café €uro")),
        );
        document
    }

    #[test]
    fn test_markup_has_declaration_and_doctype() {
        let markup = sample().to_markup();
        let mut lines = markup.lines();
        assert_eq!(lines.next(), Some(XML_DECLARATION));
        assert_eq!(lines.next(), Some(DOCTYPE));
        assert!(lines.next().unwrap().starts_with("<tv source-info-name=\"Schedules Direct\""));
        assert!(markup.ends_with("</tv>\n"));
    }

    #[test]
    fn test_bytes_are_latin1_with_char_refs() {
        let bytes = sample().to_bytes();
        let needle = b"Caf\xE9 &#8364;uro";
        assert!(bytes.windows(needle.len()).any(|w| w == needle));
    }

    #[test]
    fn test_write_atomic_then_read_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("xmltv.xml");
        let document = sample();

        document.write_atomic(&path).unwrap();
        let loaded = GuideDocument::read(&path).unwrap().unwrap();

        assert_eq!(loaded, document);
        assert_eq!(loaded.channels().count(), 1);
        assert_eq!(loaded.programmes().count(), 1);
        assert_eq!(std::fs::read(&path).unwrap(), loaded.to_bytes());
    }

    #[test]
    fn test_write_atomic_replaces_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("xmltv.xml");
        std::fs::write(&path, b"stale").unwrap();

        GuideDocument::new().write_atomic(&path).unwrap();

        let entries = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
        assert!(GuideDocument::read(&path).unwrap().is_some());
    }

    #[test]
    fn test_read_missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        assert!(GuideDocument::read(&dir.path().join("absent.xml")).unwrap().is_none());
    }
}
