//! Content-hash cache of programmes rendered by a previous run

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, info};

use crate::errors::AppResult;
use crate::xmltv::{GuideDocument, XmlElement};

/// Prior programmes indexed by the content hash in their cache keyword
#[derive(Debug, Clone, Default)]
pub struct ProgramCache {
    prefix: String,
    entries: HashMap<String, XmlElement>,
}

impl ProgramCache {
    pub fn empty<S: Into<String>>(prefix: S) -> Self {
        Self {
            prefix: prefix.into(),
            entries: HashMap::new(),
        }
    }

    /// Load the guide at `path`; a missing file yields an empty cache
    pub fn load<S: Into<String>>(path: &Path, prefix: S) -> AppResult<Self> {
        let cache = match GuideDocument::read(path)? {
            Some(document) => Self::from_document(&document, prefix),
            None => Self::empty(prefix),
        };
        info!("Loaded {} cached programmes from {}", cache.len(), path.display());
        Ok(cache)
    }

    /// Index every `<programme>` carrying a keyword with the cache prefix.
    ///
    /// The first programme seen for a hash is kept; later duplicates are ignored.
    pub fn from_document<S: Into<String>>(document: &GuideDocument, prefix: S) -> Self {
        let mut cache = Self::empty(prefix);
        let mut duplicates = 0usize;

        for programme in document.programmes() {
            for hash in cache.keyword_hashes(programme) {
                if cache.entries.contains_key(&hash) {
                    duplicates += 1;
                    continue;
                }
                cache.entries.insert(hash, programme.clone());
            }
        }

        if duplicates > 0 {
            debug!("Ignored {} duplicate cached programmes", duplicates);
        }
        cache
    }

    fn keyword_hashes(&self, programme: &XmlElement) -> Vec<String> {
        programme
            .child_elements()
            .filter(|child| child.name == "keyword")
            .filter_map(|keyword| {
                keyword
                    .text()
                    .strip_prefix(self.prefix.as_str())
                    .filter(|hash| !hash.is_empty())
                    .map(str::to_string)
            })
            .collect()
    }

    pub fn lookup(&self, content_hash: &str) -> Option<&XmlElement> {
        self.entries.get(content_hash)
    }

    pub fn contains(&self, content_hash: &str) -> bool {
        self.entries.contains_key(content_hash)
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xmltv::parse_document;

    const PRIOR: &str = r#"<?xml version="1.0" encoding="ISO-8859-1"?>
<!DOCTYPE tv SYSTEM "xmltv.dtd">
<tv>
  <channel id="I0.1.schedulesdirect.org">
    <display-name>2 KOMO</display-name>
  </channel>
  <programme start="a" stop="b" channel="I0.1.schedulesdirect.org">
    <title>First</title>
    <keyword>sd-md5-aaa</keyword>
  </programme>
  <programme start="c" stop="d" channel="I0.1.schedulesdirect.org">
    <title>Duplicate</title>
    <keyword>sd-md5-aaa</keyword>
  </programme>
  <programme start="e" stop="f" channel="I0.1.schedulesdirect.org">
    <title>Foreign</title>
    <keyword>other-bbb</keyword>
  </programme>
  <programme start="g" stop="h" channel="I0.1.schedulesdirect.org">
    <title>Second</title>
    <category>News</category>
    <keyword>sd-md5-ccc</keyword>
  </programme>
</tv>
"#;

    fn prior() -> GuideDocument {
        GuideDocument {
            root: parse_document(PRIOR).unwrap(),
        }
    }

    #[test]
    fn test_indexes_prefixed_keywords_only() {
        let cache = ProgramCache::from_document(&prior(), "sd-md5-");
        assert_eq!(cache.len(), 2);
        assert!(cache.contains("aaa"));
        assert!(cache.contains("ccc"));
        assert!(!cache.contains("bbb"));
        assert!(cache.lookup("other-bbb").is_none());
    }

    #[test]
    fn test_first_programme_wins_for_duplicate_hash() {
        let cache = ProgramCache::from_document(&prior(), "sd-md5-");
        let first = cache.lookup("aaa").unwrap();
        assert_eq!(first.attr("start"), Some("a"));
        assert_eq!(first.child_elements().next().unwrap().text(), "First");
    }

    #[test]
    fn test_custom_prefix() {
        let cache = ProgramCache::from_document(&prior(), "other-");
        assert_eq!(cache.len(), 1);
        assert!(cache.contains("bbb"));
        assert_eq!(cache.prefix(), "other-");
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempfile::TempDir::new().unwrap();
        let cache = ProgramCache::load(&dir.path().join("xmltv.xml"), "sd-md5-").unwrap();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_load_from_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("xmltv.xml");
        std::fs::write(&path, PRIOR).unwrap();

        let cache = ProgramCache::load(&path, "sd-md5-").unwrap();
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_load_rejects_corrupt_document() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("xmltv.xml");
        std::fs::write(&path, "<tv><programme></tv>").unwrap();

        assert!(ProgramCache::load(&path, "sd-md5-").is_err());
    }
}
