//! In-memory company registry built from the bulk dataset file.
//!
//! The dataset is an XML document with repeated `<list>` entries, each
//! carrying a `<corp_name>` and `<corp_code>`. It is parsed once at startup
//! into an immutable map keyed by normalized company name; lookups are
//! exact-match only.

use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::Event;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// A single registry entry, keyed externally by normalized name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEntry {
    /// Lookup code used by the disclosure API
    pub code: String,
    /// Company name exactly as it appears in the dataset
    pub original_name: String,
}

/// Errors raised while parsing the registry dataset.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The dataset XML could not be parsed.
    #[error("Dataset parse error: {reason}")]
    Parse {
        /// The reason for the parse failure
        reason: String,
    },

    /// The dataset file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Immutable company-name to code index.
///
/// Built once at startup and shared read-only across requests. A missing
/// dataset file degrades every lookup to a miss instead of failing startup.
#[derive(Debug, Default)]
pub struct RegistryIndex {
    entries: HashMap<String, RegistryEntry>,
}

/// Normalizes a company name for indexing and lookup.
///
/// Removes every corporate-suffix marker `(주)` and trims surrounding
/// whitespace. Idempotent: normalizing an already-normalized name is a
/// no-op.
pub fn normalize_name(name: &str) -> String {
    name.replace("(주)", "").trim().to_string()
}

impl RegistryIndex {
    /// Creates an empty index; every lookup misses.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Loads the index from the dataset file.
    ///
    /// Never fails: a missing file yields an empty index and a malformed
    /// document keeps whatever entries were parsed before the error. Both
    /// conditions are logged.
    pub fn load(path: &Path) -> Self {
        let mut entries = HashMap::new();

        if !path.exists() {
            warn!(
                "registry dataset {} not found, company search disabled",
                path.display()
            );
            return Self { entries };
        }

        let mut reader = match Reader::from_file(path) {
            Ok(reader) => reader,
            Err(e) => {
                error!("failed to open registry dataset {}: {e}", path.display());
                return Self { entries };
            }
        };

        if let Err(e) = parse_entries(&mut reader, &mut entries) {
            error!("registry dataset parse aborted: {e}");
        }

        info!("company registry loaded: {} entries", entries.len());
        Self { entries }
    }

    /// Builds an index from an in-memory XML document.
    ///
    /// # Errors
    /// - `RegistryError::Parse` - The document is not well-formed XML
    pub fn from_xml(xml: &str) -> Result<Self, RegistryError> {
        let mut reader = Reader::from_reader(xml.as_bytes());
        let mut entries = HashMap::new();
        parse_entries(&mut reader, &mut entries)?;
        Ok(Self { entries })
    }

    /// Looks up a company by name, normalizing the query the same way the
    /// index keys were normalized. Exact match only.
    pub fn lookup(&self, name: &str) -> Option<&RegistryEntry> {
        self.entries.get(&normalize_name(name))
    }

    /// Number of indexed companies.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Streams `<list>` entries out of the reader into the map, entry by entry.
///
/// Later entries overwrite earlier ones that normalize to the same key.
fn parse_entries<R: BufRead>(
    reader: &mut Reader<R>,
    entries: &mut HashMap<String, RegistryEntry>,
) -> Result<usize, RegistryError> {
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut in_entry = false;
    let mut current_tag = String::new();
    let mut name = String::new();
    let mut code = String::new();
    let mut duplicates = 0usize;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if tag == "list" {
                    in_entry = true;
                    name.clear();
                    code.clear();
                }
                current_tag = tag;
            }
            Ok(Event::Text(t)) => {
                if in_entry {
                    let text = t.unescape().unwrap_or_default().into_owned();
                    match current_tag.as_str() {
                        "corp_name" => name = text,
                        "corp_code" => code = text,
                        _ => {}
                    }
                }
            }
            Ok(Event::CData(t)) => {
                if in_entry {
                    let text = String::from_utf8_lossy(t.as_ref()).into_owned();
                    match current_tag.as_str() {
                        "corp_name" => name = text,
                        "corp_code" => code = text,
                        _ => {}
                    }
                }
            }
            Ok(Event::End(e)) => {
                if e.name().as_ref() == b"list" && in_entry {
                    in_entry = false;
                    if !name.is_empty() && !code.is_empty() {
                        let entry = RegistryEntry {
                            code: code.clone(),
                            original_name: name.clone(),
                        };
                        if entries.insert(normalize_name(&name), entry).is_some() {
                            duplicates += 1;
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(RegistryError::Parse {
                    reason: e.to_string(),
                });
            }
            _ => {}
        }
        buf.clear();
    }

    if duplicates > 0 {
        debug!("registry dataset: {duplicates} duplicate names overwritten");
    }

    Ok(entries.len())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<result>
  <list>
    <corp_code>00126380</corp_code>
    <corp_name>삼성전자(주)</corp_name>
    <modify_date>20240101</modify_date>
  </list>
  <list>
    <corp_code>00164779</corp_code>
    <corp_name>(주)카카오</corp_name>
  </list>
  <list>
    <corp_code>99999999</corp_code>
    <corp_name></corp_name>
  </list>
</result>"#;

    #[test]
    fn test_normalize_is_idempotent() {
        for name in ["삼성전자(주)", " (주)카카오 ", "현대자동차", "  spaced  "] {
            let once = normalize_name(name);
            assert_eq!(normalize_name(&once), once);
        }
    }

    #[test]
    fn test_lookup_matches_normalized_key() {
        let index = RegistryIndex::from_xml(SAMPLE).unwrap();

        // Suffix marker and whitespace are ignored on both sides
        let entry = index.lookup("삼성전자").unwrap();
        assert_eq!(entry.code, "00126380");
        assert_eq!(entry.original_name, "삼성전자(주)");

        let entry = index.lookup(" 삼성전자(주) ").unwrap();
        assert_eq!(entry.code, "00126380");

        let entry = index.lookup("카카오").unwrap();
        assert_eq!(entry.code, "00164779");
    }

    #[test]
    fn test_lookup_is_exact_match_only() {
        let index = RegistryIndex::from_xml(SAMPLE).unwrap();

        assert!(index.lookup("삼성").is_none());
        assert!(index.lookup("삼성전자우").is_none());
        assert!(index.lookup("").is_none());
    }

    #[test]
    fn test_entries_without_name_or_code_are_skipped() {
        let index = RegistryIndex::from_xml(SAMPLE).unwrap();
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_duplicate_names_last_write_wins() {
        let xml = r#"<result>
            <list><corp_code>1</corp_code><corp_name>중복상사</corp_name></list>
            <list><corp_code>2</corp_code><corp_name>중복상사(주)</corp_name></list>
        </result>"#;
        let index = RegistryIndex::from_xml(xml).unwrap();

        assert_eq!(index.len(), 1);
        assert_eq!(index.lookup("중복상사").unwrap().code, "2");
    }

    #[test]
    fn test_missing_file_yields_empty_index() {
        let index = RegistryIndex::load(Path::new("does-not-exist.xml"));
        assert!(index.is_empty());
        assert!(index.lookup("삼성전자").is_none());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let index = RegistryIndex::load(file.path());
        assert_eq!(index.len(), 2);
    }
}
