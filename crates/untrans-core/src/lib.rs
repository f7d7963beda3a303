use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Workspace-wide result alias.
pub type Result<T> = color_eyre::eyre::Result<T>;

/// Minimal unit used across crates: one `name`/`value` pair read from a
/// resx resource file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyedRecord {
    pub key: String,
    pub payload: String,
}

/// Source-language record plus its audit flag. `translated` starts `false`
/// and flips exactly once, when every present translation set carries the
/// key.
#[derive(Debug, Clone)]
pub struct TranslateableEntry {
    pub record: KeyedRecord,
    pub translated: bool,
}

impl TranslateableEntry {
    pub fn new(record: KeyedRecord) -> Self {
        Self {
            record,
            translated: false,
        }
    }
}

/// Target-language record plus its audit flag. Entries start stale and are
/// cleared the moment reconciliation sees the key among the source strings.
#[derive(Debug, Clone)]
pub struct TranslatedEntry {
    pub record: KeyedRecord,
    pub stale: bool,
}

impl TranslatedEntry {
    pub fn new(record: KeyedRecord) -> Self {
        Self {
            record,
            stale: true,
        }
    }
}

/// Stores are keyed maps ordered by key, so listings come out deterministic
/// without an extra sort.
pub type RecordStore = BTreeMap<String, KeyedRecord>;
pub type TranslateableSet = BTreeMap<String, TranslateableEntry>;
pub type TranslatedSet = BTreeMap<String, TranslatedEntry>;

/// Wrap a raw store into the source-side set, all entries untranslated.
pub fn to_translateable(store: RecordStore) -> TranslateableSet {
    store
        .into_iter()
        .map(|(key, record)| (key, TranslateableEntry::new(record)))
        .collect()
}

/// Wrap a raw store into a target-side set, all entries stale.
pub fn to_translated(store: RecordStore) -> TranslatedSet {
    store
        .into_iter()
        .map(|(key, record)| (key, TranslatedEntry::new(record)))
        .collect()
}

/// A configured target language: display name plus the file-name code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageConfig {
    pub name: String,
    pub code: String,
}

/// Resource-file naming scheme: `<base>.<suffix>` for the source file,
/// `<base>.<code>.<suffix>` per translation. The Porchlight defaults are
/// fixed; callers pass this value down instead of reading global state.
#[derive(Debug, Clone)]
pub struct ResourceNaming {
    pub base_filename: String,
    pub suffix: String,
}

impl Default for ResourceNaming {
    fn default() -> Self {
        Self {
            base_filename: "PorchlightStrings".to_string(),
            suffix: "resx".to_string(),
        }
    }
}

impl ResourceNaming {
    pub fn source_path(&self, base: &Path) -> PathBuf {
        base.join(format!("{}.{}", self.base_filename, self.suffix))
    }

    pub fn translation_path(&self, base: &Path, code: &str) -> PathBuf {
        base.join(format!("{}.{}.{}", self.base_filename, code, self.suffix))
    }
}

/// Shipping target languages. Order here is irrelevant; reports sort by
/// display name.
pub fn default_languages() -> Vec<LanguageConfig> {
    [
        ("Spanish", "es"),
        ("German", "de"),
        ("French", "fr"),
        ("Japanese", "ja"),
        ("Chinese", "zh"),
    ]
    .into_iter()
    .map(|(name, code)| LanguageConfig {
        name: name.to_string(),
        code: code.to_string(),
    })
    .collect()
}

#[derive(Debug, Error)]
pub enum UntransError {
    #[error("malformed resx {}: {}", .path.display(), .message)]
    Resx { path: PathBuf, message: String },
    #[error("duplicate key `{}` in {}", .key, .path.display())]
    DuplicateKey { key: String, path: PathBuf },
    #[error("invalid ignore pattern `{pattern}`: {message}")]
    IgnorePattern { pattern: String, message: String },
}
