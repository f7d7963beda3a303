use std::path::Path;

use regex::Regex;
use untrans_core::{
    KeyedRecord, LanguageConfig, Result, TranslateableSet, TranslatedSet, UntransError,
};

/// Ignore patterns, one regular expression per line, matched against the
/// payload text. Matching is anchored on both ends: a pattern must cover
/// the whole string to exclude it, a partial hit is not enough.
#[derive(Debug)]
pub struct IgnoreList {
    patterns: Vec<Regex>,
}

impl IgnoreList {
    /// Load patterns from `path`. Returns `Ok(None)` when the file does not
    /// exist; whether that is fatal is the caller's call.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(Self::parse(&text)?))
    }

    /// Blank lines are discarded; everything else must compile as a regex.
    pub fn parse(text: &str) -> Result<Self> {
        let mut patterns = Vec::new();
        for line in text.lines() {
            if line.trim().is_empty() {
                continue;
            }
            let anchored = format!("^(?:{line})$");
            let re = Regex::new(&anchored).map_err(|e| UntransError::IgnorePattern {
                pattern: line.to_string(),
                message: e.to_string(),
            })?;
            patterns.push(re);
        }
        Ok(Self { patterns })
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    fn matches(&self, payload: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(payload))
    }
}

/// Drop entries whose payload fully matches any ignore pattern. Returns a
/// new set so raw and filtered counts can both be reported; `None` is a
/// pass-through.
pub fn apply_ignore(set: &TranslateableSet, ignore: Option<&IgnoreList>) -> TranslateableSet {
    match ignore {
        None => set.clone(),
        Some(list) => set
            .iter()
            .filter(|(_, entry)| !list.matches(&entry.record.payload))
            .map(|(key, entry)| (key.clone(), entry.clone()))
            .collect(),
    }
}

/// One present target language and its loaded entries. Languages whose
/// resource file was absent never make it into this collection.
#[derive(Debug)]
pub struct LanguageSet {
    pub language: LanguageConfig,
    pub entries: TranslatedSet,
}

/// Single pass over the filtered translateable set: clear `stale` on every
/// matching translated entry, and mark a source string translated when all
/// present languages carry its key. The required count is the number of
/// present sets, so an unshipped language does not hold the others back.
/// Updates are commutative; iteration order of `sets` does not change the
/// outcome.
pub fn reconcile(translateable: &mut TranslateableSet, sets: &mut [LanguageSet]) {
    let required = sets.len();
    for (key, entry) in translateable.iter_mut() {
        let mut found = 0;
        for set in sets.iter_mut() {
            if let Some(translated) = set.entries.get_mut(key) {
                translated.stale = false;
                found += 1;
            }
        }
        if found == required {
            entry.translated = true;
        }
    }
}

/// Per-language staleness tally for the summary report.
#[derive(Debug, Clone)]
pub struct LanguageStale {
    pub name: String,
    pub code: String,
    pub stale: usize,
    pub total: usize,
}

/// Post-reconciliation counts for summary mode. `languages` is sorted
/// alphabetically by display name.
#[derive(Debug, Clone)]
pub struct AuditSummary {
    pub raw_translateable: usize,
    pub ignore_patterns: usize,
    pub translateable: usize,
    pub untranslated: usize,
    pub languages: Vec<LanguageStale>,
}

pub fn build_summary(
    raw: &TranslateableSet,
    filtered: &TranslateableSet,
    ignore_patterns: usize,
    sets: &[LanguageSet],
) -> AuditSummary {
    let mut languages: Vec<LanguageStale> = sets
        .iter()
        .map(|set| LanguageStale {
            name: set.language.name.clone(),
            code: set.language.code.clone(),
            stale: set.entries.values().filter(|e| e.stale).count(),
            total: set.entries.len(),
        })
        .collect();
    languages.sort_by(|a, b| a.name.cmp(&b.name));

    AuditSummary {
        raw_translateable: raw.len(),
        ignore_patterns,
        translateable: filtered.len(),
        untranslated: filtered.values().filter(|e| !e.translated).count(),
        languages,
    }
}

/// Untranslated key/payload pairs, in key order.
pub fn untranslated(filtered: &TranslateableSet) -> Vec<&KeyedRecord> {
    filtered
        .values()
        .filter(|e| !e.translated)
        .map(|e| &e.record)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use untrans_core::{to_translateable, to_translated, RecordStore};

    fn store(entries: &[(&str, &str)]) -> RecordStore {
        entries
            .iter()
            .map(|(key, payload)| {
                (
                    key.to_string(),
                    KeyedRecord {
                        key: key.to_string(),
                        payload: payload.to_string(),
                    },
                )
            })
            .collect()
    }

    fn source(entries: &[(&str, &str)]) -> TranslateableSet {
        to_translateable(store(entries))
    }

    fn lang(name: &str, code: &str, entries: &[(&str, &str)]) -> LanguageSet {
        LanguageSet {
            language: LanguageConfig {
                name: name.to_string(),
                code: code.to_string(),
            },
            entries: to_translated(store(entries)),
        }
    }

    #[test]
    fn ignore_matching_is_full_string() {
        let list = IgnoreList::parse("foo").unwrap();
        let set = source(&[("k1", "foo"), ("k2", "foobar")]);
        let filtered = apply_ignore(&set, Some(&list));
        assert!(!filtered.contains_key("k1"));
        assert!(filtered.contains_key("k2"));
    }

    #[test]
    fn blank_lines_are_discarded() {
        let list = IgnoreList::parse("foo\n\n   \nbar\n").unwrap();
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn invalid_pattern_is_an_error() {
        let err = IgnoreList::parse("(unclosed").unwrap_err();
        assert!(err.to_string().contains("(unclosed"), "{err}");
    }

    #[test]
    fn filtering_is_idempotent() {
        let list = IgnoreList::parse("Skip.*").unwrap();
        let set = source(&[("a", "Skip this"), ("b", "Keep this")]);
        let once = apply_ignore(&set, Some(&list));
        let twice = apply_ignore(&once, Some(&list));
        assert_eq!(once.len(), twice.len());
        assert!(twice.contains_key("b"));
    }

    #[test]
    fn no_ignore_list_is_a_pass_through() {
        let set = source(&[("a", "x"), ("b", "y")]);
        assert_eq!(apply_ignore(&set, None).len(), 2);
    }

    #[test]
    fn single_language_marks_present_keys_translated() {
        // k1 exists in the only present language, k2 nowhere.
        let mut set = source(&[("k1", "Hello"), ("k2", "World")]);
        let mut sets = vec![lang("French", "fr", &[("k1", "Bonjour")])];

        reconcile(&mut set, &mut sets);

        assert!(set["k1"].translated);
        assert!(!set["k2"].translated);
        assert!(!sets[0].entries["k1"].stale);
    }

    #[test]
    fn key_missing_in_one_present_language_stays_untranslated() {
        let mut set = source(&[("k1", "Hello")]);
        let mut sets = vec![
            lang("German", "de", &[("k1", "Hallo")]),
            lang("French", "fr", &[]),
        ];

        reconcile(&mut set, &mut sets);

        assert!(!set["k1"].translated);
        // The German copy was still observed, so it is not stale.
        assert!(!sets[0].entries["k1"].stale);
    }

    #[test]
    fn orphaned_translations_stay_stale() {
        let mut set = source(&[("k1", "Hello")]);
        let mut sets = vec![lang("German", "de", &[("k1", "Hallo"), ("kOld", "Alt")])];

        reconcile(&mut set, &mut sets);

        assert!(!sets[0].entries["k1"].stale);
        assert!(sets[0].entries["kOld"].stale);
    }

    #[test]
    fn reconcile_is_commutative_in_language_order() {
        let build = |reversed: bool| {
            let mut set = source(&[("k1", "Hello"), ("k2", "World"), ("k3", "Bye")]);
            let mut sets = vec![
                lang("German", "de", &[("k1", "Hallo"), ("k3", "Tschüss")]),
                lang("French", "fr", &[("k1", "Bonjour"), ("k2", "Monde")]),
            ];
            if reversed {
                sets.reverse();
            }
            reconcile(&mut set, &mut sets);
            let translated: Vec<bool> = set.values().map(|e| e.translated).collect();
            let mut stale: Vec<(String, String, bool)> = sets
                .iter()
                .flat_map(|s| {
                    s.entries
                        .values()
                        .map(|e| (s.language.code.clone(), e.record.key.clone(), e.stale))
                })
                .collect();
            stale.sort();
            (translated, stale)
        };

        assert_eq!(build(false), build(true));
    }

    #[test]
    fn no_translation_files_at_all_marks_everything_translated() {
        // With zero present sets the required count is zero, so every
        // source string trivially satisfies it.
        let mut set = source(&[("k1", "Hello"), ("k2", "World")]);
        let mut sets: Vec<LanguageSet> = Vec::new();

        reconcile(&mut set, &mut sets);

        assert!(set.values().all(|e| e.translated));
    }

    #[test]
    fn absent_language_does_not_block_the_rest() {
        // Two languages configured, one file missing: the present one alone
        // decides. The missing language simply never enters the collection.
        let mut set = source(&[("k1", "Hello")]);
        let mut sets = vec![lang("German", "de", &[("k1", "Hallo")])];

        reconcile(&mut set, &mut sets);

        assert!(set["k1"].translated);
    }

    #[test]
    fn summary_counts_raw_filtered_and_untranslated() {
        let raw = source(&[("k1", "Hello"), ("k2", "World")]);
        let list = IgnoreList::parse("World").unwrap();
        let mut filtered = apply_ignore(&raw, Some(&list));
        let mut sets = vec![lang("German", "de", &[("k1", "Hallo"), ("kOld", "Alt")])];

        reconcile(&mut filtered, &mut sets);
        let summary = build_summary(&raw, &filtered, list.len(), &sets);

        assert_eq!(summary.raw_translateable, 2);
        assert_eq!(summary.ignore_patterns, 1);
        assert_eq!(summary.translateable, 1);
        assert_eq!(summary.untranslated, 0);
        assert_eq!(summary.languages.len(), 1);
        assert_eq!(summary.languages[0].name, "German");
        assert_eq!(summary.languages[0].stale, 1);
        assert_eq!(summary.languages[0].total, 2);
    }

    #[test]
    fn summary_languages_sort_by_display_name() {
        let raw = source(&[]);
        let sets = vec![
            lang("Spanish", "es", &[]),
            lang("German", "de", &[]),
            lang("French", "fr", &[]),
        ];
        let summary = build_summary(&raw, &raw, 0, &sets);
        let names: Vec<&str> = summary.languages.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["French", "German", "Spanish"]);
    }

    #[test]
    fn untranslated_listing_is_in_key_order() {
        let mut set = source(&[("b", "B"), ("a", "A"), ("c", "C")]);
        let mut sets = vec![lang("German", "de", &[("b", "B")])];
        reconcile(&mut set, &mut sets);

        let keys: Vec<&str> = untranslated(&set).iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["a", "c"]);
    }
}
