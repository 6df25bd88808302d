//! Spelling and format auditing.
//!
//! The spell checker is a capability chosen once by the caller and injected
//! into the [`FormatAuditor`]: a dictionary-backed checker when a word list is
//! available, otherwise a fixed typo table.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, LazyLock};

use rapidfuzz::distance::levenshtein;
use regex::Regex;
use tracing::{debug, warn};

use crate::catalog::TechnicalVocabulary;
use crate::error::CatalogError;

/// Tokens shorter than this are never checked.
const MIN_TOKEN_CHARS: usize = 3;

/// Maximum edit distance for dictionary suggestions.
const MAX_EDIT_DISTANCE: usize = 2;

/// More multi-space runs than this is reported as a formatting error.
const MULTI_SPACE_TOLERANCE: usize = 2;

/// Domain abbreviations that are never spelling errors.
const ABBREVIATIONS: &[&str] = &["LSM", "PK", "KM", "NRO", "PDA", "JCP", "PC", "S/E"];

/// Known typo → correction pairs for the pattern fallback.
const TYPO_TABLE: &[(&str, &str)] = &[
    (r"\bSUSPENDIOD\b", "SUSPENDIDO"),
    (r"\bCIRUCLA\b", "CIRCULA"),
    (r"\bCIRUCLAN\b", "CIRCULAN"),
    (r"\bPARTEINEDO\b", "PARTIENDO"),
    (r"\bPARTIDIENDO\b", "PARTIENDO"),
    (r"\bMOOTIVO\b", "MOTIVO"),
    (r"\bMOTIVIO\b", "MOTIVO"),
    (r"\bHACIAA\b", "HACIA"),
    (r"\bHAICIA\b", "HACIA"),
    (r"\bREGISTRAA\b", "REGISTRA"),
    (r"\bREGISTRAAD[OA]\b", "REGISTRADO/A"),
];

static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Za-záéíóúñÁÉÍÓÚÑ]+\b").expect("token regex"));

static MULTI_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s{2,}").expect("multi-space regex"));

static TYPO_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    TYPO_TABLE
        .iter()
        .map(|(pattern, correction)| {
            (Regex::new(pattern).expect("typo table regex"), *correction)
        })
        .collect()
});

/// Spelling capability.
pub trait SpellChecker: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Spelling findings for whitespace-normalized `content`, formatted as
    /// `token → suggestion` (or a free-text description).
    fn find_errors(&self, content: &str, vocabulary: &TechnicalVocabulary) -> Vec<String>;
}

// ── Dictionary-backed checker ───────────────────────────────────────

/// Word-frequency dictionary with edit-distance suggestions.
#[derive(Debug, Clone, Default)]
pub struct DictionarySpellChecker {
    words: HashMap<String, u64>,
}

impl DictionarySpellChecker {
    /// Build from `(word, frequency)` pairs. Words are stored lower-cased.
    pub fn from_frequencies<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, u64)>,
        S: AsRef<str>,
    {
        let mut words: HashMap<String, u64> = HashMap::new();
        for (word, count) in entries {
            let word = word.as_ref().trim().to_lowercase();
            if word.is_empty() {
                continue;
            }
            *words.entry(word).or_default() += count.max(1);
        }
        Self { words }
    }

    /// Read a word list: `word` or `word count` per line, `#` starts a comment.
    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path).map_err(|e| CatalogError::io(path, e))?;

        let entries = raw.lines().filter_map(|line| {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                return None;
            }
            let mut parts = line.split_whitespace();
            let word = parts.next()?;
            let count: u64 = parts.next().and_then(|c| c.parse().ok()).unwrap_or(1);
            Some((word.to_string(), count))
        });

        let checker = Self::from_frequencies(entries);
        if checker.words.is_empty() {
            return Err(CatalogError::EmptyDictionary {
                path: path.to_path_buf(),
            });
        }
        debug!(path = %path.display(), words = checker.len(), "Loaded spelling dictionary");
        Ok(checker)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn is_known(&self, word: &str) -> bool {
        self.words.contains_key(&word.to_lowercase())
    }

    /// Most frequent known word at the smallest edit distance (≤ 2).
    /// Ties break alphabetically so results are deterministic.
    pub fn correction(&self, word: &str) -> Option<String> {
        let lower = word.to_lowercase();
        if self.words.contains_key(&lower) {
            return Some(lower);
        }
        let len = lower.chars().count();

        self.words
            .iter()
            .filter(|(candidate, _)| candidate.chars().count().abs_diff(len) <= MAX_EDIT_DISTANCE)
            .filter_map(|(candidate, freq)| {
                let distance = levenshtein::distance(lower.chars(), candidate.chars());
                (distance <= MAX_EDIT_DISTANCE).then_some((distance, *freq, candidate))
            })
            .min_by(|a, b| {
                a.0.cmp(&b.0)
                    .then_with(|| b.1.cmp(&a.1))
                    .then_with(|| a.2.cmp(b.2))
            })
            .map(|(_, _, candidate)| candidate.clone())
    }
}

impl SpellChecker for DictionarySpellChecker {
    fn name(&self) -> &str {
        "dictionary"
    }

    fn find_errors(&self, content: &str, vocabulary: &TechnicalVocabulary) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut errors = Vec::new();

        for token in TOKEN.find_iter(content).map(|m| m.as_str()) {
            let upper = token.to_uppercase();
            if !seen.insert(upper.clone()) {
                continue;
            }
            if token.chars().count() < MIN_TOKEN_CHARS
                || vocabulary.contains(&upper)
                || ABBREVIATIONS.contains(&upper.as_str())
                || self.is_known(token)
            {
                continue;
            }
            let Some(suggestion) = self.correction(token) else {
                continue;
            };
            if suggestion.to_uppercase() == upper {
                continue;
            }
            let suggestion = if token == upper {
                suggestion.to_uppercase()
            } else {
                suggestion
            };
            errors.push(format!("{token} → {suggestion}"));
        }

        errors
    }
}

// ── Pattern fallback ────────────────────────────────────────────────

/// Fixed typo table plus repeated-letter detection.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternSpellChecker;

impl SpellChecker for PatternSpellChecker {
    fn name(&self) -> &str {
        "pattern"
    }

    fn find_errors(&self, content: &str, _vocabulary: &TechnicalVocabulary) -> Vec<String> {
        let upper = content.to_uppercase();
        let mut errors: Vec<String> = TYPO_PATTERNS
            .iter()
            .filter_map(|(pattern, correction)| {
                pattern
                    .find(&upper)
                    .map(|m| format!("{} → {}", m.as_str(), correction))
            })
            .collect();

        if has_letter_run(&upper, 3) {
            errors.push("Letras repetidas excesivamente".to_string());
        }
        errors
    }
}

/// Whether `text` contains `run` or more identical consecutive letters.
fn has_letter_run(text: &str, run: usize) -> bool {
    let mut previous: Option<char> = None;
    let mut count = 0;
    for c in text.chars() {
        if c.is_alphabetic() && previous == Some(c) {
            count += 1;
        } else {
            count = 1;
        }
        if c.is_alphabetic() && count >= run {
            return true;
        }
        previous = Some(c);
    }
    false
}

// ── Format auditor ──────────────────────────────────────────────────

/// Flags spelling and format anomalies in a message.
#[derive(Clone)]
pub struct FormatAuditor {
    checker: Arc<dyn SpellChecker>,
}

impl FormatAuditor {
    pub fn new(checker: Arc<dyn SpellChecker>) -> Self {
        Self { checker }
    }

    /// Dictionary checker when `path` loads, pattern fallback otherwise.
    pub fn from_dictionary_path(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };
        match DictionarySpellChecker::from_path(path) {
            Ok(dictionary) => Self::new(Arc::new(dictionary)),
            Err(e) => {
                warn!(error = %e, "Spelling dictionary unavailable, using pattern fallback");
                Self::default()
            }
        }
    }

    pub fn checker_name(&self) -> &str {
        self.checker.name()
    }

    /// Spelling errors in `content` plus the multi-space formatting check,
    /// which looks at the raw text.
    pub fn audit(&self, content: &str, vocabulary: &TechnicalVocabulary) -> Vec<String> {
        let normalized = content.split_whitespace().collect::<Vec<_>>().join(" ");
        let mut errors = self.checker.find_errors(&normalized, vocabulary);

        let runs = MULTI_SPACE.find_iter(content).count();
        if runs > MULTI_SPACE_TOLERANCE {
            errors.push(format!("Espacios múltiples ({runs} lugares)"));
        }
        errors
    }
}

impl Default for FormatAuditor {
    fn default() -> Self {
        Self::new(Arc::new(PatternSpellChecker))
    }
}

impl std::fmt::Debug for FormatAuditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormatAuditor")
            .field("checker", &self.checker.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dictionary() -> DictionarySpellChecker {
        DictionarySpellChecker::from_frequencies([
            ("el", 500),
            ("tren", 300),
            ("circula", 200),
            ("circulan", 20),
            ("con", 400),
            ("demoras", 150),
            ("hacia", 180),
            ("desde", 170),
            ("registra", 90),
            ("minutos", 120),
        ])
    }

    #[test]
    fn pattern_checker_reports_known_typos() {
        let errors = PatternSpellChecker.find_errors(
            "EL TREN CIRUCLA HAICIA EZEIZA",
            &TechnicalVocabulary::empty(),
        );
        assert_eq!(errors, vec!["CIRUCLA → CIRCULA", "HAICIA → HACIA"]);
    }

    #[test]
    fn pattern_checker_flags_repeated_letters() {
        let errors = PatternSpellChecker.find_errors("DEMORAAAA", &TechnicalVocabulary::empty());
        assert_eq!(errors, vec!["Letras repetidas excesivamente"]);
    }

    #[test]
    fn letter_run_ignores_digits_and_pairs() {
        assert!(!has_letter_run("TREN 3000 LLEGA", 3));
        assert!(has_letter_run("BUENOSSS", 3));
    }

    #[test]
    fn dictionary_suggests_closest_frequent_word() {
        let dict = dictionary();
        assert_eq!(dict.correction("ciruclan").as_deref(), Some("circulan"));
        assert_eq!(dict.correction("circla").as_deref(), Some("circula"));
        assert_eq!(dict.correction("xyzzyq"), None);
    }

    #[test]
    fn dictionary_checker_skips_vocabulary_short_tokens_and_abbreviations() {
        let dict = dictionary();
        let vocab = TechnicalVocabulary::new(["EZEIZA"]);
        let errors = dict.find_errors("EL TREN CIRCLA HACIA EZEIZA KM 30 NRO", &vocab);
        assert_eq!(errors, vec!["CIRCLA → CIRCULA"]);
    }

    #[test]
    fn dictionary_checker_reports_each_token_once() {
        let dict = dictionary();
        let errors = dict.find_errors("DEMORAZ Y DEMORAZ", &TechnicalVocabulary::empty());
        assert_eq!(errors, vec!["DEMORAZ → DEMORAS"]);
    }

    #[test]
    fn dictionary_file_parsing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("es.txt");
        std::fs::write(&path, "# spanish\ntren 10\ncircula\n\n").unwrap();
        let dict = DictionarySpellChecker::from_path(&path).unwrap();
        assert_eq!(dict.len(), 2);
        assert!(dict.is_known("TREN"));

        std::fs::write(&path, "# nothing\n").unwrap();
        assert!(matches!(
            DictionarySpellChecker::from_path(&path),
            Err(CatalogError::EmptyDictionary { .. })
        ));
    }

    #[test]
    fn auditor_counts_multi_space_runs_in_raw_content() {
        let auditor = FormatAuditor::default();
        let vocab = TechnicalVocabulary::empty();
        assert!(auditor.audit("EL  TREN  3328", &vocab).is_empty());
        let errors = auditor.audit("EL  TREN  3328  CIRCULA  REDUCIDO", &vocab);
        assert_eq!(errors, vec!["Espacios múltiples (4 lugares)"]);
    }

    #[test]
    fn auditor_falls_back_to_patterns_without_dictionary() {
        let auditor = FormatAuditor::from_dictionary_path(Some(Path::new("/missing/dict.txt")));
        assert_eq!(auditor.checker_name(), "pattern");
        assert_eq!(FormatAuditor::from_dictionary_path(None).checker_name(), "pattern");
    }
}
