//! Contingency matrix: 2-digit cause codes, their official passenger-facing
//! phrase, and the static synonym dictionary used when the official phrase is
//! not written verbatim.
//!
//! The matrix is built once by the caller and shared read-only across
//! validations. Nothing in here mutates after construction.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::CatalogError;

/// Canonical codes used when a synonym resolves to a phrase the matrix lacks.
const FALLBACK_TECHNICAL: &str = "03";
const FALLBACK_OPERATIONAL: &str = "05";
/// Catch-all code; also the composite/ambiguous-station exception.
pub const CODE_OTHER: &str = "17";

const TECHNICAL_PHRASE: &str = "PROBLEMAS TÉCNICOS";
const OPERATIONAL_PHRASE: &str = "PROBLEMAS OPERATIVOS";
const OTHER_PHRASE: &str = "OTRAS CONTINGENCIAS";

/// Canonical phrase → accepted variants, evaluated in order.
pub const SYNONYMS: &[(&str, &[&str])] = &[
    (
        TECHNICAL_PHRASE,
        &[
            "PROBLEMAS TECNICOS",
            "FALLA TECNICA",
            "DESPERFECTOS TECNICOS",
            "INCONVENIENTES TECNICOS",
            "TECNICOS",
            "TECNICO",
        ],
    ),
    (
        OPERATIONAL_PHRASE,
        &[
            "PROBLEMAS OPERATIVOS",
            "FALLA OPERATIVA",
            "INCONVENIENTES OPERATIVOS",
            "OPERATIVOS",
            "OPERATIVO",
            "RAZONES OPERATIVAS",
            "RAZON OPERATIVA",
            "INCONVENIENTES EN LA LOC",
        ],
    ),
    (
        OTHER_PHRASE,
        &["OTRAS CONTINGENCIAS", "OTRA CAUSA", "CAUSA DESCONOCIDA"],
    ),
    (
        "ACCIDENTE EN PASO A NIVEL",
        &[
            "ACCIDENTE",
            "ACCIDENTE PAN",
            "COLISION",
            "EMBESTIDA",
            "ACCIDENTE EN VÍA",
        ],
    ),
    (
        "OBRA EN ZONA DE VÍAS",
        &["OBRA", "OBRAS", "TRABAJOS EN VIA", "REPARACION DE VÍA"],
    ),
    (
        "MANIFESTACIÓN / PIQUETE",
        &["MANIFESTACION", "PIQUETE", "CORTE DE VIA", "PROTESTA"],
    ),
];

/// Synonym patterns, compiled once.
static SYNONYM_PATTERNS: LazyLock<Vec<(&'static str, Vec<(&'static str, Regex)>)>> =
    LazyLock::new(|| {
        SYNONYMS
            .iter()
            .map(|(canonical, variants)| {
                let compiled = variants
                    .iter()
                    .map(|variant| (*variant, phrase_pattern(variant)))
                    .collect();
                (*canonical, compiled)
            })
            .collect()
    });

/// Header candidates for the code column (after trimming and `' '` → `'_'`).
const CODE_COLUMNS: &[&str] = &["Código", "Codigo"];
/// Header candidates for the official phrase column.
const PHRASE_COLUMNS: &[&str] = &["Forma_Comunicacion", "Formas_de_comunicación"];

/// A detected contingency (component C).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContingencyRecord {
    /// Two-digit matrix code.
    pub code: String,
    /// The phrase that matched in the message (official or synonym).
    pub phrase: String,
}

/// One matrix row.
#[derive(Debug, Clone)]
struct ContingencyEntry {
    code: String,
    phrase: String,
    pattern: Regex,
}

/// Code ↔ official phrase table.
#[derive(Debug, Clone, Default)]
pub struct ContingencyMatrix {
    entries: Vec<ContingencyEntry>,
}

impl ContingencyMatrix {
    /// An empty matrix: every lookup returns `None`.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from `(code, phrase)` rows. Codes are zero-padded to two digits,
    /// phrases trimmed and upper-cased; rows with an empty phrase are dropped.
    pub fn from_entries<I, C, P>(rows: I) -> Self
    where
        I: IntoIterator<Item = (C, P)>,
        C: AsRef<str>,
        P: AsRef<str>,
    {
        let entries = rows
            .into_iter()
            .filter_map(|(code, phrase)| {
                let phrase = phrase.as_ref().trim().to_uppercase();
                if phrase.is_empty() || phrase == "NAN" {
                    return None;
                }
                Some(ContingencyEntry {
                    code: pad_code(code.as_ref()),
                    pattern: phrase_pattern(&phrase),
                    phrase,
                })
            })
            .collect();
        Self { entries }
    }

    /// Load from a CSV export with a code column and an official-phrase column.
    ///
    /// Applies the canonical code alignment: technical problems are `03`,
    /// operational problems are `05`.
    pub fn from_csv_path(path: &Path) -> Result<Self, CatalogError> {
        let bytes = std::fs::read(path).map_err(|e| CatalogError::io(path, e))?;

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(bytes.as_slice());
        let headers = reader
            .headers()
            .map_err(|e| CatalogError::Csv {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?
            .clone();

        let idx_code = header_index(&headers, CODE_COLUMNS).ok_or_else(|| {
            CatalogError::MissingColumn {
                path: path.to_path_buf(),
                column: CODE_COLUMNS.join(" | "),
            }
        })?;
        let idx_phrase = header_index(&headers, PHRASE_COLUMNS).ok_or_else(|| {
            CatalogError::MissingColumn {
                path: path.to_path_buf(),
                column: PHRASE_COLUMNS.join(" | "),
            }
        })?;

        let mut rows: Vec<(String, String)> = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| CatalogError::Csv {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
            let code = record.get(idx_code).unwrap_or_default().trim();
            let phrase = record.get(idx_phrase).unwrap_or_default().trim();
            rows.push((pad_code(code), phrase.to_uppercase()));
        }

        align_canonical_codes(&mut rows);
        let matrix = Self::from_entries(rows);
        debug!(path = %path.display(), rows = matrix.len(), "Loaded contingency matrix");
        Ok(matrix)
    }

    /// Load from CSV, degrading to an empty matrix on any failure.
    pub fn load_or_empty(path: &Path) -> Self {
        match Self::from_csv_path(path) {
            Ok(matrix) => matrix,
            Err(e) => {
                warn!(error = %e, "Contingency matrix unavailable, using empty matrix");
                Self::empty()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Matrix code for an official phrase (case-insensitive).
    pub fn code_for_phrase(&self, phrase: &str) -> Option<&str> {
        let wanted = phrase.trim().to_uppercase();
        self.entries
            .iter()
            .find(|e| e.phrase == wanted)
            .map(|e| e.code.as_str())
    }

    /// Official phrase for a code.
    pub fn phrase_for_code(&self, code: &str) -> Option<&str> {
        let wanted = pad_code(code);
        self.entries
            .iter()
            .find(|e| e.code == wanted)
            .map(|e| e.phrase.as_str())
    }

    /// Two-phase lookup against upper-cased message text.
    ///
    /// 1. Every official phrase, in matrix order.
    /// 2. The synonym dictionary, resolved to the matrix code of its canonical
    ///    phrase, or to the hardcoded canonical codes when the matrix lacks it.
    pub fn lookup(&self, upper: &str) -> Option<ContingencyRecord> {
        if self.is_empty() {
            return None;
        }

        if let Some(entry) = self.entries.iter().find(|e| e.pattern.is_match(upper)) {
            return Some(ContingencyRecord {
                code: entry.code.clone(),
                phrase: entry.phrase.clone(),
            });
        }

        for (canonical, variants) in SYNONYM_PATTERNS.iter() {
            for (variant, pattern) in variants {
                if !pattern.is_match(upper) {
                    continue;
                }
                let code = self
                    .code_for_phrase(canonical)
                    .or_else(|| fallback_code(canonical));
                if let Some(code) = code {
                    return Some(ContingencyRecord {
                        code: code.to_string(),
                        phrase: (*variant).to_string(),
                    });
                }
            }
        }

        None
    }
}

fn fallback_code(canonical: &str) -> Option<&'static str> {
    match canonical {
        TECHNICAL_PHRASE => Some(FALLBACK_TECHNICAL),
        OPERATIONAL_PHRASE => Some(FALLBACK_OPERATIONAL),
        OTHER_PHRASE => Some(CODE_OTHER),
        _ => None,
    }
}

/// Left-pad a numeric code to two digits.
pub fn pad_code(code: &str) -> String {
    let code = code.trim();
    if code.len() == 1 {
        format!("0{code}")
    } else {
        code.to_string()
    }
}

/// Whitespace-tolerant literal pattern: tokens joined by `\s+`.
fn phrase_pattern(phrase: &str) -> Regex {
    let body = phrase
        .split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+");
    Regex::new(&body).expect("escaped literal always compiles")
}

fn header_index(headers: &csv::StringRecord, candidates: &[&str]) -> Option<usize> {
    headers.iter().position(|h| {
        let normalized = h.trim().replace(' ', "_");
        candidates.iter().any(|c| *c == normalized)
    })
}

/// Force the canonical codes for technical (`03`) and operational (`05`)
/// problems, relabelling the `05` row when no operational row exists.
fn align_canonical_codes(rows: &mut [(String, String)]) {
    for (code, phrase) in rows.iter_mut() {
        if phrase == TECHNICAL_PHRASE {
            *code = FALLBACK_TECHNICAL.to_string();
        }
    }

    let has_operational = rows.iter().any(|(_, phrase)| phrase == OPERATIONAL_PHRASE);
    for (code, phrase) in rows.iter_mut() {
        if has_operational && phrase == OPERATIONAL_PHRASE {
            *code = FALLBACK_OPERATIONAL.to_string();
        } else if !has_operational && code == FALLBACK_OPERATIONAL {
            *phrase = OPERATIONAL_PHRASE.to_string();
        }
    }
}
