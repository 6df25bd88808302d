//! Status catalog: the canonical service states and their formal phrasings.
//!
//! Entries are evaluated top to bottom and the first entry with any matching
//! phrasing wins. New phrasings are added by extending the pattern list of an
//! entry; new states by inserting a row at the right priority.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// A canonical service state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusKind {
    #[serde(rename = "DEMORA")]
    Delay,
    #[serde(rename = "CANCELACIÓN")]
    Cancellation,
    #[serde(rename = "SUSPENSIÓN")]
    Suspension,
    #[serde(rename = "RESTABLECIMIENTO")]
    Restoration,
    #[serde(rename = "REDUCIDO")]
    Reduced,
    #[serde(rename = "CONDICIONAL")]
    Conditional,
    #[serde(rename = "INTERRUMPIDO")]
    Interrupted,
    #[serde(rename = "DEMORA_PARTIDA")]
    DepartureDelay,
    #[serde(rename = "RECTIFICACION")]
    Rectification,
}

impl StatusKind {
    /// Canonical upper-case label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Delay => "DEMORA",
            Self::Cancellation => "CANCELACIÓN",
            Self::Suspension => "SUSPENSIÓN",
            Self::Restoration => "RESTABLECIMIENTO",
            Self::Reduced => "REDUCIDO",
            Self::Conditional => "CONDICIONAL",
            Self::Interrupted => "INTERRUMPIDO",
            Self::DepartureDelay => "DEMORA_PARTIDA",
            Self::Rectification => "RECTIFICACION",
        }
    }

    /// Catalog code for this state (`1`, `2B`, `7R`, ...).
    pub fn catalog_code(&self) -> &'static str {
        match self {
            Self::Delay => "1",
            Self::Cancellation => "2",
            Self::Suspension => "2B",
            Self::Restoration => "3",
            Self::Reduced => "4",
            Self::Conditional => "5",
            Self::Interrupted => "6",
            Self::DepartureDelay => "1B",
            Self::Rectification => "7R",
        }
    }

    /// Resolve a catalog code (as embedded in a structural code) to its state.
    pub fn from_catalog_code(code: &str) -> Option<Self> {
        STATUS_CATALOG
            .iter()
            .map(|entry| entry.kind)
            .find(|kind| kind.catalog_code() == code)
    }

    /// Cancellations and suspensions are measured against the scheduled time itself.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancellation | Self::Suspension)
    }

    /// States that never produce a lateness measurement.
    pub fn exempt_from_lateness(&self) -> bool {
        matches!(
            self,
            Self::Reduced | Self::Interrupted | Self::Conditional | Self::Restoration
        )
    }

    /// Whether two states count as the same for code/text consistency.
    pub fn equivalent_to(&self, other: StatusKind) -> bool {
        *self == other || matches!((self, other), (Self::Delay, Self::DepartureDelay))
    }
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One catalog row: a state and the phrasings that formally announce it.
pub struct StatusEntry {
    pub kind: StatusKind,
    patterns: Vec<Regex>,
}

impl StatusEntry {
    fn new(kind: StatusKind, patterns: &[&str]) -> Self {
        Self {
            kind,
            patterns: patterns
                .iter()
                .map(|p| Regex::new(p).expect("status catalog pattern must compile"))
                .collect(),
        }
    }

    /// Whether any formal phrasing of this state appears in `upper`.
    pub fn matches(&self, upper: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(upper))
    }
}

/// Priority-ordered status catalog.
pub static STATUS_CATALOG: LazyLock<Vec<StatusEntry>> = LazyLock::new(|| {
    vec![
        StatusEntry::new(
            StatusKind::Delay,
            &[
                r"CIRCULA\s+CON\s+DEMORAS?(?:\s+DE)?",
                r"REGISTRA\s+DEMORAS?",
                r"SE\s+ENCUENTRA\s+DEMORANDO",
                r"DEMORANDO\s+SU\s+PARTIDA",
                r"DEMORAS?\s+EN\s+(?:LA\s+)?PARTIDA",
                r"PARTIDA\s+DEMORADA",
            ],
        ),
        StatusEntry::new(
            StatusKind::Cancellation,
            &[
                r"HA\s+SIDO\s+CANCELADO",
                r"FUE\s+CANCELADO",
                r"SE\s+CANCEL[OÓ]",
                r"SER[AÁ]\s+CANCELADO",
            ],
        ),
        StatusEntry::new(
            StatusKind::Suspension,
            &[
                r"HA\s+SIDO\s+SUSPENDIDO",
                r"FUE\s+SUSPENDIDO",
                r"SE\s+SUSPEND[EÍ]",
                r"SER[AÁ]\s+SUSPENDIDO",
                r"SUSPENDIDO\s+EN",
                // frequent typo, still a formal suspension
                r"SER[AÁ]\s+SUSPENDIOD",
            ],
        ),
        StatusEntry::new(
            StatusKind::Restoration,
            &[
                r"SE\s+RESTABLECE",
                r"RESTABLECE\s+(?:EL\s+)?SERVICIO",
                r"SERVICIO\s+RESTABLECIDO",
            ],
        ),
        StatusEntry::new(
            StatusKind::Reduced,
            &[
                r"CIRCULA\s+REDUCIDO",
                r"SERVICIO\s+REDUCIDO",
                r"(?:ESQUEMA|CRONOGRAMA|DIAGRAMA)\s+(?:DE\s+)?(?:SERVICIO\s+)?REDUCIDO",
                r"REDUCIDO\s+(?:POR|EN)",
            ],
        ),
        StatusEntry::new(
            StatusKind::Conditional,
            &[r"CIRCULA\s+(?:DE\s+FORMA\s+)?CONDICIONAL"],
        ),
        StatusEntry::new(
            StatusKind::Interrupted,
            &[
                r"SE\s+ENCUENTRA\s+INTERRUMPIDO",
                r"EST[ÁA]\s+INTERRUMPIDO",
                r"INTERRUMPIDO\s+(?:ENTRE|EN)",
            ],
        ),
        StatusEntry::new(
            StatusKind::DepartureDelay,
            &[
                r"(?:DEMORA|DEMORANDO)\s+(?:EN|SU)?\s+PARTIDA",
                r"DEMORANDO\s+EN\s+ESTACI[OÓ]N",
            ],
        ),
        StatusEntry::new(
            StatusKind::Rectification,
            &[r"SE\s+RECTIFICA", r"RECTIFICACI[OÓ]N"],
        ),
    ]
});

static INFORMAL_DELAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bDEMORAS?\b").expect("informal delay regex"));

static INFORMAL_CANCELLATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bCANCELAD[OA]S?\b").expect("informal cancellation regex"));

/// Find the first catalog state formally announced in `upper`.
pub fn detect_formal(upper: &str) -> Option<StatusKind> {
    STATUS_CATALOG
        .iter()
        .find(|entry| entry.matches(upper))
        .map(|entry| entry.kind)
}

/// Bare-keyword fallback, limited to delays and cancellations.
pub fn detect_informal(upper: &str) -> Option<StatusKind> {
    if INFORMAL_DELAY.is_match(upper) {
        Some(StatusKind::Delay)
    } else if INFORMAL_CANCELLATION.is_match(upper) {
        Some(StatusKind::Cancellation)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formal_delay_detected() {
        assert_eq!(
            detect_formal("EL TREN REGISTRA DEMORAS DE 10 MINUTOS"),
            Some(StatusKind::Delay)
        );
    }

    #[test]
    fn tolerates_repeated_whitespace_in_phrasing() {
        assert_eq!(
            detect_formal("CIRCULA   CON  DEMORA"),
            Some(StatusKind::Delay)
        );
    }

    #[test]
    fn delay_outranks_departure_delay() {
        // "DEMORANDO SU PARTIDA" is listed under both; the earlier row wins.
        assert_eq!(
            detect_formal("SE ENCUENTRA DEMORANDO SU PARTIDA"),
            Some(StatusKind::Delay)
        );
    }

    #[test]
    fn departure_delay_reached_when_only_its_phrasing_matches() {
        assert_eq!(
            detect_formal("DEMORANDO EN ESTACION TEMPERLEY"),
            Some(StatusKind::DepartureDelay)
        );
    }

    #[test]
    fn suspension_typo_is_still_formal() {
        assert_eq!(
            detect_formal("EL SERVICIO SERA SUSPENDIOD"),
            Some(StatusKind::Suspension)
        );
    }

    #[test]
    fn informal_fallback_only_covers_delay_and_cancellation() {
        assert_eq!(detect_informal("HAY DEMORAS"), Some(StatusKind::Delay));
        assert_eq!(
            detect_informal("TRENES CANCELADOS"),
            Some(StatusKind::Cancellation)
        );
        assert_eq!(detect_informal("TODO INTERRUMPIDO"), None);
    }

    #[test]
    fn catalog_codes_round_trip() {
        for entry in STATUS_CATALOG.iter() {
            assert_eq!(
                StatusKind::from_catalog_code(entry.kind.catalog_code()),
                Some(entry.kind)
            );
        }
        assert_eq!(StatusKind::from_catalog_code("9"), None);
    }

    #[test]
    fn delay_and_departure_delay_are_equivalent_one_way() {
        assert!(StatusKind::Delay.equivalent_to(StatusKind::DepartureDelay));
        assert!(!StatusKind::DepartureDelay.equivalent_to(StatusKind::Reduced));
    }

    #[test]
    fn labels_serialize_with_accents() {
        let json = serde_json::to_value(StatusKind::Cancellation).unwrap();
        assert_eq!(json, "CANCELACIÓN");
    }
}
