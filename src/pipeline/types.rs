//! Shared types for the validation pipeline.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::catalog::{ContingencyRecord, StatusKind};
use crate::error::ValidationError;

// ── Inbound message ─────────────────────────────────────────────────

/// An operator status message as supplied by the ingestion layer.
///
/// Never mutated by the engine. Extraction works on a whitespace-collapsed
/// copy of `content`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Message identifier (numeric ids are accepted and stringified).
    #[serde(alias = "numero_mensaje", deserialize_with = "string_or_number")]
    pub id: String,
    /// Who issued the message.
    #[serde(alias = "operador", default)]
    pub operator: String,
    /// Transit line the message belongs to.
    #[serde(alias = "linea", default)]
    pub line: String,
    /// Raw message text.
    #[serde(alias = "contenido")]
    pub content: String,
    /// Send timestamp, kept raw; parsed only by the timing stage.
    #[serde(alias = "fecha_hora", default)]
    pub sent_at: String,
}

impl Message {
    pub fn new(
        id: impl Into<String>,
        operator: impl Into<String>,
        line: impl Into<String>,
        content: impl Into<String>,
        sent_at: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            operator: operator.into(),
            line: line.into(),
            content: content.into(),
            sent_at: sent_at.into(),
        }
    }

    /// Content with every whitespace run collapsed to a single space.
    pub fn normalized_content(&self) -> String {
        self.content.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// A message needs an id and some text to be worth validating.
    pub fn check_well_formed(&self) -> Result<(), ValidationError> {
        if self.id.trim().is_empty() {
            return Err(ValidationError::MalformedMessage {
                id: self.id.clone(),
                reason: "empty id".into(),
            });
        }
        if self.content.trim().is_empty() {
            return Err(ValidationError::MalformedMessage {
                id: self.id.clone(),
                reason: "empty content".into(),
            });
        }
        Ok(())
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}

// ── Message type ────────────────────────────────────────────────────

/// Message category; exactly one per message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageType {
    /// About one specific train, identified by number.
    #[serde(rename = "TREN_ESPECIFICO")]
    TrainSpecific,
    /// About a whole service, ramal or line.
    #[serde(rename = "SERVICIO_GENERAL")]
    GeneralService,
    /// Service restoration notice.
    #[serde(rename = "REANUDACION")]
    Resumption,
    /// Correction of an earlier message.
    #[serde(rename = "RECTIFICACION")]
    Rectification,
    #[serde(rename = "DESCONOCIDO")]
    Unknown,
}

impl MessageType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::TrainSpecific => "TREN_ESPECIFICO",
            Self::GeneralService => "SERVICIO_GENERAL",
            Self::Resumption => "REANUDACION",
            Self::Rectification => "RECTIFICACION",
            Self::Unknown => "DESCONOCIDO",
        }
    }

    pub fn is_recognized(&self) -> bool {
        *self != Self::Unknown
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ── Extracted components ────────────────────────────────────────────

/// Component B: the announced service state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusRecord {
    #[serde(rename = "name")]
    pub kind: StatusKind,
    /// Catalog code of the state (`1`, `2B`, ...).
    pub code: String,
    /// True only when a canonical phrasing was used.
    pub formal: bool,
    /// Announced delay, when one was found.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minutes: Option<u32>,
}

/// Component F: the leading `DD.D.L` structural code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructuralCode {
    /// As written, e.g. `3.1.A`.
    pub raw: String,
    /// Contingency code, zero-padded to two digits.
    pub contingency_digits: String,
    pub status_digit: String,
    /// Lifecycle tag; never validated.
    pub cycle_tag: char,
}

/// Component E for train-specific messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    pub origin: String,
    pub destination: String,
}

/// Type-dependent slots (components A, D and E).
///
/// Each variant carries only what is meaningful for that message type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum ComponentSlots {
    #[serde(rename = "TREN_ESPECIFICO")]
    TrainSpecific {
        /// A: train number.
        train_number: Option<String>,
        /// D: scheduled departure, `HH:MM`.
        scheduled_time: Option<String>,
        /// E: origin and destination.
        route: Option<Route>,
        /// "SERVICIO <n>" was used where "TREN <n>" belongs.
        used_service_as_train: bool,
    },
    #[serde(rename = "SERVICIO_GENERAL")]
    GeneralService {
        /// A: service, ramal or line name.
        service: Option<String>,
        /// D: free-text location.
        location: Option<String>,
        /// E: the message apologizes to passengers.
        apology: bool,
    },
    #[serde(rename = "REANUDACION")]
    Resumption {
        /// A: ramal or line being restored, when named.
        service: Option<String>,
    },
    #[serde(rename = "RECTIFICACION")]
    Rectification {
        /// A: train number or line being corrected.
        target: Option<String>,
    },
    #[serde(rename = "DESCONOCIDO")]
    Unknown,
}

impl ComponentSlots {
    pub fn message_type(&self) -> MessageType {
        match self {
            Self::TrainSpecific { .. } => MessageType::TrainSpecific,
            Self::GeneralService { .. } => MessageType::GeneralService,
            Self::Resumption { .. } => MessageType::Resumption,
            Self::Rectification { .. } => MessageType::Rectification,
            Self::Unknown => MessageType::Unknown,
        }
    }

    /// Component A.
    pub fn identifier(&self) -> Option<&str> {
        match self {
            Self::TrainSpecific { train_number, .. } => train_number.as_deref(),
            Self::GeneralService { service, .. } | Self::Resumption { service } => {
                service.as_deref()
            }
            Self::Rectification { target } => target.as_deref(),
            Self::Unknown => None,
        }
    }

    /// Component D: scheduled time or location.
    pub fn time_or_location(&self) -> Option<&str> {
        match self {
            Self::TrainSpecific { scheduled_time, .. } => scheduled_time.as_deref(),
            Self::GeneralService { location, .. } => location.as_deref(),
            _ => None,
        }
    }

    pub fn scheduled_time(&self) -> Option<&str> {
        match self {
            Self::TrainSpecific { scheduled_time, .. } => scheduled_time.as_deref(),
            _ => None,
        }
    }

    pub fn route(&self) -> Option<&Route> {
        match self {
            Self::TrainSpecific { route, .. } => route.as_ref(),
            _ => None,
        }
    }

    pub fn used_service_as_train(&self) -> bool {
        matches!(
            self,
            Self::TrainSpecific {
                used_service_as_train: true,
                ..
            }
        )
    }
}

/// Everything extracted from one message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedComponents {
    #[serde(flatten)]
    pub slots: ComponentSlots,
    /// B.
    pub status: Option<StatusRecord>,
    /// C.
    pub contingency: Option<ContingencyRecord>,
    /// F.
    pub structural_code: Option<StructuralCode>,
    /// Structural code present on a recognized message type.
    pub structure_valid: bool,
    pub spelling_valid: bool,
    pub spelling_errors: Findings,
    pub format_warnings: Findings,
}

impl ExtractedComponents {
    pub fn message_type(&self) -> MessageType {
        self.slots.message_type()
    }

    pub fn status_kind(&self) -> Option<StatusKind> {
        self.status.as_ref().map(|s| s.kind)
    }

    pub fn delay_minutes(&self) -> Option<u32> {
        self.status.as_ref().and_then(|s| s.minutes)
    }

    pub fn contingency_code(&self) -> Option<&str> {
        self.contingency.as_ref().map(|c| c.code.as_str())
    }

    /// Attach the format auditor's findings.
    pub fn with_spelling_errors(mut self, errors: Vec<String>) -> Self {
        for error in errors {
            self.spelling_errors.push(error);
        }
        self.spelling_valid = self.spelling_errors.is_empty();
        self
    }
}

// ── Findings ────────────────────────────────────────────────────────

/// Ordered list of unique findings; duplicates are dropped on insert so the
/// first occurrence keeps its position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Findings(Vec<String>);

impl Findings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, finding: impl Into<String>) {
        let finding = finding.into();
        if !self.0.contains(&finding) {
            self.0.push(finding);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn contains(&self, finding: &str) -> bool {
        self.0.iter().any(|f| f == finding)
    }
}

impl<'a> IntoIterator for &'a Findings {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// ── Timing ──────────────────────────────────────────────────────────

/// How early or late a message went out relative to its reference time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Punctuality {
    Anticipado,
    Oportuno,
    Aceptable,
    Critico,
}

/// Severity attached to a punctuality classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimingLevel {
    Excelente,
    MuyBueno,
    Aceptable,
    Observacion,
    Importante,
}

impl TimingLevel {
    /// Levels that can raise a late-notification observation.
    pub fn is_concerning(&self) -> bool {
        matches!(self, Self::Observacion | Self::Importante)
    }
}

/// Lateness analysis of one train-specific message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimingResult {
    /// `sent_at − reference`, minutes, rounded to one decimal.
    pub deviation_minutes: f64,
    pub classification: Punctuality,
    pub level: TimingLevel,
    /// `HH:MM`.
    pub reference_time: String,
    /// `HH:MM`, as extracted.
    pub scheduled_time: String,
    /// `HH:MM:SS`.
    pub sent_time: String,
    /// Announced delay used to shift the reference (0 for cancellations).
    pub delay_minutes: u32,
    pub is_cancellation: bool,
}

// ── Classification ──────────────────────────────────────────────────

/// Worst severity bucket reached by a message's findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverallLevel {
    Completo,
    Sugerencias,
    Observaciones,
    Importante,
}

impl OverallLevel {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Completo => "COMPLETO",
            Self::Sugerencias => "SUGERENCIAS",
            Self::Observaciones => "OBSERVACIONES",
            Self::Importante => "IMPORTANTE",
        }
    }

    /// Whether a human auditor has to look at the message.
    pub fn requires_notification(&self) -> bool {
        matches!(self, Self::Importante | Self::Observaciones)
    }
}

impl fmt::Display for OverallLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Findings bucketed by severity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassificationResult {
    pub important: Findings,
    pub observations: Findings,
    pub suggestions: Findings,
    pub overall_level: OverallLevel,
}

// ── Scores ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComponentsGrade {
    Completo,
    Aceptable,
    Incompleto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TimingGrade {
    #[serde(rename = "EXCELENTE")]
    Excelente,
    #[serde(rename = "BUENO")]
    Bueno,
    #[serde(rename = "DEFICIENTE")]
    Deficiente,
    #[serde(rename = "N/A")]
    NotApplicable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StructureGrade {
    Impecable,
    Correcto,
    Mejorable,
    Deficiente,
}

/// Three independent quality grades.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreSet {
    pub components: ComponentsGrade,
    pub components_points: u32,
    /// Which weighted components were missing.
    pub component_gaps: Vec<String>,
    pub timing: TimingGrade,
    pub structure: StructureGrade,
    pub structure_points: u32,
}
