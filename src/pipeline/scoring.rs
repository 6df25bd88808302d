//! Findings classification and quality scores.
//!
//! [`classify`] buckets every finding about a message into important,
//! observation and suggestion lists and derives the overall level.
//! [`score`] grades the message on three independent axes using fixed
//! point tables; it does not look at the buckets.

use std::sync::LazyLock;

use regex::Regex;

use crate::catalog::contingency::CODE_OTHER;
use crate::catalog::StatusKind;
use crate::pipeline::consistency;
use crate::pipeline::types::{
    ClassificationResult, ComponentSlots, ComponentsGrade, ExtractedComponents, Findings, Message,
    MessageType, OverallLevel, ScoreSet, StructureGrade, TimingGrade, TimingResult,
};

// ── Classification ──────────────────────────────────────────────────

/// Late-notification threshold, absolute minutes.
const LATE_NOTICE_MINUTES: f64 = 15.0;

/// Contingency codes where a general-service notice benefits from a location.
const LOCATION_HELPFUL_CODES: &[&str] = &["01", "02", "11", "12"];

static DEPARTURE_PHRASING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"DEMORANDO\s+(?:SU\s+)?PARTIDA|PARTIDA\s+DEMORADA").expect("departure regex")
});

static REDUCED_LIMIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:REDUCIDO|CORTO|LIMITADO)\s+(?:EN|A|HASTA)\s+[A-Z]").expect("reduced limit regex")
});

static FORMATIONS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"FORMACI[OÓ]N").expect("formations regex"));

#[derive(Debug, Default)]
struct Buckets {
    important: Findings,
    observations: Findings,
    suggestions: Findings,
}

impl Buckets {
    fn into_result(self) -> ClassificationResult {
        let overall_level = if !self.important.is_empty() {
            OverallLevel::Importante
        } else if !self.observations.is_empty() {
            OverallLevel::Observaciones
        } else if !self.suggestions.is_empty() {
            OverallLevel::Sugerencias
        } else {
            OverallLevel::Completo
        };
        ClassificationResult {
            important: self.important,
            observations: self.observations,
            suggestions: self.suggestions,
            overall_level,
        }
    }
}

/// Bucket every finding about `components` by severity.
pub fn classify(
    message: &Message,
    components: &ExtractedComponents,
    timing: Option<&TimingResult>,
) -> ClassificationResult {
    let upper = message.normalized_content().to_uppercase();
    let mut buckets = Buckets::default();

    match &components.slots {
        ComponentSlots::TrainSpecific { .. } => check_train(&upper, components, &mut buckets),
        ComponentSlots::GeneralService { .. } => check_general(components, &mut buckets),
        ComponentSlots::Rectification { target } => {
            if target.is_none() {
                buckets
                    .important
                    .push("No se especifica qué tren o servicio se rectifica");
            }
        }
        ComponentSlots::Resumption { .. } | ComponentSlots::Unknown => {}
    }

    if components.message_type() != MessageType::Rectification && components.contingency.is_none()
    {
        check_missing_contingency(&upper, components, &mut buckets);
    }

    check_structure(components, &mut buckets);

    for error in &components.spelling_errors {
        buckets.observations.push(format!("Ortografía: {error}"));
    }
    for warning in &components.format_warnings {
        buckets.suggestions.push(format!("Formato: {warning}"));
    }

    if let Some(timing) = timing {
        if timing.level.is_concerning() && timing.deviation_minutes.abs() > LATE_NOTICE_MINUTES {
            buckets.observations.push(format!(
                "Notificación tardía: {:.0} min después de salida",
                timing.deviation_minutes.abs()
            ));
        }
    }

    buckets.into_result()
}

fn informal_status_note(components: &ExtractedComponents, buckets: &mut Buckets) {
    if let Some(status) = components.status.as_ref().filter(|s| !s.formal) {
        buckets.suggestions.push(format!(
            "El mensaje menciona '{}' pero no usa la estructura formal.",
            status.kind
        ));
    }
}

fn check_train(upper: &str, components: &ExtractedComponents, buckets: &mut Buckets) {
    if components.slots.identifier().is_none() {
        buckets.important.push("Falta número de tren");
    }

    match components.status.as_ref() {
        None => buckets.important.push("Falta estado del servicio"),
        Some(status) => {
            informal_status_note(components, buckets);
            match status.kind {
                StatusKind::Delay if status.minutes.is_none() => {
                    if DEPARTURE_PHRASING.is_match(upper) {
                        buckets.observations.push(
                            "Demora de partida: No indicaste minutos. Es válido, pero ayuda sumarlos.",
                        );
                    } else {
                        buckets.important.push(
                            "Falta cantidad de minutos. Si aguarda salida, usar estructura 'DEMORANDO SU PARTIDA'.",
                        );
                    }
                }
                StatusKind::Reduced if !REDUCED_LIMIT.is_match(upper) => {
                    buckets.important.push("Falta tramo reducido.");
                }
                _ => {}
            }
        }
    }

    if components.slots.scheduled_time().is_none() {
        buckets.important.push("Falta hora programada");
    }
    if components.slots.route().is_none() {
        buckets.important.push("Falta origen y destino");
    }
}

fn check_general(components: &ExtractedComponents, buckets: &mut Buckets) {
    let service = components.slots.identifier();
    match service {
        None => buckets.important.push("Falta identificación del servicio"),
        Some(name) if name.contains('-') => buckets.suggestions.push(format!(
            "Uso de guiones en '{name}' es aceptable, pero se sugiere validar Matriz."
        )),
        Some(_) => {}
    }

    if components.status.is_none() {
        buckets.important.push("Falta estado del servicio");
    } else {
        informal_status_note(components, buckets);
    }

    let location_helpful = components
        .contingency_code()
        .is_some_and(|code| LOCATION_HELPFUL_CODES.contains(&code));
    if components.slots.time_or_location().is_none() && location_helpful {
        buckets.suggestions.push("Podría ser útil especificar el LUGAR");
    }
}

fn check_missing_contingency(upper: &str, components: &ExtractedComponents, buckets: &mut Buckets) {
    let cancelled = components
        .status_kind()
        .is_some_and(|kind| kind.is_cancellation());
    let coded_other = components
        .structural_code
        .as_ref()
        .is_some_and(|code| code.contingency_digits == CODE_OTHER);

    if cancelled && coded_other {
        buckets.observations.push(
            "Código 17 sin motivo detallado. Si existe causa específica, usar código correspondiente",
        );
    } else if FORMATIONS.is_match(upper) {
        buckets
            .suggestions
            .push("Mensaje sobre formaciones sin causa específica. Si hay motivo, agregarlo");
    } else {
        buckets.important.push("Falta motivo de la contingencia");
    }
}

fn check_structure(components: &ExtractedComponents, buckets: &mut Buckets) {
    if !components.structure_valid {
        buckets.important.push(consistency::MISSING_STRUCTURAL_CODE);
        return;
    }

    if let Some(code) = components.structural_code.as_ref() {
        if components.contingency.is_some() {
            for finding in consistency::check(
                Some(code),
                components.contingency_code(),
                components.status_kind(),
            ) {
                if finding.is_critical() {
                    buckets.important.push(finding.message);
                } else {
                    buckets.observations.push(finding.message);
                }
            }
        }
        if code.contingency_digits == CODE_OTHER {
            buckets
                .observations
                .push("Código 17 es excepcional. Verificar si existe código específico");
        }
    }
}

// ── Scores ──────────────────────────────────────────────────────────

const POINTS_IDENTIFIER: u32 = 20;
const POINTS_STATUS: u32 = 20;
const POINTS_CONTINGENCY: u32 = 15;
const POINTS_TIME_OR_LOCATION: u32 = 15;
const POINTS_ROUTE: u32 = 20;
const POINTS_STRUCTURAL_CODE: u32 = 10;

const COMPONENTS_COMPLETE: u32 = 90;
const COMPONENTS_ACCEPTABLE: u32 = 70;

/// Early-notice window rated excellent for any status, minutes.
const TIMING_EXCELLENT_WINDOW: f64 = -5.0;
/// Upper bound (inclusive) of a good timing grade, minutes.
const TIMING_GOOD_MINUTES: f64 = 11.0;

const STRUCTURE_IMPECCABLE: u32 = 95;
const STRUCTURE_CORRECT: u32 = 75;
const STRUCTURE_IMPROVABLE: u32 = 55;

/// Content longer than this (with a recognized type) earns the full length bonus.
const LONG_CONTENT_CHARS: usize = 50;
const MEDIUM_CONTENT_CHARS: usize = 30;

/// Grade components, timing and structure.
pub fn score(
    message: &Message,
    components: &ExtractedComponents,
    timing: Option<&TimingResult>,
) -> ScoreSet {
    let (components_points, component_gaps) = component_points(components);
    let structure_points = structure_points(message, components);

    ScoreSet {
        components: grade_components(components_points),
        components_points,
        component_gaps,
        timing: grade_timing(timing),
        structure: grade_structure(structure_points),
        structure_points,
    }
}

fn component_points(components: &ExtractedComponents) -> (u32, Vec<String>) {
    let general = components.message_type() == MessageType::GeneralService;
    let mut points = 0;
    let mut gaps = Vec::new();

    let mut award = |present: bool, weight: u32, gap: &str| {
        if present {
            points += weight;
        } else {
            gaps.push(gap.to_string());
        }
    };

    let identifier_gap = if components.message_type() == MessageType::TrainSpecific {
        "Falta número de tren"
    } else {
        "Falta identificación del servicio"
    };
    award(
        components.slots.identifier().is_some(),
        POINTS_IDENTIFIER,
        identifier_gap,
    );
    award(components.status.is_some(), POINTS_STATUS, "Falta estado/demora");
    award(
        components.contingency.is_some(),
        POINTS_CONTINGENCY,
        "Falta causa específica",
    );
    award(
        general || components.slots.time_or_location().is_some(),
        POINTS_TIME_OR_LOCATION,
        "Falta horario",
    );
    award(
        general || components.slots.route().is_some(),
        POINTS_ROUTE,
        "Falta origen y/o destino",
    );
    award(
        components.structure_valid,
        POINTS_STRUCTURAL_CODE,
        "Falta código formal",
    );

    (points, gaps)
}

fn grade_components(points: u32) -> ComponentsGrade {
    if points >= COMPONENTS_COMPLETE {
        ComponentsGrade::Completo
    } else if points >= COMPONENTS_ACCEPTABLE {
        ComponentsGrade::Aceptable
    } else {
        ComponentsGrade::Incompleto
    }
}

fn grade_timing(timing: Option<&TimingResult>) -> TimingGrade {
    let Some(timing) = timing else {
        return TimingGrade::NotApplicable;
    };
    let deviation = timing.deviation_minutes;

    if (TIMING_EXCELLENT_WINDOW..=0.0).contains(&deviation)
        || (deviation < TIMING_EXCELLENT_WINDOW && timing.is_cancellation)
    {
        TimingGrade::Excelente
    } else if deviation > 0.0 && deviation <= TIMING_GOOD_MINUTES {
        TimingGrade::Bueno
    } else {
        TimingGrade::Deficiente
    }
}

fn spelling_points(errors: usize) -> u32 {
    match errors {
        0 => 40,
        1 => 25,
        2..=3 => 15,
        4..=5 => 10,
        _ => 0,
    }
}

fn structure_points(message: &Message, components: &ExtractedComponents) -> u32 {
    let validity = if components.structure_valid { 30 } else { 10 };

    let length = message.content.chars().count();
    let length_points = if length > LONG_CONTENT_CHARS && components.message_type().is_recognized() {
        30
    } else if length > MEDIUM_CONTENT_CHARS {
        20
    } else {
        10
    };

    spelling_points(components.spelling_errors.len()) + validity + length_points
}

fn grade_structure(points: u32) -> StructureGrade {
    if points >= STRUCTURE_IMPECCABLE {
        StructureGrade::Impecable
    } else if points >= STRUCTURE_CORRECT {
        StructureGrade::Correcto
    } else if points >= STRUCTURE_IMPROVABLE {
        StructureGrade::Mejorable
    } else {
        StructureGrade::Deficiente
    }
}
