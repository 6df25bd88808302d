//! Message type detection.
//!
//! Rules are an ordered table of `(name, matcher)` rows evaluated top to
//! bottom; the first rule that produces a detection wins and no later rule is
//! consulted. Adding a phrasing means adding or extending a row, never nesting
//! another conditional.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::pipeline::types::MessageType;

/// Outcome of type detection, with whatever the winning rule captured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDetection {
    pub message_type: MessageType,
    /// Train number, for train-specific messages.
    pub train_number: Option<String>,
    /// Ramal/line/service name, when the rule captured one.
    pub service_name: Option<String>,
    /// The number followed "SERVICIO" instead of "TREN".
    pub used_service_as_train: bool,
}

impl TypeDetection {
    fn of(message_type: MessageType) -> Self {
        Self {
            message_type,
            train_number: None,
            service_name: None,
            used_service_as_train: false,
        }
    }
}

/// One row of the rule table.
struct TypeRule {
    name: &'static str,
    matcher: fn(&str) -> Option<TypeDetection>,
}

/// Priority order. Restoration beats everything, including a train number.
const TYPE_RULES: &[TypeRule] = &[
    TypeRule {
        name: "restoration",
        matcher: match_restoration,
    },
    TypeRule {
        name: "rectification",
        matcher: match_rectification,
    },
    TypeRule {
        name: "train_number",
        matcher: match_train,
    },
    TypeRule {
        name: "general_service",
        matcher: match_general_service,
    },
];

static RESTORATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"SE\s+RESTABLECE|RESTABLECE\s+(?:EL\s+)?SERVICIO").expect("restoration regex")
});

static RESTORED_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:RAMAL|L[ÍI]NEA)\s+([A-ZÁÉÍÓÚÑ\s\-\.]+?)(?:\s+SE\s+|\s+RESTABLECE)")
        .expect("restored line regex")
});

static RECTIFICATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"SE\s+RECTIFICA|RECTIFICACI[OÓ]N").expect("rectification regex")
});

/// "TREN N° 3328", "TREN @T3328", "@T3328".
static TRAIN_DIRECT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:TREN\s+(?:N[°º]?\s*)?(?:@?T)?|@T)\s*(\d{3,4})\b").expect("train regex")
});

/// Any 3–4 digit number somewhere after the word TREN.
static TRAIN_LOOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"TREN.*?(\d{3,4})").expect("loose train regex"));

static SERVICE_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"SERVICIO\s+(?:N[°º]?\s*)?(\d{3,4})\b").expect("service number regex")
});

static GENERAL_SERVICE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:RAMAL|SERVICIO|L[IÍ]NEA)\s+([A-ZÁÉÍÓÚÑ\s-]+?)\s+(?:SE\s+|INTERRUMPIDO|REDUCIDO|CON\s+|DEMORAS|CANCELADO)",
    )
    .expect("general service regex")
});

fn match_restoration(upper: &str) -> Option<TypeDetection> {
    if !RESTORATION.is_match(upper) {
        return None;
    }
    let mut detection = TypeDetection::of(MessageType::Resumption);
    detection.service_name = RESTORED_LINE
        .captures(upper)
        .map(|c| c[1].trim().to_string())
        .filter(|name| !name.is_empty());
    Some(detection)
}

fn match_rectification(upper: &str) -> Option<TypeDetection> {
    RECTIFICATION
        .is_match(upper)
        .then(|| TypeDetection::of(MessageType::Rectification))
}

fn match_train(upper: &str) -> Option<TypeDetection> {
    let direct = TRAIN_DIRECT
        .captures(upper)
        .or_else(|| TRAIN_LOOSE.captures(upper))
        .map(|c| c[1].to_string());

    let (number, used_service_as_train) = match direct {
        Some(number) => (number, false),
        None => (SERVICE_NUMBER.captures(upper)?[1].to_string(), true),
    };

    let mut detection = TypeDetection::of(MessageType::TrainSpecific);
    detection.train_number = Some(number);
    detection.used_service_as_train = used_service_as_train;
    Some(detection)
}

fn match_general_service(upper: &str) -> Option<TypeDetection> {
    let captures = GENERAL_SERVICE.captures(upper)?;
    let mut detection = TypeDetection::of(MessageType::GeneralService);
    detection.service_name = Some(captures[1].trim().to_string());
    Some(detection)
}

/// Determine the category of a message. Pure; `content` may be raw or normalized.
pub fn classify(content: &str) -> TypeDetection {
    let upper = content.to_uppercase();

    for rule in TYPE_RULES {
        if let Some(detection) = (rule.matcher)(&upper) {
            debug!(
                rule = rule.name,
                message_type = %detection.message_type,
                "Type rule matched"
            );
            return detection;
        }
    }

    TypeDetection::of(MessageType::Unknown)
}
