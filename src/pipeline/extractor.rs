//! Component extraction (A–F) for a classified message.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::debug;

use crate::catalog::status::{self, StatusKind};
use crate::catalog::{ContingencyMatrix, TechnicalVocabulary};
use crate::pipeline::classifier::{self, TypeDetection};
use crate::pipeline::spelling::FormatAuditor;
use crate::pipeline::types::{
    ComponentSlots, ExtractedComponents, Findings, Message, MessageType, Route, StatusRecord,
    StructuralCode,
};

const PROCEDURE_REMINDER: &str = "IMPORTANTE: SIEMPRE SEGUIR EL PROCEDIMIENTO.";

/// Locations that are really time expressions ("EN EL DIA", ...).
const TEMPORAL_STOPLIST: &[&str] = &["EL DIA", "LA TARDE", "LA NOCHE", "EL TRANSCURSO"];

static STRUCTURAL_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\W*(\d{1,2})\.(\d{1,2})\.([A-Z])").expect("structural code regex")
});

static DELAY_MINUTES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:DEMORAS?|REGISTRA|ESPERA)(?:[\s\w]*?)(?:DE\s*|DE_|OBSERVA\s+)?([_\-\.]?)\s*(\d+)\s*([_\-\.]?)\s*(?:MINUTOS?|MIN\.?)",
    )
    .expect("delay minutes regex")
});

// ── Identifier (A) ──

static GENERAL_SERVICE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:SERVICIO|RAMAL|L[ÍI]NEA)\s+([A-ZÁÉÍÓÚÑ\s\-\.]+?)(?:\s+SE\s+|\s+CIRCULA|\s+HA\s+)")
        .expect("general service name regex")
});

static RECTIFIED_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:TREN|SERVICIO|FORMACI[OÓ]N)\s+(?:N[°º]?\s*)?(\d+)").expect("rectified number regex")
});

static RECTIFIED_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:RAMAL|L[ÍI]NEA)\s+([A-ZÁÉÍÓÚÑ\s\-\.]+)").expect("rectified line regex")
});

// ── Scheduled time (D) ──

static TIME_COMPACT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"DE\s+LAS\s+(\d{2})(\d{2})\s*HS").expect("compact time regex"));

static TIME_CANONICAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"DE\s+LAS\s+(\d{1,2})[\s:\.]+(\d{2})\s*HS").expect("canonical time regex")
});

static TIME_INVERTED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bHS\.?\s*(\d{1,2})[\s:\.]*(\d{2})").expect("inverted time regex")
});

static TIME_LOOSE_LAS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:(?:A|DE)?\s+)?LAS\s+(\d{1,2})[\s:\._]+(\d{2})").expect("loose time regex")
});

static TIME_LOOSE_HS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{1,2})[\s:\._]+(\d{2})\s*HS").expect("bare time regex")
});

static DE_LAS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"DE\s+LAS").expect("de las regex"));

// ── Route (E) ──

const ORIGIN_STOP: &str =
    r"\s+(?:HACIA|A\s+[A-Z]|CON\s+|CIRCULA|HA\s+|FUE|Y\s+|PARTIO|DETENIDO|\(|LLEGA)";

const DESTINATION_STOP: &str = r"(?:\s+(?:CIRCULA|HA\s+|FUE|CON\s+|REGISTRA|SE\s+ENCUENTRA|POR\s+|O\s+TRAS|RESTABLECE|PARTIO|Y\s+|\(|EN\s+ESTACION|SE\s+)|$)";

const FALLBACK_ROUTE_STOP: &str = r"(?:\s+(?:CIRCULA|HA\s+SIDO|FUE|CON\s+DEMORA)|$)";

const STATION: &str = r"([A-ZÁÉÍÓÚÑ0-9\s\.]+?)";

const LOOSE_STATION: &str = r"([A-ZÁÉÍÓÚÑ][A-ZÁÉÍÓÚÑ\s\.\(\)]+?)";

static ORIGIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\b(?:PARTIENDO\s+(?:DE|DESDE)|DESDE)\s+{STATION}{ORIGIN_STOP}"))
        .expect("origin regex")
});

static DESTINATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\b(?:HACIA|LLEGA\s+A|FINALIZA\s+EN)\s+{STATION}{DESTINATION_STOP}"))
        .expect("destination regex")
});

/// Bare "DE" also appears in "DE LAS 08:00 HS", so it is only consulted last.
static BARE_ORIGIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\bDE\s+{STATION}{ORIGIN_STOP}")).expect("bare origin regex")
});

static BARE_DESTINATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\bA\s+{STATION}{DESTINATION_STOP}")).expect("bare destination regex")
});

const BARE_A_ADVICE: &str = "Según Matriz de Mensajes: Usa 'HACIA [Estacion]' en lugar de 'A'";

/// Alternate route phrasings, in priority order, with the advice each one earns.
static FALLBACK_ROUTES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    vec![
        (
            Regex::new(&format!(
                r"\bENTRE\s+{LOOSE_STATION}\s+Y\s+{LOOSE_STATION}{FALLBACK_ROUTE_STOP}"
            ))
            .expect("entre route regex"),
            "Según Matriz de Mensajes: Usa 'DESDE [Origen] HACIA [Destino]'",
        ),
        (
            Regex::new(&format!(
                r"\b(?:SALIENDO\s+|SALE\s+)?DE\s+{LOOSE_STATION}\s+A\s+{LOOSE_STATION}{FALLBACK_ROUTE_STOP}"
            ))
            .expect("de-a route regex"),
            BARE_A_ADVICE,
        ),
    ]
});

// ── General service location (D) ──

static LOCATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bEN\s+([A-ZÁÉÍÓÚÑ\s\.]+?)(?:\s+(?:DISCULPA|SEPA)|\s*\.|$)").expect("location regex")
});

/// Pulls components A–F out of a message.
///
/// Holds the injected spell-checking capability; everything else it needs is
/// passed per call.
#[derive(Debug, Clone, Default)]
pub struct ComponentExtractor {
    auditor: FormatAuditor,
}

impl ComponentExtractor {
    pub fn new(auditor: FormatAuditor) -> Self {
        Self { auditor }
    }

    /// Extract all components. Structural code, contingency code and status
    /// are available on the result through `structural_code`,
    /// [`ExtractedComponents::contingency_code`] and
    /// [`ExtractedComponents::status_kind`].
    pub fn extract(
        &self,
        message: &Message,
        matrix: &ContingencyMatrix,
        vocabulary: &TechnicalVocabulary,
    ) -> ExtractedComponents {
        let upper = message.normalized_content().to_uppercase();
        let detection = classifier::classify(&upper);
        let message_type = detection.message_type;
        let mut warnings = Findings::new();

        if detection.used_service_as_train {
            warnings.push(format!(
                "Terminología incorrecta: Usaste 'SERVICIO N°'. Para trenes específicos usa 'TREN N°'. {PROCEDURE_REMINDER}"
            ));
        }

        let structural_code = parse_structural_code(&upper);
        let structure_valid = structural_code.is_some() && message_type.is_recognized();
        if structural_code.is_some() && !structure_valid {
            warnings.push(
                "Código detectado pero el mensaje no tiene formato reconocido (TREN o GENERAL)",
            );
        }

        let status = extract_status(&upper, &mut warnings);
        let contingency = matrix.lookup(&upper);
        let slots = extract_slots(&upper, detection, &mut warnings);
        terminology_guard(&upper, message_type, &mut warnings);

        debug!(
            id = %message.id,
            message_type = %message_type,
            status = ?status.as_ref().map(|s| s.kind),
            contingency = ?contingency.as_ref().map(|c| c.code.as_str()),
            "Components extracted"
        );

        ExtractedComponents {
            slots,
            status,
            contingency,
            structural_code,
            structure_valid,
            spelling_valid: true,
            spelling_errors: Findings::new(),
            format_warnings: warnings,
        }
        .with_spelling_errors(self.auditor.audit(&message.content, vocabulary))
    }
}

/// Component F from the start of the (upper-cased) content.
pub fn parse_structural_code(upper: &str) -> Option<StructuralCode> {
    let caps = STRUCTURAL_CODE.captures(upper)?;
    let contingency_digits = format!("{:0>2}", &caps[1]);
    let status_digit = caps[2].to_string();
    let cycle_tag = caps[3].chars().next()?;
    Some(StructuralCode {
        raw: format!("{}.{}.{}", &caps[1], &caps[2], cycle_tag),
        contingency_digits,
        status_digit,
        cycle_tag,
    })
}

/// Component B, plus the minute count for delays.
fn extract_status(upper: &str, warnings: &mut Findings) -> Option<StatusRecord> {
    let (kind, formal) = match status::detect_formal(upper) {
        Some(kind) => (kind, true),
        None => (status::detect_informal(upper)?, false),
    };

    let minutes = if matches!(kind, StatusKind::Delay | StatusKind::DepartureDelay) {
        extract_minutes(upper, warnings)
    } else {
        None
    };

    Some(StatusRecord {
        kind,
        code: kind.catalog_code().to_string(),
        formal,
        minutes,
    })
}

/// Minute count near a delay verb; stray separators around the digits are
/// tolerated but reported.
fn extract_minutes(upper: &str, warnings: &mut Findings) -> Option<u32> {
    let caps = DELAY_MINUTES.captures(upper)?;
    let prefix = &caps[1];
    let digits = &caps[2];
    let suffix = &caps[3];

    if !prefix.is_empty() || !suffix.is_empty() {
        warnings.push(format!(
            "Se detectó '{prefix}{digits}{suffix}' en los minutos. Se sugiere escribir solo el número '{digits}'."
        ));
    }
    digits.parse().ok()
}

fn extract_slots(
    upper: &str,
    detection: TypeDetection,
    warnings: &mut Findings,
) -> ComponentSlots {
    match detection.message_type {
        MessageType::TrainSpecific => ComponentSlots::TrainSpecific {
            train_number: detection.train_number,
            scheduled_time: extract_scheduled_time(upper, warnings),
            route: extract_route(upper, warnings),
            used_service_as_train: detection.used_service_as_train,
        },
        MessageType::GeneralService => ComponentSlots::GeneralService {
            service: first_group(&GENERAL_SERVICE_NAME, upper).or(detection.service_name),
            location: extract_location(upper),
            apology: upper.contains("DISCULPA"),
        },
        MessageType::Resumption => ComponentSlots::Resumption {
            service: detection.service_name,
        },
        MessageType::Rectification => ComponentSlots::Rectification {
            target: first_group(&RECTIFIED_NUMBER, upper)
                .or_else(|| first_group(&RECTIFIED_LINE, upper)),
        },
        MessageType::Unknown => ComponentSlots::Unknown,
    }
}

fn first_group(regex: &Regex, upper: &str) -> Option<String> {
    regex
        .captures(upper)
        .map(|c| c[1].trim().to_string())
        .filter(|s| !s.is_empty())
}

fn hh_mm(caps: &Captures<'_>) -> String {
    format!("{:0>2}:{}", &caps[1], &caps[2])
}

/// Component D for train-specific messages, most canonical phrasing first.
fn extract_scheduled_time(upper: &str, warnings: &mut Findings) -> Option<String> {
    if let Some(caps) = TIME_COMPACT.captures(upper) {
        warnings.push(format!(
            "SUGERENCIA: Se recomienda usar 'DE LAS HH:MM HS' (con dos puntos) en lugar de sin separador. {PROCEDURE_REMINDER}"
        ));
        return Some(hh_mm(&caps));
    }

    if let Some(caps) = TIME_CANONICAL.captures(upper) {
        if !caps[0].contains(':') {
            warnings.push(format!(
                "SUGERENCIA: Se recomienda usar 'DE LAS HH:MM HS' (con dos puntos). {PROCEDURE_REMINDER}"
            ));
        }
        return Some(hh_mm(&caps));
    }

    if let Some(caps) = TIME_INVERTED.captures(upper) {
        warnings.push(format!(
            "Orden incorrecto: Escribiste 'HS Hora'. Lo correcto es 'DE LAS HH:MM HS'. {PROCEDURE_REMINDER}"
        ));
        return Some(hh_mm(&caps));
    }

    let caps = TIME_LOOSE_LAS
        .captures(upper)
        .or_else(|| TIME_LOOSE_HS.captures(upper))?;
    if !DE_LAS.is_match(upper) {
        warnings.push(format!(
            "Falta preposición: Escribiste mal la hora. Lo correcto es 'DE LAS HH:MM HS'. {PROCEDURE_REMINDER}"
        ));
    }
    Some(hh_mm(&caps))
}

/// Component E for train-specific messages. Only set when both endpoints are found.
///
/// Canonical "DESDE .. HACIA .." wins; then "ENTRE .. Y .." and "DE .. A .."
/// in that order; finally any mix of explicit and bare markers.
fn extract_route(upper: &str, warnings: &mut Findings) -> Option<Route> {
    let origin = first_group(&ORIGIN, upper);
    let destination = first_group(&DESTINATION, upper);

    if let (Some(origin), Some(destination)) = (&origin, &destination) {
        return Some(Route {
            origin: origin.clone(),
            destination: destination.clone(),
        });
    }

    for (pattern, advice) in FALLBACK_ROUTES.iter() {
        if let Some(caps) = pattern.captures(upper) {
            warnings.push(*advice);
            return Some(Route {
                origin: caps[1].trim().to_string(),
                destination: caps[2].trim().to_string(),
            });
        }
    }

    let origin = origin.or_else(|| first_group(&BARE_ORIGIN, upper))?;
    let (destination, bare) = match destination {
        Some(destination) => (destination, false),
        None => (first_group(&BARE_DESTINATION, upper)?, true),
    };
    if bare {
        warnings.push(BARE_A_ADVICE);
    }
    Some(Route {
        origin,
        destination,
    })
}

/// Component D for general-service messages.
fn extract_location(upper: &str) -> Option<String> {
    first_group(&LOCATION, upper).filter(|place| !TEMPORAL_STOPLIST.contains(&place.as_str()))
}

fn terminology_guard(upper: &str, message_type: MessageType, warnings: &mut Findings) {
    if upper.contains("@T") {
        warnings.push(
            "Formato no estándar: Se detectó el prefijo interno '@T'. P/ comunicación externa usar 'TREN N° ...'.",
        );
    }

    if upper.contains("SUSPENDIDO") {
        let advice = if message_type == MessageType::TrainSpecific {
            "Si el tren no completa recorrido, usar estructura: 'EL TREN N° [N] DESDE [A] HACIA [B] CIRCULA REDUCIDO ENTRE [A] Y [C] POR [MOTIVO]'."
        } else {
            "Usar 'REDUCIDO' (menos trenes) o 'CANCELADO' (no corre)."
        };
        warnings.push(format!("'SUSPENDIDO' no es válido. {advice}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix() -> ContingencyMatrix {
        ContingencyMatrix::from_entries([
            ("1", "PROBLEMAS CLIMÁTICOS"),
            ("3", "PROBLEMAS TÉCNICOS"),
            ("5", "PROBLEMAS OPERATIVOS"),
            ("17", "OTRAS CONTINGENCIAS"),
        ])
    }

    fn extract(content: &str) -> ExtractedComponents {
        let message = Message::new("1", "op", "ROCA", content, "01/12/2024 08:05:00");
        ComponentExtractor::default().extract(&message, &matrix(), &TechnicalVocabulary::empty())
    }

    #[test]
    fn canonical_train_message() {
        let c = extract(
            "3.1.A EL TREN N° 3328 DE LAS 08:00 HS DESDE CONSTITUCIÓN HACIA EZEIZA REGISTRA DEMORAS DE 10 MINUTOS POR PROBLEMAS TÉCNICOS",
        );
        assert_eq!(c.message_type(), MessageType::TrainSpecific);
        assert_eq!(c.slots.identifier(), Some("3328"));
        assert_eq!(c.status_kind(), Some(StatusKind::Delay));
        assert!(c.status.as_ref().unwrap().formal);
        assert_eq!(c.delay_minutes(), Some(10));
        assert_eq!(c.contingency_code(), Some("03"));
        assert_eq!(c.slots.scheduled_time(), Some("08:00"));
        assert_eq!(
            c.slots.route(),
            Some(&Route {
                origin: "CONSTITUCIÓN".into(),
                destination: "EZEIZA".into(),
            })
        );
        assert!(c.structure_valid);
        assert_eq!(c.structural_code.as_ref().unwrap().contingency_digits, "03");
        assert!(c.format_warnings.is_empty());
    }

    #[test]
    fn structural_code_pads_contingency_digits() {
        let code = parse_structural_code("- 3.1.A EL TREN").unwrap();
        assert_eq!(code.raw, "3.1.A");
        assert_eq!(code.contingency_digits, "03");
        assert_eq!(code.status_digit, "1");
        assert_eq!(code.cycle_tag, 'A');
        assert!(parse_structural_code("EL TREN 3.1.A").is_none());
    }

    #[test]
    fn structural_code_on_unknown_message_is_not_valid() {
        let c = extract("3.1.A BUENOS DIAS");
        assert!(c.structural_code.is_some());
        assert!(!c.structure_valid);
        assert!(c.format_warnings.contains(
            "Código detectado pero el mensaje no tiene formato reconocido (TREN o GENERAL)"
        ));
    }

    #[test]
    fn dirty_minutes_are_accepted_with_advice() {
        let c = extract("EL TREN 3328 REGISTRA DEMORAS DE 5_ MINUTOS");
        assert_eq!(c.delay_minutes(), Some(5));
        assert!(c.format_warnings.contains(
            "Se detectó '5_' en los minutos. Se sugiere escribir solo el número '5'."
        ));
    }

    #[test]
    fn informal_status_is_not_formal() {
        let c = extract("EL TREN 3328 TIENE DEMORA");
        let status = c.status.unwrap();
        assert_eq!(status.kind, StatusKind::Delay);
        assert_eq!(status.code, "1");
        assert!(!status.formal);
    }

    #[test]
    fn compact_time_is_accepted_with_suggestion() {
        let c = extract("EL TREN 3328 DE LAS 0815 HS FUE CANCELADO");
        assert_eq!(c.slots.scheduled_time(), Some("08:15"));
        assert!(c.format_warnings.iter().any(|w| w.contains("sin separador")));
    }

    #[test]
    fn dotted_time_suggests_colon() {
        let c = extract("EL TREN 3328 DE LAS 8.15 HS FUE CANCELADO");
        assert_eq!(c.slots.scheduled_time(), Some("08:15"));
        assert!(c.format_warnings.iter().any(|w| w.contains("(con dos puntos).")));
    }

    #[test]
    fn inverted_time_order_is_flagged() {
        let c = extract("EL TREN 3328 HS 08:15 FUE CANCELADO");
        assert_eq!(c.slots.scheduled_time(), Some("08:15"));
        assert!(c.format_warnings.iter().any(|w| w.starts_with("Orden incorrecto")));
    }

    #[test]
    fn loose_time_without_preposition() {
        let c = extract("EL TREN 3328 A LAS 9:40 FUE CANCELADO");
        assert_eq!(c.slots.scheduled_time(), Some("09:40"));
        assert!(c.format_warnings.iter().any(|w| w.starts_with("Falta preposición")));
    }

    #[test]
    fn entre_route_fallback() {
        let c = extract("EL TREN 3328 ENTRE TEMPERLEY Y HAEDO FUE CANCELADO");
        assert_eq!(
            c.slots.route(),
            Some(&Route {
                origin: "TEMPERLEY".into(),
                destination: "HAEDO".into(),
            })
        );
        assert!(c.format_warnings.contains(
            "Según Matriz de Mensajes: Usa 'DESDE [Origen] HACIA [Destino]'"
        ));
    }

    #[test]
    fn de_a_route_fallback() {
        let c = extract("EL TREN 3328 SALE DE TEMPERLEY A HAEDO CON DEMORA");
        let route = c.slots.route().unwrap();
        assert_eq!(route.origin, "TEMPERLEY");
        assert_eq!(route.destination, "HAEDO");
        assert!(c.format_warnings.contains(
            "Según Matriz de Mensajes: Usa 'HACIA [Estacion]' en lugar de 'A'"
        ));
    }

    #[test]
    fn entre_takes_priority_over_de_a() {
        let c = extract(
            "EL TREN 3328 QUE SALE DE LANUS A QUILMES CIRCULA CON DEMORA ENTRE TEMPERLEY Y HAEDO CON DEMORA",
        );
        let route = c.slots.route().unwrap();
        assert_eq!(route.origin, "TEMPERLEY");
        assert_eq!(route.destination, "HAEDO");
        assert!(c.format_warnings.contains(
            "Según Matriz de Mensajes: Usa 'DESDE [Origen] HACIA [Destino]'"
        ));
        assert!(!c.format_warnings.contains(BARE_A_ADVICE));
    }

    #[test]
    fn explicit_origin_with_bare_destination() {
        let c = extract("EL TREN 3328 DESDE TEMPERLEY A HAEDO REGISTRA DEMORAS DE 5 MINUTOS");
        let route = c.slots.route().unwrap();
        assert_eq!(route.origin, "TEMPERLEY");
        assert_eq!(route.destination, "HAEDO");
        assert!(c.format_warnings.contains(BARE_A_ADVICE));
    }

    #[test]
    fn route_requires_both_endpoints() {
        let c = extract("EL TREN 3328 HACIA EZEIZA FUE CANCELADO");
        assert!(c.slots.route().is_none());
    }

    #[test]
    fn general_service_slots() {
        let c = extract(
            "1.4.A EL RAMAL ALEJANDRO KORN CIRCULA REDUCIDO POR PROBLEMAS CLIMÁTICOS EN ESTACION GLEW. SEPA DISCULPAR",
        );
        assert_eq!(c.message_type(), MessageType::GeneralService);
        assert_eq!(c.slots.identifier(), Some("ALEJANDRO KORN"));
        assert_eq!(c.slots.time_or_location(), Some("ESTACION GLEW"));
        assert!(matches!(
            c.slots,
            ComponentSlots::GeneralService { apology: true, .. }
        ));
        assert_eq!(c.contingency_code(), Some("01"));
    }

    #[test]
    fn temporal_phrases_are_not_locations() {
        assert_eq!(extract_location("RAMAL X CON DEMORAS EN EL TRANSCURSO."), None);
    }

    #[test]
    fn rectification_target() {
        let c = extract("SE RECTIFICA: EL TREN N° 3328 NO FUE CANCELADO");
        assert_eq!(c.slots.identifier(), Some("3328"));

        let c = extract("RECTIFICACION RAMAL BOSQUES");
        assert_eq!(c.slots.identifier(), Some("BOSQUES"));
    }

    #[test]
    fn terminology_guards() {
        let c = extract("@T3328 FUE SUSPENDIDO");
        assert!(c.format_warnings.iter().any(|w| w.contains("'@T'")));
        assert!(c
            .format_warnings
            .iter()
            .any(|w| w.starts_with("'SUSPENDIDO' no es válido. Si el tren")));

        let c = extract("EL RAMAL BOSQUES HA SIDO SUSPENDIDO");
        assert!(c
            .format_warnings
            .contains("'SUSPENDIDO' no es válido. Usar 'REDUCIDO' (menos trenes) o 'CANCELADO' (no corre)."));
    }

    #[test]
    fn service_as_train_warning_comes_first() {
        let c = extract("EL SERVICIO 3328 CIRCULA REDUCIDO");
        assert!(c.slots.used_service_as_train());
        assert!(c.format_warnings.as_slice()[0].starts_with("Terminología incorrecta"));
    }

    #[test]
    fn spelling_errors_flow_into_components() {
        let c = extract("EL TREN 3328 CIRUCLA CON DEMORAS");
        assert!(!c.spelling_valid);
        assert!(c.spelling_errors.contains("CIRUCLA → CIRCULA"));
    }
}
