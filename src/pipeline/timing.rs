//! Timeliness of train-specific notices.

use chrono::{DateTime, NaiveDateTime, NaiveTime, TimeDelta};
use tracing::debug;

use crate::pipeline::types::{
    ExtractedComponents, Message, MessageType, Punctuality, TimingLevel, TimingResult,
};

/// Minutes before the reference after which an early notice is outstanding.
const WELL_AHEAD_MINUTES: f64 = -60.0;
/// Upper bound (inclusive) of an on-time notice.
const ON_TIME_MINUTES: f64 = 10.0;
/// Upper bound (inclusive) of a tolerably late notice.
const TOLERABLE_MINUTES: f64 = 20.0;

const SENT_AT_FORMATS: &[&str] = &[
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
];

/// Parse a send timestamp in any of the accepted layouts.
pub fn parse_sent_at(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    SENT_AT_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.naive_local())
        })
}

fn parse_hh_mm(raw: &str) -> Option<NaiveTime> {
    let (hour, minute) = raw.split_once(':')?;
    NaiveTime::from_hms_opt(hour.trim().parse().ok()?, minute.trim().parse().ok()?, 0)
}

/// Measure how late the notice went out. `None` whenever the measurement
/// does not apply or any input is unusable.
pub fn analyze(message: &Message, components: &ExtractedComponents) -> Option<TimingResult> {
    if matches!(
        components.message_type(),
        MessageType::GeneralService | MessageType::Rectification
    ) {
        return None;
    }

    let status = components.status_kind()?;
    if status.exempt_from_lateness() {
        return None;
    }

    let scheduled_time = components.slots.scheduled_time()?;
    let is_cancellation = status.is_cancellation();
    let delay_minutes = if is_cancellation {
        0
    } else {
        components.delay_minutes()?
    };

    let Some(sent) = parse_sent_at(&message.sent_at) else {
        debug!(id = %message.id, sent_at = %message.sent_at, "Unparseable send time, skipping timing");
        return None;
    };

    // Scheduled time is anchored to the send date; there is no midnight rollover.
    let scheduled = sent.date().and_time(parse_hh_mm(scheduled_time)?);
    let reference =
        scheduled.checked_add_signed(TimeDelta::try_minutes(i64::from(delay_minutes))?)?;

    let deviation = (sent - reference).num_milliseconds() as f64 / 60_000.0;
    let (classification, level) = classify_deviation(deviation, is_cancellation);

    Some(TimingResult {
        deviation_minutes: (deviation * 10.0).round() / 10.0,
        classification,
        level,
        reference_time: reference.format("%H:%M").to_string(),
        scheduled_time: scheduled_time.to_string(),
        sent_time: sent.format("%H:%M:%S").to_string(),
        delay_minutes,
        is_cancellation,
    })
}

/// Thresholds apply to the unrounded deviation.
pub fn classify_deviation(deviation: f64, is_cancellation: bool) -> (Punctuality, TimingLevel) {
    if !is_cancellation {
        if deviation < WELL_AHEAD_MINUTES {
            return (Punctuality::Anticipado, TimingLevel::Excelente);
        }
        if deviation < 0.0 {
            return (Punctuality::Anticipado, TimingLevel::MuyBueno);
        }
    }

    if deviation <= ON_TIME_MINUTES {
        (Punctuality::Oportuno, TimingLevel::Aceptable)
    } else if deviation <= TOLERABLE_MINUTES {
        (Punctuality::Aceptable, TimingLevel::Observacion)
    } else {
        (Punctuality::Critico, TimingLevel::Importante)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ContingencyMatrix, TechnicalVocabulary};
    use crate::pipeline::extractor::ComponentExtractor;

    fn timing(content: &str, sent_at: &str) -> Option<TimingResult> {
        let message = Message::new("1", "op", "ROCA", content, sent_at);
        let components = ComponentExtractor::default().extract(
            &message,
            &ContingencyMatrix::empty(),
            &TechnicalVocabulary::empty(),
        );
        analyze(&message, &components)
    }

    const DELAYED: &str = "EL TREN N° 3328 DE LAS 08:00 HS DESDE CONSTITUCIÓN HACIA EZEIZA REGISTRA DEMORAS DE 10 MINUTOS";

    #[test]
    fn delay_sent_one_minute_after_reference() {
        let t = timing(DELAYED, "01/12/2024 08:11:00").unwrap();
        assert_eq!(t.reference_time, "08:10");
        assert_eq!(t.deviation_minutes, 1.0);
        assert_eq!(t.classification, Punctuality::Oportuno);
        assert_eq!(t.level, TimingLevel::Aceptable);
        assert_eq!(t.delay_minutes, 10);
        assert_eq!(t.sent_time, "08:11:00");
    }

    #[test]
    fn schedule_is_anchored_to_send_date() {
        let t = timing(
            "EL TREN N° 3328 DE LAS 23:55 HS DESDE CONSTITUCIÓN HACIA EZEIZA REGISTRA DEMORAS DE 10 MINUTOS",
            "02/12/2024 00:07:00",
        )
        .unwrap();
        assert_eq!(t.reference_time, "00:05");
        assert_eq!(t.deviation_minutes, -1438.0);
        assert_eq!(t.classification, Punctuality::Anticipado);
    }

    #[test]
    fn delay_sent_far_too_late() {
        let t = timing(DELAYED, "01/12/2024 08:35:00").unwrap();
        assert_eq!(t.deviation_minutes, 25.0);
        assert_eq!(t.classification, Punctuality::Critico);
        assert_eq!(t.level, TimingLevel::Importante);
    }

    #[test]
    fn early_notice_is_rewarded() {
        let t = timing(DELAYED, "2024-12-01 08:05:30").unwrap();
        assert_eq!(t.deviation_minutes, -4.5);
        assert_eq!(t.level, TimingLevel::MuyBueno);
    }

    #[test]
    fn cancellation_measured_from_scheduled_time() {
        let t = timing(
            "EL TREN N° 3328 DE LAS 08:00 HS FUE CANCELADO",
            "01/12/2024 08:15",
        )
        .unwrap();
        assert!(t.is_cancellation);
        assert_eq!(t.reference_time, "08:00");
        assert_eq!(t.delay_minutes, 0);
        assert_eq!(t.classification, Punctuality::Aceptable);
        assert_eq!(t.level, TimingLevel::Observacion);
    }

    #[test]
    fn cancellation_never_counts_as_early() {
        assert_eq!(
            classify_deviation(-90.0, true),
            (Punctuality::Oportuno, TimingLevel::Aceptable)
        );
        assert_eq!(
            classify_deviation(-90.0, false),
            (Punctuality::Anticipado, TimingLevel::Excelente)
        );
    }

    #[test]
    fn boundaries_are_inclusive() {
        assert_eq!(classify_deviation(10.0, false).0, Punctuality::Oportuno);
        assert_eq!(classify_deviation(10.05, false).0, Punctuality::Aceptable);
        assert_eq!(classify_deviation(20.0, false).0, Punctuality::Aceptable);
        assert_eq!(classify_deviation(20.01, false).0, Punctuality::Critico);
    }

    #[test]
    fn absent_when_not_applicable() {
        // no minutes on a plain delay
        assert!(timing("EL TREN N° 3328 DE LAS 08:00 HS REGISTRA DEMORAS", "01/12/2024 08:11:00").is_none());
        // exempt status
        assert!(timing("EL TREN N° 3328 DE LAS 08:00 HS CIRCULA REDUCIDO", "01/12/2024 08:11:00").is_none());
        // no scheduled time
        assert!(timing("EL TREN N° 3328 FUE CANCELADO", "01/12/2024 08:11:00").is_none());
        // general service
        assert!(timing("EL RAMAL BOSQUES CIRCULA CON DEMORAS DE 10 MINUTOS", "01/12/2024 08:11:00").is_none());
    }

    #[test]
    fn malformed_timestamps_are_absent_not_errors() {
        assert!(timing(DELAYED, "ayer a la mañana").is_none());
        assert!(timing(DELAYED, "").is_none());
        assert!(timing("EL TREN N° 3328 DE LAS 27:00 HS FUE CANCELADO", "01/12/2024 08:11:00").is_none());
    }

    #[test]
    fn accepted_timestamp_layouts() {
        for raw in [
            "01/12/2024 08:11:00",
            "01/12/2024 08:11",
            "2024-12-01 08:11:00",
            "2024-12-01T08:11:00",
            "2024-12-01T08:11:00-03:00",
        ] {
            let parsed = parse_sent_at(raw).unwrap();
            assert_eq!(parsed.format("%Y-%m-%d %H:%M").to_string(), "2024-12-01 08:11");
        }
    }
}
