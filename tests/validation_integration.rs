//! End-to-end validation through the public API.

use std::sync::Arc;

use notice_audit::catalog::{ContingencyMatrix, StatusKind, TechnicalVocabulary};
use notice_audit::pipeline::consistency;
use notice_audit::pipeline::extractor::parse_structural_code;
use notice_audit::pipeline::types::{MessageType, OverallLevel, Punctuality, TimingLevel};
use notice_audit::pipeline::{Message, MessageValidator, Report};

const SCENARIO_A: &str = "3.1.A EL TREN N° 3328 DE LAS 08:00 HS DESDE CONSTITUCIÓN HACIA EZEIZA REGISTRA DEMORAS DE 10 MINUTOS POR PROBLEMAS TÉCNICOS";

const MATRIX_CSV: &str = "Código,Forma Comunicacion\n\
1,PROBLEMAS CLIMÁTICOS\n\
3,PROBLEMAS TÉCNICOS\n\
5,PROBLEMAS OPERATIVOS\n\
17,OTRAS CONTINGENCIAS\n";

fn matrix() -> ContingencyMatrix {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("matriz.csv");
    std::fs::write(&path, MATRIX_CSV).unwrap();
    ContingencyMatrix::from_csv_path(&path).unwrap()
}

fn validate(content: &str, sent_at: &str) -> Report {
    let message = Message::new("100", "ana", "ROCA", content, sent_at);
    MessageValidator::default().validate(&message, &matrix(), &TechnicalVocabulary::empty())
}

#[test]
fn scenario_a_canonical_delay() {
    let report = validate(SCENARIO_A, "01/12/2024 08:05:00");
    let c = report.components();

    assert_eq!(report.message_type(), MessageType::TrainSpecific);
    assert_eq!(c.slots.identifier(), Some("3328"));
    assert_eq!(c.status_kind(), Some(StatusKind::Delay));
    assert_eq!(c.delay_minutes(), Some(10));
    assert_eq!(c.contingency_code(), Some("03"));
    assert_eq!(c.slots.scheduled_time(), Some("08:00"));
    let route = c.slots.route().unwrap();
    assert_eq!(route.origin, "CONSTITUCIÓN");
    assert_eq!(route.destination, "EZEIZA");
    assert!(c.structure_valid);
    assert!(matches!(
        report.overall_level(),
        OverallLevel::Completo | OverallLevel::Sugerencias
    ));
    assert!(!report.requires_notification());
}

#[test]
fn scenario_b_service_used_as_train() {
    let report = validate("EL SERVICIO 3328 CIRCULA REDUCIDO", "01/12/2024 08:05:00");
    let classification = report.classification();

    assert!(report.components().slots.used_service_as_train());
    assert!(classification
        .suggestions
        .iter()
        .any(|s| s.contains("Terminología incorrecta")));
    assert!(classification
        .important
        .contains(consistency::MISSING_STRUCTURAL_CODE));
    assert!(classification
        .important
        .contains("Falta motivo de la contingencia"));
    assert_eq!(report.overall_level(), OverallLevel::Importante);
    assert!(report.requires_notification());
}

#[test]
fn timing_boundary_on_time() {
    let report = validate(SCENARIO_A, "01/12/2024 08:11:00");
    let timing = report.timing().unwrap();
    assert_eq!(timing.reference_time, "08:10");
    assert_eq!(timing.deviation_minutes, 1.0);
    assert_eq!(timing.classification, Punctuality::Oportuno);
    assert_eq!(timing.level, TimingLevel::Aceptable);
}

#[test]
fn timing_boundary_critical() {
    let report = validate(SCENARIO_A, "01/12/2024 08:35:00");
    let timing = report.timing().unwrap();
    assert_eq!(timing.deviation_minutes, 25.0);
    assert_eq!(timing.classification, Punctuality::Critico);
    assert_eq!(timing.level, TimingLevel::Importante);
}

#[test]
fn validation_is_deterministic() {
    let first = validate(SCENARIO_A, "01/12/2024 08:11:00");
    let second = validate(SCENARIO_A, "01/12/2024 08:11:00");
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn restoration_beats_train_number() {
    for content in [
        "SE RESTABLECE EL SERVICIO DEL TREN N° 3328",
        "3.3.A EL TREN 3328 RESTABLECE SERVICIO DESDE TEMPERLEY",
    ] {
        let report = validate(content, "01/12/2024 08:05:00");
        assert_eq!(report.message_type(), MessageType::Resumption, "{content}");
    }
}

#[test]
fn code_17_without_contingency_is_consistent() {
    for raw in ["17.1.A", "17.2.B", "17.4.C"] {
        let code = parse_structural_code(raw).unwrap();
        for status in [StatusKind::Delay, StatusKind::Cancellation, StatusKind::Reduced] {
            let findings = consistency::check(Some(&code), None, Some(status));
            assert!(
                findings.iter().all(|f| !f.message.starts_with("Inconsistencia en código")),
                "{raw} {status}"
            );
        }
    }
}

#[test]
fn overall_level_tracks_buckets() {
    for content in [
        SCENARIO_A,
        "EL SERVICIO 3328 CIRCULA REDUCIDO",
        "17.2.A EL TREN N° 3328 DE LAS 08:00 HS DESDE TEMPERLEY HACIA HAEDO HA SIDO CANCELADO",
        "1.4.A LINEA ROCA-LA PLATA CIRCULA REDUCIDO POR PROBLEMAS CLIMÁTICOS",
        "BUENOS DIAS",
    ] {
        let report = validate(content, "01/12/2024 08:05:00");
        let c = report.classification();
        assert_eq!(
            report.overall_level() == OverallLevel::Importante,
            !c.important.is_empty()
        );
        assert_eq!(
            report.overall_level() == OverallLevel::Completo,
            c.important.is_empty() && c.observations.is_empty() && c.suggestions.is_empty()
        );

        for bucket in [&c.important, &c.observations, &c.suggestions] {
            let mut seen = std::collections::HashSet::new();
            assert!(bucket.iter().all(|f| seen.insert(f.clone())));
        }
    }
}

#[test]
fn empty_matrix_reports_missing_contingency() {
    let message = Message::new("1", "ana", "ROCA", SCENARIO_A, "01/12/2024 08:05:00");
    let report = MessageValidator::default().validate(
        &message,
        &ContingencyMatrix::empty(),
        &TechnicalVocabulary::empty(),
    );
    assert!(report.components().contingency.is_none());
    assert!(report
        .classification()
        .important
        .contains("Falta motivo de la contingencia"));
}

fn batch() -> Vec<Message> {
    (0..12)
        .map(|i| {
            let content = if i % 4 == 3 { String::new() } else { SCENARIO_A.to_string() };
            Message::new(i.to_string(), "ana", "ROCA", content, "01/12/2024 08:05:00")
        })
        .collect()
}

#[test]
fn batch_preserves_order_and_skips_malformed() {
    let reports =
        MessageValidator::default().validate_all(&batch(), &matrix(), &TechnicalVocabulary::empty());
    let ids: Vec<_> = reports.iter().map(|r| r.message().id.clone()).collect();
    assert_eq!(ids, vec!["0", "1", "2", "4", "5", "6", "8", "9", "10"]);
}

#[tokio::test]
async fn parallel_batch_preserves_order() {
    let reports = MessageValidator::default()
        .validate_all_parallel(
            batch(),
            Arc::new(matrix()),
            Arc::new(TechnicalVocabulary::empty()),
        )
        .await;
    let ids: Vec<_> = reports.iter().map(|r| r.message().id.clone()).collect();
    assert_eq!(ids, vec!["0", "1", "2", "4", "5", "6", "8", "9", "10"]);
}
