use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use notice_audit::catalog::{ContingencyMatrix, TechnicalVocabulary};
use notice_audit::config::AuditConfig;
use notice_audit::pipeline::{FormatAuditor, MessageValidator, Report};
use notice_audit::source::{JsonFileSource, MessageSource};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AuditConfig::from_env().context("reading audit configuration")?;
    info!(
        messages = %config.messages_path.display(),
        line = %config.line,
        parallel = config.parallel,
        "Notice audit v{}",
        env!("CARGO_PKG_VERSION")
    );

    // ── Reference tables ────────────────────────────────────────────────
    let matrix = Arc::new(
        config
            .matrix_path
            .as_deref()
            .map(ContingencyMatrix::load_or_empty)
            .unwrap_or_default(),
    );
    let vocabulary = Arc::new(TechnicalVocabulary::load_for_line(
        &config.config_dir,
        &config.line,
    ));
    let auditor = FormatAuditor::from_dictionary_path(config.dictionary_path.as_deref());
    info!(
        contingencies = matrix.len(),
        technical_words = vocabulary.len(),
        spell_checker = auditor.checker_name(),
        "Reference tables loaded"
    );

    // ── Validation ──────────────────────────────────────────────────────
    let source = JsonFileSource::new(&config.messages_path);
    let messages = source
        .fetch()
        .await
        .with_context(|| format!("fetching messages from {}", source.name()))?;

    let validator = MessageValidator::new(auditor);
    let reports = if config.parallel {
        validator
            .validate_all_parallel(messages, Arc::clone(&matrix), Arc::clone(&vocabulary))
            .await
    } else {
        validator.validate_all(&messages, &matrix, &vocabulary)
    };

    // ── Output ──────────────────────────────────────────────────────────
    let json = serde_json::to_string_pretty(&reports).context("serializing reports")?;
    match &config.output_path {
        Some(path) => {
            tokio::fs::write(path, json)
                .await
                .with_context(|| format!("writing reports to {}", path.display()))?;
            info!(path = %path.display(), "Reports written");
        }
        None => println!("{json}"),
    }

    log_summary(&reports);
    Ok(())
}

fn log_summary(reports: &[Report]) {
    let mut by_level: BTreeMap<&'static str, usize> = BTreeMap::new();
    for report in reports {
        *by_level.entry(report.overall_level().label()).or_default() += 1;
    }
    let needs_review = reports.iter().filter(|r| r.requires_notification()).count();

    info!(
        total = reports.len(),
        needs_review,
        ?by_level,
        "Audit complete"
    );
}
