//! Message validator: runs every stage for one message and assembles the report.
//!
//! Flow per message:
//! 1. Extraction (type detection, components A–F, spelling)
//! 2. Timing analysis
//! 3. Classification and scoring
//! 4. Report assembly

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, error, info};

use crate::catalog::{ContingencyMatrix, TechnicalVocabulary};
use crate::error::ValidationError;
use crate::pipeline::extractor::ComponentExtractor;
use crate::pipeline::report::Report;
use crate::pipeline::spelling::FormatAuditor;
use crate::pipeline::types::Message;
use crate::pipeline::{scoring, timing};

/// Stateless validator. Cheap to clone; clones share the spell checker.
#[derive(Debug, Clone, Default)]
pub struct MessageValidator {
    extractor: ComponentExtractor,
}

impl MessageValidator {
    pub fn new(auditor: FormatAuditor) -> Self {
        Self {
            extractor: ComponentExtractor::new(auditor),
        }
    }

    /// Validate a single message. Pure: identical inputs give identical reports.
    pub fn validate(
        &self,
        message: &Message,
        matrix: &ContingencyMatrix,
        vocabulary: &TechnicalVocabulary,
    ) -> Report {
        let components = self.extractor.extract(message, matrix, vocabulary);
        let timing = timing::analyze(message, &components);
        let classification = scoring::classify(message, &components, timing.as_ref());
        let scores = scoring::score(message, &components, timing.as_ref());

        debug!(
            id = %message.id,
            message_type = %components.message_type(),
            level = %classification.overall_level,
            "Message validated"
        );

        Report::builder(message.clone(), components)
            .timing(timing)
            .build(classification, scores)
    }

    /// Like [`validate`](Self::validate), but rejects messages with no id or content.
    pub fn try_validate(
        &self,
        message: &Message,
        matrix: &ContingencyMatrix,
        vocabulary: &TechnicalVocabulary,
    ) -> Result<Report, ValidationError> {
        message.check_well_formed()?;
        Ok(self.validate(message, matrix, vocabulary))
    }

    /// Validate a batch in input order.
    ///
    /// A message that is malformed, or whose validation panics, is logged and
    /// left out of the result; the batch always completes.
    pub fn validate_all(
        &self,
        messages: &[Message],
        matrix: &ContingencyMatrix,
        vocabulary: &TechnicalVocabulary,
    ) -> Vec<Report> {
        let count = messages.len();
        info!(count, "Validating message batch");

        let mut reports = Vec::with_capacity(count);
        for (index, message) in messages.iter().enumerate() {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                self.try_validate(message, matrix, vocabulary)
            }))
            .unwrap_or_else(|payload| {
                Err(ValidationError::TaskFailed {
                    index,
                    reason: panic_reason(payload.as_ref()),
                })
            });

            match outcome {
                Ok(report) => reports.push(report),
                Err(e) => error!(id = %message.id, error = %e, "Skipping message in batch"),
            }
        }

        info!(validated = reports.len(), total = count, "Batch validation complete");
        reports
    }

    /// Validate a batch on the blocking pool, one task per message.
    ///
    /// Results are joined in input order regardless of completion order.
    pub async fn validate_all_parallel(
        &self,
        messages: Vec<Message>,
        matrix: Arc<ContingencyMatrix>,
        vocabulary: Arc<TechnicalVocabulary>,
    ) -> Vec<Report> {
        let count = messages.len();
        info!(count, "Validating message batch in parallel");

        let tasks: Vec<_> = messages
            .into_iter()
            .map(|message| {
                let validator = self.clone();
                let matrix = Arc::clone(&matrix);
                let vocabulary = Arc::clone(&vocabulary);
                tokio::task::spawn_blocking(move || {
                    validator.try_validate(&message, &matrix, &vocabulary)
                })
            })
            .collect();

        let mut reports = Vec::with_capacity(count);
        for (index, joined) in join_all(tasks).await.into_iter().enumerate() {
            let outcome = joined.unwrap_or_else(|e| {
                Err(ValidationError::TaskFailed {
                    index,
                    reason: e.to_string(),
                })
            });
            match outcome {
                Ok(report) => reports.push(report),
                Err(e) => error!(index, error = %e, "Skipping message in batch"),
            }
        }

        info!(validated = reports.len(), total = count, "Parallel batch validation complete");
        reports
    }
}

fn panic_reason(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "panic".to_string())
}
