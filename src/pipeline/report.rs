//! The final, immutable validation report.

use serde::Serialize;

use crate::pipeline::types::{
    ClassificationResult, ExtractedComponents, Message, MessageType, OverallLevel, ScoreSet,
    TimingResult,
};

/// Everything the audit workflow needs about one message.
///
/// Fields are private; a report cannot be altered once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    message: Message,
    message_type: MessageType,
    components: ExtractedComponents,
    classification: ClassificationResult,
    overall_level: OverallLevel,
    timing: Option<TimingResult>,
    scores: ScoreSet,
    requires_notification: bool,
}

impl Report {
    pub fn builder(message: Message, components: ExtractedComponents) -> ReportBuilder {
        ReportBuilder::new(message, components)
    }

    pub fn message(&self) -> &Message {
        &self.message
    }

    pub fn message_type(&self) -> MessageType {
        self.message_type
    }

    pub fn components(&self) -> &ExtractedComponents {
        &self.components
    }

    pub fn classification(&self) -> &ClassificationResult {
        &self.classification
    }

    pub fn overall_level(&self) -> OverallLevel {
        self.overall_level
    }

    pub fn timing(&self) -> Option<&TimingResult> {
        self.timing.as_ref()
    }

    pub fn scores(&self) -> &ScoreSet {
        &self.scores
    }

    /// The only signal the audit workflow reads to decide on human review.
    pub fn requires_notification(&self) -> bool {
        self.requires_notification
    }
}

/// Assembles a [`Report`] from the outputs of the pipeline stages.
#[derive(Debug)]
pub struct ReportBuilder {
    message: Message,
    components: ExtractedComponents,
    timing: Option<TimingResult>,
}

impl ReportBuilder {
    pub fn new(message: Message, components: ExtractedComponents) -> Self {
        Self {
            message,
            components,
            timing: None,
        }
    }

    pub fn timing(mut self, timing: Option<TimingResult>) -> Self {
        self.timing = timing;
        self
    }

    /// Finish the report. Overall level and notification flag are derived
    /// from `classification`, never set independently.
    pub fn build(self, classification: ClassificationResult, scores: ScoreSet) -> Report {
        let overall_level = classification.overall_level;
        Report {
            message_type: self.components.message_type(),
            message: self.message,
            components: self.components,
            overall_level,
            requires_notification: overall_level.requires_notification(),
            classification,
            timing: self.timing,
            scores,
        }
    }
}
