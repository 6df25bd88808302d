//! Cross-checks the structural code against what the text actually says.

use serde::Serialize;

use crate::catalog::StatusKind;
use crate::catalog::contingency::CODE_OTHER;
use crate::pipeline::types::StructuralCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Critical,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConsistencyFinding {
    pub severity: Severity,
    pub message: String,
}

impl ConsistencyFinding {
    fn critical(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Critical,
            message: message.into(),
        }
    }

    fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    pub fn is_critical(&self) -> bool {
        self.severity == Severity::Critical
    }
}

pub const MISSING_STRUCTURAL_CODE: &str = "Falta código de estructura (ej: 3.1.A)";

/// Compare the structural code with the detected contingency code and status.
///
/// Code 17 without a detected contingency is accepted as is: it covers
/// composite stations and other cases with no single cause.
pub fn check(
    structural_code: Option<&StructuralCode>,
    contingency_code: Option<&str>,
    status: Option<StatusKind>,
) -> Vec<ConsistencyFinding> {
    let Some(code) = structural_code else {
        return vec![ConsistencyFinding::critical(MISSING_STRUCTURAL_CODE)];
    };

    let mut findings = Vec::new();

    let other_without_cause = code.contingency_digits == CODE_OTHER && contingency_code.is_none();
    if !other_without_cause {
        if let Some(detected) = contingency_code {
            if detected != code.contingency_digits {
                findings.push(ConsistencyFinding::warning(format!(
                    "Inconsistencia en código: Usaste {} pero la contingencia corresponde al código {}",
                    code.contingency_digits, detected
                )));
            }
        }
    }

    let expected = StatusKind::from_catalog_code(&code.status_digit);
    if let (Some(expected), Some(detected)) = (expected, status) {
        if !expected.equivalent_to(detected) {
            findings.push(ConsistencyFinding::warning(format!(
                "Inconsistencia en estado: Código indica {expected} pero el mensaje describe {detected}"
            )));
        }
    }

    findings
}
