//! Shared validation result type.
//!
//! Validators collect every finding instead of stopping at the first one, so
//! an import screen can show the whole list at once.

use std::fmt;

use serde::Serialize;

/// A validation finding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationError {
    pub category: &'static str,
    pub severity: Severity,
    pub message: String,
}

/// Finding severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    Error,
    Warning,
}

impl ValidationError {
    pub fn error(category: &'static str, message: impl Into<String>) -> Self {
        Self {
            category,
            severity: Severity::Error,
            message: message.into(),
        }
    }

    pub fn warning(category: &'static str, message: impl Into<String>) -> Self {
        Self {
            category,
            severity: Severity::Warning,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "[{level}] {}: {}", self.category, self.message)
    }
}

/// True if any finding is an error (warnings alone don't block).
pub fn has_errors(findings: &[ValidationError]) -> bool {
    findings.iter().any(|f| f.severity == Severity::Error)
}
