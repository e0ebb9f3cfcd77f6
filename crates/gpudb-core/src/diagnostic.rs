//! Diagnostic codes for non-fatal dialect findings
//!
//! Diagnostic codes are stable identifiers. Add new codes, never rename.

use serde::{Deserialize, Serialize};

/// Diagnostic code registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosticCode {
    // Reflection
    /// The driver reported a column type the mapper does not know
    UnrecognizedColumnType,

    /// A column was left out of the reflected table
    ColumnDropped,

    // Compilation
    /// A query was rewritten to emulate LIMIT/OFFSET
    PaginationRewritten,
}

impl DiagnosticCode {
    /// Get the diagnostic code as a stable string identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnrecognizedColumnType => "UNRECOGNIZED_COLUMN_TYPE",
            Self::ColumnDropped => "COLUMN_DROPPED",
            Self::PaginationRewritten => "PAGINATION_REWRITTEN",
        }
    }
}

impl std::fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warn,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
        }
    }
}

/// A diagnostic message with structured metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Stable diagnostic code
    pub code: DiagnosticCode,

    /// Severity level
    pub severity: Severity,

    /// Human-readable message
    pub message: String,

    /// Column the diagnostic refers to, if any
    pub column: Option<String>,
}

impl Diagnostic {
    /// Create a new diagnostic with minimal fields
    pub fn new(code: DiagnosticCode, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            code,
            severity,
            message: message.into(),
            column: None,
        }
    }

    /// Attach the column name
    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}]: {}", self.severity, self.code, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_code_stability() {
        assert_eq!(DiagnosticCode::UnrecognizedColumnType.as_str(), "UNRECOGNIZED_COLUMN_TYPE");
        assert_eq!(DiagnosticCode::PaginationRewritten.to_string(), "PAGINATION_REWRITTEN");
    }

    #[test]
    fn diagnostic_serialization() {
        let diag = Diagnostic::new(
            DiagnosticCode::UnrecognizedColumnType,
            Severity::Warn,
            "Did not recognize type 'FOOBAR'",
        )
        .with_column("payload");

        let json = serde_json::to_string(&diag).unwrap();
        assert!(json.contains("UNRECOGNIZED_COLUMN_TYPE"));
        assert!(json.contains("\"warn\""));
        assert!(json.contains("payload"));
    }

    #[test]
    fn diagnostic_display() {
        let diag = Diagnostic::new(DiagnosticCode::ColumnDropped, Severity::Info, "dropped 'x'");
        assert_eq!(diag.to_string(), "info [COLUMN_DROPPED]: dropped 'x'");
    }
}
