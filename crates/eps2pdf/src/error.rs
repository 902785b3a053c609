use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Errors that can occur while converting or archiving a single document.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("source not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("conversion error: {0}")]
    Conversion(String),

    #[error("archive error: {0}")]
    Archive(String),

    #[error("verification error: {0}")]
    Verification(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConvertError {
    /// Classify the error for the per-item report.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::SourceNotFound(_) => FailureKind::SourceNotFound,
            Self::UnsupportedFormat(_) | Self::Conversion(_) | Self::Verification(_) => {
                FailureKind::Conversion
            }
            Self::Archive(_) => FailureKind::Archive,
            Self::Io(_) => FailureKind::Io,
        }
    }
}

/// Why an item was counted as failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    SourceNotFound,
    Conversion,
    Archive,
    Io,
}

/// A non-fatal warning emitted when an option or step could not be honored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConvertWarning {
    /// The option or step the warning is about.
    pub element: String,
    /// Reason it was not honored.
    pub reason: String,
}

impl ConvertWarning {
    pub fn new(element: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            element: element.into(),
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for ConvertWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.element, self.reason)
    }
}
