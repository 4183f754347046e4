use thiserror::Error;

/// Broad category of a failure, used to decide how it is surfaced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or malformed user input; reported inline, state untouched
    Validation,
    /// Formatting service failure; recovered by falling back to the raw value
    Formatting,
    /// OCR job failure or timeout; fatal to the current operation
    Ocr,
    /// Report generation could not produce a request
    Replacement,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReportError {
    #[error("Unknown variable: {0}")]
    UnknownVariable(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidField { field: String, reason: String },

    #[error("Index {index} out of range for section of {len} variables")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Please select a template first")]
    MissingTemplate,

    #[error("No authentication token found")]
    MissingAuthToken,

    #[error("Storage bucket not configured")]
    MissingBucket,

    #[error("No text replacements to apply. Please bind variables to bounding boxes first.")]
    NothingToReplace,

    #[error("OCR job failed: {0}")]
    OcrJobFailed(String),

    #[error("OCR job did not finish after {0} attempts")]
    OcrTimeout(u32),

    #[error("Formatting service error: {0}")]
    FormattingService(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl ReportError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReportError::UnknownVariable(_)
            | ReportError::InvalidField { .. }
            | ReportError::IndexOutOfRange { .. }
            | ReportError::MissingTemplate
            | ReportError::Serialization(_) => ErrorKind::Validation,
            ReportError::FormattingService(_) => ErrorKind::Formatting,
            ReportError::OcrJobFailed(_) | ReportError::OcrTimeout(_) => ErrorKind::Ocr,
            ReportError::MissingAuthToken
            | ReportError::MissingBucket
            | ReportError::NothingToReplace => ErrorKind::Replacement,
        }
    }

    pub(crate) fn invalid_field(field: &str, reason: impl Into<String>) -> Self {
        ReportError::InvalidField {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for ReportError {
    fn from(err: serde_json::Error) -> Self {
        ReportError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
