use thiserror::Error;

#[derive(Error, Debug)]
pub enum PdfReplaceError {
    #[error("Failed to parse PDF: {0}")]
    ParseError(String),

    #[error("Page number {page} out of range. PDF has {count} pages.")]
    PageOutOfRange { page: u32, count: u32 },

    #[error("Page has no usable MediaBox")]
    MissingMediaBox,

    #[error("PDF operation failed: {0}")]
    OperationError(String),
}

impl From<lopdf::Error> for PdfReplaceError {
    fn from(err: lopdf::Error) -> Self {
        PdfReplaceError::OperationError(err.to_string())
    }
}
