//! PDF text replacement
//!
//! Applies positioned replacement instructions to one page of a PDF using
//! lopdf. Each instruction covers its box with white and writes the new text
//! in Helvetica.

pub mod error;
pub mod replace;

pub use error::PdfReplaceError;
pub use replace::{font_size_for, page_count, page_size, replace_text};
