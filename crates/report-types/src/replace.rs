//! Wire types for the PDF text-replacement service

use serde::{Deserialize, Serialize};

use crate::geometry::DocumentRect;

/// Positioned text destined for one rectangle of a PDF page
///
/// Coordinates are document points with a top-left origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplacementInstruction {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub text: String,
}

impl ReplacementInstruction {
    pub fn new(rect: DocumentRect, text: impl Into<String>) -> Self {
        Self {
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            text: text.into(),
        }
    }

    pub fn rect(&self) -> DocumentRect {
        DocumentRect {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
        }
    }
}

/// `POST /api/pdf/replace-text`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplaceTextRequest {
    /// Object key of the template PDF in `source_bucket`
    pub template_id: String,
    pub replacements: Vec<ReplacementInstruction>,
    /// 0-based page index
    #[serde(default)]
    pub page_number: u32,
    pub source_bucket: String,
    pub destination_bucket: String,
    pub output_key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplaceTextResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replacements_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
