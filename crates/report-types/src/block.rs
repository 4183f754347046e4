use serde::{Deserialize, Serialize};

use crate::geometry::NormalizedBox;

/// Region kinds reported by the document-analysis service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlockType {
    Page,
    Line,
    Word,
    Table,
    Cell,
    MergedCell,
    KeyValueSet,
    SelectionElement,
    Title,
    Signature,
    Query,
    QueryResult,
    #[serde(other)]
    Other,
}

impl BlockType {
    /// Parse a block type filter as sent from the UI (`"LINE"`, `"word"`, ...)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "PAGE" => Some(BlockType::Page),
            "LINE" => Some(BlockType::Line),
            "WORD" => Some(BlockType::Word),
            "TABLE" => Some(BlockType::Table),
            "CELL" => Some(BlockType::Cell),
            "MERGED_CELL" => Some(BlockType::MergedCell),
            "KEY_VALUE_SET" => Some(BlockType::KeyValueSet),
            "SELECTION_ELEMENT" => Some(BlockType::SelectionElement),
            "TITLE" => Some(BlockType::Title),
            "SIGNATURE" => Some(BlockType::Signature),
            "QUERY" => Some(BlockType::Query),
            "QUERY_RESULT" => Some(BlockType::QueryResult),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Geometry {
    #[serde(rename = "BoundingBox")]
    pub bounding_box: NormalizedBox,
}

/// One OCR-detected region
///
/// Blocks are produced once per OCR run and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Block {
    pub id: String,
    /// 1-based page number
    #[serde(default = "first_page")]
    pub page: u32,
    pub block_type: BlockType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Geometry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

fn first_page() -> u32 {
    1
}

impl Block {
    pub fn new(id: impl Into<String>, page: u32, block_type: BlockType, bbox: NormalizedBox) -> Self {
        Self {
            id: id.into(),
            page,
            block_type,
            geometry: Some(Geometry { bounding_box: bbox }),
            text: None,
            confidence: None,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn bounding_box(&self) -> Option<&NormalizedBox> {
        self.geometry.as_ref().map(|g| &g.bounding_box)
    }
}
