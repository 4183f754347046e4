//! Shared data model for the report template workspace
//!
//! Types in this crate cross crate and process boundaries: OCR blocks as
//! returned by the document-analysis service, normalized and absolute
//! rectangles, and the request/response bodies of the formatting and
//! text-replacement services.

pub mod block;
pub mod format;
pub mod geometry;
pub mod ocr;
pub mod replace;

pub use block::{Block, BlockType, Geometry};
pub use format::{FormatResponse, NumberInput, RoundingRequest, SigFigsRequest};
pub use geometry::{DocumentRect, NormalizedBox, PageSize, PixelRect};
pub use ocr::{
    DocumentMetadata, GetResultsRequest, GetResultsResponse, JobStatus, StartAnalysisRequest,
    StartAnalysisResponse,
};
pub use replace::{ReplaceTextRequest, ReplaceTextResponse, ReplacementInstruction};
