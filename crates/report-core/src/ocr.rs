//! OCR result ingestion and job polling state

use std::collections::HashMap;

use report_types::{Block, BlockType, GetResultsResponse, JobStatus};
use tracing::{debug, info};

use crate::error::{ReportError, Result};

pub const DEFAULT_POLL_INTERVAL_MS: u32 = 5_000;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 60;

/// Read-only lookup over the blocks of one OCR run
#[derive(Debug, Clone, Default)]
pub struct BlockIndex {
    blocks: Vec<Block>,
    by_id: HashMap<String, usize>,
}

impl BlockIndex {
    pub fn new(blocks: Vec<Block>) -> Self {
        let by_id = blocks
            .iter()
            .enumerate()
            .map(|(i, block)| (block.id.clone(), i))
            .collect();
        Self { blocks, by_id }
    }

    pub fn get(&self, id: &str) -> Option<&Block> {
        self.by_id.get(id).and_then(|&i| self.blocks.get(i))
    }

    /// Blocks on a 1-based page, optionally restricted to one type
    pub fn blocks_on_page(&self, page: u32, filter: Option<BlockType>) -> Vec<&Block> {
        self.blocks
            .iter()
            .filter(|b| b.page == page)
            .filter(|b| filter.map_or(true, |t| b.block_type == t))
            .collect()
    }

    /// Smallest block on `page` containing the normalized point `(x, y)`
    pub fn block_at(&self, page: u32, x: f64, y: f64, filter: Option<BlockType>) -> Option<&Block> {
        self.blocks_on_page(page, filter)
            .into_iter()
            .filter_map(|b| b.bounding_box().map(|bbox| (b, bbox)))
            .filter(|(_, bbox)| bbox.contains(x, y))
            .min_by(|(_, a), (_, b)| a.area().total_cmp(&b.area()))
            .map(|(block, _)| block)
    }

    pub fn page_count(&self) -> u32 {
        self.blocks.iter().map(|b| b.page).max().unwrap_or(0)
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Outcome of feeding one poll response to [`OcrPoll::observe`]
#[derive(Debug, Clone)]
pub enum PollStep {
    /// Job still running; wait the poll interval and ask again
    Pending,
    /// Job finished; fetch the next page of results with this token
    FetchMore(String),
    Complete(BlockIndex),
}

/// Attempt budget and accumulated results for one analysis job
#[derive(Debug, Clone)]
pub struct OcrPoll {
    pub interval_ms: u32,
    pub max_attempts: u32,
    attempts: u32,
    blocks: Vec<Block>,
}

impl Default for OcrPoll {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL_MS, DEFAULT_MAX_ATTEMPTS)
    }
}

impl OcrPoll {
    pub fn new(interval_ms: u32, max_attempts: u32) -> Self {
        Self {
            interval_ms,
            max_attempts,
            attempts: 0,
            blocks: Vec::new(),
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Consume one poll response
    ///
    /// In-progress responses count against the attempt budget; pages of a
    /// finished job do not.
    pub fn observe(&mut self, response: GetResultsResponse) -> Result<PollStep> {
        match response.job_status {
            JobStatus::Failed => {
                let message = response
                    .status_message
                    .or(response.error)
                    .unwrap_or_else(|| "unknown error".to_string());
                Err(ReportError::OcrJobFailed(message))
            }
            JobStatus::InProgress => {
                self.attempts += 1;
                if self.attempts >= self.max_attempts {
                    return Err(ReportError::OcrTimeout(self.attempts));
                }
                debug!(attempt = self.attempts, "OCR job still running");
                Ok(PollStep::Pending)
            }
            JobStatus::Succeeded | JobStatus::PartialSuccess => {
                self.blocks.extend(response.blocks);
                match response.next_token {
                    Some(token) if !token.is_empty() => Ok(PollStep::FetchMore(token)),
                    _ => {
                        let blocks = std::mem::take(&mut self.blocks);
                        info!(blocks = blocks.len(), "OCR job complete");
                        Ok(PollStep::Complete(BlockIndex::new(blocks)))
                    }
                }
            }
        }
    }
}
