//! Session state container
//!
//! [`ReportSession`] owns everything one editing session needs and is only
//! mutated through [`ReportSession::dispatch`]. An action that fails leaves
//! the session as it was.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use report_types::{Block, BlockType, PageSize, PixelRect, ReplaceTextRequest, ReplacementInstruction};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::assembler::{self, ReportContext};
use crate::bindings::BindingStore;
use crate::error::{ReportError, Result};
use crate::geometry::to_pixel_rect;
use crate::ocr::BlockIndex;
use crate::propagation::{Completion, FormatTicket, PropagationEngine};
use crate::registry::{affects_display, Section, VariableRegistry};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SessionAction {
    LoadBlocks { blocks: Vec<Block> },
    AddVariable { section: Section },
    RemoveVariable { id: String },
    ReorderVariables { section: Section, from: usize, to: usize },
    UpdateField { id: String, field: String, value: Value },
    Bind { variable: String, block: String },
    Unbind { variable: String, block: String },
    SetPageSize { width: f64, height: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SessionEvent {
    BlocksLoaded {
        count: usize,
    },
    VariableAdded {
        id: String,
    },
    VariableRemoved {
        id: String,
        blocks: Vec<String>,
    },
    VariablesReordered,
    FieldUpdated {
        id: String,
        display: Option<String>,
    },
    Bound {
        variable: String,
        block: String,
        changed: bool,
        /// Other variables that also claim the block
        collisions: Vec<String>,
    },
    Unbound {
        variable: String,
        block: String,
        changed: bool,
    },
    PageSizeSet,
}

/// What the overlay needs to draw one block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayBox {
    pub block_id: String,
    pub block_type: BlockType,
    pub rect: PixelRect,
    pub text: Option<String>,
    /// Variables bound to this block
    pub bound_to: Vec<String>,
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ReportSession {
    blocks: BlockIndex,
    registry: VariableRegistry,
    bindings: BindingStore,
    engine: PropagationEngine,
    page_size: PageSize,
}

impl ReportSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dispatch(&mut self, action: SessionAction) -> Result<SessionEvent> {
        match action {
            SessionAction::LoadBlocks { blocks } => {
                let count = blocks.len();
                self.blocks = BlockIndex::new(blocks);
                debug!(count, "blocks loaded");
                Ok(SessionEvent::BlocksLoaded { count })
            }
            SessionAction::AddVariable { section } => {
                let id = self.registry.add_variable(section);
                self.engine
                    .on_variable_changed(&self.registry, &self.bindings, &id)?;
                Ok(SessionEvent::VariableAdded { id })
            }
            SessionAction::RemoveVariable { id } => {
                if self.registry.remove_variable(&id).is_none() {
                    return Err(ReportError::UnknownVariable(id));
                }
                let blocks = self.bindings.unbind_all(&id);
                self.engine.on_variable_removed(&id, &blocks);
                for block in &blocks {
                    self.reproject(block);
                }
                Ok(SessionEvent::VariableRemoved { id, blocks })
            }
            SessionAction::ReorderVariables { section, from, to } => {
                self.registry.reorder(section, from, to)?;
                Ok(SessionEvent::VariablesReordered)
            }
            SessionAction::UpdateField { id, field, value } => {
                self.registry.update_field(&id, &field, value)?;
                let display = if affects_display(&field) {
                    Some(
                        self.engine
                            .on_variable_changed(&self.registry, &self.bindings, &id)?,
                    )
                } else {
                    None
                };
                Ok(SessionEvent::FieldUpdated { id, display })
            }
            SessionAction::Bind { variable, block } => {
                if !self.registry.contains(&variable) {
                    return Err(ReportError::UnknownVariable(variable));
                }
                let changed = self.bindings.bind(&variable, &block);
                if !self.engine.on_binding_added(&variable, &block) {
                    self.engine
                        .on_variable_changed(&self.registry, &self.bindings, &variable)?;
                }
                let collisions: Vec<String> = self
                    .bindings
                    .owners_of(&block)
                    .into_iter()
                    .filter(|owner| *owner != variable)
                    .map(String::from)
                    .collect();
                if !collisions.is_empty() {
                    warn!(block = %block, ?collisions, "block bound to more than one variable");
                }
                Ok(SessionEvent::Bound {
                    variable,
                    block,
                    changed,
                    collisions,
                })
            }
            SessionAction::Unbind { variable, block } => {
                let changed = self.bindings.unbind(&variable, &block);
                if changed {
                    self.engine.on_binding_removed(&block);
                    self.reproject(&block);
                }
                Ok(SessionEvent::Unbound {
                    variable,
                    block,
                    changed,
                })
            }
            SessionAction::SetPageSize { width, height } => {
                for (field, v) in [("width", width), ("height", height)] {
                    if !v.is_finite() || v <= 0.0 {
                        return Err(ReportError::InvalidField {
                            field: field.to_string(),
                            reason: format!("page {} must be positive, got {}", field, v),
                        });
                    }
                }
                self.page_size = PageSize::new(width, height);
                Ok(SessionEvent::PageSizeSet)
            }
        }
    }

    /// Give a block the value of a remaining owner after its binding was dropped
    fn reproject(&mut self, block: &str) {
        let owner = self.bindings.owners_of(block).first().map(|o| o.to_string());
        if let Some(owner) = owner {
            self.engine.on_binding_added(&owner, block);
        }
    }

    pub fn begin_remote_format(&mut self, variable_id: &str) -> Result<FormatTicket> {
        self.engine
            .begin_remote_format(&self.registry, &self.bindings, variable_id)
    }

    pub fn complete_remote_format(
        &mut self,
        ticket: &FormatTicket,
        outcome: std::result::Result<String, String>,
    ) -> Completion {
        self.engine
            .complete_remote_format(&self.registry, &self.bindings, ticket, outcome)
    }

    pub fn build_replacements(&self) -> Result<Vec<ReplacementInstruction>> {
        assembler::build_replacements(&self.blocks, self.engine.block_values(), self.page_size)
    }

    pub fn build_request(
        &self,
        context: &ReportContext,
        at: DateTime<Utc>,
    ) -> Result<ReplaceTextRequest> {
        assembler::build_request(
            &self.blocks,
            self.engine.block_values(),
            self.page_size,
            context,
            at,
        )
    }

    /// Pixel boxes for every block on a 1-based page
    pub fn overlay(
        &self,
        page: u32,
        width_px: f64,
        height_px: f64,
        filter: Option<BlockType>,
    ) -> Vec<OverlayBox> {
        let mut owners: BTreeMap<&str, Vec<String>> = BTreeMap::new();
        for (variable, blocks) in self.bindings.iter() {
            for block in blocks {
                owners
                    .entry(block.as_str())
                    .or_default()
                    .push(variable.to_string());
            }
        }

        self.blocks
            .blocks_on_page(page, filter)
            .into_iter()
            .filter_map(|block| {
                let bbox = block.bounding_box()?;
                Some(OverlayBox {
                    block_id: block.id.clone(),
                    block_type: block.block_type,
                    rect: to_pixel_rect(bbox, width_px, height_px),
                    text: block.text.clone(),
                    bound_to: owners.get(block.id.as_str()).cloned().unwrap_or_default(),
                    value: self.engine.block_value(&block.id).map(String::from),
                })
            })
            .collect()
    }

    pub fn blocks(&self) -> &BlockIndex {
        &self.blocks
    }

    pub fn registry(&self) -> &VariableRegistry {
        &self.registry
    }

    pub fn bindings(&self) -> &BindingStore {
        &self.bindings
    }

    pub fn engine(&self) -> &PropagationEngine {
        &self.engine
    }

    pub fn page_size(&self) -> PageSize {
        self.page_size
    }
}
