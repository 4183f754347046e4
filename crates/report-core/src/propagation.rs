//! Display-string propagation from variables to their bound blocks
//!
//! The engine caches each variable's display string and projects it onto
//! every bound block. Both maps are written in the same `&mut self` call, so
//! a reader never sees a variable updated without its blocks.
//!
//! Remote formatting is split into [`PropagationEngine::begin_remote_format`]
//! and [`PropagationEngine::complete_remote_format`]. Every begin (and every
//! local recompute) bumps a per-variable sequence number; a completion
//! carrying an older number is discarded.

use std::collections::{BTreeMap, HashMap};

use report_types::{NumberInput, RoundingRequest, SigFigsRequest};
use serde_json::Value;
use tracing::{debug, warn};

use crate::bindings::BindingStore;
use crate::error::{ReportError, Result};
use crate::format::{self, RoundingMode};
use crate::registry::VariableRegistry;

/// A call to the number-formatting service
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteFormat {
    SigFigs(SigFigsRequest),
    Rounding(RoundingRequest),
}

impl RemoteFormat {
    pub fn path(&self) -> &'static str {
        match self {
            RemoteFormat::SigFigs(_) => "/api/format/sig-figs",
            RemoteFormat::Rounding(_) => "/api/format/rounding",
        }
    }

    pub fn body(&self) -> Result<Value> {
        let body = match self {
            RemoteFormat::SigFigs(req) => serde_json::to_value(req)?,
            RemoteFormat::Rounding(req) => serde_json::to_value(req)?,
        };
        Ok(body)
    }
}

/// Handle for one in-flight formatting request
#[derive(Debug, Clone, PartialEq)]
pub struct FormatTicket {
    pub variable_id: String,
    pub sequence: u64,
    /// `None` when the value was propagated locally and no call is needed
    pub request: Option<RemoteFormat>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Applied(String),
    /// A newer request was issued or the variable no longer exists
    Stale,
}

#[derive(Debug, Clone, Default)]
pub struct PropagationEngine {
    variable_values: BTreeMap<String, String>,
    block_values: BTreeMap<String, String>,
    sequences: HashMap<String, u64>,
}

impl PropagationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute a variable's display string locally and fan it out
    pub fn on_variable_changed(
        &mut self,
        registry: &VariableRegistry,
        bindings: &BindingStore,
        variable_id: &str,
    ) -> Result<String> {
        let variable = registry
            .get(variable_id)
            .ok_or_else(|| ReportError::UnknownVariable(variable_id.to_string()))?;
        let display = format::display_value(variable.raw_value(), &variable.display_options());
        self.next_sequence(variable_id);
        self.apply(bindings, variable_id, display.clone());
        Ok(display)
    }

    /// Start formatting a variable through the formatting service
    ///
    /// When the value needs no service call it is propagated immediately and
    /// the returned ticket has no request. The previous display string stays
    /// in place until the ticket is completed.
    pub fn begin_remote_format(
        &mut self,
        registry: &VariableRegistry,
        bindings: &BindingStore,
        variable_id: &str,
    ) -> Result<FormatTicket> {
        let variable = registry
            .get(variable_id)
            .ok_or_else(|| ReportError::UnknownVariable(variable_id.to_string()))?;
        let raw = variable.raw_value();
        let options = variable.display_options();

        let request = if options.numeric && format::is_numeric(raw) {
            let value = Some(NumberInput::from(raw.trim()));
            match options.format.rounding_mode {
                RoundingMode::Sigfigs => match options.format.sig_figs {
                    Some(n) if n >= 1 => Some(RemoteFormat::SigFigs(SigFigsRequest {
                        value,
                        sig_figs: Some(n),
                    })),
                    _ => None,
                },
                RoundingMode::Standard => match options.format.decimal_places {
                    Some(k) if k >= 0 => Some(RemoteFormat::Rounding(RoundingRequest {
                        value,
                        decimal_places: Some(k),
                    })),
                    _ => None,
                },
                RoundingMode::None => None,
            }
        } else {
            None
        };

        let sequence = self.next_sequence(variable_id);
        if request.is_none() {
            let display = format::display_value(raw, &options);
            self.apply(bindings, variable_id, display);
        }

        Ok(FormatTicket {
            variable_id: variable_id.to_string(),
            sequence,
            request,
        })
    }

    /// Apply the outcome of a formatting request
    ///
    /// `Err` carries the failure message; the raw value is shown instead.
    pub fn complete_remote_format(
        &mut self,
        registry: &VariableRegistry,
        bindings: &BindingStore,
        ticket: &FormatTicket,
        outcome: std::result::Result<String, String>,
    ) -> Completion {
        if self.sequences.get(&ticket.variable_id) != Some(&ticket.sequence) {
            debug!(variable = %ticket.variable_id, sequence = ticket.sequence, "discarding stale format response");
            return Completion::Stale;
        }
        let Some(variable) = registry.get(&ticket.variable_id) else {
            return Completion::Stale;
        };

        let options = variable.display_options();
        let formatted = match outcome {
            Ok(formatted) => formatted,
            Err(message) => {
                warn!(variable = %ticket.variable_id, error = %message, "formatting service failed, using raw value");
                variable.raw_value().to_string()
            }
        };
        let display = format::apply_inequality(&formatted, options.allow_inequalities, options.operator);
        self.apply(bindings, &ticket.variable_id, display.clone());
        Completion::Applied(display)
    }

    /// Project the variable's current display string onto a newly bound block
    ///
    /// Returns `false` when the variable has no display string yet.
    pub fn on_binding_added(&mut self, variable_id: &str, block_id: &str) -> bool {
        match self.variable_values.get(variable_id) {
            Some(display) => {
                self.block_values.insert(block_id.to_string(), display.clone());
                true
            }
            None => false,
        }
    }

    pub fn on_binding_removed(&mut self, block_id: &str) {
        self.block_values.remove(block_id);
    }

    /// Forget a deleted variable and invalidate its in-flight requests
    pub fn on_variable_removed(&mut self, variable_id: &str, blocks: &[String]) {
        self.variable_values.remove(variable_id);
        self.sequences.remove(variable_id);
        for block in blocks {
            self.block_values.remove(block);
        }
    }

    pub fn display_value(&self, variable_id: &str) -> Option<&str> {
        self.variable_values.get(variable_id).map(String::as_str)
    }

    pub fn block_value(&self, block_id: &str) -> Option<&str> {
        self.block_values.get(block_id).map(String::as_str)
    }

    /// Block id to display string, ordered by block id
    pub fn block_values(&self) -> &BTreeMap<String, String> {
        &self.block_values
    }

    pub fn clear(&mut self) {
        self.variable_values.clear();
        self.block_values.clear();
        self.sequences.clear();
    }

    fn next_sequence(&mut self, variable_id: &str) -> u64 {
        let sequence = self.sequences.entry(variable_id.to_string()).or_insert(0);
        *sequence += 1;
        *sequence
    }

    fn apply(&mut self, bindings: &BindingStore, variable_id: &str, text: String) {
        let blocks = bindings.blocks_for(variable_id);
        for block in blocks {
            self.block_values.insert(block.clone(), text.clone());
        }
        debug!(variable = %variable_id, blocks = blocks.len(), value = %text, "propagated");
        self.variable_values.insert(variable_id.to_string(), text);
    }
}
