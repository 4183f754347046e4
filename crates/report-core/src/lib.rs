//! Report template core
//!
//! Variables are bound to OCR blocks; each variable's value is formatted
//! once and projected onto every bound block, and at generation time the
//! projected strings become positioned replacement instructions.
//!
//! - `format`: significant-figure and fixed-decimal formatting
//! - `geometry`: normalized box to pixel and document space
//! - `bindings`, `registry`, `propagation`: session state
//! - `assembler`: replacement instructions and request assembly
//! - `session`: the state container tying them together

pub mod assembler;
pub mod bindings;
pub mod error;
pub mod format;
pub mod geometry;
pub mod ocr;
pub mod propagation;
pub mod registry;
pub mod session;

pub use assembler::{build_replacements, build_request, ReportContext, ReportTarget};
pub use bindings::BindingStore;
pub use error::{ErrorKind, ReportError, Result};
pub use format::{
    count_sig_figs, format_with_rounding, format_with_sig_figs, DisplayOptions, FormatOptions,
    InequalityOperator, RoundingMode,
};
pub use geometry::{to_document_rect, to_pdf_user_space, to_pixel_rect};
pub use ocr::{BlockIndex, OcrPoll, PollStep};
pub use propagation::{Completion, FormatTicket, PropagationEngine, RemoteFormat};
pub use registry::{
    InputType, ManualConfig, Section, Variable, VariableConfig, VariableRegistry,
};
pub use session::{OverlayBox, ReportSession, SessionAction, SessionEvent};
