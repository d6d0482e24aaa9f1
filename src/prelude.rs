//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the bookflow crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use bookflow::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let sequencer = Sequencer::standard()?;
//! let mut session = BookingSession::new(sequencer, SessionConfig::default());
//!
//! let welcome = session.open()?;
//! assert_eq!(welcome.screen, ScreenId::Welcome);
//!
//! let key = FlowKey::new(PatientType::Returning, AppointmentPath::Family);
//! let next = session.continue_with(DraftUpdate::selection(key))?;
//! println!("{}", SummaryFormatter::progress_label(&next));
//! # Ok(())
//! # }
//! ```

// Compilation
pub use crate::compiler::Compiler;
pub use crate::recipe::{
    CompiledCatalog, FlowDefinition, FlowSequenceDefinition, IntoFlow, ScreenDefinition,
    standard_flows,
};

// Flows and sequencing
pub use crate::flow::{AppointmentPath, CompiledFlow, FlowCatalog, FlowKey, PatientType, ScreenId};
pub use crate::sequencer::{CloseDecision, FlowPosition, ScreenProps, ScreenView, Sequencer};
pub use crate::session::{BookingSession, CloseOutcome, LeaveDialog, WidgetState};

// Booking data
pub use crate::data::{ClinicDirectory, Money};
pub use crate::draft::{BookingDraft, DraftUpdate};
pub use crate::summary::{BookingSummary, SummaryFormatter};

// Collaborators and configuration
pub use crate::config::{BookflowConfig, ServiceConfig, SessionConfig};
pub use crate::services::{CallPolicy, Services};

// Error types
pub use crate::error::{
    ArtifactError, CompileError, DraftError, FlowConversionError, SequenceError, ServiceError,
    SessionError,
};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
