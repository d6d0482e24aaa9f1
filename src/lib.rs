//! # bookflow - Booking Widget Flow Sequencer
//!
//! **bookflow** decides which screen a dental booking widget shows at each step.
//! A patient picks whether they are new or returning and whether they book a single
//! visit, an exam + cleaning combo, or a family visit. Each of the six combinations
//! walks a different sequence of screens. bookflow compiles those sequences from a
//! declarative table, validates them, and resolves `(step, draft)` to a screen.
//!
//! ## Core Workflow
//!
//! 1.  **Describe flows**: use the built-in table (`standard_flows`) or load your own
//!     format and convert it with the `IntoFlow` trait.
//! 2.  **Compile**: `Compiler::builder(definition).build().compile()` validates every
//!     flow and produces a `FlowCatalog`. Catalogs can be saved as `CompiledCatalog`
//!     artifacts.
//! 3.  **Sequence**: a `Sequencer` maps a `FlowPosition` and `BookingDraft` to a
//!     `ScreenView`, advances with typed `DraftUpdate`s, and reports progress and
//!     whether closing needs confirmation.
//! 4.  **Drive a widget**: `BookingSession` adds the open/close lifecycle, and
//!     `Services` calls the patient, verification and payment collaborators.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bookflow::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let catalog = Compiler::builder(standard_flows()).build().compile()?;
//!     let sequencer = Sequencer::new(catalog);
//!
//!     let (position, mut draft) = Sequencer::start();
//!     let key = FlowKey::new(PatientType::New, AppointmentPath::Single);
//!     let position = sequencer.advance(position, &mut draft, DraftUpdate::selection(key))?;
//!
//!     let view = sequencer.current_screen(position, &draft)?;
//!     println!("{}", SummaryFormatter::progress_label(&view));
//!     println!("{}% complete", sequencer.progress_percent(position, &draft));
//!     Ok(())
//! }
//! ```

pub mod compiler;
pub mod config;
pub mod data;
pub mod draft;
pub mod error;
pub mod flow;
pub mod prelude;
pub mod recipe;
pub mod sequencer;
pub mod services;
pub mod session;
pub mod summary;
