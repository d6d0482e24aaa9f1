use crate::draft::{BookingDraft, DraftUpdate};
use crate::error::{CompileError, SequenceError};
use crate::flow::{CompiledFlow, FlowCatalog, FlowKey, ScreenDescriptor, ScreenId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

mod props;

pub use props::ScreenProps;

/// A 1-based step index within the active flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FlowPosition {
    step: usize,
}

impl FlowPosition {
    pub const fn start() -> Self {
        Self { step: 1 }
    }

    /// A position at `step`, floored at 1.
    pub fn at(step: usize) -> Self {
        Self { step: step.max(1) }
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn next(&self) -> Self {
        Self {
            step: self.step + 1,
        }
    }

    pub fn previous(&self) -> Self {
        Self::at(self.step.saturating_sub(1))
    }

    pub fn is_start(&self) -> bool {
        self.step == 1
    }
}

impl Default for FlowPosition {
    fn default() -> Self {
        Self::start()
    }
}

/// What the widget should render at a position.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ScreenView {
    pub screen: ScreenId,
    pub label: String,
    pub step: usize,
    pub total_steps: usize,
    pub props: ScreenProps,
}

/// Whether closing the widget needs the "are you sure you want to leave" dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseDecision {
    CloseImmediately,
    ConfirmRequired,
}

/// Maps positions and drafts onto screens using a compiled `FlowCatalog`.
///
/// A `Sequencer` holds no session state; positions and drafts are passed in, so one
/// instance can serve any number of sessions and threads.
#[derive(Debug, Clone)]
pub struct Sequencer {
    catalog: Arc<FlowCatalog>,
}

impl Sequencer {
    pub fn new(catalog: impl Into<Arc<FlowCatalog>>) -> Self {
        Self {
            catalog: catalog.into(),
        }
    }

    /// A sequencer over the standard six-flow catalog.
    pub fn standard() -> Result<Self, CompileError> {
        Ok(Self::new(FlowCatalog::standard()?))
    }

    pub fn catalog(&self) -> &FlowCatalog {
        &self.catalog
    }

    /// The initial position and an empty draft.
    pub fn start() -> (FlowPosition, BookingDraft) {
        (FlowPosition::start(), BookingDraft::Unselected)
    }

    /// The flow the draft selects, if any.
    pub fn active_flow(&self, draft: &BookingDraft) -> Result<Option<&CompiledFlow>, SequenceError> {
        match draft.flow_key() {
            None => Ok(None),
            Some(key) => self
                .catalog
                .get(key)
                .map(Some)
                .ok_or(SequenceError::UnknownFlow(key)),
        }
    }

    /// Number of steps in the active flow, or in the longest flow before one is chosen.
    pub fn total_steps(&self, draft: &BookingDraft) -> Result<usize, SequenceError> {
        Ok(match self.active_flow(draft)? {
            Some(flow) => flow.total_steps(),
            None => self.catalog.longest_flow_steps(),
        })
    }

    fn resolve(
        &self,
        position: FlowPosition,
        draft: &BookingDraft,
    ) -> Result<(&ScreenDescriptor, usize), SequenceError> {
        let step = position.step();
        // Step 1 is shared by every flow and is what selects one, so it resolves even
        // when the draft names a flow this catalog lacks.
        if position.is_start() {
            return Ok(match draft.flow_key().and_then(|key| self.catalog.get(key)) {
                Some(flow) => (
                    flow.screen_at(1).unwrap_or(self.catalog.welcome()),
                    flow.total_steps(),
                ),
                None => (self.catalog.welcome(), self.catalog.longest_flow_steps()),
            });
        }
        match self.active_flow(draft)? {
            Some(flow) => {
                let total = flow.total_steps();
                flow.screen_at(step)
                    .map(|descriptor| (descriptor, total))
                    .ok_or(SequenceError::StepOutOfRange {
                        step,
                        total,
                        key: flow.key,
                    })
            }
            None => Err(SequenceError::FlowNotSelected { step }),
        }
    }

    /// Resolves the screen to present at `position`, with the draft fields it may read.
    pub fn current_screen(
        &self,
        position: FlowPosition,
        draft: &BookingDraft,
    ) -> Result<ScreenView, SequenceError> {
        let (descriptor, total_steps) = self.resolve(position, draft)?;
        Ok(ScreenView {
            screen: descriptor.screen,
            label: descriptor.label.clone(),
            step: position.step(),
            total_steps,
            props: ScreenProps::for_screen(descriptor.screen, draft),
        })
    }

    /// Merges the current screen's update into the draft and moves one step forward.
    ///
    /// The update must be the kind the current screen collects. The draft is not
    /// checked for completeness; screens only continue once their own fields are filled.
    pub fn advance(
        &self,
        position: FlowPosition,
        draft: &mut BookingDraft,
        update: DraftUpdate,
    ) -> Result<FlowPosition, SequenceError> {
        let (descriptor, _) = self.resolve(position, draft)?;
        let screen = descriptor.screen;

        let Some(expected) = screen.accepts() else {
            let key = draft
                .flow_key()
                .ok_or(SequenceError::FlowNotSelected {
                    step: position.step(),
                })?;
            return Err(SequenceError::FlowComplete { key });
        };
        let found = update.kind();
        if found != expected {
            return Err(SequenceError::UnexpectedUpdate {
                screen,
                expected,
                found,
            });
        }

        if let DraftUpdate::Selection {
            patient_type,
            appointment_path,
        } = &update
        {
            let key = FlowKey::new(*patient_type, *appointment_path);
            if self.catalog.get(key).is_none() {
                return Err(SequenceError::UnknownFlow(key));
            }
        }

        draft.apply(update)?;
        let next = position.next();
        tracing::debug!(
            from = position.step(),
            to = next.step(),
            %screen,
            flow = ?draft.flow_key(),
            "advanced"
        );
        Ok(next)
    }

    /// One step back, never before Welcome. Draft data is kept.
    pub fn retreat(position: FlowPosition) -> FlowPosition {
        let previous = position.previous();
        tracing::debug!(from = position.step(), to = previous.step(), "retreated");
        previous
    }

    pub fn is_terminal(&self, position: FlowPosition, draft: &BookingDraft) -> bool {
        self.resolve(position, draft)
            .is_ok_and(|(descriptor, _)| descriptor.screen.is_terminal())
    }

    /// `round(step / total * 100)`, clamped to 0..=100. Positions that do not resolve
    /// to a screen report 0.
    pub fn progress_percent(&self, position: FlowPosition, draft: &BookingDraft) -> u8 {
        let Ok((_, total)) = self.resolve(position, draft) else {
            return 0;
        };
        let total = total.max(1);
        let percent = (position.step() as f64 / total as f64 * 100.0).round();
        percent.clamp(0.0, 100.0) as u8
    }

    /// Closing from Welcome or from the end of a flow needs no confirmation.
    pub fn close_decision(&self, position: FlowPosition, draft: &BookingDraft) -> CloseDecision {
        if position.is_start() || self.is_terminal(position, draft) {
            CloseDecision::CloseImmediately
        } else {
            CloseDecision::ConfirmRequired
        }
    }
}
