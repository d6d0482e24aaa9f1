//! The booking widget's open/close lifecycle around a [`Sequencer`].

use crate::config::SessionConfig;
use crate::draft::{BookingDraft, DraftUpdate};
use crate::error::SessionError;
use crate::sequencer::{CloseDecision, FlowPosition, ScreenView, Sequencer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetState {
    Closed,
    Open,
    /// The close animation is running; the draft is discarded when it ends.
    Closing,
}

/// The "are you sure you want to leave" dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveDialog {
    Hidden,
    Shown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    /// The widget started closing; call `finish_close` to complete it.
    Closing,
    /// The leave dialog is showing and needs `confirm_leave` or `cancel_leave`.
    ConfirmationShown,
}

/// One user's booking widget: its position, draft and visibility.
#[derive(Debug, Clone)]
pub struct BookingSession {
    sequencer: Sequencer,
    config: SessionConfig,
    state: WidgetState,
    dialog: LeaveDialog,
    position: FlowPosition,
    draft: BookingDraft,
}

impl BookingSession {
    pub fn new(sequencer: Sequencer, config: SessionConfig) -> Self {
        let (position, draft) = Sequencer::start();
        Self {
            sequencer,
            config,
            state: WidgetState::Closed,
            dialog: LeaveDialog::Hidden,
            position,
            draft,
        }
    }

    pub fn state(&self) -> WidgetState {
        self.state
    }

    pub fn dialog(&self) -> LeaveDialog {
        self.dialog
    }

    pub fn position(&self) -> FlowPosition {
        self.position
    }

    pub fn draft(&self) -> &BookingDraft {
        &self.draft
    }

    pub fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    /// Opens the widget on the Welcome screen with an empty draft.
    pub fn open(&mut self) -> Result<ScreenView, SessionError> {
        if self.state != WidgetState::Closed {
            return Err(SessionError::AlreadyOpen);
        }
        let (position, draft) = Sequencer::start();
        self.position = position;
        self.draft = draft;
        self.dialog = LeaveDialog::Hidden;
        self.state = WidgetState::Open;
        tracing::info!("booking widget opened");
        self.screen()
    }

    pub fn screen(&self) -> Result<ScreenView, SessionError> {
        self.ensure_open()?;
        Ok(self.sequencer.current_screen(self.position, &self.draft)?)
    }

    pub fn progress_percent(&self) -> Result<u8, SessionError> {
        self.ensure_open()?;
        Ok(self.sequencer.progress_percent(self.position, &self.draft))
    }

    /// Continues from the current screen with the data it collected.
    pub fn continue_with(&mut self, update: DraftUpdate) -> Result<ScreenView, SessionError> {
        self.ensure_interactive()?;
        self.position = self
            .sequencer
            .advance(self.position, &mut self.draft, update)?;
        self.screen()
    }

    pub fn back(&mut self) -> Result<ScreenView, SessionError> {
        self.ensure_interactive()?;
        self.position = Sequencer::retreat(self.position);
        self.screen()
    }

    /// Closes at once from Welcome or the final screen, otherwise asks first.
    pub fn request_close(&mut self) -> Result<CloseOutcome, SessionError> {
        self.ensure_interactive()?;
        match self.sequencer.close_decision(self.position, &self.draft) {
            CloseDecision::CloseImmediately => {
                self.begin_close();
                Ok(CloseOutcome::Closing)
            }
            CloseDecision::ConfirmRequired => {
                self.dialog = LeaveDialog::Shown;
                tracing::debug!(step = self.position.step(), "leave confirmation shown");
                Ok(CloseOutcome::ConfirmationShown)
            }
        }
    }

    /// Leaves despite the unsaved booking.
    pub fn confirm_leave(&mut self) -> Result<CloseOutcome, SessionError> {
        self.ensure_pending_confirmation()?;
        self.dialog = LeaveDialog::Hidden;
        self.begin_close();
        Ok(CloseOutcome::Closing)
    }

    /// Dismisses the leave dialog; position and draft are untouched.
    pub fn cancel_leave(&mut self) -> Result<(), SessionError> {
        self.ensure_pending_confirmation()?;
        self.dialog = LeaveDialog::Hidden;
        Ok(())
    }

    /// Waits out the close animation, then discards the draft.
    pub async fn finish_close(&mut self) -> Result<(), SessionError> {
        if self.state != WidgetState::Closing {
            return Err(SessionError::NotClosing);
        }
        tokio::time::sleep(self.config.reset_delay()).await;

        let (position, draft) = Sequencer::start();
        self.position = position;
        self.draft = draft;
        self.state = WidgetState::Closed;
        tracing::info!("booking widget closed and draft discarded");
        Ok(())
    }

    fn begin_close(&mut self) {
        self.state = WidgetState::Closing;
        tracing::info!(
            step = self.position.step(),
            flow = ?self.draft.flow_key(),
            "booking widget closing"
        );
    }

    fn ensure_open(&self) -> Result<(), SessionError> {
        match self.state {
            WidgetState::Open => Ok(()),
            _ => Err(SessionError::NotOpen),
        }
    }

    fn ensure_interactive(&self) -> Result<(), SessionError> {
        self.ensure_open()?;
        match self.dialog {
            LeaveDialog::Hidden => Ok(()),
            LeaveDialog::Shown => Err(SessionError::DialogOpen),
        }
    }

    fn ensure_pending_confirmation(&self) -> Result<(), SessionError> {
        self.ensure_open()?;
        match self.dialog {
            LeaveDialog::Shown => Ok(()),
            LeaveDialog::Hidden => Err(SessionError::NoPendingConfirmation),
        }
    }
}
