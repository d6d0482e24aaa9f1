use crate::flow::{FlowKey, ScreenId, UpdateKind};
use std::time::Duration;
use thiserror::Error;

/// A string that did not name any known variant of an enum.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownVariant {
    pub fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Errors that can occur while compiling flow definitions into a catalog.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("The flow definition contains no flows")]
    EmptyCatalog,

    #[error("Flow '{flow_id}' has no screens")]
    EmptyFlow { flow_id: String },

    #[error("Flow '{flow_id}' has an invalid {field}: '{value}'")]
    InvalidFlowKey {
        flow_id: String,
        field: &'static str,
        value: String,
    },

    #[error("Flow '{flow_id}' selects {key}, which is already defined by flow '{existing_id}'")]
    DuplicateFlow {
        flow_id: String,
        existing_id: String,
        key: FlowKey,
    },

    #[error(
        "Screen '{screen_id}' in flow '{flow_id}' has an unregistered or invalid screen type: '{type_name}'"
    )]
    InvalidScreenType {
        flow_id: String,
        screen_id: String,
        type_name: String,
    },

    #[error("Flow '{flow_id}' must start with the Welcome screen")]
    MissingWelcome { flow_id: String },

    #[error("Flow '{flow_id}' shows the Welcome screen again at step {step}")]
    MisplacedWelcome { flow_id: String, step: usize },

    #[error("Flow '{flow_id}' labels the Welcome screen '{label}', but earlier flows use '{expected}'")]
    WelcomeLabelMismatch {
        flow_id: String,
        label: String,
        expected: String,
    },

    #[error("Flow '{flow_id}' must end with a confirmation screen")]
    MissingTerminal { flow_id: String },

    #[error("Flow '{flow_id}' reaches terminal screen {screen} early, at step {step}")]
    MisplacedTerminal {
        flow_id: String,
        screen: ScreenId,
        step: usize,
    },

    #[error("Screen {screen} cannot appear in flow '{flow_id}' ({key})")]
    ScreenNotAllowed {
        flow_id: String,
        screen: ScreenId,
        key: FlowKey,
    },

    #[error("Screen {screen} appears more than once in flow '{flow_id}'")]
    DuplicateScreen { flow_id: String, screen: ScreenId },
}

/// Errors raised while merging a partial update into a booking draft.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DraftError {
    #[error("No patient type and appointment path have been chosen yet")]
    NoPathSelected,

    #[error("A {update} update does not apply to a {key} booking")]
    NotApplicable { update: UpdateKind, key: FlowKey },

    #[error("No patient record has been found to select family members from")]
    MissingPatientRecord,

    #[error("Family member '{0}' is not part of this booking")]
    UnknownFamilyMember(String),

    #[error("A family booking needs at least one member")]
    EmptyFamily,
}

/// Errors that can occur while resolving or moving through a flow.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SequenceError {
    #[error("Step {step} requires a patient type and appointment path")]
    FlowNotSelected { step: usize },

    #[error("The catalog has no flow for {0}")]
    UnknownFlow(FlowKey),

    #[error("Step {step} is beyond the {total} steps of the {key} flow")]
    StepOutOfRange {
        step: usize,
        total: usize,
        key: FlowKey,
    },

    #[error("The {key} flow is already complete")]
    FlowComplete { key: FlowKey },

    #[error("Screen {screen} expects a {expected} update, but received {found}")]
    UnexpectedUpdate {
        screen: ScreenId,
        expected: UpdateKind,
        found: UpdateKind,
    },

    #[error(transparent)]
    Draft(#[from] DraftError),
}

/// Errors from the widget session lifecycle.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error("The booking widget is not open")]
    NotOpen,

    #[error("The booking widget is already open")]
    AlreadyOpen,

    #[error("The leave confirmation dialog is showing")]
    DialogOpen,

    #[error("There is no pending leave confirmation")]
    NoPendingConfirmation,

    #[error("The booking widget is not closing")]
    NotClosing,

    #[error(transparent)]
    Sequence(#[from] SequenceError),
}

/// Errors returned by external collaborators (patient directory, verification, payment, availability).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("Call to '{operation}' timed out after {after:?}")]
    Timeout { operation: String, after: Duration },

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid contact '{0}'")]
    InvalidContact(String),

    #[error("The verification code was not accepted")]
    InvalidCode,

    #[error("Payment declined: {0}")]
    Declined(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Missing input for collaborator call: {0}")]
    MissingInput(&'static str),

    #[error("Screen {0} is not backed by a collaborator")]
    Unsupported(ScreenId),
}

impl ServiceError {
    /// Transient failures that a retry may resolve.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ServiceError::Timeout { .. } | ServiceError::Unavailable(_))
    }
}

/// Errors that can occur when saving or loading a compiled catalog.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArtifactError {
    #[error("Artifact error: {0}")]
    Generic(String),

    #[error("Catalog artifact has format version {found}, expected {expected}")]
    VersionMismatch { found: u32, expected: u32 },
}

/// Errors that can occur while loading configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {message}")]
    Io { path: String, message: String },

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid value '{value}' for {key}")]
    InvalidValue { key: String, value: String },
}

/// Errors that can occur when converting a custom user format into a `FlowDefinition`.
#[derive(Error, Debug, Clone)]
pub enum FlowConversionError {
    #[error("Invalid custom data: {0}")]
    ValidationError(String),
}
