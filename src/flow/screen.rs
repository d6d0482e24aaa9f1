use super::{AppointmentPath, FlowKey, PatientType};
use crate::error::UnknownVariant;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Every screen a booking flow can present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ScreenId {
    Welcome,
    Location,
    Category,
    Procedure,
    Provider,
    Slot,
    PatientInfo,
    VerificationMethod,
    PhoneVerify,
    Payment,
    Confirmation,
    PatientDetailsEntry,
    PatientLookup,
    ExamProvider,
    HygieneProvider,
    ComboSlot,
    FamilySetup,
    FamilyProvider,
    FamilySlot,
    FamilyContactInfo,
    ReturningFamilySetup,
    ReturningFamilyProvider,
    FamilyConfirmation,
}

impl ScreenId {
    pub const ALL: [ScreenId; 23] = [
        ScreenId::Welcome,
        ScreenId::Location,
        ScreenId::Category,
        ScreenId::Procedure,
        ScreenId::Provider,
        ScreenId::Slot,
        ScreenId::PatientInfo,
        ScreenId::VerificationMethod,
        ScreenId::PhoneVerify,
        ScreenId::Payment,
        ScreenId::Confirmation,
        ScreenId::PatientDetailsEntry,
        ScreenId::PatientLookup,
        ScreenId::ExamProvider,
        ScreenId::HygieneProvider,
        ScreenId::ComboSlot,
        ScreenId::FamilySetup,
        ScreenId::FamilyProvider,
        ScreenId::FamilySlot,
        ScreenId::FamilyContactInfo,
        ScreenId::ReturningFamilySetup,
        ScreenId::ReturningFamilyProvider,
        ScreenId::FamilyConfirmation,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ScreenId::Welcome => "Welcome",
            ScreenId::Location => "Location",
            ScreenId::Category => "Category",
            ScreenId::Procedure => "Procedure",
            ScreenId::Provider => "Provider",
            ScreenId::Slot => "Slot",
            ScreenId::PatientInfo => "PatientInfo",
            ScreenId::VerificationMethod => "VerificationMethod",
            ScreenId::PhoneVerify => "PhoneVerify",
            ScreenId::Payment => "Payment",
            ScreenId::Confirmation => "Confirmation",
            ScreenId::PatientDetailsEntry => "PatientDetailsEntry",
            ScreenId::PatientLookup => "PatientLookup",
            ScreenId::ExamProvider => "ExamProvider",
            ScreenId::HygieneProvider => "HygieneProvider",
            ScreenId::ComboSlot => "ComboSlot",
            ScreenId::FamilySetup => "FamilySetup",
            ScreenId::FamilyProvider => "FamilyProvider",
            ScreenId::FamilySlot => "FamilySlot",
            ScreenId::FamilyContactInfo => "FamilyContactInfo",
            ScreenId::ReturningFamilySetup => "ReturningFamilySetup",
            ScreenId::ReturningFamilyProvider => "ReturningFamilyProvider",
            ScreenId::FamilyConfirmation => "FamilyConfirmation",
        }
    }

    /// The heading shown above the screen when a flow definition gives none.
    pub fn default_label(&self) -> &'static str {
        match self {
            ScreenId::Welcome => "Book an appointment",
            ScreenId::Location => "Choose a location",
            ScreenId::Category => "What brings you in?",
            ScreenId::Procedure => "Choose a procedure",
            ScreenId::Provider => "Choose a provider",
            ScreenId::Slot => "Pick a date and time",
            ScreenId::PatientInfo => "Tell us about yourself",
            ScreenId::VerificationMethod => "How should we verify you?",
            ScreenId::PhoneVerify => "Enter your verification code",
            ScreenId::Payment => "Secure your booking",
            ScreenId::Confirmation => "You're booked",
            ScreenId::PatientDetailsEntry => "Welcome back",
            ScreenId::PatientLookup => "Finding your record",
            ScreenId::ExamProvider => "Choose your exam provider",
            ScreenId::HygieneProvider => "Choose your hygienist",
            ScreenId::ComboSlot => "Pick a date and times",
            ScreenId::FamilySetup => "Who is coming in?",
            ScreenId::FamilyProvider => "Choose providers",
            ScreenId::FamilySlot => "Pick a date and times",
            ScreenId::FamilyContactInfo => "Family contact details",
            ScreenId::ReturningFamilySetup => "Who is coming in?",
            ScreenId::ReturningFamilyProvider => "Choose providers",
            ScreenId::FamilyConfirmation => "Your family is booked",
        }
    }

    /// Terminal screens end a flow; nothing follows them.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ScreenId::Confirmation | ScreenId::FamilyConfirmation)
    }

    /// The kind of update this screen hands to `advance`. Terminal screens collect nothing.
    pub fn accepts(&self) -> Option<UpdateKind> {
        let kind = match self {
            ScreenId::Welcome => UpdateKind::Selection,
            ScreenId::Location => UpdateKind::Location,
            ScreenId::Category => UpdateKind::Category,
            ScreenId::Procedure => UpdateKind::Procedure,
            ScreenId::Provider => UpdateKind::Provider,
            ScreenId::Slot => UpdateKind::Slot,
            ScreenId::PatientInfo => UpdateKind::PatientInfo,
            ScreenId::VerificationMethod => UpdateKind::VerificationMethod,
            ScreenId::PhoneVerify => UpdateKind::Verified,
            ScreenId::Payment => UpdateKind::Payment,
            ScreenId::PatientDetailsEntry => UpdateKind::PatientDetails,
            ScreenId::PatientLookup => UpdateKind::PatientFound,
            ScreenId::ExamProvider => UpdateKind::ExamProvider,
            ScreenId::HygieneProvider => UpdateKind::HygieneProvider,
            ScreenId::ComboSlot => UpdateKind::ComboSlot,
            ScreenId::FamilySetup => UpdateKind::FamilyMembers,
            ScreenId::ReturningFamilySetup => UpdateKind::FamilySelection,
            ScreenId::FamilyProvider | ScreenId::ReturningFamilyProvider => {
                UpdateKind::FamilyProviders
            }
            ScreenId::FamilySlot => UpdateKind::FamilySlot,
            ScreenId::FamilyContactInfo => UpdateKind::FamilyContact,
            ScreenId::Confirmation | ScreenId::FamilyConfirmation => return None,
        };
        Some(kind)
    }

    /// Whether this screen can appear in the flow selected by `key`.
    pub fn allowed_in(&self, key: FlowKey) -> bool {
        match self {
            ScreenId::Confirmation => !key.is_family(),
            ScreenId::FamilyConfirmation => key.is_family(),
            other => other
                .accepts()
                .is_some_and(|kind| kind.applies_to(key)),
        }
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScreenId {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ScreenId::ALL
            .into_iter()
            .find(|screen| screen.name() == s)
            .ok_or_else(|| UnknownVariant::new("screen", s))
    }
}

/// Discriminates the partial updates a screen can merge into a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpdateKind {
    Selection,
    Location,
    Category,
    Procedure,
    Provider,
    Slot,
    PatientInfo,
    VerificationMethod,
    Verified,
    Payment,
    PatientDetails,
    PatientFound,
    ExamProvider,
    HygieneProvider,
    ComboSlot,
    FamilyMembers,
    FamilySelection,
    FamilyProviders,
    FamilySlot,
    FamilyContact,
}

impl UpdateKind {
    /// Whether a draft on the flow `key` has the fields this update writes.
    pub fn applies_to(&self, key: FlowKey) -> bool {
        use AppointmentPath::*;
        match self {
            UpdateKind::Selection
            | UpdateKind::Location
            | UpdateKind::VerificationMethod
            | UpdateKind::Verified
            | UpdateKind::Payment => true,
            UpdateKind::Category | UpdateKind::Procedure | UpdateKind::Provider | UpdateKind::Slot => {
                key.path == Single
            }
            UpdateKind::PatientInfo => matches!(key.path, Single | Combo),
            UpdateKind::PatientDetails | UpdateKind::PatientFound => key.is_returning(),
            UpdateKind::ExamProvider | UpdateKind::HygieneProvider | UpdateKind::ComboSlot => {
                key.path == Combo
            }
            UpdateKind::FamilyMembers
            | UpdateKind::FamilyProviders
            | UpdateKind::FamilySlot
            | UpdateKind::FamilyContact => key.path == Family,
            UpdateKind::FamilySelection => {
                key.path == Family && key.patient == PatientType::Returning
            }
        }
    }
}

impl fmt::Display for UpdateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A screen as it appears in a compiled flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenDescriptor {
    pub screen: ScreenId,
    pub label: String,
}

impl ScreenDescriptor {
    pub fn new(screen: ScreenId) -> Self {
        Self {
            screen,
            label: screen.default_label().to_string(),
        }
    }

    pub fn with_label(screen: ScreenId, label: impl Into<String>) -> Self {
        Self {
            screen,
            label: label.into(),
        }
    }
}
