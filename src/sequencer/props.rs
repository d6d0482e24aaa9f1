use crate::draft::*;
use crate::flow::{FlowKey, ScreenId};
use crate::summary::BookingSummary;
use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;

/// The subset of the draft a screen is allowed to read.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "screen")]
pub enum ScreenProps {
    Welcome {
        selection: Option<FlowKey>,
    },
    Location {
        selected: Option<String>,
    },
    Category {
        location_id: Option<String>,
        selected: Option<String>,
    },
    Procedure {
        location_id: Option<String>,
        category_id: Option<String>,
        selected: Option<String>,
    },
    Provider {
        location_id: Option<String>,
        procedure_id: Option<String>,
        selected: Option<String>,
    },
    Slot {
        location_id: Option<String>,
        provider_id: Option<String>,
        date: Option<NaiveDate>,
        time: Option<NaiveTime>,
    },
    PatientInfo {
        existing: Option<PatientInfo>,
    },
    VerificationMethod {
        method: Option<VerificationMethod>,
        contact_hint: Option<String>,
    },
    PhoneVerify {
        method: VerificationMethod,
        contact: Option<String>,
        verified: bool,
    },
    PatientDetailsEntry {
        existing: Option<PatientDetails>,
    },
    PatientLookup {
        details: Option<PatientDetails>,
    },
    ExamProvider {
        location_id: Option<String>,
        selected: Option<String>,
    },
    HygieneProvider {
        location_id: Option<String>,
        exam_provider_id: Option<String>,
        selected: Option<String>,
    },
    ComboSlot {
        location_id: Option<String>,
        exam_provider_id: Option<String>,
        hygiene_provider_id: Option<String>,
    },
    FamilySetup {
        members: Vec<FamilyMember>,
    },
    ReturningFamilySetup {
        available: Vec<FamilyMember>,
        selected: Vec<String>,
    },
    FamilyProvider {
        location_id: Option<String>,
        members: Vec<FamilyMember>,
        assignments: Vec<ProviderAssignment>,
    },
    FamilySlot {
        location_id: Option<String>,
        assignments: Vec<ProviderAssignment>,
    },
    FamilyContactInfo {
        members: Vec<FamilyMember>,
        existing: Option<ContactInfo>,
    },
    Payment {
        summary: BookingSummary,
    },
    Confirmation {
        summary: BookingSummary,
    },
}

impl ScreenProps {
    /// Projects the draft onto what `screen` may read.
    pub fn for_screen(screen: ScreenId, draft: &BookingDraft) -> Self {
        let location_id = || draft.location_id().map(str::to_string);
        let single = draft.single();
        let combo = draft.combo();
        let family = draft.family();
        let common = draft.common();

        match screen {
            ScreenId::Welcome => ScreenProps::Welcome {
                selection: draft.flow_key(),
            },
            ScreenId::Location => ScreenProps::Location {
                selected: location_id(),
            },
            ScreenId::Category => ScreenProps::Category {
                location_id: location_id(),
                selected: single.and_then(|d| d.category_id.clone()),
            },
            ScreenId::Procedure => ScreenProps::Procedure {
                location_id: location_id(),
                category_id: single.and_then(|d| d.category_id.clone()),
                selected: single.and_then(|d| d.procedure_id.clone()),
            },
            ScreenId::Provider => ScreenProps::Provider {
                location_id: location_id(),
                procedure_id: single.and_then(|d| d.procedure_id.clone()),
                selected: single.and_then(|d| d.provider_id.clone()),
            },
            ScreenId::Slot => ScreenProps::Slot {
                location_id: location_id(),
                provider_id: single.and_then(|d| d.provider_id.clone()),
                date: single.and_then(|d| d.date),
                time: single.and_then(|d| d.time),
            },
            ScreenId::PatientInfo => ScreenProps::PatientInfo {
                existing: draft.patient_info().cloned(),
            },
            ScreenId::VerificationMethod => ScreenProps::VerificationMethod {
                method: common
                    .and_then(|c| c.verification.as_ref())
                    .map(|v| v.method),
                contact_hint: draft.primary_contact().map(str::to_string),
            },
            ScreenId::PhoneVerify => {
                let verification = common.and_then(|c| c.verification.as_ref());
                ScreenProps::PhoneVerify {
                    method: verification.map_or(VerificationMethod::Sms, |v| v.method),
                    contact: draft.primary_contact().map(str::to_string),
                    verified: verification.is_some_and(|v| v.verified),
                }
            }
            ScreenId::PatientDetailsEntry => ScreenProps::PatientDetailsEntry {
                existing: common.and_then(|c| c.details()).cloned(),
            },
            ScreenId::PatientLookup => ScreenProps::PatientLookup {
                details: common.and_then(|c| c.details()).cloned(),
            },
            ScreenId::ExamProvider => ScreenProps::ExamProvider {
                location_id: location_id(),
                selected: combo.and_then(|d| d.exam_provider_id.clone()),
            },
            ScreenId::HygieneProvider => ScreenProps::HygieneProvider {
                location_id: location_id(),
                exam_provider_id: combo.and_then(|d| d.exam_provider_id.clone()),
                selected: combo.and_then(|d| d.hygiene_provider_id.clone()),
            },
            ScreenId::ComboSlot => ScreenProps::ComboSlot {
                location_id: location_id(),
                exam_provider_id: combo.and_then(|d| d.exam_provider_id.clone()),
                hygiene_provider_id: combo.and_then(|d| d.hygiene_provider_id.clone()),
            },
            ScreenId::FamilySetup => ScreenProps::FamilySetup {
                members: family.map(|d| d.members.clone()).unwrap_or_default(),
            },
            ScreenId::ReturningFamilySetup => ScreenProps::ReturningFamilySetup {
                available: common
                    .and_then(|c| c.record())
                    .map(|r| r.family_members.clone())
                    .unwrap_or_default(),
                selected: family
                    .map(|d| d.members.iter().map(|m| m.member_id.clone()).collect())
                    .unwrap_or_default(),
            },
            ScreenId::FamilyProvider | ScreenId::ReturningFamilyProvider => {
                ScreenProps::FamilyProvider {
                    location_id: location_id(),
                    members: family.map(|d| d.members.clone()).unwrap_or_default(),
                    assignments: family.map(|d| d.assignments.clone()).unwrap_or_default(),
                }
            }
            ScreenId::FamilySlot => ScreenProps::FamilySlot {
                location_id: location_id(),
                assignments: family.map(|d| d.assignments.clone()).unwrap_or_default(),
            },
            ScreenId::FamilyContactInfo => ScreenProps::FamilyContactInfo {
                members: family.map(|d| d.members.clone()).unwrap_or_default(),
                existing: family.and_then(|d| d.contact.clone()),
            },
            ScreenId::Payment => ScreenProps::Payment {
                summary: BookingSummary::from_draft(draft),
            },
            ScreenId::Confirmation | ScreenId::FamilyConfirmation => ScreenProps::Confirmation {
                summary: BookingSummary::from_draft(draft),
            },
        }
    }
}
