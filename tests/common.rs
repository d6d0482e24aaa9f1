//! Common test utilities for building flow definitions, drafts and updates.
use bookflow::data::Money;
use bookflow::draft::*;
use bookflow::flow::{AppointmentPath, FlowKey, PatientType, ScreenId};
use bookflow::recipe::{FlowDefinition, FlowSequenceDefinition, ScreenDefinition};
use bookflow::sequencer::{FlowPosition, Sequencer};
use chrono::{NaiveDate, NaiveTime};

pub const NEW_SINGLE: FlowKey = FlowKey::new(PatientType::New, AppointmentPath::Single);
pub const RETURNING_SINGLE: FlowKey = FlowKey::new(PatientType::Returning, AppointmentPath::Single);
pub const NEW_COMBO: FlowKey = FlowKey::new(PatientType::New, AppointmentPath::Combo);
pub const RETURNING_COMBO: FlowKey = FlowKey::new(PatientType::Returning, AppointmentPath::Combo);
pub const NEW_FAMILY: FlowKey = FlowKey::new(PatientType::New, AppointmentPath::Family);
pub const RETURNING_FAMILY: FlowKey = FlowKey::new(PatientType::Returning, AppointmentPath::Family);

/// `(key, expected total steps)` for the six standard flows.
#[allow(dead_code)]
pub const STANDARD_TOTALS: [(FlowKey, usize); 6] = [
    (NEW_SINGLE, 11),
    (RETURNING_SINGLE, 11),
    (NEW_COMBO, 10),
    (RETURNING_COMBO, 10),
    (NEW_FAMILY, 10),
    (RETURNING_FAMILY, 10),
];

#[allow(dead_code)]
pub fn sequencer() -> Sequencer {
    Sequencer::standard().expect("standard flows must compile")
}

#[allow(dead_code)]
pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[allow(dead_code)]
pub fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

#[allow(dead_code)]
pub fn sample_patient_info() -> PatientInfo {
    PatientInfo {
        first_name: "Maya".to_string(),
        last_name: "Rivera".to_string(),
        date_of_birth: Some(date(1990, 4, 12)),
        phone: "5551234567".to_string(),
        email: Some("maya@example.com".to_string()),
    }
}

#[allow(dead_code)]
pub fn sample_details() -> PatientDetails {
    PatientDetails {
        first_name: "Jordan".to_string(),
        last_name: "Lee".to_string(),
        date_of_birth: None,
        contact: "5559876543".to_string(),
    }
}

#[allow(dead_code)]
pub fn sample_record() -> PatientRecord {
    PatientRecord {
        patient_id: "pt-lee".to_string(),
        first_name: "Jordan".to_string(),
        last_name: "Lee".to_string(),
        phone: "5559876543".to_string(),
        email: None,
        family_members: vec![
            FamilyMember {
                member_id: "fm-1".to_string(),
                name: "Sam Lee".to_string(),
                date_of_birth: None,
            },
            FamilyMember {
                member_id: "fm-2".to_string(),
                name: "Alex Lee".to_string(),
                date_of_birth: None,
            },
        ],
    }
}

#[allow(dead_code)]
pub fn sample_family() -> Vec<FamilyMember> {
    vec![
        FamilyMember {
            member_id: "member-1".to_string(),
            name: "Ana Park".to_string(),
            date_of_birth: None,
        },
        FamilyMember {
            member_id: "member-2".to_string(),
            name: "Ben Park".to_string(),
            date_of_birth: None,
        },
    ]
}

/// The update a patient would submit on `screen`, consistent with `draft`.
#[allow(dead_code)]
pub fn update_for(screen: ScreenId, key: FlowKey, draft: &BookingDraft) -> DraftUpdate {
    let member_ids = || -> Vec<String> {
        draft
            .family()
            .map(|d| d.members.iter().map(|m| m.member_id.clone()).collect())
            .unwrap_or_default()
    };

    match screen {
        ScreenId::Welcome => DraftUpdate::selection(key),
        ScreenId::Location => DraftUpdate::Location {
            location_id: "loc-downtown".to_string(),
        },
        ScreenId::Category => DraftUpdate::Category {
            category_id: "preventive".to_string(),
        },
        ScreenId::Procedure => DraftUpdate::Procedure {
            procedure_id: "cleaning".to_string(),
        },
        ScreenId::Provider => DraftUpdate::Provider {
            provider_id: "prov-kim".to_string(),
        },
        ScreenId::Slot => DraftUpdate::Slot {
            date: date(2026, 11, 3),
            time: time(9, 0),
        },
        ScreenId::PatientInfo => DraftUpdate::PatientInfo(sample_patient_info()),
        ScreenId::VerificationMethod => DraftUpdate::VerificationMethod {
            method: VerificationMethod::Sms,
            contact: "5551234567".to_string(),
        },
        ScreenId::PhoneVerify => DraftUpdate::Verified {
            method: VerificationMethod::Sms,
            contact: draft.primary_contact().unwrap_or("5551234567").to_string(),
        },
        ScreenId::Payment => DraftUpdate::payment("PAY-000001", Money::new(2500, "USD")),
        ScreenId::PatientDetailsEntry => DraftUpdate::PatientDetails(sample_details()),
        ScreenId::PatientLookup => DraftUpdate::PatientFound(sample_record()),
        ScreenId::ExamProvider => DraftUpdate::ExamProvider {
            provider_id: "prov-ruiz".to_string(),
        },
        ScreenId::HygieneProvider => DraftUpdate::HygieneProvider {
            provider_id: "prov-kim".to_string(),
        },
        ScreenId::ComboSlot => DraftUpdate::ComboSlot {
            date: date(2026, 11, 3),
            exam_time: time(9, 0),
            hygiene_time: time(9, 45),
        },
        ScreenId::FamilySetup => DraftUpdate::FamilyMembers {
            members: sample_family(),
        },
        ScreenId::ReturningFamilySetup => DraftUpdate::FamilySelection {
            member_ids: vec!["fm-1".to_string(), "fm-2".to_string()],
        },
        ScreenId::FamilyProvider | ScreenId::ReturningFamilyProvider => {
            DraftUpdate::FamilyProviders {
                assignments: member_ids()
                    .into_iter()
                    .map(|member_id| ProviderAssignment {
                        member_id,
                        provider_id: "prov-ruiz".to_string(),
                    })
                    .collect(),
            }
        }
        ScreenId::FamilySlot => DraftUpdate::FamilySlot {
            date: date(2026, 11, 4),
            times: member_ids()
                .into_iter()
                .zip([time(10, 0), time(10, 30), time(11, 0), time(11, 30)])
                .map(|(member_id, time)| MemberTime { member_id, time })
                .collect(),
        },
        ScreenId::FamilyContactInfo => DraftUpdate::FamilyContact(ContactInfo {
            name: "Ana Park".to_string(),
            phone: "5550001111".to_string(),
            email: None,
        }),
        ScreenId::Confirmation | ScreenId::FamilyConfirmation => {
            panic!("terminal screens collect nothing")
        }
    }
}

/// Advances a fresh draft along `key`'s flow until `step` is reached.
#[allow(dead_code)]
pub fn walk_to(sequencer: &Sequencer, key: FlowKey, step: usize) -> (FlowPosition, BookingDraft) {
    let (mut position, mut draft) = Sequencer::start();
    while position.step() < step {
        let view = sequencer
            .current_screen(position, &draft)
            .expect("every step before the target resolves");
        let update = update_for(view.screen, key, &draft);
        position = sequencer
            .advance(position, &mut draft, update)
            .expect("sample updates are accepted");
    }
    (position, draft)
}

#[allow(dead_code)]
pub fn flow(id: &str, patient: &str, path: &str, screens: &[&str]) -> FlowSequenceDefinition {
    FlowSequenceDefinition {
        id: id.to_string(),
        patient_type: patient.to_string(),
        appointment_path: path.to_string(),
        screens: screens.iter().map(|s| ScreenDefinition::of_type(s)).collect(),
    }
}

/// A one-flow definition: new patients booking a single appointment.
#[allow(dead_code)]
pub fn single_flow_definition() -> FlowDefinition {
    FlowDefinition {
        flows: vec![flow(
            "short-single",
            "new",
            "single",
            &[
                "Welcome",
                "Location",
                "Category",
                "Procedure",
                "Provider",
                "Slot",
                "Payment",
                "Confirmation",
            ],
        )],
    }
}
