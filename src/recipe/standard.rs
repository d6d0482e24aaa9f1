use super::definition::{FlowDefinition, FlowSequenceDefinition, ScreenDefinition};

/// The six standard booking flows as `(id, patient type, appointment path, screens)`.
const STANDARD_FLOWS: &[(&str, &str, &str, &[&str])] = &[
    (
        "new-single",
        "new",
        "single",
        &[
            "Welcome",
            "Location",
            "Category",
            "Procedure",
            "Provider",
            "Slot",
            "PatientInfo",
            "VerificationMethod",
            "PhoneVerify",
            "Payment",
            "Confirmation",
        ],
    ),
    (
        "returning-single",
        "returning",
        "single",
        &[
            "Welcome",
            "PatientDetailsEntry",
            "PatientLookup",
            "PhoneVerify",
            "Location",
            "Category",
            "Procedure",
            "Provider",
            "Slot",
            "Payment",
            "Confirmation",
        ],
    ),
    (
        "new-combo",
        "new",
        "combo",
        &[
            "Welcome",
            "Location",
            "ExamProvider",
            "HygieneProvider",
            "ComboSlot",
            "PatientInfo",
            "VerificationMethod",
            "PhoneVerify",
            "Payment",
            "Confirmation",
        ],
    ),
    (
        "returning-combo",
        "returning",
        "combo",
        &[
            "Welcome",
            "PatientDetailsEntry",
            "PatientLookup",
            "PhoneVerify",
            "Location",
            "ExamProvider",
            "HygieneProvider",
            "ComboSlot",
            "Payment",
            "Confirmation",
        ],
    ),
    (
        "new-family",
        "new",
        "family",
        &[
            "Welcome",
            "FamilySetup",
            "Location",
            "FamilyProvider",
            "FamilySlot",
            "FamilyContactInfo",
            "VerificationMethod",
            "PhoneVerify",
            "Payment",
            "FamilyConfirmation",
        ],
    ),
    (
        "returning-family",
        "returning",
        "family",
        &[
            "Welcome",
            "PatientDetailsEntry",
            "PatientLookup",
            "PhoneVerify",
            "ReturningFamilySetup",
            "Location",
            "ReturningFamilyProvider",
            "FamilySlot",
            "Payment",
            "FamilyConfirmation",
        ],
    ),
];

/// Builds the definition of the standard flow table.
pub fn standard_flows() -> FlowDefinition {
    let flows = STANDARD_FLOWS
        .iter()
        .map(
            |(id, patient_type, appointment_path, screens)| FlowSequenceDefinition {
                id: id.to_string(),
                patient_type: patient_type.to_string(),
                appointment_path: appointment_path.to_string(),
                screens: screens
                    .iter()
                    .map(|screen| ScreenDefinition::of_type(screen))
                    .collect(),
            },
        )
        .collect();
    FlowDefinition { flows }
}
