use crate::error::CompileError;
use crate::flow::{ScreenDescriptor, ScreenId};
use crate::recipe::ScreenDefinition;
use ahash::AHashMap;

/// Defines the contract for parsing a specific `screen_type` into a `ScreenDescriptor`.
pub trait ScreenParser: Send + Sync {
    fn screen_type(&self) -> &str;
    fn parse(&self, definition: &ScreenDefinition) -> Result<ScreenDescriptor, CompileError>;
}

/// Uses the definition's label when one is given, otherwise the screen's default.
fn describe(screen: ScreenId, definition: &ScreenDefinition) -> ScreenDescriptor {
    match definition.label.as_deref().map(str::trim) {
        Some(label) if !label.is_empty() => ScreenDescriptor::with_label(screen, label),
        _ => ScreenDescriptor::new(screen),
    }
}

/// Master macro to define all standard screen parsers, their registration, and their creation.
macro_rules! define_screen_parsers {
    ( $( ($struct_name:ident, $screen_type:literal, $screen:path) ),* $(,)? ) => {
        // 1. Define all the parser structs and their implementations
        $(
            struct $struct_name;
            impl ScreenParser for $struct_name {
                fn screen_type(&self) -> &str { $screen_type }
                fn parse(&self, definition: &ScreenDefinition) -> Result<ScreenDescriptor, CompileError> {
                    Ok(describe($screen, definition))
                }
            }
        )*

        // 2. Define the function to register all default parsers
        pub(super) fn register_default_parsers(registry: &mut AHashMap<String, Box<dyn ScreenParser>>) {
            $( registry.insert($screen_type.to_string(), Box::new($struct_name)); )*
        }

        // 3. Define the function to create a parser by its string name
        pub(super) fn create_parser_by_name(name: &str) -> Option<Box<dyn ScreenParser>> {
            match name {
                $( $screen_type => Some(Box::new($struct_name)), )*
                _ => None,
            }
        }
    };
}

// Use the macro to define all standard screen parsers
define_screen_parsers! {
    // Shared
    (WelcomeParser, "Welcome", ScreenId::Welcome),
    (LocationParser, "Location", ScreenId::Location),
    (PhoneVerifyParser, "PhoneVerify", ScreenId::PhoneVerify),
    (VerificationMethodParser, "VerificationMethod", ScreenId::VerificationMethod),
    (PaymentParser, "Payment", ScreenId::Payment),
    (ConfirmationParser, "Confirmation", ScreenId::Confirmation),

    // Single appointment
    (CategoryParser, "Category", ScreenId::Category),
    (ProcedureParser, "Procedure", ScreenId::Procedure),
    (ProviderParser, "Provider", ScreenId::Provider),
    (SlotParser, "Slot", ScreenId::Slot),
    (PatientInfoParser, "PatientInfo", ScreenId::PatientInfo),

    // Returning patients
    (PatientDetailsEntryParser, "PatientDetailsEntry", ScreenId::PatientDetailsEntry),
    (PatientLookupParser, "PatientLookup", ScreenId::PatientLookup),

    // Combo
    (ExamProviderParser, "ExamProvider", ScreenId::ExamProvider),
    (HygieneProviderParser, "HygieneProvider", ScreenId::HygieneProvider),
    (ComboSlotParser, "ComboSlot", ScreenId::ComboSlot),

    // Family
    (FamilySetupParser, "FamilySetup", ScreenId::FamilySetup),
    (FamilyProviderParser, "FamilyProvider", ScreenId::FamilyProvider),
    (FamilySlotParser, "FamilySlot", ScreenId::FamilySlot),
    (FamilyContactInfoParser, "FamilyContactInfo", ScreenId::FamilyContactInfo),
    (ReturningFamilySetupParser, "ReturningFamilySetup", ScreenId::ReturningFamilySetup),
    (ReturningFamilyProviderParser, "ReturningFamilyProvider", ScreenId::ReturningFamilyProvider),
    (FamilyConfirmationParser, "FamilyConfirmation", ScreenId::FamilyConfirmation),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_screen_has_a_default_parser() {
        let mut registry = AHashMap::new();
        register_default_parsers(&mut registry);
        for screen in ScreenId::ALL {
            let parser = registry
                .get(screen.name())
                .unwrap_or_else(|| panic!("no parser for {}", screen));
            let parsed = parser
                .parse(&ScreenDefinition::of_type(screen.name()))
                .unwrap();
            assert_eq!(parsed.screen, screen);
            assert_eq!(parsed.label, screen.default_label());
        }
    }

    #[test]
    fn blank_labels_fall_back_to_default() {
        let parser = create_parser_by_name("Slot").unwrap();
        let mut definition = ScreenDefinition::of_type("Slot");
        definition.label = Some("   ".to_string());
        let parsed = parser.parse(&definition).unwrap();
        assert_eq!(parsed.label, ScreenId::Slot.default_label());

        definition.label = Some("When works for you?".to_string());
        assert_eq!(parser.parse(&definition).unwrap().label, "When works for you?");
    }
}
