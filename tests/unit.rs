//! Unit tests for core bookflow value types.
mod common;
use bookflow::data::{ClinicDirectory, Money, ProviderRole};
use bookflow::draft::DraftUpdate;
use bookflow::error::UnknownVariant;
use bookflow::flow::*;
use bookflow::sequencer::FlowPosition;
use common::*;

#[test]
fn test_flow_key_display() {
    assert_eq!(format!("{}", NEW_SINGLE), "new+single");
    assert_eq!(format!("{}", RETURNING_FAMILY), "returning+family");
    assert!(RETURNING_COMBO.is_returning());
    assert!(RETURNING_COMBO.is_combo());
    assert!(!RETURNING_COMBO.is_family());
}

#[test]
fn test_flow_key_parts_parse() {
    assert_eq!("New".parse::<PatientType>(), Ok(PatientType::New));
    assert_eq!(" existing ".parse::<PatientType>(), Ok(PatientType::Returning));
    assert_eq!("FAMILY".parse::<AppointmentPath>(), Ok(AppointmentPath::Family));
    assert_eq!(
        "walk-in".parse::<PatientType>(),
        Err(UnknownVariant::new("patient type", "walk-in"))
    );
    assert!("triple".parse::<AppointmentPath>().is_err());
}

#[test]
fn test_all_flow_keys_are_distinct() {
    let keys: Vec<_> = FlowKey::all().collect();
    assert_eq!(keys.len(), 6);
    for (i, a) in keys.iter().enumerate() {
        for b in &keys[i + 1..] {
            assert_ne!(a, b);
        }
    }
}

#[test]
fn test_screen_id_names_round_trip() {
    for screen in ScreenId::ALL {
        assert_eq!(screen.name().parse::<ScreenId>(), Ok(screen));
        assert_eq!(screen.to_string(), screen.name());
    }
    assert!("welcome".parse::<ScreenId>().is_err());
}

#[test]
fn test_terminal_screens_accept_nothing() {
    for screen in ScreenId::ALL {
        assert_eq!(screen.accepts().is_none(), screen.is_terminal(), "{}", screen);
    }
}

#[test]
fn test_screens_allowed_per_flow() {
    assert!(ScreenId::Welcome.allowed_in(NEW_FAMILY));
    assert!(ScreenId::PatientInfo.allowed_in(NEW_COMBO));
    assert!(!ScreenId::PatientInfo.allowed_in(NEW_FAMILY));
    assert!(ScreenId::PatientLookup.allowed_in(RETURNING_SINGLE));
    assert!(!ScreenId::PatientLookup.allowed_in(NEW_SINGLE));
    assert!(ScreenId::ReturningFamilySetup.allowed_in(RETURNING_FAMILY));
    assert!(!ScreenId::ReturningFamilySetup.allowed_in(NEW_FAMILY));
    assert!(!ScreenId::ComboSlot.allowed_in(RETURNING_SINGLE));
    assert!(ScreenId::Confirmation.allowed_in(RETURNING_COMBO));
    assert!(!ScreenId::Confirmation.allowed_in(RETURNING_FAMILY));
    assert!(ScreenId::FamilyConfirmation.allowed_in(NEW_FAMILY));
}

#[test]
fn test_update_kinds_match_screens() {
    let update = DraftUpdate::selection(NEW_COMBO);
    assert_eq!(update.kind(), UpdateKind::Selection);
    assert_eq!(ScreenId::Welcome.accepts(), Some(UpdateKind::Selection));
    assert_eq!(
        ScreenId::ReturningFamilyProvider.accepts(),
        ScreenId::FamilyProvider.accepts()
    );
    assert!(UpdateKind::Payment.applies_to(NEW_FAMILY));
    assert!(!UpdateKind::FamilySelection.applies_to(NEW_FAMILY));
}

#[test]
fn test_flow_position_steps() {
    let start = FlowPosition::start();
    assert!(start.is_start());
    assert_eq!(start.step(), 1);
    assert_eq!(start.next().step(), 2);
    assert_eq!(start.previous(), start);
    assert_eq!(FlowPosition::at(7).previous().step(), 6);
    assert_eq!(FlowPosition::default(), start);
}

#[test]
fn test_money_display() {
    assert_eq!(Money::new(2500, "USD").to_string(), "USD 25.00");
    assert_eq!(Money::new(5, "EUR").to_string(), "EUR 0.05");
    assert_eq!(Money::new(0, "USD").to_string(), "USD 0.00");
}

#[test]
fn test_clinic_directory_lookups() {
    let clinic = ClinicDirectory::default();
    assert_eq!(clinic.location("loc-northside").map(|l| l.name.as_str()), Some("Northside"));
    assert!(clinic.location("loc-uptown").is_none());

    let preventive: Vec<_> = clinic.procedures_in("preventive").map(|p| p.id.as_str()).collect();
    assert_eq!(preventive, vec!["exam", "cleaning"]);

    let hygienists: Vec<_> = clinic
        .providers_at("loc-northside", Some(ProviderRole::Hygienist))
        .map(|p| p.id.as_str())
        .collect();
    assert_eq!(hygienists, vec!["prov-kim", "prov-patel"]);
    assert_eq!(clinic.providers_at("loc-downtown", None).count(), 3);
}
