//! Tests for resolving, advancing and retreating through the standard flows.
mod common;
use bookflow::draft::{BookingDraft, DraftUpdate, VerificationMethod};
use bookflow::error::{DraftError, SequenceError};
use bookflow::flow::{FlowKey, ScreenId, UpdateKind};
use bookflow::recipe::FlowDefinition;
use bookflow::prelude::Compiler;
use bookflow::sequencer::{CloseDecision, FlowPosition, ScreenProps, Sequencer};
use common::*;

#[test]
fn step_one_is_welcome_for_every_flow_and_draft() {
    let sequencer = sequencer();

    let view = sequencer
        .current_screen(FlowPosition::start(), &BookingDraft::Unselected)
        .unwrap();
    assert_eq!(view.screen, ScreenId::Welcome);

    for (key, total) in STANDARD_TOTALS {
        for step in 1..total {
            let (_, draft) = walk_to(&sequencer, key, step);
            let view = sequencer.current_screen(FlowPosition::start(), &draft).unwrap();
            assert_eq!(view.screen, ScreenId::Welcome, "{} after step {}", key, step);
            assert_eq!(view.step, 1);
        }
    }
}

#[test]
fn total_steps_match_the_flow_table() {
    let sequencer = sequencer();
    for (key, total) in STANDARD_TOTALS {
        let draft = BookingDraft::empty_for(key);
        assert_eq!(sequencer.total_steps(&draft).unwrap(), total, "{}", key);
        assert_eq!(sequencer.catalog().get(key).unwrap().total_steps(), total);
    }
    assert_eq!(sequencer.total_steps(&BookingDraft::Unselected).unwrap(), 11);
}

#[test]
fn advance_then_retreat_returns_to_the_same_step() {
    let sequencer = sequencer();
    for (key, total) in STANDARD_TOTALS {
        for step in 2..total {
            let (position, mut draft) = walk_to(&sequencer, key, step);
            let screen = sequencer.current_screen(position, &draft).unwrap().screen;
            let update = update_for(screen, key, &draft);
            let next = sequencer.advance(position, &mut draft, update).unwrap();
            assert_eq!(next.step(), step + 1);
            assert_eq!(Sequencer::retreat(next), position, "{} at step {}", key, step);
        }
    }
}

#[test]
fn progress_is_monotone_and_full_only_at_the_end() {
    let sequencer = sequencer();
    for (key, total) in STANDARD_TOTALS {
        let (_, draft) = walk_to(&sequencer, key, total);
        let mut previous = 0;
        for step in 1..=total {
            let position = FlowPosition::at(step);
            let percent = sequencer.progress_percent(position, &draft);
            assert!(percent >= previous, "{} step {}", key, step);
            assert_eq!(percent == 100, step == total, "{} step {}", key, step);
            previous = percent;
        }
    }
}

#[test]
fn only_confirmation_screens_are_terminal() {
    let sequencer = sequencer();
    for (key, total) in STANDARD_TOTALS {
        let (_, draft) = walk_to(&sequencer, key, total);
        for step in 1..=total {
            let position = FlowPosition::at(step);
            let screen = sequencer.current_screen(position, &draft).unwrap().screen;
            let expected = matches!(screen, ScreenId::Confirmation | ScreenId::FamilyConfirmation);
            assert_eq!(sequencer.is_terminal(position, &draft), expected);
            assert_eq!(expected, step == total);
        }
    }
}

#[test]
fn new_single_moves_from_welcome_to_location() {
    let sequencer = sequencer();
    let (position, mut draft) = Sequencer::start();
    let position = sequencer
        .advance(position, &mut draft, DraftUpdate::selection(NEW_SINGLE))
        .unwrap();

    let view = sequencer.current_screen(position, &draft).unwrap();
    assert_eq!(view.screen, ScreenId::Location);
    assert_eq!(view.label, "Choose a location");
    assert_eq!(view.step, 2);
    assert_eq!(view.total_steps, 11);
    assert_eq!(sequencer.progress_percent(position, &draft), 18);
}

#[test]
fn returning_family_starts_with_patient_details() {
    let sequencer = sequencer();
    let (position, draft) = walk_to(&sequencer, RETURNING_FAMILY, 2);
    let view = sequencer.current_screen(position, &draft).unwrap();
    assert_eq!(view.screen, ScreenId::PatientDetailsEntry);
}

#[test]
fn close_needs_confirmation_only_mid_flow() {
    let sequencer = sequencer();
    assert_eq!(
        sequencer.close_decision(FlowPosition::start(), &BookingDraft::Unselected),
        CloseDecision::CloseImmediately
    );

    for (key, total) in STANDARD_TOTALS {
        let (_, draft) = walk_to(&sequencer, key, total);
        for step in 1..=total {
            let expected = if step == 1 || step == total {
                CloseDecision::CloseImmediately
            } else {
                CloseDecision::ConfirmRequired
            };
            assert_eq!(
                sequencer.close_decision(FlowPosition::at(step), &draft),
                expected,
                "{} step {}",
                key,
                step
            );
        }
    }
}

#[test]
fn progress_before_selection_uses_the_longest_flow() {
    let sequencer = sequencer();
    assert_eq!(
        sequencer.progress_percent(FlowPosition::start(), &BookingDraft::Unselected),
        9
    );
}

#[test]
fn retreat_never_goes_before_welcome() {
    assert_eq!(Sequencer::retreat(FlowPosition::start()), FlowPosition::start());
    assert_eq!(FlowPosition::at(0), FlowPosition::start());
    assert_eq!(Sequencer::retreat(FlowPosition::at(3)).step(), 2);
}

#[test]
fn steps_past_welcome_need_a_selected_flow() {
    let sequencer = sequencer();
    let err = sequencer
        .current_screen(FlowPosition::at(2), &BookingDraft::Unselected)
        .unwrap_err();
    assert_eq!(err, SequenceError::FlowNotSelected { step: 2 });
}

#[test]
fn steps_past_the_end_are_out_of_range() {
    let sequencer = sequencer();
    let draft = BookingDraft::empty_for(NEW_COMBO);
    let err = sequencer
        .current_screen(FlowPosition::at(11), &draft)
        .unwrap_err();
    assert_eq!(
        err,
        SequenceError::StepOutOfRange {
            step: 11,
            total: 10,
            key: NEW_COMBO
        }
    );
    assert!(!sequencer.is_terminal(FlowPosition::at(11), &draft));
    assert_eq!(sequencer.progress_percent(FlowPosition::at(11), &draft), 0);
    assert_eq!(sequencer.progress_percent(FlowPosition::at(40), &draft), 0);
    assert_eq!(
        sequencer.progress_percent(FlowPosition::at(2), &BookingDraft::Unselected),
        0
    );
}

#[test]
fn advancing_from_the_terminal_screen_fails() {
    let sequencer = sequencer();
    let (position, mut draft) = walk_to(&sequencer, NEW_FAMILY, 10);
    let before = draft.clone();
    let err = sequencer
        .advance(position, &mut draft, DraftUpdate::selection(NEW_FAMILY))
        .unwrap_err();
    assert_eq!(err, SequenceError::FlowComplete { key: NEW_FAMILY });
    assert_eq!(draft, before);
}

#[test]
fn advance_rejects_updates_for_other_screens() {
    let sequencer = sequencer();
    let (position, mut draft) = walk_to(&sequencer, NEW_SINGLE, 2);
    let err = sequencer
        .advance(
            position,
            &mut draft,
            DraftUpdate::Category {
                category_id: "preventive".to_string(),
            },
        )
        .unwrap_err();
    assert_eq!(
        err,
        SequenceError::UnexpectedUpdate {
            screen: ScreenId::Location,
            expected: UpdateKind::Location,
            found: UpdateKind::Category,
        }
    );
    assert_eq!(draft.location_id(), None);
}

#[test]
fn draft_errors_surface_through_advance() {
    let sequencer = sequencer();
    let (position, mut draft) = walk_to(&sequencer, NEW_FAMILY, 2);
    let err = sequencer
        .advance(
            position,
            &mut draft,
            DraftUpdate::FamilyMembers {
                members: Vec::new(),
            },
        )
        .unwrap_err();
    assert_eq!(err, SequenceError::Draft(DraftError::EmptyFamily));
}

#[test]
fn flows_missing_from_a_custom_catalog_are_reported() {
    let catalog = Compiler::builder(single_flow_definition())
        .build()
        .compile()
        .unwrap();
    let sequencer = Sequencer::new(catalog);
    let draft = BookingDraft::empty_for(NEW_COMBO);

    let err = sequencer
        .current_screen(FlowPosition::at(2), &draft)
        .unwrap_err();
    assert_eq!(err, SequenceError::UnknownFlow(NEW_COMBO));
    assert_eq!(
        sequencer.total_steps(&draft),
        Err(SequenceError::UnknownFlow(NEW_COMBO))
    );
    // Welcome is still shared, so the patient can pick a flow the catalog has.
    let view = sequencer.current_screen(FlowPosition::start(), &draft).unwrap();
    assert_eq!(view.screen, ScreenId::Welcome);
    assert_eq!(view.total_steps, 8);
    assert_eq!(
        sequencer.close_decision(FlowPosition::start(), &draft),
        CloseDecision::CloseImmediately
    );

    let mut draft = draft;
    let position = sequencer
        .advance(FlowPosition::start(), &mut draft, DraftUpdate::selection(NEW_SINGLE))
        .unwrap();
    assert_eq!(draft, BookingDraft::empty_for(NEW_SINGLE));
    assert_eq!(
        sequencer.current_screen(position, &draft).unwrap().screen,
        ScreenId::Location
    );
}

#[test]
fn selecting_a_flow_the_catalog_lacks_leaves_the_draft_alone() {
    let catalog = Compiler::builder(single_flow_definition())
        .build()
        .compile()
        .unwrap();
    let sequencer = Sequencer::new(catalog);
    let (position, mut draft) = Sequencer::start();

    let err = sequencer
        .advance(position, &mut draft, DraftUpdate::selection(NEW_FAMILY))
        .unwrap_err();
    assert_eq!(err, SequenceError::UnknownFlow(NEW_FAMILY));
    assert_eq!(draft, BookingDraft::Unselected);

    // An earlier, valid choice survives a rejected reselection.
    let next = sequencer
        .advance(position, &mut draft, DraftUpdate::selection(NEW_SINGLE))
        .unwrap();
    sequencer
        .advance(
            next,
            &mut draft,
            DraftUpdate::Location {
                location_id: "loc-downtown".to_string(),
            },
        )
        .unwrap();
    assert!(sequencer
        .advance(position, &mut draft, DraftUpdate::selection(RETURNING_COMBO))
        .is_err());
    assert_eq!(draft.flow_key(), Some(NEW_SINGLE));
    assert_eq!(draft.location_id(), Some("loc-downtown"));
}

#[test]
fn welcome_uses_the_selected_flows_total() {
    let sequencer = sequencer();
    let draft = BookingDraft::empty_for(NEW_FAMILY);
    let view = sequencer.current_screen(FlowPosition::start(), &draft).unwrap();
    assert_eq!(view.screen, ScreenId::Welcome);
    assert_eq!(view.total_steps, 10);
    assert_eq!(sequencer.progress_percent(FlowPosition::start(), &draft), 10);
}

#[test]
fn an_empty_definition_never_reaches_the_sequencer() {
    let result = Compiler::builder(FlowDefinition::default()).build().compile();
    assert!(result.is_err());
}

#[test]
fn back_navigation_keeps_entered_data() {
    let sequencer = sequencer();
    let (position, mut draft) = walk_to(&sequencer, NEW_SINGLE, 6);
    assert_eq!(
        sequencer.current_screen(position, &draft).unwrap().screen,
        ScreenId::Slot
    );

    let back = Sequencer::retreat(Sequencer::retreat(position));
    let view = sequencer.current_screen(back, &draft).unwrap();
    assert_eq!(view.screen, ScreenId::Procedure);
    assert_eq!(
        view.props,
        ScreenProps::Procedure {
            location_id: Some("loc-downtown".to_string()),
            category_id: Some("preventive".to_string()),
            selected: Some("cleaning".to_string()),
        }
    );

    // Re-submitting an earlier screen does not clear later choices.
    let forward = sequencer
        .advance(
            back,
            &mut draft,
            DraftUpdate::Procedure {
                procedure_id: "filling".to_string(),
            },
        )
        .unwrap();
    let provider = draft.single().unwrap();
    assert_eq!(provider.procedure_id.as_deref(), Some("filling"));
    assert_eq!(provider.provider_id.as_deref(), Some("prov-kim"));
    assert_eq!(forward.step(), 5);
}

#[test]
fn reselecting_a_different_flow_at_welcome_starts_over() {
    let sequencer = sequencer();
    let (_, mut draft) = walk_to(&sequencer, NEW_SINGLE, 5);
    assert!(draft.location_id().is_some());

    let position = sequencer
        .advance(FlowPosition::start(), &mut draft, DraftUpdate::selection(NEW_COMBO))
        .unwrap();
    assert_eq!(draft, BookingDraft::empty_for(NEW_COMBO));
    assert_eq!(sequencer.total_steps(&draft).unwrap(), 10);
    assert_eq!(
        sequencer.current_screen(position, &draft).unwrap().screen,
        ScreenId::Location
    );
}

#[test]
fn phone_verify_reads_the_contact_chosen_earlier() {
    let sequencer = sequencer();
    let (position, draft) = walk_to(&sequencer, NEW_SINGLE, 9);
    let view = sequencer.current_screen(position, &draft).unwrap();
    assert_eq!(view.screen, ScreenId::PhoneVerify);
    assert_eq!(
        view.props,
        ScreenProps::PhoneVerify {
            method: VerificationMethod::Sms,
            contact: Some("5551234567".to_string()),
            verified: false,
        }
    );
}

#[test]
fn returning_patients_verify_the_phone_on_record() {
    let sequencer = sequencer();
    let (position, draft) = walk_to(&sequencer, RETURNING_COMBO, 4);
    let view = sequencer.current_screen(position, &draft).unwrap();
    assert_eq!(view.screen, ScreenId::PhoneVerify);
    match view.props {
        ScreenProps::PhoneVerify { contact, .. } => {
            assert_eq!(contact.as_deref(), Some("5559876543"))
        }
        other => panic!("unexpected props {:?}", other),
    }
}

#[test]
fn every_flow_walks_to_its_confirmation() {
    let sequencer = sequencer();
    for key in FlowKey::all() {
        let total = sequencer.catalog().get(key).unwrap().total_steps();
        let (position, draft) = walk_to(&sequencer, key, total);
        assert!(sequencer.is_terminal(position, &draft));
        assert!(draft.is_payment_complete(), "{}", key);
        assert_eq!(draft.flow_key(), Some(key));
    }
}
