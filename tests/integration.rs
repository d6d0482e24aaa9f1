//! Integration tests for bookflow
//!
//! End-to-end tests that drive whole booking sessions against the mock collaborators.
//!
mod common;
use bookflow::data::{ReplayScript, ScriptEvent};
use bookflow::prelude::*;
use common::*;
use std::sync::Arc;

const CODE: &str = "123456";

/// Books `key` from Welcome to its confirmation screen, calling collaborators where needed.
async fn book(
    session: &mut BookingSession,
    services: &Services,
    clinic: &ClinicDirectory,
    key: FlowKey,
) -> ScreenView {
    let mut view = session.open().expect("widget opens");
    while !session.sequencer().is_terminal(session.position(), session.draft()) {
        let update = match view.screen {
            ScreenId::PatientLookup | ScreenId::PhoneVerify | ScreenId::Payment => services
                .collect_update(&view, clinic, CODE)
                .await
                .expect("mock collaborators succeed"),
            screen => update_for(screen, key, session.draft()),
        };
        view = session.continue_with(update).expect("update accepted");
    }
    view
}

#[cfg(test)]
mod integration_tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_every_flow_books_end_to_end() {
        let clinic = Arc::new(ClinicDirectory::default());
        let services = Services::mock(clinic.clone(), &ServiceConfig::default());
        let sequencer = Sequencer::standard().expect("standard flows compile");

        for key in FlowKey::all() {
            let mut session = BookingSession::new(sequencer.clone(), SessionConfig::default());
            let view = book(&mut session, &services, &clinic, key).await;

            assert!(view.screen.is_terminal(), "{} ended on {}", key, view.screen);
            assert_eq!(view.step, view.total_steps);
            assert_eq!(session.progress_percent(), Ok(100));

            let summary = match &view.props {
                ScreenProps::Confirmation { summary } => summary.clone(),
                other => panic!("unexpected props {:?}", other),
            };
            assert_eq!(summary.key, Some(key));
            let payment = summary.payment.clone().expect("deposit paid");
            assert!(payment.reference.starts_with("PAY-"));
            assert_eq!(payment.amount, clinic.deposit_for(&summary));

            println!("{}:", key);
            println!("{}", SummaryFormatter::booking_summary(&summary, &clinic));

            assert_eq!(session.request_close(), Ok(CloseOutcome::Closing));
            session.finish_close().await.expect("close completes");
            assert_eq!(session.state(), WidgetState::Closed);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_returning_family_uses_the_found_record() {
        let clinic = Arc::new(ClinicDirectory::default());
        let services = Services::mock(clinic.clone(), &ServiceConfig::default());
        let mut session =
            BookingSession::new(Sequencer::standard().unwrap(), SessionConfig::default());

        book(&mut session, &services, &clinic, RETURNING_FAMILY).await;

        let family = session.draft().family().expect("family draft");
        let record = family.common.record().expect("record found by lookup");
        assert_eq!(record.patient_id, "pt-lee");
        let names: Vec<_> = family.members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Sam Lee", "Alex Lee"]);
        assert!(family.common.is_verified());
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoning_mid_flow_discards_the_draft() {
        let clinic = Arc::new(ClinicDirectory::default());
        let mut session =
            BookingSession::new(Sequencer::standard().unwrap(), SessionConfig::default());
        session.open().unwrap();

        for _ in 0..4 {
            let screen = session.screen().unwrap().screen;
            let update = update_for(screen, NEW_SINGLE, session.draft());
            session.continue_with(update).unwrap();
        }
        let summary = BookingSummary::from_draft(session.draft());
        assert_eq!(clinic.deposit_for(&summary), Money::new(2500, "USD"));

        assert_eq!(session.request_close(), Ok(CloseOutcome::ConfirmationShown));
        session.confirm_leave().unwrap();
        session.finish_close().await.unwrap();

        let view = session.open().unwrap();
        assert_eq!(view.screen, ScreenId::Welcome);
        assert_eq!(session.draft(), &BookingDraft::Unselected);
    }

    #[test]
    fn test_artifact_round_trip_then_sequence() {
        let catalog = FlowCatalog::standard().expect("standard flows compile");
        let bytes = CompiledCatalog::new(catalog.clone())
            .to_bytes()
            .expect("catalog serializes");
        let loaded = CompiledCatalog::from_bytes(&bytes)
            .expect("catalog deserializes")
            .into_catalog();
        assert_eq!(loaded, catalog);

        let fresh = Sequencer::new(catalog);
        let restored = Sequencer::new(loaded);
        for key in FlowKey::all() {
            let total = fresh.catalog().get(key).unwrap().total_steps();
            for step in 1..=total {
                let (position, draft) = walk_to(&fresh, key, step);
                assert_eq!(
                    fresh.current_screen(position, &draft),
                    restored.current_screen(position, &draft),
                    "{} step {}",
                    key,
                    step
                );
            }
        }
        println!("Artifact size: {} bytes", bytes.len());
    }

    #[test]
    fn test_replay_script_parses_and_drives_a_session() {
        let json = r#"{
            "name": "pick a flow then leave",
            "events": [
                { "event": "advance", "update": { "kind": "selection", "patient_type": "new", "appointment_path": "combo" } },
                { "event": "advance", "update": { "kind": "location", "location_id": "loc-northside" } },
                { "event": "back" },
                { "event": "close" },
                { "event": "cancel_leave" },
                { "event": "close" },
                { "event": "confirm_leave" }
            ]
        }"#;
        let script: ReplayScript = serde_json::from_str(json).expect("script parses");
        assert_eq!(script.events.len(), 7);

        let mut session =
            BookingSession::new(Sequencer::standard().unwrap(), SessionConfig::default());
        session.open().unwrap();
        let mut outcomes = Vec::new();
        for event in script.events {
            match event {
                ScriptEvent::Advance { update } => {
                    session.continue_with(update).unwrap();
                }
                ScriptEvent::Back => {
                    session.back().unwrap();
                }
                ScriptEvent::Close => outcomes.push(session.request_close().unwrap()),
                ScriptEvent::ConfirmLeave => outcomes.push(session.confirm_leave().unwrap()),
                ScriptEvent::CancelLeave => session.cancel_leave().unwrap(),
                ScriptEvent::Auto => panic!("no collaborator screens in this script"),
            }
        }

        assert_eq!(
            outcomes,
            vec![
                CloseOutcome::ConfirmationShown,
                CloseOutcome::ConfirmationShown,
                CloseOutcome::Closing
            ]
        );
        assert_eq!(session.state(), WidgetState::Closing);
        assert_eq!(session.draft().location_id(), Some("loc-northside"));
        assert_eq!(session.position().step(), 2);
    }
}
