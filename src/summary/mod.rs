use crate::draft::{BookingDraft, PaymentConfirmation};
use crate::flow::FlowKey;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

mod formatter;

pub use formatter::SummaryFormatter;

/// Procedure ids used for the two halves of a combo booking.
pub const COMBO_EXAM_PROCEDURE: &str = "exam";
pub const COMBO_HYGIENE_PROCEDURE: &str = "cleaning";

/// One appointment within a booking.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AppointmentLine {
    pub patient: Option<String>,
    pub procedure_id: Option<String>,
    pub provider_id: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
}

/// A flattened, path-independent view of a draft, read by the payment and confirmation screens.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct BookingSummary {
    pub key: Option<FlowKey>,
    pub location_id: Option<String>,
    pub appointments: Vec<AppointmentLine>,
    pub contact: Option<String>,
    pub payment: Option<PaymentConfirmation>,
}

impl BookingSummary {
    pub fn from_draft(draft: &BookingDraft) -> Self {
        let Some(common) = draft.common() else {
            return Self::default();
        };
        let patient = draft.patient_name();

        let appointments = match draft {
            BookingDraft::Unselected => Vec::new(),
            BookingDraft::Single(d) => vec![AppointmentLine {
                patient,
                procedure_id: d.procedure_id.clone(),
                provider_id: d.provider_id.clone(),
                date: d.date,
                time: d.time,
            }],
            BookingDraft::Combo(d) => vec![
                AppointmentLine {
                    patient: patient.clone(),
                    procedure_id: Some(COMBO_EXAM_PROCEDURE.to_string()),
                    provider_id: d.exam_provider_id.clone(),
                    date: d.date,
                    time: d.exam_time,
                },
                AppointmentLine {
                    patient,
                    procedure_id: Some(COMBO_HYGIENE_PROCEDURE.to_string()),
                    provider_id: d.hygiene_provider_id.clone(),
                    date: d.date,
                    time: d.hygiene_time,
                },
            ],
            BookingDraft::Family(d) => d
                .members
                .iter()
                .map(|member| AppointmentLine {
                    patient: Some(member.name.clone()),
                    procedure_id: None,
                    provider_id: d.provider_for(&member.member_id).map(str::to_string),
                    date: d.date,
                    time: d.time_for(&member.member_id),
                })
                .collect(),
        };

        Self {
            key: draft.flow_key(),
            location_id: common.location_id.clone(),
            appointments,
            contact: draft.primary_contact().map(str::to_string),
            payment: common.payment.clone(),
        }
    }
}
