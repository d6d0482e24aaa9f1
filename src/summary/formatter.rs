use super::{AppointmentLine, BookingSummary};
use crate::data::ClinicDirectory;
use crate::flow::CompiledFlow;
use crate::sequencer::ScreenView;
use chrono::{NaiveDate, NaiveTime};
use itertools::Itertools;

/// Formats progress and booking summaries into human-readable strings
pub struct SummaryFormatter;

impl SummaryFormatter {
    /// "Step 2 of 11: Choose a location"
    pub fn progress_label(view: &ScreenView) -> String {
        format!("Step {} of {}: {}", view.step, view.total_steps, view.label)
    }

    /// The screens of a flow in order, e.g. "Welcome -> Location -> ...".
    pub fn flow_outline(flow: &CompiledFlow) -> String {
        flow.screens.iter().map(|d| d.screen).join(" -> ")
    }

    /// A multi-line summary of the booking, resolving ids against the clinic directory.
    pub fn booking_summary(summary: &BookingSummary, clinic: &ClinicDirectory) -> String {
        let mut lines = Vec::new();

        if let Some(location_id) = &summary.location_id {
            let location = match clinic.location(location_id) {
                Some(location) => format!("{} ({})", location.name, location.address),
                None => location_id.clone(),
            };
            lines.push(format!("Location: {}", location));
        }

        lines.extend(
            summary
                .appointments
                .iter()
                .map(|appointment| Self::format_appointment(appointment, clinic)),
        );

        if let Some(contact) = &summary.contact {
            lines.push(format!("Contact: {}", contact));
        }

        match &summary.payment {
            Some(payment) => lines.push(format!(
                "Deposit paid: {} (ref {})",
                payment.amount, payment.reference
            )),
            None if summary.key.is_some() => {
                lines.push(format!("Deposit due: {}", clinic.deposit_for(summary)))
            }
            None => {}
        }

        lines.join("\n")
    }

    fn format_appointment(appointment: &AppointmentLine, clinic: &ClinicDirectory) -> String {
        let service = appointment
            .procedure_id
            .as_deref()
            .map(|id| clinic.procedure(id).map_or(id, |p| p.name.as_str()))
            .unwrap_or("Visit");

        let mut line = service.to_string();
        if let Some(provider_id) = &appointment.provider_id {
            let provider = clinic
                .provider(provider_id)
                .map_or(provider_id.as_str(), |p| p.name.as_str());
            line.push_str(&format!(" with {}", provider));
        }
        if let Some(when) = Self::format_slot(appointment.date, appointment.time) {
            line.push_str(&format!(" on {}", when));
        }
        if let Some(patient) = &appointment.patient {
            line.push_str(&format!(" for {}", patient));
        }
        line
    }

    fn format_slot(date: Option<NaiveDate>, time: Option<NaiveTime>) -> Option<String> {
        match (date, time) {
            (Some(date), Some(time)) => Some(format!(
                "{} at {}",
                date.format("%a %b %-d, %Y"),
                time.format("%-I:%M %p")
            )),
            (Some(date), None) => Some(date.format("%a %b %-d, %Y").to_string()),
            _ => None,
        }
    }
}
