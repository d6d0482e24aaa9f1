use super::booking::{BookingCommon, BookingDraft, FamilyBookingDraft};
use super::model::*;
use crate::data::Money;
use crate::error::DraftError;
use crate::flow::{AppointmentPath, FlowKey, PatientType, UpdateKind};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// A typed partial update produced by a screen's "continue" action.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DraftUpdate {
    Selection {
        patient_type: PatientType,
        appointment_path: AppointmentPath,
    },
    Location {
        location_id: String,
    },
    Category {
        category_id: String,
    },
    Procedure {
        procedure_id: String,
    },
    Provider {
        provider_id: String,
    },
    Slot {
        date: NaiveDate,
        time: NaiveTime,
    },
    PatientInfo(PatientInfo),
    VerificationMethod {
        method: VerificationMethod,
        contact: String,
    },
    Verified {
        method: VerificationMethod,
        contact: String,
    },
    Payment(PaymentConfirmation),
    PatientDetails(PatientDetails),
    PatientFound(PatientRecord),
    ExamProvider {
        provider_id: String,
    },
    HygieneProvider {
        provider_id: String,
    },
    ComboSlot {
        date: NaiveDate,
        exam_time: NaiveTime,
        hygiene_time: NaiveTime,
    },
    FamilyMembers {
        members: Vec<FamilyMember>,
    },
    FamilySelection {
        member_ids: Vec<String>,
    },
    FamilyProviders {
        assignments: Vec<ProviderAssignment>,
    },
    FamilySlot {
        date: NaiveDate,
        times: Vec<MemberTime>,
    },
    FamilyContact(ContactInfo),
}

impl DraftUpdate {
    pub fn selection(key: FlowKey) -> Self {
        DraftUpdate::Selection {
            patient_type: key.patient,
            appointment_path: key.path,
        }
    }

    pub fn payment(reference: impl Into<String>, amount: Money) -> Self {
        DraftUpdate::Payment(PaymentConfirmation {
            reference: reference.into(),
            amount,
        })
    }

    pub fn kind(&self) -> UpdateKind {
        match self {
            DraftUpdate::Selection { .. } => UpdateKind::Selection,
            DraftUpdate::Location { .. } => UpdateKind::Location,
            DraftUpdate::Category { .. } => UpdateKind::Category,
            DraftUpdate::Procedure { .. } => UpdateKind::Procedure,
            DraftUpdate::Provider { .. } => UpdateKind::Provider,
            DraftUpdate::Slot { .. } => UpdateKind::Slot,
            DraftUpdate::PatientInfo(_) => UpdateKind::PatientInfo,
            DraftUpdate::VerificationMethod { .. } => UpdateKind::VerificationMethod,
            DraftUpdate::Verified { .. } => UpdateKind::Verified,
            DraftUpdate::Payment(_) => UpdateKind::Payment,
            DraftUpdate::PatientDetails(_) => UpdateKind::PatientDetails,
            DraftUpdate::PatientFound(_) => UpdateKind::PatientFound,
            DraftUpdate::ExamProvider { .. } => UpdateKind::ExamProvider,
            DraftUpdate::HygieneProvider { .. } => UpdateKind::HygieneProvider,
            DraftUpdate::ComboSlot { .. } => UpdateKind::ComboSlot,
            DraftUpdate::FamilyMembers { .. } => UpdateKind::FamilyMembers,
            DraftUpdate::FamilySelection { .. } => UpdateKind::FamilySelection,
            DraftUpdate::FamilyProviders { .. } => UpdateKind::FamilyProviders,
            DraftUpdate::FamilySlot { .. } => UpdateKind::FamilySlot,
            DraftUpdate::FamilyContact(_) => UpdateKind::FamilyContact,
        }
    }
}

impl BookingDraft {
    /// Merges a partial update into the draft.
    ///
    /// A `Selection` for a different flow replaces the draft with an empty one for that
    /// flow; re-selecting the current flow keeps everything. Any other update must apply
    /// to the draft's flow, otherwise `DraftError::NotApplicable` is returned and the
    /// draft is left untouched.
    pub fn apply(&mut self, update: DraftUpdate) -> Result<(), DraftError> {
        if let DraftUpdate::Selection {
            patient_type,
            appointment_path,
        } = update
        {
            let key = FlowKey::new(patient_type, appointment_path);
            if self.flow_key() != Some(key) {
                tracing::debug!(from = ?self.flow_key(), to = %key, "starting a fresh draft");
                *self = BookingDraft::empty_for(key);
            }
            return Ok(());
        }

        let key = self.flow_key().ok_or(DraftError::NoPathSelected)?;
        let kind = update.kind();
        if !kind.applies_to(key) {
            return Err(DraftError::NotApplicable { update: kind, key });
        }

        match (self, update) {
            (draft, DraftUpdate::Location { location_id }) => {
                common(draft)?.location_id = Some(location_id);
            }
            (draft, DraftUpdate::VerificationMethod { method, contact }) => {
                common(draft)?.verification = Some(Verification {
                    method,
                    contact,
                    verified: false,
                });
            }
            (draft, DraftUpdate::Verified { method, contact }) => {
                common(draft)?.verification = Some(Verification {
                    method,
                    contact,
                    verified: true,
                });
            }
            (draft, DraftUpdate::Payment(confirmation)) => {
                common(draft)?.payment = Some(confirmation);
            }
            (draft, DraftUpdate::PatientDetails(details)) => {
                let common = common(draft)?;
                let unchanged = common
                    .identity
                    .as_ref()
                    .is_some_and(|i| i.details.as_ref() == Some(&details));
                // New details invalidate any record found for the old ones.
                if !unchanged {
                    common.identity = Some(Identity {
                        details: Some(details),
                        record: None,
                    });
                }
            }
            (draft, DraftUpdate::PatientFound(record)) => {
                let identity = common(draft)?.identity.get_or_insert(Identity {
                    details: None,
                    record: None,
                });
                identity.record = Some(record);
            }

            (BookingDraft::Single(d), DraftUpdate::Category { category_id }) => {
                d.category_id = Some(category_id);
            }
            (BookingDraft::Single(d), DraftUpdate::Procedure { procedure_id }) => {
                d.procedure_id = Some(procedure_id);
            }
            (BookingDraft::Single(d), DraftUpdate::Provider { provider_id }) => {
                d.provider_id = Some(provider_id);
            }
            (BookingDraft::Single(d), DraftUpdate::Slot { date, time }) => {
                d.date = Some(date);
                d.time = Some(time);
            }
            (BookingDraft::Single(d), DraftUpdate::PatientInfo(info)) => {
                d.patient = Some(info);
            }

            (BookingDraft::Combo(d), DraftUpdate::PatientInfo(info)) => {
                d.patient = Some(info);
            }
            (BookingDraft::Combo(d), DraftUpdate::ExamProvider { provider_id }) => {
                d.exam_provider_id = Some(provider_id);
            }
            (BookingDraft::Combo(d), DraftUpdate::HygieneProvider { provider_id }) => {
                d.hygiene_provider_id = Some(provider_id);
            }
            (
                BookingDraft::Combo(d),
                DraftUpdate::ComboSlot {
                    date,
                    exam_time,
                    hygiene_time,
                },
            ) => {
                d.date = Some(date);
                d.exam_time = Some(exam_time);
                d.hygiene_time = Some(hygiene_time);
            }

            (BookingDraft::Family(d), DraftUpdate::FamilyMembers { members }) => {
                if members.is_empty() {
                    return Err(DraftError::EmptyFamily);
                }
                d.members = members;
                prune_family_choices(d);
            }
            (BookingDraft::Family(d), DraftUpdate::FamilySelection { member_ids }) => {
                if member_ids.is_empty() {
                    return Err(DraftError::EmptyFamily);
                }
                let record = d
                    .common
                    .record()
                    .ok_or(DraftError::MissingPatientRecord)?;
                let members = member_ids
                    .iter()
                    .map(|id| {
                        record
                            .family_members
                            .iter()
                            .find(|m| &m.member_id == id)
                            .cloned()
                            .ok_or_else(|| DraftError::UnknownFamilyMember(id.clone()))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                d.members = members;
                prune_family_choices(d);
            }
            (BookingDraft::Family(d), DraftUpdate::FamilyProviders { assignments }) => {
                if let Some(unknown) = assignments.iter().find(|a| d.member(&a.member_id).is_none())
                {
                    return Err(DraftError::UnknownFamilyMember(unknown.member_id.clone()));
                }
                d.assignments = assignments;
            }
            (BookingDraft::Family(d), DraftUpdate::FamilySlot { date, times }) => {
                if let Some(unknown) = times.iter().find(|t| d.member(&t.member_id).is_none()) {
                    return Err(DraftError::UnknownFamilyMember(unknown.member_id.clone()));
                }
                d.date = Some(date);
                d.times = times;
            }
            (BookingDraft::Family(d), DraftUpdate::FamilyContact(contact)) => {
                d.contact = Some(contact);
            }

            // `applies_to` already rejected every other combination.
            (_, update) => {
                return Err(DraftError::NotApplicable {
                    update: update.kind(),
                    key,
                });
            }
        }
        Ok(())
    }
}

fn common(draft: &mut BookingDraft) -> Result<&mut BookingCommon, DraftError> {
    draft.common_mut().ok_or(DraftError::NoPathSelected)
}

/// Drops provider and time choices for members no longer in the booking.
fn prune_family_choices(draft: &mut FamilyBookingDraft) {
    let members = &draft.members;
    draft
        .assignments
        .retain(|a| members.iter().any(|m| m.member_id == a.member_id));
    draft
        .times
        .retain(|t| members.iter().any(|m| m.member_id == t.member_id));
}
