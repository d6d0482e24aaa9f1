use super::model::*;
use crate::flow::{AppointmentPath, FlowKey, PatientType};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Fields every booking has once a patient type and path are chosen.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BookingCommon {
    pub patient_type: PatientType,
    pub location_id: Option<String>,
    /// Only ever populated for returning patients.
    pub identity: Option<Identity>,
    pub verification: Option<Verification>,
    pub payment: Option<PaymentConfirmation>,
}

impl BookingCommon {
    fn new(patient_type: PatientType) -> Self {
        Self {
            patient_type,
            location_id: None,
            identity: None,
            verification: None,
            payment: None,
        }
    }

    pub fn record(&self) -> Option<&PatientRecord> {
        self.identity.as_ref().and_then(|i| i.record.as_ref())
    }

    pub fn details(&self) -> Option<&PatientDetails> {
        self.identity.as_ref().and_then(|i| i.details.as_ref())
    }

    pub fn is_verified(&self) -> bool {
        self.verification.as_ref().is_some_and(|v| v.verified)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SingleBookingDraft {
    pub common: BookingCommon,
    pub category_id: Option<String>,
    pub procedure_id: Option<String>,
    pub provider_id: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub patient: Option<PatientInfo>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ComboBookingDraft {
    pub common: BookingCommon,
    pub exam_provider_id: Option<String>,
    pub hygiene_provider_id: Option<String>,
    pub date: Option<NaiveDate>,
    pub exam_time: Option<NaiveTime>,
    pub hygiene_time: Option<NaiveTime>,
    pub patient: Option<PatientInfo>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FamilyBookingDraft {
    pub common: BookingCommon,
    pub members: Vec<FamilyMember>,
    pub assignments: Vec<ProviderAssignment>,
    pub date: Option<NaiveDate>,
    pub times: Vec<MemberTime>,
    pub contact: Option<ContactInfo>,
}

impl FamilyBookingDraft {
    pub fn member(&self, member_id: &str) -> Option<&FamilyMember> {
        self.members.iter().find(|m| m.member_id == member_id)
    }

    pub fn provider_for(&self, member_id: &str) -> Option<&str> {
        self.assignments
            .iter()
            .find(|a| a.member_id == member_id)
            .map(|a| a.provider_id.as_str())
    }

    pub fn time_for(&self, member_id: &str) -> Option<NaiveTime> {
        self.times
            .iter()
            .find(|t| t.member_id == member_id)
            .map(|t| t.time)
    }
}

/// The in-progress booking, one variant per appointment path.
///
/// Each variant only carries the fields that are meaningful for its path, so a
/// draft can never hold combo providers while booking a family visit.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(tag = "path", rename_all = "lowercase")]
pub enum BookingDraft {
    #[default]
    Unselected,
    Single(SingleBookingDraft),
    Combo(ComboBookingDraft),
    Family(FamilyBookingDraft),
}

impl BookingDraft {
    /// A fresh, empty draft for the given flow.
    pub fn empty_for(key: FlowKey) -> Self {
        let common = BookingCommon::new(key.patient);
        match key.path {
            AppointmentPath::Single => BookingDraft::Single(SingleBookingDraft {
                common,
                category_id: None,
                procedure_id: None,
                provider_id: None,
                date: None,
                time: None,
                patient: None,
            }),
            AppointmentPath::Combo => BookingDraft::Combo(ComboBookingDraft {
                common,
                exam_provider_id: None,
                hygiene_provider_id: None,
                date: None,
                exam_time: None,
                hygiene_time: None,
                patient: None,
            }),
            AppointmentPath::Family => BookingDraft::Family(FamilyBookingDraft {
                common,
                members: Vec::new(),
                assignments: Vec::new(),
                date: None,
                times: Vec::new(),
                contact: None,
            }),
        }
    }

    pub fn is_selected(&self) -> bool {
        !matches!(self, BookingDraft::Unselected)
    }

    pub fn path(&self) -> Option<AppointmentPath> {
        match self {
            BookingDraft::Unselected => None,
            BookingDraft::Single(_) => Some(AppointmentPath::Single),
            BookingDraft::Combo(_) => Some(AppointmentPath::Combo),
            BookingDraft::Family(_) => Some(AppointmentPath::Family),
        }
    }

    /// The flow this draft selects, or `None` before Welcome has been completed.
    pub fn flow_key(&self) -> Option<FlowKey> {
        let path = self.path()?;
        let common = self.common()?;
        Some(FlowKey::new(common.patient_type, path))
    }

    pub fn common(&self) -> Option<&BookingCommon> {
        match self {
            BookingDraft::Unselected => None,
            BookingDraft::Single(d) => Some(&d.common),
            BookingDraft::Combo(d) => Some(&d.common),
            BookingDraft::Family(d) => Some(&d.common),
        }
    }

    pub fn common_mut(&mut self) -> Option<&mut BookingCommon> {
        match self {
            BookingDraft::Unselected => None,
            BookingDraft::Single(d) => Some(&mut d.common),
            BookingDraft::Combo(d) => Some(&mut d.common),
            BookingDraft::Family(d) => Some(&mut d.common),
        }
    }

    pub fn single(&self) -> Option<&SingleBookingDraft> {
        match self {
            BookingDraft::Single(d) => Some(d),
            _ => None,
        }
    }

    pub fn combo(&self) -> Option<&ComboBookingDraft> {
        match self {
            BookingDraft::Combo(d) => Some(d),
            _ => None,
        }
    }

    pub fn family(&self) -> Option<&FamilyBookingDraft> {
        match self {
            BookingDraft::Family(d) => Some(d),
            _ => None,
        }
    }

    pub fn location_id(&self) -> Option<&str> {
        self.common().and_then(|c| c.location_id.as_deref())
    }

    pub fn is_payment_complete(&self) -> bool {
        self.common().is_some_and(|c| c.payment.is_some())
    }

    /// The new patient's own details, for paths that collect them.
    pub fn patient_info(&self) -> Option<&PatientInfo> {
        match self {
            BookingDraft::Single(d) => d.patient.as_ref(),
            BookingDraft::Combo(d) => d.patient.as_ref(),
            _ => None,
        }
    }

    /// Display name of the person booking.
    pub fn patient_name(&self) -> Option<String> {
        if let Some(record) = self.common().and_then(BookingCommon::record) {
            return Some(record.full_name());
        }
        if let Some(info) = self.patient_info() {
            return Some(info.full_name());
        }
        self.family()
            .and_then(|f| f.contact.as_ref())
            .map(|c| c.name.clone())
    }

    /// The phone number or email address a verification code would go to.
    pub fn primary_contact(&self) -> Option<&str> {
        let common = self.common()?;
        if let Some(verification) = &common.verification {
            return Some(&verification.contact);
        }
        if let Some(record) = common.record() {
            return Some(&record.phone);
        }
        if let Some(details) = common.details() {
            return Some(&details.contact);
        }
        if let Some(info) = self.patient_info() {
            return Some(&info.phone);
        }
        self.family()
            .and_then(|f| f.contact.as_ref())
            .map(|c| c.phone.as_str())
    }
}
