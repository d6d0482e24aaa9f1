use crate::data::Money;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Details a new patient enters about themselves.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PatientInfo {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub phone: String,
    pub email: Option<String>,
}

impl PatientInfo {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// What a returning patient enters so their record can be found.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PatientDetails {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    /// Phone number or email address on file.
    pub contact: String,
}

/// A patient record returned by the patient directory.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PatientRecord {
    pub patient_id: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub family_members: Vec<FamilyMember>,
}

impl PatientRecord {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FamilyMember {
    pub member_id: String,
    pub name: String,
    pub date_of_birth: Option<NaiveDate>,
}

/// Who is responsible for a family booking.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ContactInfo {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VerificationMethod {
    Sms,
    Email,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    pub method: VerificationMethod,
    pub contact: String,
    pub verified: bool,
}

/// A returning patient's identity: what they entered and, once looked up, their record.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub details: Option<PatientDetails>,
    pub record: Option<PatientRecord>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ProviderAssignment {
    pub member_id: String,
    pub provider_id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MemberTime {
    pub member_id: String,
    pub time: NaiveTime,
}

/// Proof that the deposit was paid.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PaymentConfirmation {
    pub reference: String,
    pub amount: Money,
}
