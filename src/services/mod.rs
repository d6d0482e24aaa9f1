//! External collaborators the widget calls out to: patient lookup, code
//! verification, payment and availability.
//!
//! Every call returns a future that can be dropped to cancel it. `Services` runs
//! each one through a [`CallPolicy`] for timeouts and retries.

use crate::config::ServiceConfig;
use crate::data::{ClinicDirectory, Money};
use crate::draft::{
    DraftUpdate, PatientDetails, PatientRecord, PaymentConfirmation, VerificationMethod,
};
use crate::error::ServiceError;
use crate::sequencer::{ScreenProps, ScreenView};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

mod mock;
mod policy;

pub use mock::{MockAvailability, MockPatientDirectory, MockPaymentGateway, MockVerification};
pub use policy::CallPolicy;

/// A verification code that has been sent and can be checked.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct VerificationTicket {
    pub ticket_id: String,
    pub method: VerificationMethod,
    pub contact: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[default]
    Card,
    Wallet,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntent {
    pub intent_id: String,
    pub amount: Money,
    pub method: PaymentMethod,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PaymentReceipt {
    pub reference: String,
    pub amount: Money,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityQuery {
    pub location_id: String,
    /// All providers at the location when `None`.
    pub provider_id: Option<String>,
    pub from: NaiveDate,
    pub to: NaiveDate,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AvailableSlot {
    pub location_id: String,
    pub provider_id: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
}

#[async_trait]
pub trait PatientDirectory: Send + Sync {
    /// Finds the record matching what a returning patient entered, family members included.
    async fn lookup(&self, details: &PatientDetails) -> Result<PatientRecord, ServiceError>;
}

#[async_trait]
pub trait VerificationService: Send + Sync {
    async fn send_code(
        &self,
        method: VerificationMethod,
        contact: &str,
    ) -> Result<VerificationTicket, ServiceError>;

    async fn check_code(
        &self,
        ticket: &VerificationTicket,
        code: &str,
    ) -> Result<bool, ServiceError>;
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_intent(
        &self,
        amount: Money,
        method: PaymentMethod,
    ) -> Result<PaymentIntent, ServiceError>;

    async fn confirm(&self, intent: &PaymentIntent) -> Result<PaymentReceipt, ServiceError>;
}

#[async_trait]
pub trait AvailabilityService: Send + Sync {
    async fn query(&self, query: &AvailabilityQuery) -> Result<Vec<AvailableSlot>, ServiceError>;
}

/// The collaborators one widget talks to, with the policy applied to every call.
#[derive(Clone)]
pub struct Services {
    pub patients: Arc<dyn PatientDirectory>,
    pub verification: Arc<dyn VerificationService>,
    pub payments: Arc<dyn PaymentGateway>,
    pub availability: Arc<dyn AvailabilityService>,
    pub policy: CallPolicy,
}

impl Services {
    pub fn new(
        patients: Arc<dyn PatientDirectory>,
        verification: Arc<dyn VerificationService>,
        payments: Arc<dyn PaymentGateway>,
        availability: Arc<dyn AvailabilityService>,
        policy: CallPolicy,
    ) -> Self {
        Self {
            patients,
            verification,
            payments,
            availability,
            policy,
        }
    }

    /// In-process mocks with the configured latency and policy.
    pub fn mock(clinic: Arc<ClinicDirectory>, config: &ServiceConfig) -> Self {
        let delay = config.mock_delay();
        Self::new(
            Arc::new(MockPatientDirectory::new(delay)),
            Arc::new(MockVerification::new(delay, config.verification_code.clone())),
            Arc::new(MockPaymentGateway::new(delay)),
            Arc::new(MockAvailability::new(delay, clinic)),
            config.policy(),
        )
    }

    pub async fn lookup_patient(
        &self,
        details: &PatientDetails,
    ) -> Result<PatientRecord, ServiceError> {
        self.policy
            .run("lookup_patient", || self.patients.lookup(details))
            .await
    }

    pub async fn send_code(
        &self,
        method: VerificationMethod,
        contact: &str,
    ) -> Result<VerificationTicket, ServiceError> {
        self.policy
            .run("send_code", || self.verification.send_code(method, contact))
            .await
    }

    pub async fn check_code(
        &self,
        ticket: &VerificationTicket,
        code: &str,
    ) -> Result<bool, ServiceError> {
        self.policy
            .run("check_code", || self.verification.check_code(ticket, code))
            .await
    }

    /// Creates and confirms a payment intent for `amount`.
    pub async fn pay(
        &self,
        amount: Money,
        method: PaymentMethod,
    ) -> Result<PaymentReceipt, ServiceError> {
        let intent = self
            .policy
            .run("create_intent", || {
                self.payments.create_intent(amount.clone(), method)
            })
            .await?;
        self.policy
            .run("confirm_payment", || self.payments.confirm(&intent))
            .await
    }

    pub async fn available_slots(
        &self,
        query: &AvailabilityQuery,
    ) -> Result<Vec<AvailableSlot>, ServiceError> {
        self.policy
            .run("query_availability", || self.availability.query(query))
            .await
    }

    /// Produces the update for a screen whose "continue" depends on a collaborator.
    ///
    /// Patient lookup, code verification and payment are supported. `code` is what the
    /// patient typed on the verification screen.
    pub async fn collect_update(
        &self,
        view: &ScreenView,
        clinic: &ClinicDirectory,
        code: &str,
    ) -> Result<DraftUpdate, ServiceError> {
        match &view.props {
            ScreenProps::PatientLookup { details } => {
                let details = details
                    .as_ref()
                    .ok_or(ServiceError::MissingInput("patient details"))?;
                let record = self.lookup_patient(details).await?;
                tracing::info!(patient_id = %record.patient_id, "patient record found");
                Ok(DraftUpdate::PatientFound(record))
            }
            ScreenProps::PhoneVerify {
                method, contact, ..
            } => {
                let contact = contact
                    .as_deref()
                    .ok_or(ServiceError::MissingInput("contact"))?;
                let ticket = self.send_code(*method, contact).await?;
                if !self.check_code(&ticket, code).await? {
                    return Err(ServiceError::InvalidCode);
                }
                Ok(DraftUpdate::Verified {
                    method: ticket.method,
                    contact: ticket.contact,
                })
            }
            ScreenProps::Payment { summary } => {
                let amount = clinic.deposit_for(summary);
                let receipt = self.pay(amount, PaymentMethod::Card).await?;
                tracing::info!(reference = %receipt.reference, amount = %receipt.amount, "deposit paid");
                Ok(DraftUpdate::Payment(PaymentConfirmation {
                    reference: receipt.reference,
                    amount: receipt.amount,
                }))
            }
            _ => Err(ServiceError::Unsupported(view.screen)),
        }
    }
}
