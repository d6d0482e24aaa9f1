use super::*;
use chrono::{Datelike, TimeDelta, Weekday};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Finds a record for anyone, after `delay`.
pub struct MockPatientDirectory {
    delay: Duration,
}

impl MockPatientDirectory {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl PatientDirectory for MockPatientDirectory {
    async fn lookup(&self, details: &PatientDetails) -> Result<PatientRecord, ServiceError> {
        tokio::time::sleep(self.delay).await;

        let (phone, email) = if details.contact.contains('@') {
            ("5550100000".to_string(), Some(details.contact.clone()))
        } else {
            (details.contact.clone(), None)
        };
        let member = |id: &str, first: &str| crate::draft::FamilyMember {
            member_id: id.to_string(),
            name: format!("{} {}", first, details.last_name),
            date_of_birth: None,
        };

        Ok(PatientRecord {
            patient_id: format!("pt-{}", details.last_name.to_lowercase()),
            first_name: details.first_name.clone(),
            last_name: details.last_name.clone(),
            phone,
            email,
            family_members: vec![member("fm-1", "Sam"), member("fm-2", "Alex")],
        })
    }
}

/// Sends nothing. SMS contacts need at least ten digits and email contacts an `@`;
/// only `code` is accepted.
pub struct MockVerification {
    delay: Duration,
    code: String,
    sent: AtomicU64,
}

impl MockVerification {
    pub fn new(delay: Duration, code: impl Into<String>) -> Self {
        Self {
            delay,
            code: code.into(),
            sent: AtomicU64::new(0),
        }
    }

    pub fn is_valid_contact(method: VerificationMethod, contact: &str) -> bool {
        match method {
            VerificationMethod::Sms => contact.chars().filter(char::is_ascii_digit).count() >= 10,
            VerificationMethod::Email => contact.contains('@'),
        }
    }
}

#[async_trait]
impl VerificationService for MockVerification {
    async fn send_code(
        &self,
        method: VerificationMethod,
        contact: &str,
    ) -> Result<VerificationTicket, ServiceError> {
        tokio::time::sleep(self.delay).await;
        if !Self::is_valid_contact(method, contact) {
            return Err(ServiceError::InvalidContact(contact.to_string()));
        }
        let n = self.sent.fetch_add(1, Ordering::Relaxed) + 1;
        Ok(VerificationTicket {
            ticket_id: format!("ver-{}", n),
            method,
            contact: contact.to_string(),
        })
    }

    async fn check_code(
        &self,
        _ticket: &VerificationTicket,
        code: &str,
    ) -> Result<bool, ServiceError> {
        tokio::time::sleep(self.delay).await;
        Ok(code.trim() == self.code)
    }
}

/// Approves every payment.
pub struct MockPaymentGateway {
    delay: Duration,
    issued: AtomicU64,
}

impl MockPaymentGateway {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            issued: AtomicU64::new(0),
        }
    }

    fn next_id(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::Relaxed) + 1
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn create_intent(
        &self,
        amount: Money,
        method: PaymentMethod,
    ) -> Result<PaymentIntent, ServiceError> {
        tokio::time::sleep(self.delay).await;
        Ok(PaymentIntent {
            intent_id: format!("pi-{}", self.next_id()),
            amount,
            method,
        })
    }

    async fn confirm(&self, intent: &PaymentIntent) -> Result<PaymentReceipt, ServiceError> {
        tokio::time::sleep(self.delay).await;
        Ok(PaymentReceipt {
            reference: format!("PAY-{:06}", self.next_id()),
            amount: intent.amount.clone(),
        })
    }
}

/// Offers every slot inside office hours, Monday to Saturday.
pub struct MockAvailability {
    delay: Duration,
    clinic: Arc<ClinicDirectory>,
}

impl MockAvailability {
    pub fn new(delay: Duration, clinic: Arc<ClinicDirectory>) -> Self {
        Self { delay, clinic }
    }

    fn day_slots(&self) -> Vec<NaiveTime> {
        let hours = &self.clinic.hours;
        let step = TimeDelta::minutes(i64::from(hours.slot_minutes.max(1)));
        let mut slots = Vec::new();
        let mut time = hours.open;
        while time < hours.close {
            slots.push(time);
            let (next, wrapped) = time.overflowing_add_signed(step);
            if wrapped != 0 {
                break;
            }
            time = next;
        }
        slots
    }
}

#[async_trait]
impl AvailabilityService for MockAvailability {
    async fn query(&self, query: &AvailabilityQuery) -> Result<Vec<AvailableSlot>, ServiceError> {
        tokio::time::sleep(self.delay).await;

        if self.clinic.location(&query.location_id).is_none() {
            return Err(ServiceError::NotFound(format!(
                "location {}",
                query.location_id
            )));
        }
        let providers: Vec<&str> = self
            .clinic
            .providers_at(&query.location_id, None)
            .filter(|p| query.provider_id.as_deref().is_none_or(|id| p.id == id))
            .map(|p| p.id.as_str())
            .collect();
        if let (Some(id), true) = (&query.provider_id, providers.is_empty()) {
            return Err(ServiceError::NotFound(format!(
                "provider {} at {}",
                id, query.location_id
            )));
        }

        let times = self.day_slots();
        let mut slots = Vec::new();
        for date in query.from.iter_days().take_while(|date| *date <= query.to) {
            if date.weekday() == Weekday::Sun {
                continue;
            }
            for provider_id in &providers {
                slots.extend(times.iter().map(|time| AvailableSlot {
                    location_id: query.location_id.clone(),
                    provider_id: provider_id.to_string(),
                    date,
                    time: *time,
                }));
            }
        }
        Ok(slots)
    }
}
