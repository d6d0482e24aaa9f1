use crate::summary::BookingSummary;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;

/// An amount of money in minor units (cents).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct Money {
    pub amount_cents: u64,
    pub currency: String,
}

impl Money {
    pub fn new(amount_cents: u64, currency: impl Into<String>) -> Self {
        Self {
            amount_cents,
            currency: currency.into(),
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}.{:02}",
            self.currency,
            self.amount_cents / 100,
            self.amount_cents % 100
        )
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Location {
    pub id: String,
    pub name: String,
    pub address: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Category {
    pub id: String,
    pub name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Procedure {
    pub id: String,
    pub category_id: String,
    pub name: String,
    pub duration_minutes: u32,
    pub deposit_cents: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderRole {
    Dentist,
    Hygienist,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Provider {
    pub id: String,
    pub name: String,
    pub role: ProviderRole,
    pub location_ids: Vec<String>,
}

/// Daily opening hours, split into bookable slots.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct OfficeHours {
    pub open: NaiveTime,
    pub close: NaiveTime,
    pub slot_minutes: u32,
}

/// The clinic's locations, services and staff, matching the expected JSON format.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ClinicDirectory {
    pub currency: String,
    pub locations: Vec<Location>,
    pub categories: Vec<Category>,
    pub procedures: Vec<Procedure>,
    pub providers: Vec<Provider>,
    pub hours: OfficeHours,
    /// Deposit per patient when no procedure-specific deposit applies.
    pub default_deposit_cents: u64,
    pub combo_deposit_cents: u64,
}

impl ClinicDirectory {
    /// Load a clinic directory from a JSON file.
    pub fn from_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        let data = serde_json::from_str(&content)?;
        Ok(data)
    }

    pub fn location(&self, id: &str) -> Option<&Location> {
        self.locations.iter().find(|l| l.id == id)
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn procedure(&self, id: &str) -> Option<&Procedure> {
        self.procedures.iter().find(|p| p.id == id)
    }

    pub fn provider(&self, id: &str) -> Option<&Provider> {
        self.providers.iter().find(|p| p.id == id)
    }

    pub fn procedures_in(&self, category_id: &str) -> impl Iterator<Item = &Procedure> {
        self.procedures
            .iter()
            .filter(move |p| p.category_id == category_id)
    }

    /// Providers working at a location, optionally restricted to one role.
    pub fn providers_at(
        &self,
        location_id: &str,
        role: Option<ProviderRole>,
    ) -> impl Iterator<Item = &Provider> {
        self.providers.iter().filter(move |p| {
            p.location_ids.iter().any(|l| l == location_id) && role.is_none_or(|r| p.role == r)
        })
    }

    /// The deposit charged at the payment step for the booking described by `summary`.
    pub fn deposit_for(&self, summary: &BookingSummary) -> Money {
        use crate::flow::AppointmentPath;

        let cents = match summary.key.map(|k| k.path) {
            Some(AppointmentPath::Combo) => self.combo_deposit_cents,
            Some(AppointmentPath::Family) => {
                self.default_deposit_cents * summary.appointments.len().max(1) as u64
            }
            Some(AppointmentPath::Single) | None => summary
                .appointments
                .first()
                .and_then(|a| a.procedure_id.as_deref())
                .and_then(|id| self.procedure(id))
                .map_or(self.default_deposit_cents, |p| p.deposit_cents),
        };
        Money::new(cents, self.currency.clone())
    }
}

impl Default for ClinicDirectory {
    /// A small two-location practice used by the mock collaborators.
    fn default() -> Self {
        let both = || vec!["loc-downtown".to_string(), "loc-northside".to_string()];
        let procedure = |id: &str, category: &str, name: &str, minutes, deposit| Procedure {
            id: id.to_string(),
            category_id: category.to_string(),
            name: name.to_string(),
            duration_minutes: minutes,
            deposit_cents: deposit,
        };
        let provider = |id: &str, name: &str, role, location_ids| Provider {
            id: id.to_string(),
            name: name.to_string(),
            role,
            location_ids,
        };

        Self {
            currency: "USD".to_string(),
            locations: vec![
                Location {
                    id: "loc-downtown".to_string(),
                    name: "Downtown".to_string(),
                    address: "120 Main St".to_string(),
                },
                Location {
                    id: "loc-northside".to_string(),
                    name: "Northside".to_string(),
                    address: "4 Birch Ave".to_string(),
                },
            ],
            categories: vec![
                Category {
                    id: "preventive".to_string(),
                    name: "Checkups & cleanings".to_string(),
                },
                Category {
                    id: "restorative".to_string(),
                    name: "Fillings & repairs".to_string(),
                },
                Category {
                    id: "cosmetic".to_string(),
                    name: "Cosmetic".to_string(),
                },
            ],
            procedures: vec![
                procedure("exam", "preventive", "Comprehensive exam", 45, 2500),
                procedure("cleaning", "preventive", "Hygiene cleaning", 60, 2500),
                procedure("filling", "restorative", "Filling", 60, 5000),
                procedure("whitening", "cosmetic", "Whitening", 90, 7500),
            ],
            providers: vec![
                provider("prov-ruiz", "Dr. Ana Ruiz", ProviderRole::Dentist, both()),
                provider(
                    "prov-okafor",
                    "Dr. Chidi Okafor",
                    ProviderRole::Dentist,
                    vec!["loc-downtown".to_string()],
                ),
                provider("prov-kim", "Jo Kim, RDH", ProviderRole::Hygienist, both()),
                provider(
                    "prov-patel",
                    "Priya Patel, RDH",
                    ProviderRole::Hygienist,
                    vec!["loc-northside".to_string()],
                ),
            ],
            hours: OfficeHours {
                open: NaiveTime::from_hms_opt(8, 0, 0).unwrap_or_default(),
                close: NaiveTime::from_hms_opt(17, 0, 0).unwrap_or_default(),
                slot_minutes: 30,
            },
            default_deposit_cents: 2500,
            combo_deposit_cents: 4000,
        }
    }
}
