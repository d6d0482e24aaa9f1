use crate::error::UnknownVariant;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Whether the patient is booking for the first time or already has a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatientType {
    New,
    Returning,
}

impl PatientType {
    pub const ALL: [PatientType; 2] = [PatientType::New, PatientType::Returning];

    pub fn as_str(&self) -> &'static str {
        match self {
            PatientType::New => "new",
            PatientType::Returning => "returning",
        }
    }
}

impl fmt::Display for PatientType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PatientType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "new" => Ok(PatientType::New),
            "returning" | "existing" => Ok(PatientType::Returning),
            _ => Err(UnknownVariant::new("patient type", s)),
        }
    }
}

/// The kind of appointment being booked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentPath {
    /// One procedure with one provider.
    Single,
    /// An exam and a hygiene visit booked together.
    Combo,
    /// Several patients booked in one session.
    Family,
}

impl AppointmentPath {
    pub const ALL: [AppointmentPath; 3] = [
        AppointmentPath::Single,
        AppointmentPath::Combo,
        AppointmentPath::Family,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentPath::Single => "single",
            AppointmentPath::Combo => "combo",
            AppointmentPath::Family => "family",
        }
    }
}

impl fmt::Display for AppointmentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentPath {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(AppointmentPath::Single),
            "combo" => Ok(AppointmentPath::Combo),
            "family" => Ok(AppointmentPath::Family),
            _ => Err(UnknownVariant::new("appointment path", s)),
        }
    }
}

/// Selects one of the flow sequences in a catalog.
///
/// This is the typed form of the three flags a booking draft implies
/// (`is_combo`, `is_family`, `is_returning`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FlowKey {
    pub patient: PatientType,
    pub path: AppointmentPath,
}

impl FlowKey {
    pub const fn new(patient: PatientType, path: AppointmentPath) -> Self {
        Self { patient, path }
    }

    /// All six patient type and appointment path combinations.
    pub fn all() -> impl Iterator<Item = FlowKey> {
        PatientType::ALL.into_iter().flat_map(|patient| {
            AppointmentPath::ALL
                .into_iter()
                .map(move |path| FlowKey::new(patient, path))
        })
    }

    pub fn is_combo(&self) -> bool {
        self.path == AppointmentPath::Combo
    }

    pub fn is_family(&self) -> bool {
        self.path == AppointmentPath::Family
    }

    pub fn is_returning(&self) -> bool {
        self.patient == PatientType::Returning
    }
}

impl fmt::Display for FlowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}", self.patient, self.path)
    }
}
