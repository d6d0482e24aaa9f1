use crate::draft::DraftUpdate;
use serde::{Deserialize, Serialize};
use std::fs;

/// One user interaction in a recorded booking session.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ScriptEvent {
    /// Continue from the current screen with the given update.
    Advance { update: DraftUpdate },
    /// Continue from a collaborator-backed screen (lookup, verification, payment)
    /// by calling the collaborator for the update.
    Auto,
    Back,
    Close,
    ConfirmLeave,
    CancelLeave,
}

/// A scripted booking session that can be replayed against a catalog.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ReplayScript {
    pub name: String,
    pub events: Vec<ScriptEvent>,
}

impl ReplayScript {
    /// Load a replay script from a JSON file.
    pub fn from_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        let script = serde_json::from_str(&content)?;
        Ok(script)
    }
}
