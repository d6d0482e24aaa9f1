/// The complete, canonical definition of a set of booking flows, ready for compilation.
/// This is the target structure for any custom data model conversion.
#[derive(Debug, Clone, Default)]
pub struct FlowDefinition {
    pub flows: Vec<FlowSequenceDefinition>,
}

/// Defines one flow: which patients and appointment path it serves, and its screens in order.
#[derive(Debug, Clone)]
pub struct FlowSequenceDefinition {
    pub id: String,
    pub patient_type: String,
    pub appointment_path: String,
    pub screens: Vec<ScreenDefinition>,
}

/// Defines a single screen (step) in a flow.
#[derive(Debug, Clone)]
pub struct ScreenDefinition {
    pub id: String,
    pub screen_type: String,
    pub label: Option<String>,
}

impl ScreenDefinition {
    /// A screen whose id is its type name and whose label is the default.
    pub fn of_type(screen_type: &str) -> Self {
        Self {
            id: screen_type.to_string(),
            screen_type: screen_type.to_string(),
            label: None,
        }
    }
}
