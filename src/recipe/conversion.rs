use super::definition::FlowDefinition;
use crate::error::FlowConversionError;

/// A trait for custom data models that can be converted into a bookflow `FlowDefinition`.
///
/// This is the extension point for loading flow tables from any format. By implementing
/// this trait on your own configuration structs, you provide a translation layer that
/// lets the compiler process them.
///
/// # Example
///
/// ```rust,no_run
/// use bookflow::error::FlowConversionError;
/// use bookflow::recipe::{FlowDefinition, FlowSequenceDefinition, IntoFlow, ScreenDefinition};
///
/// // 1. Define your custom structs for parsing your format.
/// struct MyStep { kind: String }
/// struct MyWizard { name: String, audience: String, path: String, steps: Vec<MyStep> }
/// struct MyWizards(Vec<MyWizard>);
///
/// // 2. Implement `IntoFlow` for your top-level struct.
/// impl IntoFlow for MyWizards {
///     fn into_flow(self) -> Result<FlowDefinition, FlowConversionError> {
///         let flows = self
///             .0
///             .into_iter()
///             .map(|wizard| FlowSequenceDefinition {
///                 id: wizard.name,
///                 patient_type: wizard.audience,
///                 appointment_path: wizard.path,
///                 screens: wizard
///                     .steps
///                     .iter()
///                     .map(|step| ScreenDefinition::of_type(&step.kind))
///                     .collect(),
///             })
///             .collect();
///         Ok(FlowDefinition { flows })
///     }
/// }
/// ```
pub trait IntoFlow {
    /// Consumes the object and converts it into bookflow's flow definition.
    fn into_flow(self) -> Result<FlowDefinition, FlowConversionError>;
}
