use crate::error::CompileError;
use crate::flow::{CompiledFlow, FlowCatalog, FlowKey, ScreenDescriptor, ScreenId};
use crate::recipe::{FlowDefinition, FlowSequenceDefinition};
use ahash::AHashMap;
use itertools::Itertools;

pub mod parsing;
mod validator;

use parsing::*;
use validator::FlowValidator;

/// Compiles a `FlowDefinition` into a `FlowCatalog`.
pub struct Compiler {
    definition: FlowDefinition,
    registry: AHashMap<String, Box<dyn ScreenParser>>,
}

pub struct CompilerBuilder {
    definition: FlowDefinition,
    registry: AHashMap<String, Box<dyn ScreenParser>>,
}

impl CompilerBuilder {
    pub fn new(definition: FlowDefinition) -> Self {
        let mut registry: AHashMap<String, Box<dyn ScreenParser>> = AHashMap::new();
        register_default_parsers(&mut registry);
        Self {
            definition,
            registry,
        }
    }

    /// Lets a user format name a built-in screen type differently (e.g. `"pick-clinic"` -> `"Location"`).
    pub fn with_type_mapping(mut self, user_type_name: &str, screen_type_name: &str) -> Self {
        if let Some(parser) = create_parser_by_name(screen_type_name) {
            self.registry.insert(user_type_name.to_string(), parser);
        } else {
            tracing::warn!(
                user_type_name,
                screen_type_name,
                "ignoring type mapping to an unknown screen type"
            );
        }
        self
    }

    pub fn with_custom_parser(mut self, parser: Box<dyn ScreenParser>) -> Self {
        self.registry.insert(parser.screen_type().to_string(), parser);
        self
    }

    pub fn build(self) -> Compiler {
        Compiler {
            definition: self.definition,
            registry: self.registry,
        }
    }
}

impl Compiler {
    pub fn builder(definition: FlowDefinition) -> CompilerBuilder {
        CompilerBuilder::new(definition)
    }

    pub fn compile(self) -> Result<FlowCatalog, CompileError> {
        if self.definition.flows.is_empty() {
            return Err(CompileError::EmptyCatalog);
        }

        let mut flows: AHashMap<FlowKey, CompiledFlow> = AHashMap::new();
        let mut welcome: Option<ScreenDescriptor> = None;

        for sequence in &self.definition.flows {
            let compiled = self.compile_sequence(sequence)?;

            if let Some(existing) = flows.get(&compiled.key) {
                return Err(CompileError::DuplicateFlow {
                    flow_id: compiled.id,
                    existing_id: existing.id.clone(),
                    key: compiled.key,
                });
            }

            tracing::debug!(
                flow = %compiled.id,
                key = %compiled.key,
                steps = compiled.total_steps(),
                "compiled flow"
            );
            // Welcome is shown before any flow is chosen, so every flow must label it alike.
            if let (Some(shared), Some(own)) = (&welcome, compiled.screens.first()) {
                if own.label != shared.label {
                    return Err(CompileError::WelcomeLabelMismatch {
                        flow_id: compiled.id.clone(),
                        label: own.label.clone(),
                        expected: shared.label.clone(),
                    });
                }
            }
            if welcome.is_none() {
                welcome = compiled.screens.first().cloned();
            }
            flows.insert(compiled.key, compiled);
        }

        let missing: Vec<FlowKey> = FlowKey::all().filter(|k| !flows.contains_key(k)).collect();
        if !missing.is_empty() {
            tracing::warn!(
                missing = %missing.iter().join(", "),
                "catalog does not define every patient type and appointment path"
            );
        }

        let welcome = welcome.unwrap_or_else(|| ScreenDescriptor::new(ScreenId::Welcome));
        Ok(FlowCatalog::new(flows, welcome))
    }

    fn compile_sequence(&self, sequence: &FlowSequenceDefinition) -> Result<CompiledFlow, CompileError> {
        let patient = sequence
            .patient_type
            .parse()
            .map_err(|_| CompileError::InvalidFlowKey {
                flow_id: sequence.id.clone(),
                field: "patient type",
                value: sequence.patient_type.clone(),
            })?;
        let path = sequence
            .appointment_path
            .parse()
            .map_err(|_| CompileError::InvalidFlowKey {
                flow_id: sequence.id.clone(),
                field: "appointment path",
                value: sequence.appointment_path.clone(),
            })?;
        let key = FlowKey::new(patient, path);

        let screens = sequence
            .screens
            .iter()
            .map(|definition| {
                let parser = self.registry.get(&definition.screen_type).ok_or_else(|| {
                    CompileError::InvalidScreenType {
                        flow_id: sequence.id.clone(),
                        screen_id: definition.id.clone(),
                        type_name: definition.screen_type.clone(),
                    }
                })?;
                parser.parse(definition)
            })
            .collect::<Result<Vec<_>, CompileError>>()?;

        FlowValidator::new(&sequence.id, key, &screens).validate()?;

        Ok(CompiledFlow {
            id: sequence.id.clone(),
            key,
            screens,
        })
    }
}
