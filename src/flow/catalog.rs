use super::{FlowKey, ScreenDescriptor, ScreenId};
use crate::compiler::Compiler;
use crate::error::CompileError;
use crate::recipe::standard_flows;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// One validated flow: the ordered screens a patient walks through.
///
/// Step indices are 1-based, so step `n` is `screens[n - 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledFlow {
    pub id: String,
    pub key: FlowKey,
    pub screens: Vec<ScreenDescriptor>,
}

impl CompiledFlow {
    pub fn total_steps(&self) -> usize {
        self.screens.len()
    }

    pub fn screen_at(&self, step: usize) -> Option<&ScreenDescriptor> {
        step.checked_sub(1).and_then(|idx| self.screens.get(idx))
    }

    /// Step index of the first screen with the given id.
    pub fn step_of(&self, screen: ScreenId) -> Option<usize> {
        self.screens
            .iter()
            .position(|d| d.screen == screen)
            .map(|idx| idx + 1)
    }
}

/// The declarative lookup table `FlowKey -> [ScreenDescriptor]` produced by the compiler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowCatalog {
    pub(crate) flows: AHashMap<FlowKey, CompiledFlow>,
    pub(crate) welcome: ScreenDescriptor,
}

impl FlowCatalog {
    pub(crate) fn new(flows: AHashMap<FlowKey, CompiledFlow>, welcome: ScreenDescriptor) -> Self {
        Self { flows, welcome }
    }

    /// Compiles the built-in six-flow table.
    pub fn standard() -> Result<Self, CompileError> {
        Compiler::builder(standard_flows()).build().compile()
    }

    pub fn get(&self, key: FlowKey) -> Option<&CompiledFlow> {
        self.flows.get(&key)
    }

    /// The screen shown at step 1 before a flow has been chosen.
    pub fn welcome(&self) -> &ScreenDescriptor {
        &self.welcome
    }

    /// Flows ordered by key, for stable output.
    pub fn flows(&self) -> Vec<&CompiledFlow> {
        let mut flows: Vec<_> = self.flows.values().collect();
        flows.sort_by_key(|flow| flow.key);
        flows
    }

    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }

    /// Used as the progress denominator while no flow has been selected.
    pub fn longest_flow_steps(&self) -> usize {
        self.flows
            .values()
            .map(CompiledFlow::total_steps)
            .max()
            .unwrap_or(1)
    }
}
