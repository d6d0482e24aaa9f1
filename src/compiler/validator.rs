use crate::error::CompileError;
use crate::flow::{FlowKey, ScreenDescriptor, ScreenId};
use itertools::Itertools;

/// Checks the structural rules every compiled flow must satisfy.
pub(super) struct FlowValidator<'a> {
    flow_id: &'a str,
    key: FlowKey,
    screens: &'a [ScreenDescriptor],
}

impl<'a> FlowValidator<'a> {
    pub(super) fn new(flow_id: &'a str, key: FlowKey, screens: &'a [ScreenDescriptor]) -> Self {
        Self {
            flow_id,
            key,
            screens,
        }
    }

    pub(super) fn validate(&self) -> Result<(), CompileError> {
        let (first, last) = match (self.screens.first(), self.screens.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => {
                return Err(CompileError::EmptyFlow {
                    flow_id: self.flow_id.to_string(),
                });
            }
        };

        if first.screen != ScreenId::Welcome {
            return Err(CompileError::MissingWelcome {
                flow_id: self.flow_id.to_string(),
            });
        }
        if !last.screen.is_terminal() {
            return Err(CompileError::MissingTerminal {
                flow_id: self.flow_id.to_string(),
            });
        }

        let final_step = self.screens.len();
        for (idx, descriptor) in self.screens.iter().enumerate() {
            let step = idx + 1;
            if step > 1 && descriptor.screen == ScreenId::Welcome {
                return Err(CompileError::MisplacedWelcome {
                    flow_id: self.flow_id.to_string(),
                    step,
                });
            }
            if step < final_step && descriptor.screen.is_terminal() {
                return Err(CompileError::MisplacedTerminal {
                    flow_id: self.flow_id.to_string(),
                    screen: descriptor.screen,
                    step,
                });
            }
            if !descriptor.screen.allowed_in(self.key) {
                return Err(CompileError::ScreenNotAllowed {
                    flow_id: self.flow_id.to_string(),
                    screen: descriptor.screen,
                    key: self.key,
                });
            }
        }

        if let Some(screen) = self.screens.iter().map(|d| d.screen).duplicates().next() {
            return Err(CompileError::DuplicateScreen {
                flow_id: self.flow_id.to_string(),
                screen,
            });
        }

        Ok(())
    }
}
