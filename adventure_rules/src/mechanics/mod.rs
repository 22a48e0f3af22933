//! Interaction gating: item requirements, required flags, and condition expressions.

mod expr;

pub use expr::*;

use crate::entities::Interaction;
use crate::world_state::WorldState;

/// Why an interaction was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Denial {
    MissingItem(String),
    FlagNotSet(String),
    ExpressionFalse,
    /// The expression could not be parsed; treated the same as false.
    MalformedExpression(String),
}

/// Decides whether an interaction may run in the current world state.
///
/// The evaluator is pure: it reads inventory and flags and never writes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConditionEvaluator;

impl ConditionEvaluator {
    pub fn new() -> Self {
        Self
    }

    /// True if every requirement of the interaction passes.
    pub fn allowed(&self, interaction: &Interaction, state: &WorldState) -> bool {
        self.check(interaction, state).is_ok()
    }

    /// Check requirements in order of cost: flag lookup, inventory scan, expression.
    pub fn check(&self, interaction: &Interaction, state: &WorldState) -> Result<(), Denial> {
        if let Some(flag) = &interaction.requires_state {
            if !state.check_flag(flag) {
                return Err(Denial::FlagNotSet(flag.clone()));
            }
        }

        if let Some(requirement) = &interaction.requires {
            if let Some(missing) = requirement.items().iter().find(|item| !state.has_item(item.as_str())) {
                return Err(Denial::MissingItem(missing.to_string()));
            }
        }

        if let Some(source) = &interaction.requires_expr {
            match Expr::parse(source) {
                Ok(expr) => {
                    if !expr.eval(state.flags()) {
                        tracing::debug!("Condition {:?} is false over {:?}", source, expr.flags());
                        return Err(Denial::ExpressionFalse);
                    }
                }
                Err(e) => {
                    tracing::warn!("Rejecting malformed condition {:?}: {}", source, e);
                    return Err(Denial::MalformedExpression(e.to_string()));
                }
            }
        }

        Ok(())
    }
}
