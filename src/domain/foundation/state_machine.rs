//! State machine trait for step enums.
//!
//! Gives every lifecycle enum (currently the intake `Step`) one way to
//! declare its legal edges and check a move before it is applied.

use super::ValidationError;

/// Trait for enums that represent state machines.
///
/// Implementors list their legal edges; validated transitions and
/// terminal-state detection come for free.
///
/// # Example
///
/// ```ignore
/// impl StateMachine for Step {
///     fn can_transition_to(&self, target: &Self) -> bool {
///         matches!((self, target), (AwaitingLocation, AwaitingConfirmation) | ...)
///     }
///
///     fn valid_transitions(&self) -> Vec<Self> { ... }
/// }
///
/// let next = current.transition_to(Step::AwaitingConfirmation)?;
/// ```
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Returns true if transition from self to target is valid.
    fn can_transition_to(&self, target: &Self) -> bool;

    /// Returns the representative set of target states from the current state.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Performs transition with validation, returning error if invalid.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(ValidationError::invalid_format(
                "state_transition",
                format!("Cannot transition from {:?} to {:?}", self, target),
            ))
        }
    }

    /// Checks if current state is terminal (no valid outgoing transitions).
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}
