//! Dialogue steps and their legal transitions.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::StateMachine;

/// The single active step of an intake session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "step", content = "slot")]
pub enum Step {
    Greeting,
    AwaitingIdentity,
    AwaitingProblem,
    AwaitingArea,
    AwaitingBuilding,
    AwaitingRoom,
    /// Collecting the media slot at this index.
    AwaitingMedia(usize),
    AwaitingLocation,
    AwaitingConfirmation,
    Completed,
}

impl Step {
    /// True once a reporter has been identified.
    pub fn is_identified(&self) -> bool {
        !matches!(self, Step::Greeting | Step::AwaitingIdentity | Step::Completed)
    }

    /// Steps that may be entered right after an area has been settled.
    fn is_post_area_target(&self) -> bool {
        matches!(
            self,
            Step::AwaitingBuilding
                | Step::AwaitingMedia(0)
                | Step::AwaitingLocation
                | Step::AwaitingConfirmation
        )
    }
}

impl StateMachine for Step {
    fn can_transition_to(&self, target: &Self) -> bool {
        use Step::*;

        // Restarting the problem description keeps the reporter and is
        // allowed from any identified step except the terminal one.
        if *target == AwaitingProblem && self.is_identified() && *self != AwaitingProblem {
            return true;
        }

        match (self, target) {
            (Greeting, AwaitingIdentity) | (Greeting, AwaitingProblem) => true,
            (AwaitingIdentity, AwaitingProblem) => true,
            (AwaitingProblem, AwaitingArea) => true,
            (AwaitingProblem, t) | (AwaitingArea, t) => t.is_post_area_target(),
            (AwaitingBuilding, AwaitingRoom) => true,
            (AwaitingBuilding, t) => t.is_post_area_target() && *t != AwaitingBuilding,
            (AwaitingRoom, AwaitingMedia(0)) | (AwaitingRoom, AwaitingConfirmation) => true,
            (AwaitingMedia(i), AwaitingMedia(j)) => *j == i + 1,
            (AwaitingMedia(_), AwaitingLocation) | (AwaitingMedia(_), AwaitingConfirmation) => true,
            (AwaitingLocation, AwaitingConfirmation) => true,
            (AwaitingConfirmation, Completed) => true,
            _ => false,
        }
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use Step::*;
        match self {
            Greeting => vec![AwaitingIdentity, AwaitingProblem],
            AwaitingIdentity => vec![AwaitingProblem],
            AwaitingProblem => vec![
                AwaitingArea,
                AwaitingBuilding,
                AwaitingMedia(0),
                AwaitingLocation,
                AwaitingConfirmation,
            ],
            AwaitingArea => vec![
                AwaitingProblem,
                AwaitingBuilding,
                AwaitingMedia(0),
                AwaitingLocation,
                AwaitingConfirmation,
            ],
            AwaitingBuilding => vec![
                AwaitingProblem,
                AwaitingRoom,
                AwaitingMedia(0),
                AwaitingLocation,
                AwaitingConfirmation,
            ],
            AwaitingRoom => vec![AwaitingProblem, AwaitingMedia(0), AwaitingConfirmation],
            AwaitingMedia(i) => vec![
                AwaitingProblem,
                AwaitingMedia(i + 1),
                AwaitingLocation,
                AwaitingConfirmation,
            ],
            AwaitingLocation => vec![AwaitingProblem, AwaitingConfirmation],
            AwaitingConfirmation => vec![AwaitingProblem, Completed],
            Completed => vec![],
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Greeting => write!(f, "greeting"),
            Step::AwaitingIdentity => write!(f, "awaiting_identity"),
            Step::AwaitingProblem => write!(f, "awaiting_problem"),
            Step::AwaitingArea => write!(f, "awaiting_area"),
            Step::AwaitingBuilding => write!(f, "awaiting_building"),
            Step::AwaitingRoom => write!(f, "awaiting_room"),
            Step::AwaitingMedia(i) => write!(f, "awaiting_media[{}]", i),
            Step::AwaitingLocation => write!(f, "awaiting_location"),
            Step::AwaitingConfirmation => write!(f, "awaiting_confirmation"),
            Step::Completed => write!(f, "completed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Step; 11] = [
        Step::Greeting,
        Step::AwaitingIdentity,
        Step::AwaitingProblem,
        Step::AwaitingArea,
        Step::AwaitingBuilding,
        Step::AwaitingRoom,
        Step::AwaitingMedia(0),
        Step::AwaitingMedia(2),
        Step::AwaitingLocation,
        Step::AwaitingConfirmation,
        Step::Completed,
    ];

    #[test]
    fn completed_is_terminal() {
        assert!(Step::Completed.is_terminal());
        for target in ALL {
            assert!(!Step::Completed.can_transition_to(&target));
        }
    }

    #[test]
    fn valid_transitions_are_accepted() {
        for step in ALL {
            for target in step.valid_transitions() {
                assert!(step.can_transition_to(&target), "{} -> {}", step, target);
            }
        }
    }

    #[test]
    fn media_index_only_moves_forward_by_one() {
        assert!(Step::AwaitingMedia(1).can_transition_to(&Step::AwaitingMedia(2)));
        assert!(!Step::AwaitingMedia(2).can_transition_to(&Step::AwaitingMedia(1)));
        assert!(!Step::AwaitingMedia(0).can_transition_to(&Step::AwaitingMedia(2)));
    }

    #[test]
    fn confirmation_requires_prior_steps() {
        assert!(!Step::AwaitingIdentity.can_transition_to(&Step::AwaitingConfirmation));
        assert!(!Step::Greeting.can_transition_to(&Step::AwaitingConfirmation));
    }

    #[test]
    fn rejection_returns_to_problem() {
        assert!(Step::AwaitingConfirmation.can_transition_to(&Step::AwaitingProblem));
        assert!(!Step::AwaitingIdentity.can_transition_to(&Step::AwaitingArea));
    }

    #[test]
    fn display_uses_snake_case_names() {
        assert_eq!(Step::AwaitingMedia(1).to_string(), "awaiting_media[1]");
        assert_eq!(Step::AwaitingConfirmation.to_string(), "awaiting_confirmation");
    }
}
