//! Cycle phases and the transitions between them.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleVerdict {
    Success,
    Failure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CyclePhase {
    Generate,
    Test,
    Review,
    Done(CycleVerdict),
}

impl CyclePhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done(_))
    }

    /// Task kind used for the collaborator call made in this phase.
    pub fn task_kind(self) -> &'static str {
        match self {
            Self::Generate => "generate",
            Self::Test => "test",
            Self::Review => "review",
            Self::Done(_) => "done",
        }
    }

    /// Phase entered when the collaborator in this phase accepts.
    pub fn on_accept(self) -> Self {
        match self {
            Self::Generate => Self::Test,
            Self::Test => Self::Review,
            Self::Review => Self::Done(CycleVerdict::Success),
            done @ Self::Done(_) => done,
        }
    }

    /// Phase entered on rejection, given whether attempts remain.
    pub fn on_reject(self, attempts_left: bool) -> Self {
        match self {
            done @ Self::Done(_) => done,
            _ if attempts_left => Self::Generate,
            _ => Self::Done(CycleVerdict::Failure),
        }
    }
}

impl fmt::Display for CyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Done(CycleVerdict::Success) => f.write_str("done(success)"),
            Self::Done(CycleVerdict::Failure) => f.write_str("done(failure)"),
            phase => f.write_str(phase.task_kind()),
        }
    }
}

/// One edge taken through the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseTransition {
    pub attempt: u32,
    pub from: CyclePhase,
    pub to: CyclePhase,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accept_path() {
        let mut phase = CyclePhase::Generate;
        let mut seen = vec![phase];
        while !phase.is_terminal() {
            phase = phase.on_accept();
            seen.push(phase);
        }
        assert_eq!(
            seen,
            vec![
                CyclePhase::Generate,
                CyclePhase::Test,
                CyclePhase::Review,
                CyclePhase::Done(CycleVerdict::Success)
            ]
        );
    }

    #[test]
    fn test_reject_loops_until_budget_is_spent() {
        assert_eq!(CyclePhase::Test.on_reject(true), CyclePhase::Generate);
        assert_eq!(
            CyclePhase::Review.on_reject(false),
            CyclePhase::Done(CycleVerdict::Failure)
        );
        let done = CyclePhase::Done(CycleVerdict::Success);
        assert_eq!(done.on_reject(true), done);
        assert_eq!(done.to_string(), "done(success)");
    }
}
