//! The session manager: one user's resumable attempt at one assessment.
//!
//! [`SessionState`] is the persisted unit. [`Attempt`] owns it together with
//! the assessment and the phase, and exposes the navigation and submission
//! operations. Nothing in here touches storage; callers take a
//! [`Snapshot`] after each mutation and hand it to the autosaver.

mod attempt;
mod order;
mod state;

use std::fmt;

use thiserror::Error;

use crate::models::QuestionId;

pub use attempt::{Attempt, Origin, Snapshot, Submission};
pub use order::{LinearSelector, NextQuestionSelector, SelectionContext, is_permutation_of, presentation_order, shuffled};
pub use state::{Advance, Progress, SessionState};

/// Lifecycle of an attempt once its assessment has loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Active,
    Submitting,
    Submitted,
    Exited,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Active => "active",
            Phase::Submitting => "submitting",
            Phase::Submitted => "submitted",
            Phase::Exited => "exited",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("question {0} is required")]
    RequiredUnanswered(QuestionId),
    #[error("answer does not fit question {0}")]
    AnswerMismatch(QuestionId),
    #[error("there is no current question")]
    NoCurrentQuestion,
    #[error("session is {0}")]
    NotActive(Phase),
    #[error("a submission is already in progress")]
    SubmitInFlight,
}
