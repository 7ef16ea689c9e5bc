//! Scoring collaborator: receives finished attempts.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::AssessmentId;
use crate::session::Submission;

pub const DEFAULT_SUBMIT_DELAY: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoringError {
    #[error("scoring service unavailable")]
    Unavailable,
}

/// Acknowledgement of an accepted submission.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionReceipt {
    pub assessment_id: AssessmentId,
    pub answered: usize,
    pub elapsed_time: u64,
    pub submitted_at: DateTime<Utc>,
}

#[async_trait]
pub trait ScoringService: Send + Sync {
    async fn submit(&self, submission: &Submission) -> Result<SubmissionReceipt, ScoringError>;
}

/// Accepts every submission after a fixed delay, unless told to fail.
#[derive(Debug)]
pub struct SimulatedScoring {
    delay: Duration,
    failing: AtomicBool,
}

impl SimulatedScoring {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            failing: AtomicBool::new(false),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl Default for SimulatedScoring {
    fn default() -> Self {
        Self::new(DEFAULT_SUBMIT_DELAY)
    }
}

#[async_trait]
impl ScoringService for SimulatedScoring {
    async fn submit(&self, submission: &Submission) -> Result<SubmissionReceipt, ScoringError> {
        tracing::info!(
            "submitting assessment {} with {} answers after {}s",
            submission.assessment_id,
            submission.answers.answered_count(),
            submission.elapsed_time
        );
        tokio::time::sleep(self.delay).await;

        if self.failing.load(Ordering::SeqCst) {
            return Err(ScoringError::Unavailable);
        }

        Ok(SubmissionReceipt {
            assessment_id: submission.assessment_id,
            answered: submission.answers.answered_count(),
            elapsed_time: submission.elapsed_time,
            submitted_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnswerValue, Answers};

    fn submission() -> Submission {
        let mut answers = Answers::new();
        answers.set(1, Some(AnswerValue::choice(2)));
        answers.set(2, Some(AnswerValue::Text(String::new())));
        Submission {
            assessment_id: 101,
            answers,
            elapsed_time: 64,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_accepts_after_delay() {
        let scoring = SimulatedScoring::default();
        let start = tokio::time::Instant::now();

        let receipt = scoring.submit(&submission()).await.unwrap();
        assert!(start.elapsed() >= DEFAULT_SUBMIT_DELAY);
        assert_eq!(receipt.assessment_id, 101);
        assert_eq!(receipt.answered, 1);
        assert_eq!(receipt.elapsed_time, 64);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_can_be_toggled() {
        let scoring = SimulatedScoring::new(Duration::from_millis(10));
        scoring.set_failing(true);
        assert_eq!(
            scoring.submit(&submission()).await,
            Err(ScoringError::Unavailable)
        );

        scoring.set_failing(false);
        assert!(scoring.submit(&submission()).await.is_ok());
    }
}
