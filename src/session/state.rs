use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::models::{AnswerValue, Answers, Assessment, AssessmentId, Question, QuestionId};

use super::SessionError;
use super::order::{NextQuestionSelector, SelectionContext, presentation_order};

/// Durable record of one attempt, stored as JSON under `assessment_<id>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub assessment_id: AssessmentId,
    #[serde(default)]
    pub answers: Answers,
    #[serde(default)]
    pub current_question_index: usize,
    /// Seconds spent on the attempt.
    #[serde(default)]
    pub elapsed_time: u64,
    /// Question ids in presentation order; fixed for the attempt.
    #[serde(default)]
    pub question_order: Vec<QuestionId>,
    #[serde(default = "Utc::now")]
    pub saved_at: DateTime<Utc>,
}

/// Outcome of a successful `advance`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Moved to the given position.
    Moved(usize),
    /// Already at the end; the attempt can be submitted.
    ReadyToSubmit,
}

/// Position summary for the progress bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    /// 1-based position of the current question.
    pub position: usize,
    pub total: usize,
    pub remaining: usize,
    pub percent: f64,
}

impl SessionState {
    /// New attempt: shuffled order, no answers, zero time.
    pub fn fresh<R: Rng + ?Sized>(assessment: &Assessment, rng: &mut R) -> Self {
        Self {
            assessment_id: assessment.id,
            answers: Answers::new(),
            current_question_index: 0,
            elapsed_time: 0,
            question_order: presentation_order(assessment, rng),
            saved_at: Utc::now(),
        }
    }

    pub fn current_question_id(&self) -> Option<QuestionId> {
        self.question_order.get(self.current_question_index).copied()
    }

    pub fn current_question<'a>(&self, assessment: &'a Assessment) -> Option<&'a Question> {
        self.current_question_id()
            .and_then(|id| assessment.question(id))
    }

    pub fn current_answer(&self) -> Option<&AnswerValue> {
        self.current_question_id()
            .and_then(|id| self.answers.get(id))
    }

    pub fn is_last(&self) -> bool {
        self.current_question_index + 1 >= self.question_order.len()
    }

    /// Writes or clears the answer to the current question.
    ///
    /// Values that do not fit the question are rejected; empty text and
    /// empty selections are stored as "unanswered".
    pub fn record_answer(
        &mut self,
        assessment: &Assessment,
        value: Option<AnswerValue>,
    ) -> Result<QuestionId, SessionError> {
        let question = self
            .current_question(assessment)
            .ok_or(SessionError::NoCurrentQuestion)?;

        if let Some(value) = &value {
            if !value.fits(question) {
                return Err(SessionError::AnswerMismatch(question.id));
            }
        }

        let id = question.id;
        self.answers
            .set(id, value.filter(AnswerValue::is_answered));
        Ok(id)
    }

    /// Moves forward unless the current question is required and unanswered.
    pub fn advance(
        &mut self,
        assessment: &Assessment,
        selector: &dyn NextQuestionSelector,
    ) -> Result<Advance, SessionError> {
        let question = self
            .current_question(assessment)
            .ok_or(SessionError::NoCurrentQuestion)?;

        if question.required && !self.answers.is_answered(question.id) {
            return Err(SessionError::RequiredUnanswered(question.id));
        }

        let context = SelectionContext {
            assessment,
            order: &self.question_order,
            index: self.current_question_index,
            question,
            answer: self.answers.get(question.id),
            answers: &self.answers,
        };

        match selector.next_index(&context) {
            Some(next) if next < self.question_order.len() => {
                self.current_question_index = next;
                Ok(Advance::Moved(next))
            }
            _ => Ok(Advance::ReadyToSubmit),
        }
    }

    /// Steps back one position; returns false at the first question.
    pub fn retreat(&mut self) -> bool {
        if self.current_question_index == 0 {
            return false;
        }
        self.current_question_index -= 1;
        true
    }

    pub fn tick(&mut self) {
        self.elapsed_time = self.elapsed_time.saturating_add(1);
    }

    pub fn progress(&self) -> Progress {
        let total = self.question_order.len();
        if total == 0 {
            return Progress {
                position: 0,
                total: 0,
                remaining: 0,
                percent: 0.0,
            };
        }

        let position = self.current_question_index + 1;
        Progress {
            position,
            total,
            remaining: total.saturating_sub(position),
            percent: position as f64 / total as f64 * 100.0,
        }
    }
}
