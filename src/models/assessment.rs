use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::question::{MAX_RATING_VALUES, Question, QuestionId, QuestionKind};

pub type AssessmentId = u32;

/// Reasons an assessment definition is rejected at load time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidAssessment {
    #[error("assessment has no questions")]
    NoQuestions,
    #[error("question id {0} appears more than once")]
    DuplicateQuestion(QuestionId),
    #[error("question {question} repeats option id {option}")]
    DuplicateOption { question: QuestionId, option: u32 },
    #[error("choice question {0} has no options")]
    MissingOptions(QuestionId),
    #[error("rating question {0} has min above max")]
    InvertedRating(QuestionId),
    #[error("rating question {0} offers more than {MAX_RATING_VALUES} values")]
    RatingTooWide(QuestionId),
}

/// A named set of questions taken as one timed attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    pub id: AssessmentId,
    pub title: String,
    pub description: String,
    /// Free-form estimate shown next to the timer, e.g. "about 60 minutes".
    pub estimated_time: String,
    pub questions: Vec<Question>,
}

impl Assessment {
    pub fn question(&self, id: QuestionId) -> Option<&Question> {
        self.questions.iter().find(|question| question.id == id)
    }

    /// Question ids in definition order.
    pub fn question_ids(&self) -> Vec<QuestionId> {
        self.questions.iter().map(|question| question.id).collect()
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn validate(&self) -> Result<(), InvalidAssessment> {
        if self.questions.is_empty() {
            return Err(InvalidAssessment::NoQuestions);
        }

        let mut ids = HashSet::new();
        for question in &self.questions {
            if !ids.insert(question.id) {
                return Err(InvalidAssessment::DuplicateQuestion(question.id));
            }

            let mut option_ids = HashSet::new();
            for option in &question.options {
                if !option_ids.insert(option.id) {
                    return Err(InvalidAssessment::DuplicateOption {
                        question: question.id,
                        option: option.id,
                    });
                }
            }

            if question.kind.has_options() && question.options.is_empty() {
                return Err(InvalidAssessment::MissingOptions(question.id));
            }
            if question.kind == QuestionKind::Rating {
                let bounds = question.rating_bounds();
                if bounds.is_empty() {
                    return Err(InvalidAssessment::InvertedRating(question.id));
                }
                if bounds.span().is_none_or(|values| values > MAX_RATING_VALUES) {
                    return Err(InvalidAssessment::RatingTooWide(question.id));
                }
            }
        }

        Ok(())
    }
}
