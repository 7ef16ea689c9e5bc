use async_trait::async_trait;

use crate::models::{Assessment, AssessmentId, Question, QuestionId, QuestionKind};

use super::{AssessmentSource, AssessmentSummary, LoadError};

pub const MOCK_ASSESSMENT_ID: AssessmentId = 101;
pub const MOCK_QUESTION_COUNT: u32 = 145;

pub const CATEGORIES: [&str; 5] = [
    "Logical Thinking",
    "Communication",
    "Problem Solving",
    "Teamwork",
    "Leadership",
];

const KIND_CYCLE: [QuestionKind; 3] = [
    QuestionKind::Single,
    QuestionKind::Rating,
    QuestionKind::Boolean,
];

const OPTION_LABELS: [char; 4] = ['A', 'B', 'C', 'D'];

/// Synthetic questions `1..=count`, cycling through three kinds and five categories.
pub fn generate_questions(count: u32) -> Vec<Question> {
    (1..=count).map(generate_question).collect()
}

fn generate_question(id: QuestionId) -> Question {
    let kind = KIND_CYCLE[id as usize % KIND_CYCLE.len()];
    let category = CATEGORIES[id as usize % CATEGORIES.len()];

    let mut question = Question::new(
        id,
        format!(
            "Question {id}: what is your view on {}? ({})",
            category.to_lowercase(),
            kind.label()
        ),
        kind,
    )
    .required();
    question.difficulty = Some((id % 3) as u8 + 1);
    question.category = Some(category.to_string());

    match kind {
        QuestionKind::Single | QuestionKind::Multiple => {
            question = question.with_options(
                OPTION_LABELS
                    .iter()
                    .zip(1..)
                    .map(|(label, option_id)| (option_id, format!("Option {label} (Q{id})"))),
            );
        }
        QuestionKind::Rating => {
            question = question
                .with_rating(1, 5)
                .with_description("Rate from 1 (strongly disagree) to 5 (strongly agree).");
        }
        QuestionKind::Text | QuestionKind::Boolean => {}
    }

    question
}

/// The fixed in-memory catalog used when no catalog file is configured.
#[derive(Debug, Clone)]
pub struct MockSource {
    assessment: Assessment,
}

impl MockSource {
    pub fn new() -> Self {
        Self {
            assessment: Assessment {
                id: MOCK_ASSESSMENT_ID,
                title: "Comprehensive Skills Assessment".to_string(),
                description: "This assessment evaluates a broad range of your skills and \
                              traits. Please answer honestly."
                    .to_string(),
                estimated_time: "about 60 minutes".to_string(),
                questions: generate_questions(MOCK_QUESTION_COUNT),
            },
        }
    }
}

impl Default for MockSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AssessmentSource for MockSource {
    async fn load_assessment(&self, id: AssessmentId) -> Result<Assessment, LoadError> {
        if id == self.assessment.id {
            Ok(self.assessment.clone())
        } else {
            Err(LoadError::NotFound(id))
        }
    }

    async fn list_assessments(&self) -> Result<Vec<AssessmentSummary>, LoadError> {
        Ok(vec![AssessmentSummary::from(&self.assessment)])
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_generates_requested_number_of_unique_questions() {
        let questions = generate_questions(MOCK_QUESTION_COUNT);
        assert_eq!(questions.len(), 145);
        let ids: HashSet<_> = questions.iter().map(|q| q.id).collect();
        assert_eq!(ids.len(), 145);
    }

    #[test]
    fn test_kinds_and_categories_cycle() {
        let questions = generate_questions(6);
        let kinds: Vec<_> = questions.iter().map(|q| q.kind).collect();
        assert_eq!(
            kinds,
            vec![
                QuestionKind::Rating,
                QuestionKind::Boolean,
                QuestionKind::Single,
                QuestionKind::Rating,
                QuestionKind::Boolean,
                QuestionKind::Single,
            ]
        );
        assert_eq!(questions[4].category.as_deref(), Some("Logical Thinking"));
        assert_eq!(questions[0].difficulty, Some(2));
        assert!(questions.iter().all(|q| q.required));
    }

    #[test]
    fn test_choice_questions_get_four_options() {
        let question = generate_question(3);
        assert_eq!(question.kind, QuestionKind::Single);
        assert_eq!(
            question.options.iter().map(|o| o.id).collect::<Vec<_>>(),
            vec![1, 2, 3, 4]
        );
        assert_eq!(question.options[1].label, "Option B (Q3)");
    }

    #[tokio::test]
    async fn test_mock_source_serves_only_its_assessment() {
        let source = MockSource::new();
        let assessment = source.load_assessment(MOCK_ASSESSMENT_ID).await.unwrap();
        assert_eq!(assessment.validate(), Ok(()));
        assert!(matches!(
            source.load_assessment(5).await,
            Err(LoadError::NotFound(5))
        ));
    }
}
