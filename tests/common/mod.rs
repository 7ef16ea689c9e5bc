#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use assessment_tui::data::AssessmentSummary;
use assessment_tui::models::QuestionId;
use assessment_tui::results::MockResults;
use assessment_tui::surveys::MockSurveyResults;
use assessment_tui::{
    Answers, Assessment, AssessmentId, AssessmentSource, LoadError, MemoryStore, Question,
    QuestionKind, Services, SessionState, SessionStore, SimulatedScoring,
};
use async_trait::async_trait;

pub const SCENARIO_ID: AssessmentId = 9;

/// Required single choice, required rating 1-5, optional free text.
pub fn scenario_assessment() -> Assessment {
    Assessment {
        id: SCENARIO_ID,
        title: "Scenario".to_string(),
        description: "Three questions".to_string(),
        estimated_time: "5 minutes".to_string(),
        questions: vec![
            Question::new(1, "Pick an option", QuestionKind::Single)
                .required()
                .with_options([(1, "One"), (2, "Two"), (3, "Three")]),
            Question::new(2, "Rate yourself", QuestionKind::Rating)
                .required()
                .with_rating(1, 5),
            Question::new(3, "Anything to add?", QuestionKind::Text),
        ],
    }
}

/// A stored session that presents the questions in id order.
pub fn stored_in_order(order: Vec<QuestionId>) -> SessionState {
    SessionState {
        assessment_id: SCENARIO_ID,
        answers: Answers::new(),
        current_question_index: 0,
        elapsed_time: 0,
        question_order: order,
        saved_at: chrono::Utc::now(),
    }
}

pub struct ScenarioSource;

#[async_trait]
impl AssessmentSource for ScenarioSource {
    async fn load_assessment(&self, id: AssessmentId) -> Result<Assessment, LoadError> {
        if id == SCENARIO_ID {
            Ok(scenario_assessment())
        } else {
            Err(LoadError::NotFound(id))
        }
    }

    async fn list_assessments(&self) -> Result<Vec<AssessmentSummary>, LoadError> {
        Ok(vec![AssessmentSummary::from(&scenario_assessment())])
    }
}

pub fn services(store: &Arc<MemoryStore>) -> Services {
    let store: Arc<dyn SessionStore> = store.clone();
    Services {
        source: Arc::new(ScenarioSource),
        store,
        scoring: Arc::new(SimulatedScoring::new(Duration::from_millis(200))),
        results: Arc::new(MockResults::with_seed(7)),
        surveys: Arc::new(MockSurveyResults),
    }
}
