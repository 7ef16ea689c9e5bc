//! Survey results collaborator: the aggregated report of a survey round.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use crate::data::LoadError;
use crate::models::{
    Comparisons, DistributionEntry, PeriodScores, QuestionKind, QuestionResult, SurveyId,
    SurveyReport, SurveySummary,
};

/// The most recent survey round; the listing links to it.
pub const LATEST_SURVEY_ID: SurveyId = 1;

#[async_trait]
pub trait SurveyResultSource: Send + Sync {
    async fn load_survey_result(&self, id: SurveyId) -> Result<SurveyReport, LoadError>;
}

/// Serves the quarterly engagement survey for every valid id.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockSurveyResults;

#[async_trait]
impl SurveyResultSource for MockSurveyResults {
    async fn load_survey_result(&self, id: SurveyId) -> Result<SurveyReport, LoadError> {
        if id == 0 {
            return Err(LoadError::InvalidId(id));
        }
        tracing::debug!("serving survey report {id}");
        Ok(engagement_report(id))
    }
}

fn distribution(entries: &[(&str, u32)]) -> Vec<DistributionEntry> {
    entries
        .iter()
        .map(|(name, value)| DistributionEntry {
            name: name.to_string(),
            value: *value,
        })
        .collect()
}

fn submitted_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 4, 26, 14, 30, 0)
        .single()
        .unwrap_or_default()
}

/// Quarterly engagement survey with one result per answerable kind.
pub fn engagement_report(id: SurveyId) -> SurveyReport {
    SurveyReport {
        id,
        title: "Quarterly Engagement Survey".to_string(),
        submitted_at: submitted_at(),
        summary: SurveySummary {
            overall_satisfaction: 4.2,
            recommendation_score: 8.5,
            engagement_score: 76,
            completion_time: "8 min".to_string(),
        },
        question_results: vec![
            QuestionResult {
                question_id: 1,
                question: "Which department do you belong to?".to_string(),
                kind: QuestionKind::Single,
                distribution: distribution(&[
                    ("Sales", 15),
                    ("Marketing", 22),
                    ("Engineering", 45),
                    ("Human Resources", 8),
                    ("Management", 10),
                ]),
                average_rating: None,
            },
            QuestionResult {
                question_id: 3,
                question: "How satisfied are you with your current work environment?".to_string(),
                kind: QuestionKind::Rating,
                distribution: distribution(&[
                    ("1 (very dissatisfied)", 2),
                    ("2 (dissatisfied)", 5),
                    ("3 (neutral)", 25),
                    ("4 (satisfied)", 45),
                    ("5 (very satisfied)", 23),
                ]),
                average_rating: Some(4.2),
            },
            QuestionResult {
                question_id: 4,
                question: "Which aspects of work do you value most? (select all that apply)"
                    .to_string(),
                kind: QuestionKind::Multiple,
                distribution: distribution(&[
                    ("Pay and benefits", 68),
                    ("Career growth", 75),
                    ("Colleagues", 82),
                    ("Work-life balance", 90),
                    ("Mission and vision", 45),
                    ("Learning opportunities", 72),
                ]),
                average_rating: None,
            },
            QuestionResult {
                question_id: 5,
                question: "Do you find team communication effective?".to_string(),
                kind: QuestionKind::Boolean,
                distribution: distribution(&[("Yes", 75), ("No", 25)]),
                average_rating: None,
            },
        ],
        insights: vec![
            "Work-life balance is the most valued aspect of work.".to_string(),
            "75% consider team communication effective.".to_string(),
            "Satisfaction with the work environment is above average but can still improve."
                .to_string(),
            "Career growth and learning opportunities are named as key factors.".to_string(),
        ],
        recommendations: vec![
            "Strengthen communication further through team building activities.".to_string(),
            "Consider expanding the career development program.".to_string(),
            "Introduce initiatives that encourage collaboration across departments.".to_string(),
        ],
        comparisons: Comparisons {
            previous_period: PeriodScores {
                overall_satisfaction: 3.9,
                engagement_score: 72,
            },
            industry_average: PeriodScores {
                overall_satisfaction: 3.8,
                engagement_score: 68,
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_covers_each_chartable_kind() {
        let report = engagement_report(4);
        assert_eq!(report.id, 4);

        let kinds: Vec<QuestionKind> = report.question_results.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![
                QuestionKind::Single,
                QuestionKind::Rating,
                QuestionKind::Multiple,
                QuestionKind::Boolean,
            ]
        );
        for result in &report.question_results {
            assert!(!result.distribution.is_empty());
            assert_eq!(result.average_rating.is_some(), result.kind == QuestionKind::Rating);
        }
    }

    #[test]
    fn test_changes_against_previous_period() {
        let report = engagement_report(LATEST_SURVEY_ID);
        assert_eq!(report.satisfaction_change(), 0.3);
        assert_eq!(report.engagement_change(), 4);

        let mut worse = report.clone();
        worse.summary.engagement_score = 70;
        worse.summary.overall_satisfaction = 3.5;
        assert_eq!(worse.engagement_change(), -2);
        assert_eq!(worse.satisfaction_change(), -0.4);
    }

    #[tokio::test]
    async fn test_zero_id_is_invalid() {
        let surveys = MockSurveyResults;
        assert!(matches!(
            surveys.load_survey_result(0).await,
            Err(LoadError::InvalidId(0))
        ));
        let report = surveys.load_survey_result(LATEST_SURVEY_ID).await.unwrap();
        assert_eq!(report.title, "Quarterly Engagement Survey");
    }
}
