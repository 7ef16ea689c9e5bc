use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::question::{QuestionId, QuestionKind};

pub type SurveyId = u32;

/// Headline numbers of a survey round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveySummary {
    /// Out of 5.
    pub overall_satisfaction: f64,
    /// Out of 10.
    pub recommendation_score: f64,
    /// Out of 100.
    pub engagement_score: u8,
    pub completion_time: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionEntry {
    pub name: String,
    pub value: u32,
}

/// How the responses to one question were spread over its answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResult {
    pub question_id: QuestionId,
    pub question: String,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    pub distribution: Vec<DistributionEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_rating: Option<f64>,
}

impl QuestionResult {
    pub fn total(&self) -> u32 {
        self.distribution.iter().map(|entry| entry.value).sum()
    }

    /// Whole percent of all responses that `entry` represents.
    pub fn percent(&self, entry: &DistributionEntry) -> u32 {
        match self.total() {
            0 => 0,
            total => (f64::from(entry.value) * 100.0 / f64::from(total)).round() as u32,
        }
    }
}

/// The two headline scores another population reached.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodScores {
    pub overall_satisfaction: f64,
    pub engagement_score: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comparisons {
    pub previous_period: PeriodScores,
    pub industry_average: PeriodScores,
}

/// Aggregated outcome of a survey round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyReport {
    pub id: SurveyId,
    pub title: String,
    pub submitted_at: DateTime<Utc>,
    pub summary: SurveySummary,
    pub question_results: Vec<QuestionResult>,
    pub insights: Vec<String>,
    pub recommendations: Vec<String>,
    pub comparisons: Comparisons,
}

impl SurveyReport {
    /// Satisfaction change against the previous period, one decimal.
    pub fn satisfaction_change(&self) -> f64 {
        let delta =
            self.summary.overall_satisfaction - self.comparisons.previous_period.overall_satisfaction;
        (delta * 10.0).round() / 10.0
    }

    pub fn engagement_change(&self) -> i16 {
        i16::from(self.summary.engagement_score)
            - i16::from(self.comparisons.previous_period.engagement_score)
    }
}
