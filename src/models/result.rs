use serde::{Deserialize, Serialize};

use super::assessment::AssessmentId;

/// Score for one category, all values on a 0-100 scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryScore {
    pub category: String,
    pub score: u8,
    /// Industry average.
    pub average: u8,
    /// Score of the previous attempt.
    pub previous: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// Everything the results screen shows for a submitted attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentResult {
    pub assessment_id: AssessmentId,
    pub assessment_title: String,
    pub completed_date: String,
    pub overall_score: u8,
    pub summary: String,
    pub category_scores: Vec<CategoryScore>,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub recommendations: Vec<Recommendation>,
    pub detailed_feedback: String,
}
