//! Results collaborator: produces the report shown after submission.

use std::sync::Mutex;
use std::sync::PoisonError;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::data::{CATEGORIES, LoadError, MOCK_ASSESSMENT_ID};
use crate::models::{AssessmentId, AssessmentResult, CategoryScore, Recommendation};

const STRENGTH_THRESHOLD: u8 = 75;
const WEAKNESS_THRESHOLD: u8 = 60;

#[async_trait]
pub trait ResultSource: Send + Sync {
    async fn load_result(&self, id: AssessmentId) -> Result<AssessmentResult, LoadError>;
}

/// Generates plausible random reports.
pub struct MockResults {
    rng: Mutex<StdRng>,
}

impl MockResults {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for MockResults {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResultSource for MockResults {
    async fn load_result(&self, id: AssessmentId) -> Result<AssessmentResult, LoadError> {
        if id == 0 {
            return Err(LoadError::InvalidId(id));
        }
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(generate_result(id, &mut *rng))
    }
}

/// Random category scores and the report derived from them.
pub fn generate_result<R: Rng + ?Sized>(id: AssessmentId, rng: &mut R) -> AssessmentResult {
    let category_scores: Vec<CategoryScore> = CATEGORIES
        .iter()
        .map(|category| CategoryScore {
            category: category.to_string(),
            score: rng.random_range(40..=100),
            average: rng.random_range(55..=75),
            previous: rng.random_range(45..=85),
        })
        .collect();

    build_result(id, category_scores, chrono::Local::now().format("%Y-%m-%d").to_string())
}

fn build_result(
    id: AssessmentId,
    category_scores: Vec<CategoryScore>,
    completed_date: String,
) -> AssessmentResult {
    let total: u32 = category_scores.iter().map(|s| u32::from(s.score)).sum();
    let overall_score = if category_scores.is_empty() {
        0
    } else {
        (f64::from(total) / category_scores.len() as f64).round() as u8
    };

    let strengths: Vec<String> = category_scores
        .iter()
        .filter(|s| s.score >= STRENGTH_THRESHOLD)
        .map(|s| s.category.clone())
        .collect();
    let weaknesses: Vec<String> = category_scores
        .iter()
        .filter(|s| s.score < WEAKNESS_THRESHOLD)
        .map(|s| s.category.clone())
        .collect();

    let mut summary = format!("Your overall score is {overall_score}.");
    if !strengths.is_empty() {
        summary.push_str(&format!(" You show strength in {}.", strengths.join(", ")));
    }
    if !weaknesses.is_empty() {
        summary.push_str(&format!(
            " There is room to improve in {}.",
            weaknesses.join(", ")
        ));
    }

    let mut recommendations = vec![
        Recommendation {
            title: "Online course: sharpening logical thinking".to_string(),
            description: "Strengthens data analysis and critical thinking.".to_string(),
            link: Some("#".to_string()),
        },
        Recommendation {
            title: "Effective communication training".to_string(),
            description: "Improves presentation and interpersonal skills.".to_string(),
            link: Some("#".to_string()),
        },
    ];
    if weaknesses.iter().any(|w| w == "Problem Solving") {
        recommendations.push(Recommendation {
            title: "Problem solving workshop".to_string(),
            description: "Builds solving skills through practical case studies.".to_string(),
            link: Some("#".to_string()),
        });
    }

    let name = if id == MOCK_ASSESSMENT_ID {
        "Comprehensive Skills Assessment"
    } else {
        "assessment"
    };
    let detailed_feedback = format!(
        "This {name} looked at several of your abilities. {} {}",
        if strengths.is_empty() {
            "No single area stood out as a strength.".to_string()
        } else {
            format!("You showed high potential in {}.", strengths.join(" and "))
        },
        if weaknesses.is_empty() {
            "Keep building on your current level through continued practice.".to_string()
        } else {
            format!(
                "{} can be developed further through study and practice.",
                weaknesses.join(" and ")
            )
        }
    );

    AssessmentResult {
        assessment_id: id,
        assessment_title: format!("Comprehensive Skills Assessment (ID: {id})"),
        completed_date,
        overall_score,
        summary,
        category_scores,
        strengths: non_empty_or(strengths, "No notable strengths"),
        weaknesses: non_empty_or(weaknesses, "No notable weaknesses"),
        recommendations,
        detailed_feedback,
    }
}

fn non_empty_or(items: Vec<String>, placeholder: &str) -> Vec<String> {
    if items.is_empty() {
        vec![placeholder.to_string()]
    } else {
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(category: &str, score: u8) -> CategoryScore {
        CategoryScore {
            category: category.to_string(),
            score,
            average: 65,
            previous: 60,
        }
    }

    #[test]
    fn test_generated_scores_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            let result = generate_result(101, &mut rng);
            assert_eq!(result.category_scores.len(), 5);
            for s in &result.category_scores {
                assert!((40..=100).contains(&s.score));
                assert!((55..=75).contains(&s.average));
                assert!((45..=85).contains(&s.previous));
            }
            assert!((40..=100).contains(&result.overall_score));
        }
    }

    #[test]
    fn test_strengths_and_weaknesses_follow_thresholds() {
        let result = build_result(
            101,
            vec![
                score("Logical Thinking", 90),
                score("Communication", 75),
                score("Problem Solving", 59),
                score("Teamwork", 60),
                score("Leadership", 41),
            ],
            "2026-10-18".to_string(),
        );

        assert_eq!(result.overall_score, 65);
        assert_eq!(result.strengths, vec!["Logical Thinking", "Communication"]);
        assert_eq!(result.weaknesses, vec!["Problem Solving", "Leadership"]);
        assert_eq!(result.recommendations.len(), 3);
        assert!(result.summary.contains("65"));
    }

    #[test]
    fn test_placeholders_when_nothing_stands_out() {
        let result = build_result(
            7,
            vec![score("Teamwork", 70), score("Leadership", 65)],
            "2026-10-18".to_string(),
        );
        assert_eq!(result.strengths, vec!["No notable strengths"]);
        assert_eq!(result.weaknesses, vec!["No notable weaknesses"]);
        assert_eq!(result.recommendations.len(), 2);
    }

    #[tokio::test]
    async fn test_zero_id_is_invalid() {
        let results = MockResults::with_seed(1);
        assert!(matches!(
            results.load_result(0).await,
            Err(LoadError::InvalidId(0))
        ));
        assert_eq!(results.load_result(101).await.unwrap().assessment_id, 101);
    }
}
