//! Navigation paths shared with the rest of the portal.

use std::fmt;

use crate::models::{AssessmentId, SurveyId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// `/assessments`
    Listing,
    /// `/assessments/take/:id`
    Take(AssessmentId),
    /// `/assessments/results/:id`
    Results(AssessmentId),
    /// `/surveys/results/:id`
    SurveyResults(SurveyId),
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Listing => "/assessments".to_string(),
            Route::Take(id) => format!("/assessments/take/{id}"),
            Route::Results(id) => format!("/assessments/results/{id}"),
            Route::SurveyResults(id) => format!("/surveys/results/{id}"),
        }
    }

    /// Parses a path; trailing slashes are ignored.
    pub fn parse(path: &str) -> Option<Self> {
        let segments: Vec<&str> = path
            .trim_end_matches('/')
            .split('/')
            .skip(1)
            .collect();

        match segments.as_slice() {
            ["assessments"] => Some(Route::Listing),
            ["assessments", "take", id] => id.parse().ok().map(Route::Take),
            ["assessments", "results", id] => id.parse().ok().map(Route::Results),
            ["surveys", "results", id] => id.parse().ok().map(Route::SurveyResults),
            _ => None,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
