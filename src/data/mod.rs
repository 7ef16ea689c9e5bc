//! Data source for assessment definitions.

mod loader;
mod mock;

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Assessment, AssessmentId, InvalidAssessment};

pub use loader::{JsonSource, load_catalog_from_json};
pub use mock::{CATEGORIES, MOCK_ASSESSMENT_ID, MOCK_QUESTION_COUNT, MockSource, generate_questions};

/// Failure to produce assessment or result data.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("assessment {0} was not found")]
    NotFound(AssessmentId),
    #[error("{0} is not a valid assessment id")]
    InvalidId(AssessmentId),
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{} must contain at least one assessment", .0.display())]
    EmptyCatalog(PathBuf),
    #[error("assessment {id} is malformed: {source}")]
    Invalid {
        id: AssessmentId,
        #[source]
        source: InvalidAssessment,
    },
}

/// Short catalog entry for the listing screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssessmentSummary {
    pub id: AssessmentId,
    pub title: String,
    pub estimated_time: String,
    pub question_count: usize,
}

impl From<&Assessment> for AssessmentSummary {
    fn from(assessment: &Assessment) -> Self {
        Self {
            id: assessment.id,
            title: assessment.title.clone(),
            estimated_time: assessment.estimated_time.clone(),
            question_count: assessment.len(),
        }
    }
}

/// Read-only provider of assessment definitions.
#[async_trait]
pub trait AssessmentSource: Send + Sync {
    async fn load_assessment(&self, id: AssessmentId) -> Result<Assessment, LoadError>;

    async fn list_assessments(&self) -> Result<Vec<AssessmentSummary>, LoadError>;
}
