use std::fs;
use std::path::Path;

use async_trait::async_trait;

use crate::models::{Assessment, AssessmentId};

use super::{AssessmentSource, AssessmentSummary, LoadError};

/// Reads a catalog file: a JSON array of assessments.
pub fn load_catalog_from_json<P: AsRef<Path>>(path: P) -> Result<Vec<Assessment>, LoadError> {
    let path = path.as_ref();

    let json_content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let catalog: Vec<Assessment> =
        serde_json::from_str(&json_content).map_err(|source| LoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    if catalog.is_empty() {
        return Err(LoadError::EmptyCatalog(path.to_path_buf()));
    }

    for assessment in &catalog {
        assessment.validate().map_err(|source| LoadError::Invalid {
            id: assessment.id,
            source,
        })?;
    }

    Ok(catalog)
}

/// Catalog backed by a JSON file, loaded once at construction.
#[derive(Debug, Clone)]
pub struct JsonSource {
    catalog: Vec<Assessment>,
}

impl JsonSource {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let catalog = load_catalog_from_json(path)?;
        tracing::info!(
            "loaded {} assessments from {}",
            catalog.len(),
            path.display()
        );
        Ok(Self { catalog })
    }
}

#[async_trait]
impl AssessmentSource for JsonSource {
    async fn load_assessment(&self, id: AssessmentId) -> Result<Assessment, LoadError> {
        self.catalog
            .iter()
            .find(|assessment| assessment.id == id)
            .cloned()
            .ok_or(LoadError::NotFound(id))
    }

    async fn list_assessments(&self) -> Result<Vec<AssessmentSummary>, LoadError> {
        Ok(self.catalog.iter().map(AssessmentSummary::from).collect())
    }
}
