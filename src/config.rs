//! Runtime settings and the services they select.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::autosave::{AutosaveConfig, DEFAULT_DEBOUNCE, DEFAULT_MAX_WAIT};
use crate::data::{AssessmentSource, JsonSource, LoadError, MockSource};
use crate::models::{AssessmentId, SurveyId};
use crate::results::MockResults;
use crate::routes::Route;
use crate::runtime::Services;
use crate::scoring::{DEFAULT_SUBMIT_DELAY, SimulatedScoring};
use crate::storage::FileStore;
use crate::surveys::MockSurveyResults;

pub const DEFAULT_DATA_DIR: &str = ".assessment-data";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Opens this assessment directly instead of the listing.
    pub assessment: Option<AssessmentId>,
    /// Opens the results of this survey round instead of the listing.
    pub survey: Option<SurveyId>,
    /// Catalog file; the built-in catalog is used when absent.
    pub catalog: Option<PathBuf>,
    /// Directory holding saved sessions.
    pub data_dir: PathBuf,
    pub autosave: AutosaveConfig,
    pub submit_delay: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            assessment: None,
            survey: None,
            catalog: None,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            autosave: AutosaveConfig {
                debounce: DEFAULT_DEBOUNCE,
                max_wait: DEFAULT_MAX_WAIT,
            },
            submit_delay: DEFAULT_SUBMIT_DELAY,
        }
    }
}

impl Config {
    /// The first screen: an assessment, a survey report, or the listing.
    pub fn initial_route(&self) -> Route {
        match (self.assessment, self.survey) {
            (Some(id), _) => Route::Take(id),
            (None, Some(id)) => Route::SurveyResults(id),
            (None, None) => Route::Listing,
        }
    }

    /// Builds the collaborators: a JSON or built-in catalog, file-backed
    /// sessions, simulated scoring, generated results and the sample survey
    /// report.
    pub fn services(&self) -> Result<Services, LoadError> {
        let source: Arc<dyn AssessmentSource> = match &self.catalog {
            Some(path) => Arc::new(JsonSource::open(path)?),
            None => Arc::new(MockSource::new()),
        };

        Ok(Services {
            source,
            store: Arc::new(FileStore::new(&self.data_dir)),
            scoring: Arc::new(SimulatedScoring::new(self.submit_delay)),
            results: Arc::new(MockResults::new()),
            surveys: Arc::new(MockSurveyResults),
        })
    }
}
