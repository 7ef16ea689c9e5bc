//! # assessment-tui
//!
//! A terminal client for taking timed, resumable assessments. Progress is
//! saved automatically while answering, so an attempt that is left (or
//! interrupted) picks up at the same question, with the same question order
//! and the same elapsed time.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use assessment_tui::{AssessmentError, Config, Portal};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), AssessmentError> {
//!     // Built-in catalog, sessions saved under `.assessment-data`
//!     let portal = Portal::from_config(&Config::default())?;
//!
//!     // Take over the terminal until the user quits
//!     portal.run().await
//! }
//! ```

pub mod app;
pub mod autosave;
pub mod config;
pub mod data;
pub mod models;
pub mod results;
pub mod routes;
pub mod runtime;
pub mod scoring;
pub mod session;
pub mod storage;
pub mod surveys;
pub mod terminal;
mod ui;

use std::io;
use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyEventKind};
use futures_util::StreamExt;
use rand::SeedableRng;
use rand::rngs::StdRng;
use thiserror::Error;
use tokio::time::MissedTickBehavior;

pub use app::App;
pub use autosave::{AutosaveConfig, Autosaver, SaveEvent};
pub use config::Config;
pub use data::{AssessmentSource, JsonSource, LoadError, MockSource, load_catalog_from_json};
pub use models::{AnswerValue, Answers, Assessment, AssessmentId, Question, QuestionKind};
pub use routes::Route;
pub use runtime::{Flow, Runtime, Services};
pub use scoring::{ScoringError, ScoringService, SimulatedScoring};
pub use session::{Attempt, Phase, SessionError, SessionState};
pub use storage::{FileStore, MemoryStore, SessionStore, StorageError};
pub use surveys::{MockSurveyResults, SurveyResultSource};

/// Error type for the portal as a whole.
#[derive(Debug, Error)]
pub enum AssessmentError {
    #[error("failed to load data: {0}")]
    Load(#[from] LoadError),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("terminal error: {0}")]
    Io(#[from] io::Error),
}

const TICK: Duration = Duration::from_secs(1);

/// The assessment portal, ready to run in the terminal.
pub struct Portal {
    services: Services,
    autosave: AutosaveConfig,
    initial: Route,
}

impl Portal {
    pub fn new(services: Services, autosave: AutosaveConfig) -> Self {
        Self {
            services,
            autosave,
            initial: Route::Listing,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, AssessmentError> {
        let mut portal = Self::new(config.services()?, config.autosave);
        portal.initial = config.initial_route();
        Ok(portal)
    }

    /// Takes over the terminal and returns when the user quits.
    pub async fn run(self) -> Result<(), AssessmentError> {
        let mut term = terminal::init()?;
        let result = self.run_event_loop(&mut term).await;
        terminal::restore()?;
        result
    }

    async fn run_event_loop(self, term: &mut terminal::PortalTerminal) -> Result<(), AssessmentError> {
        let mut runtime = Runtime::new(self.services, self.autosave);
        let mut app = App::new(StdRng::from_os_rng());
        let mut keys = EventStream::new();
        let mut ticks = tokio::time::interval_at(tokio::time::Instant::now() + TICK, TICK);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let effects = app.start(self.initial);
        if runtime.execute(&mut app, effects).await == Flow::Quit {
            return Ok(());
        }

        loop {
            term.draw(|frame| ui::render(frame, &app))?;

            let effects = tokio::select! {
                event = keys.next() => match event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => app.on_key(key),
                    Some(Ok(_)) => Vec::new(),
                    Some(Err(e)) => return Err(e.into()),
                    None => app.interrupt(),
                },
                _ = ticks.tick() => app.on_tick(),
                Some(incoming) = runtime.recv() => incoming.deliver(&mut app),
            };

            if runtime.execute(&mut app, effects).await == Flow::Quit {
                break;
            }
        }

        tracing::info!("leaving at {}", app.route());
        Ok(())
    }
}
