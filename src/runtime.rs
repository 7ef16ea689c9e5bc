//! Effect executor: runs the work the app asks for and routes the outcomes
//! back as events.

use std::collections::VecDeque;
use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::mpsc;

use crate::app::{App, AppEvent, Effect, ListingEntry};
use crate::autosave::{AutosaveConfig, Autosaver, SaveEvent};
use crate::data::{AssessmentSource, AssessmentSummary};
use crate::models::{AssessmentId, SurveyId};
use crate::results::ResultSource;
use crate::scoring::ScoringService;
use crate::session::{Attempt, Submission};
use crate::storage::SessionStore;
use crate::surveys::SurveyResultSource;

/// The collaborators the portal talks to.
#[derive(Clone)]
pub struct Services {
    pub source: Arc<dyn AssessmentSource>,
    pub store: Arc<dyn SessionStore>,
    pub scoring: Arc<dyn ScoringService>,
    pub results: Arc<dyn ResultSource>,
    pub surveys: Arc<dyn SurveyResultSource>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Something that finished in the background.
pub enum Incoming {
    App(AppEvent),
    Save(SaveEvent),
}

impl Incoming {
    pub fn deliver(self, app: &mut App) -> Vec<Effect> {
        match self {
            Incoming::App(event) => app.on_event(event),
            Incoming::Save(event) => app.on_save_event(event),
        }
    }
}

pub struct Runtime {
    services: Services,
    autosaver: Arc<Autosaver>,
    sender: mpsc::UnboundedSender<AppEvent>,
    events: mpsc::UnboundedReceiver<AppEvent>,
    save_events: mpsc::UnboundedReceiver<SaveEvent>,
}

impl Runtime {
    /// Must be called from within a tokio runtime.
    pub fn new(services: Services, autosave: AutosaveConfig) -> Self {
        let (save_sender, save_events) = mpsc::unbounded_channel();
        let autosaver = Autosaver::spawn(Arc::clone(&services.store), autosave, save_sender);
        let (sender, events) = mpsc::unbounded_channel();

        Self {
            services,
            autosaver: Arc::new(autosaver),
            sender,
            events,
            save_events,
        }
    }

    /// Waits for the next background outcome.
    pub async fn recv(&mut self) -> Option<Incoming> {
        tokio::select! {
            Some(event) = self.events.recv() => Some(Incoming::App(event)),
            Some(event) = self.save_events.recv() => Some(Incoming::Save(event)),
            else => None,
        }
    }

    /// Runs effects in order. Immediate saves are awaited so that a following
    /// `Quit` never races them.
    pub async fn execute(&self, app: &mut App, effects: Vec<Effect>) -> Flow {
        let mut queue = VecDeque::from(effects);

        while let Some(effect) = queue.pop_front() {
            match effect {
                Effect::Quit => return Flow::Quit,
                Effect::PersistNow(snapshot) => {
                    let result = self.autosaver.save_now(snapshot).await;
                    queue.extend(app.on_event(AppEvent::Persisted(result)));
                }
                Effect::Persist(snapshot) => self.autosaver.schedule(snapshot),
                Effect::CancelAutosave => self.autosaver.cancel(),
                Effect::LoadListing => self.load_listing(),
                Effect::LoadAssessment(id) => self.load_assessment(id),
                Effect::Submit(submission) => self.submit(submission),
                Effect::LoadResult(id) => self.load_result(id),
                Effect::LoadSurveyResult(id) => self.load_survey_result(id),
            }
        }

        Flow::Continue
    }

    fn load_listing(&self) {
        let source = Arc::clone(&self.services.source);
        let store = Arc::clone(&self.services.store);
        let sender = self.sender.clone();

        tokio::spawn(async move {
            let result = match source.list_assessments().await {
                Ok(summaries) => Ok(mark_resumable(store, summaries).await),
                Err(e) => Err(e),
            };
            let _ = sender.send(AppEvent::ListingLoaded(result));
        });
    }

    fn load_assessment(&self, id: AssessmentId) {
        let source = Arc::clone(&self.services.source);
        let store = Arc::clone(&self.services.store);
        let sender = self.sender.clone();

        tokio::spawn(async move {
            tracing::info!("loading assessment {id}");
            let mut rng = StdRng::from_os_rng();
            let result = Attempt::initialize(source.as_ref(), store.as_ref(), id, &mut rng).await;
            let _ = sender.send(AppEvent::AttemptReady(id, result));
        });
    }

    fn submit(&self, submission: Submission) {
        let scoring = Arc::clone(&self.services.scoring);
        let autosaver = Arc::clone(&self.autosaver);
        let sender = self.sender.clone();

        tokio::spawn(async move {
            let assessment_id = submission.assessment_id;
            let outcome = scoring.submit(&submission).await;
            let cleared = match &outcome {
                Ok(_) => autosaver.discard(assessment_id).await,
                Err(_) => Ok(()),
            };
            let _ = sender.send(AppEvent::Submitted {
                assessment_id,
                outcome,
                cleared,
            });
        });
    }

    fn load_result(&self, id: AssessmentId) {
        let results = Arc::clone(&self.services.results);
        let sender = self.sender.clone();

        tokio::spawn(async move {
            let result = results.load_result(id).await;
            let _ = sender.send(AppEvent::ResultLoaded(id, result));
        });
    }

    fn load_survey_result(&self, id: SurveyId) {
        let surveys = Arc::clone(&self.services.surveys);
        let sender = self.sender.clone();

        tokio::spawn(async move {
            let result = surveys.load_survey_result(id).await;
            let _ = sender.send(AppEvent::SurveyResultLoaded(id, result));
        });
    }
}

async fn mark_resumable(
    store: Arc<dyn SessionStore>,
    summaries: Vec<AssessmentSummary>,
) -> Vec<ListingEntry> {
    let ids: Vec<AssessmentId> = summaries.iter().map(|s| s.id).collect();
    let stored = tokio::task::spawn_blocking(move || {
        ids.into_iter()
            .map(|id| store.contains(id).unwrap_or(false))
            .collect::<Vec<_>>()
    })
    .await
    .unwrap_or_default();

    summaries
        .into_iter()
        .enumerate()
        .map(|(i, summary)| ListingEntry {
            summary,
            resumable: stored.get(i).copied().unwrap_or(false),
        })
        .collect()
}

