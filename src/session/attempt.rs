use std::sync::Arc;

use chrono::Utc;
use rand::Rng;

use crate::data::{AssessmentSource, LoadError};
use crate::models::{AnswerValue, Answers, Assessment, AssessmentId, Question};
use crate::storage::SessionStore;

use super::order::{LinearSelector, NextQuestionSelector, is_permutation_of, presentation_order};
use super::state::{Advance, SessionState};
use super::{Phase, SessionError};

/// How the attempt's state came to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Fresh,
    Resumed,
}

/// A copy of the state to persist, tagged with the revision it reflects.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub revision: u64,
    pub state: SessionState,
}

/// Final payload handed to the scoring service.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub assessment_id: AssessmentId,
    pub answers: Answers,
    pub elapsed_time: u64,
}

/// One user's progress through one assessment.
pub struct Attempt {
    assessment: Arc<Assessment>,
    state: SessionState,
    phase: Phase,
    origin: Origin,
    selector: Box<dyn NextQuestionSelector>,
    revision: u64,
    unsaved_edit: Option<u64>,
}

impl Attempt {
    /// Loads the assessment and resumes the stored session, if any.
    ///
    /// A stored session that cannot be read is logged and replaced by a
    /// fresh one; only a missing assessment fails.
    pub async fn initialize<R: Rng + Send>(
        source: &dyn AssessmentSource,
        store: &dyn SessionStore,
        id: AssessmentId,
        rng: &mut R,
    ) -> Result<Self, LoadError> {
        let assessment = source.load_assessment(id).await?;
        assessment
            .validate()
            .map_err(|source| LoadError::Invalid { id, source })?;

        let stored = match store.load(id) {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!("ignoring unreadable session for assessment {id}: {e}");
                None
            }
        };

        Ok(Self::restore(assessment, stored, rng))
    }

    /// Builds an attempt from a loaded assessment and an optional stored state.
    pub fn restore<R: Rng + ?Sized>(
        assessment: Assessment,
        stored: Option<SessionState>,
        rng: &mut R,
    ) -> Self {
        let (state, origin) = match stored {
            Some(stored) if stored.assessment_id == assessment.id => {
                match reconcile(stored, &assessment, rng) {
                    Some(state) => (state, Origin::Resumed),
                    None => (SessionState::fresh(&assessment, rng), Origin::Fresh),
                }
            }
            Some(stored) => {
                tracing::warn!(
                    "stored session belongs to assessment {}, expected {}",
                    stored.assessment_id,
                    assessment.id
                );
                (SessionState::fresh(&assessment, rng), Origin::Fresh)
            }
            None => (SessionState::fresh(&assessment, rng), Origin::Fresh),
        };

        match origin {
            Origin::Fresh => tracing::info!("starting assessment {} fresh", assessment.id),
            Origin::Resumed => tracing::info!(
                "resuming assessment {} at question {} of {}",
                assessment.id,
                state.current_question_index + 1,
                state.question_order.len()
            ),
        }

        Self {
            assessment: Arc::new(assessment),
            state,
            phase: Phase::Active,
            origin,
            selector: Box::new(LinearSelector),
            revision: 0,
            unsaved_edit: None,
        }
    }

    /// Replaces the linear walk with another selection policy.
    pub fn with_selector(mut self, selector: Box<dyn NextQuestionSelector>) -> Self {
        self.selector = selector;
        self
    }

    pub fn assessment(&self) -> &Assessment {
        &self.assessment
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.state.current_question(&self.assessment)
    }

    pub fn current_answer(&self) -> Option<&AnswerValue> {
        self.state.current_answer()
    }

    /// False while answer or navigation edits have not reached storage.
    pub fn is_saved(&self) -> bool {
        self.unsaved_edit.is_none()
    }

    pub fn can_retreat(&self) -> bool {
        self.phase == Phase::Active
            && self.selector.allows_retreat()
            && self.state.current_question_index > 0
    }

    pub fn record_answer(&mut self, value: Option<AnswerValue>) -> Result<(), SessionError> {
        self.ensure_active()?;
        self.state.record_answer(&self.assessment, value)?;
        self.edited();
        Ok(())
    }

    pub fn advance(&mut self) -> Result<Advance, SessionError> {
        self.ensure_active()?;
        let outcome = self
            .state
            .advance(&self.assessment, self.selector.as_ref())?;
        if let Advance::Moved(_) = outcome {
            self.edited();
        }
        Ok(outcome)
    }

    pub fn retreat(&mut self) -> bool {
        if !self.can_retreat() {
            return false;
        }
        let moved = self.state.retreat();
        if moved {
            self.edited();
        }
        moved
    }

    /// Counts one second. Only an active attempt's clock runs.
    pub fn tick(&mut self) -> bool {
        if self.phase != Phase::Active {
            return false;
        }
        self.state.tick();
        self.revision += 1;
        true
    }

    pub fn snapshot(&self) -> Snapshot {
        let mut state = self.state.clone();
        state.saved_at = Utc::now();
        Snapshot {
            revision: self.revision,
            state,
        }
    }

    /// Records that everything up to `revision` is durable.
    pub fn mark_saved(&mut self, revision: u64) {
        if self.unsaved_edit.is_some_and(|edit| edit <= revision) {
            self.unsaved_edit = None;
        }
    }

    /// Freezes the attempt for submission; a second call while one is in
    /// flight is refused.
    pub fn begin_submit(&mut self) -> Result<Submission, SessionError> {
        match self.phase {
            Phase::Active => {}
            Phase::Submitting => return Err(SessionError::SubmitInFlight),
            other => return Err(SessionError::NotActive(other)),
        }

        self.phase = Phase::Submitting;
        Ok(Submission {
            assessment_id: self.assessment.id,
            answers: self.state.answers.clone(),
            elapsed_time: self.state.elapsed_time,
        })
    }

    /// Completes a submission; a failure returns the attempt to active.
    pub fn finish_submit(&mut self, succeeded: bool) {
        if self.phase != Phase::Submitting {
            return;
        }
        self.phase = if succeeded {
            Phase::Submitted
        } else {
            Phase::Active
        };
    }

    /// Abandons the attempt for now. The returned snapshot is what should be
    /// left in storage for resumption.
    pub fn exit(&mut self) -> Result<Snapshot, SessionError> {
        self.ensure_active()?;
        self.phase = Phase::Exited;
        Ok(self.snapshot())
    }

    fn ensure_active(&self) -> Result<(), SessionError> {
        match self.phase {
            Phase::Active => Ok(()),
            other => Err(SessionError::NotActive(other)),
        }
    }

    fn edited(&mut self) {
        self.revision += 1;
        self.unsaved_edit = Some(self.revision);
    }
}

/// Checks a stored state against the assessment it claims to belong to.
fn reconcile<R: Rng + ?Sized>(
    mut stored: SessionState,
    assessment: &Assessment,
    rng: &mut R,
) -> Option<SessionState> {
    let ids = assessment.question_ids();

    if stored.question_order.is_empty() {
        stored.question_order = presentation_order(assessment, rng);
    } else if !is_permutation_of(&stored.question_order, &ids) {
        tracing::warn!(
            "stored order for assessment {} no longer matches its questions",
            assessment.id
        );
        return None;
    }

    if stored.current_question_index >= stored.question_order.len() {
        stored.current_question_index = stored.question_order.len().saturating_sub(1);
    }

    stored
        .answers
        .retain_questions(|id| assessment.question(id).is_some());

    Some(stored)
}
