//! Presentation controller.
//!
//! `App` turns key presses, timer ticks and background results into screen
//! changes plus a list of [`Effect`]s. It never performs I/O itself; the
//! runtime executes the effects and feeds their outcomes back as
//! [`AppEvent`]s.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use rand::rngs::StdRng;

use crate::autosave::SaveEvent;
use crate::data::{AssessmentSummary, LoadError};
use crate::models::{
    AnswerValue, AssessmentId, AssessmentResult, OptionId, QuestionId, QuestionKind, SurveyId,
    SurveyReport,
};
use crate::routes::Route;
use crate::scoring::{ScoringError, SubmissionReceipt};
use crate::session::{Advance, Attempt, Origin, Phase, SessionError, Snapshot, Submission, shuffled};
use crate::storage::StorageError;
use crate::surveys::LATEST_SURVEY_ID;

/// Ticks a notification stays on screen.
const NOTICE_TTL: u8 = 4;

/// Work the runtime performs on the app's behalf.
#[derive(Debug)]
pub enum Effect {
    LoadListing,
    LoadAssessment(AssessmentId),
    /// Debounced write.
    Persist(Snapshot),
    /// Immediate write, superseding anything pending.
    PersistNow(Snapshot),
    CancelAutosave,
    Submit(Submission),
    LoadResult(AssessmentId),
    LoadSurveyResult(SurveyId),
    Quit,
}

/// Outcomes of effects, delivered back to the app.
pub enum AppEvent {
    ListingLoaded(Result<Vec<ListingEntry>, LoadError>),
    AttemptReady(AssessmentId, Result<Attempt, LoadError>),
    Submitted {
        assessment_id: AssessmentId,
        outcome: Result<SubmissionReceipt, ScoringError>,
        cleared: Result<(), StorageError>,
    },
    ResultLoaded(AssessmentId, Result<AssessmentResult, LoadError>),
    SurveyResultLoaded(SurveyId, Result<SurveyReport, LoadError>),
    Persisted(Result<(), StorageError>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub summary: AssessmentSummary,
    /// A stored session exists and will be resumed.
    pub resumable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub detail: String,
    ttl: u8,
}

impl Notice {
    pub fn info(title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            title: title.into(),
            detail: detail.into(),
            ttl: NOTICE_TTL,
        }
    }

    pub fn error(title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            title: title.into(),
            detail: detail.into(),
            ttl: NOTICE_TTL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialog {
    Help,
    ConfirmExit,
    ConfirmSubmit,
}

#[derive(Debug, Default)]
pub struct ListingView {
    pub entries: Vec<ListingEntry>,
    pub selected: usize,
    pub loaded: bool,
}

pub struct TakingView {
    pub attempt: Attempt,
    /// Display order of the current question's options.
    pub option_order: Vec<OptionId>,
    pub cursor: usize,
    pub dialog: Option<Dialog>,
    shown: Option<QuestionId>,
}

pub struct ResultsView {
    pub assessment_id: AssessmentId,
    pub result: Option<AssessmentResult>,
    pub scroll: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SurveyTab {
    #[default]
    Summary,
    Details,
    Insights,
    Comparison,
}

impl SurveyTab {
    pub const ALL: [SurveyTab; 4] = [
        SurveyTab::Summary,
        SurveyTab::Details,
        SurveyTab::Insights,
        SurveyTab::Comparison,
    ];

    pub fn title(self) -> &'static str {
        match self {
            SurveyTab::Summary => "Summary",
            SurveyTab::Details => "Details",
            SurveyTab::Insights => "Insights",
            SurveyTab::Comparison => "Comparison",
        }
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|tab| *tab == self).unwrap_or(0)
    }

    fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    fn previous(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

pub struct SurveyResultsView {
    pub survey_id: SurveyId,
    pub report: Option<SurveyReport>,
    pub tab: SurveyTab,
    pub scroll: u16,
}

pub enum Screen {
    Listing(ListingView),
    Loading(AssessmentId),
    Taking(TakingView),
    Results(ResultsView),
    SurveyResults(SurveyResultsView),
}

impl TakingView {
    fn new(attempt: Attempt, rng: &mut StdRng) -> Self {
        let mut view = Self {
            attempt,
            option_order: Vec::new(),
            cursor: 0,
            dialog: None,
            shown: None,
        };
        view.sync_question(rng);
        view
    }

    /// Reshuffles the options whenever a different question comes into view.
    fn sync_question(&mut self, rng: &mut StdRng) {
        let Some(question) = self.attempt.current_question() else {
            self.option_order.clear();
            self.shown = None;
            return;
        };
        if self.shown == Some(question.id) {
            return;
        }

        let id = question.id;
        let option_ids: Vec<OptionId> = question.options.iter().map(|o| o.id).collect();
        self.shown = Some(id);
        self.option_order = shuffled(&option_ids, rng);
        self.cursor = self.answered_position().unwrap_or(0);
    }

    fn answered_position(&self) -> Option<usize> {
        let question = self.attempt.current_question()?;
        let answer = self.attempt.current_answer()?;
        match question.kind {
            QuestionKind::Single => {
                let id = OptionId::try_from(answer.as_number()?).ok()?;
                self.option_order.iter().position(|o| *o == id)
            }
            QuestionKind::Rating => {
                let offset = answer.as_number()?.checked_sub(question.rating_bounds().min)?;
                usize::try_from(offset).ok()
            }
            QuestionKind::Boolean => Some(if answer.as_flag()? { 0 } else { 1 }),
            QuestionKind::Multiple | QuestionKind::Text => None,
        }
    }

    /// Number of cursor positions for the current question.
    pub fn item_count(&self) -> usize {
        match self.attempt.current_question() {
            Some(q) if q.kind.has_options() => self.option_order.len(),
            Some(q) if q.kind == QuestionKind::Rating => q.rating_bounds().len(),
            Some(q) if q.kind == QuestionKind::Boolean => 2,
            _ => 0,
        }
    }

    pub fn current_text(&self) -> &str {
        self.attempt
            .current_answer()
            .and_then(AnswerValue::as_text)
            .unwrap_or("")
    }

    fn is_text_question(&self) -> bool {
        self.attempt
            .current_question()
            .is_some_and(|q| q.kind == QuestionKind::Text)
    }

    /// The answer that selecting the item under the cursor produces.
    fn value_at_cursor(&self) -> Option<AnswerValue> {
        let question = self.attempt.current_question()?;
        match question.kind {
            QuestionKind::Single => self
                .option_order
                .get(self.cursor)
                .map(|id| AnswerValue::choice(*id)),
            QuestionKind::Multiple => {
                let id = *self.option_order.get(self.cursor)?;
                let mut selected = self
                    .attempt
                    .current_answer()
                    .map(|a| a.as_choices().to_vec())
                    .unwrap_or_default();
                if let Some(index) = selected.iter().position(|s| *s == id) {
                    selected.remove(index);
                } else {
                    selected.push(id);
                }
                Some(AnswerValue::Choices(selected))
            }
            QuestionKind::Rating => {
                let bounds = question.rating_bounds();
                let value = bounds.min.checked_add(i64::try_from(self.cursor).ok()?)?;
                bounds.contains(value).then_some(AnswerValue::rating(value))
            }
            QuestionKind::Boolean => Some(AnswerValue::Flag(self.cursor == 0)),
            QuestionKind::Text => None,
        }
    }

    fn rating_cursor(&self, value: i64) -> Option<usize> {
        let question = self.attempt.current_question()?;
        let bounds = question.rating_bounds();
        if question.kind != QuestionKind::Rating || !bounds.contains(value) {
            return None;
        }
        usize::try_from(value.checked_sub(bounds.min)?).ok()
    }
}

impl ResultsView {
    fn loading(assessment_id: AssessmentId) -> Self {
        Self {
            assessment_id,
            result: None,
            scroll: 0,
        }
    }
}

impl SurveyResultsView {
    fn loading(survey_id: SurveyId) -> Self {
        Self {
            survey_id,
            report: None,
            tab: SurveyTab::default(),
            scroll: 0,
        }
    }
}

/// What a screen handler wants done besides its own state change.
#[derive(Default)]
struct Reaction {
    effects: Vec<Effect>,
    notice: Option<Notice>,
    goto: Option<Goto>,
}

enum Goto {
    Listing,
    Take(AssessmentId),
    Results(AssessmentId),
    SurveyResults(SurveyId),
}

impl From<Route> for Goto {
    fn from(route: Route) -> Self {
        match route {
            Route::Listing => Goto::Listing,
            Route::Take(id) => Goto::Take(id),
            Route::Results(id) => Goto::Results(id),
            Route::SurveyResults(id) => Goto::SurveyResults(id),
        }
    }
}

impl Reaction {
    fn effect(effect: Effect) -> Self {
        Self {
            effects: vec![effect],
            ..Self::default()
        }
    }

    fn notice(notice: Notice) -> Self {
        Self {
            notice: Some(notice),
            ..Self::default()
        }
    }

    fn goto(goto: Goto) -> Self {
        Self {
            goto: Some(goto),
            ..Self::default()
        }
    }
}

pub struct App {
    screen: Screen,
    notice: Option<Notice>,
    rng: StdRng,
}

impl App {
    pub fn new(rng: StdRng) -> Self {
        Self {
            screen: Screen::Listing(ListingView::default()),
            notice: None,
            rng,
        }
    }

    /// Opens the screen behind `route`.
    pub fn start(&mut self, route: Route) -> Vec<Effect> {
        self.apply(Reaction::goto(Goto::from(route)))
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn route(&self) -> Route {
        match &self.screen {
            Screen::Listing(_) => Route::Listing,
            Screen::Loading(id) => Route::Take(*id),
            Screen::Taking(view) => Route::Take(view.attempt.assessment().id),
            Screen::Results(view) => Route::Results(view.assessment_id),
            Screen::SurveyResults(view) => Route::SurveyResults(view.survey_id),
        }
    }

    pub fn on_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return self.interrupt();
        }

        let reaction = match &mut self.screen {
            Screen::Listing(view) => listing_key(view, key.code),
            Screen::Loading(_) => Reaction::default(),
            Screen::Taking(view) => taking_key(view, &mut self.rng, key.code),
            Screen::Results(view) => results_key(view, key.code),
            Screen::SurveyResults(view) => survey_key(view, key.code),
        };
        self.apply(reaction)
    }

    /// One second of wall time.
    pub fn on_tick(&mut self) -> Vec<Effect> {
        if let Some(notice) = &mut self.notice {
            notice.ttl = notice.ttl.saturating_sub(1);
        }
        if self.notice.as_ref().is_some_and(|n| n.ttl == 0) {
            self.notice = None;
        }

        match &mut self.screen {
            Screen::Taking(view) => {
                if view.attempt.tick() {
                    vec![Effect::Persist(view.attempt.snapshot())]
                } else {
                    Vec::new()
                }
            }
            _ => Vec::new(),
        }
    }

    pub fn on_event(&mut self, event: AppEvent) -> Vec<Effect> {
        let reaction = match event {
            AppEvent::ListingLoaded(result) => self.listing_loaded(result),
            AppEvent::AttemptReady(id, result) => self.attempt_ready(id, result),
            AppEvent::Submitted {
                assessment_id,
                outcome,
                cleared,
            } => self.submitted(assessment_id, outcome, cleared),
            AppEvent::ResultLoaded(id, result) => self.result_loaded(id, result),
            AppEvent::SurveyResultLoaded(id, result) => self.survey_result_loaded(id, result),
            AppEvent::Persisted(Ok(())) => Reaction::default(),
            AppEvent::Persisted(Err(e)) => Reaction::notice(Notice::error(
                "Save failed",
                format!("Progress could not be saved: {e}"),
            )),
        };
        self.apply(reaction)
    }

    pub fn on_save_event(&mut self, event: SaveEvent) -> Vec<Effect> {
        match event {
            SaveEvent::Saved {
                assessment_id,
                revision,
                ..
            } => {
                if let Screen::Taking(view) = &mut self.screen {
                    if view.attempt.assessment().id == assessment_id {
                        view.attempt.mark_saved(revision);
                    }
                }
            }
            SaveEvent::Failed { reason, .. } => {
                self.notice = Some(Notice::error(
                    "Autosave failed",
                    format!("Answers are kept in memory and saving will be retried ({reason})."),
                ));
            }
        }
        Vec::new()
    }

    /// Leaves the portal, saving an attempt in progress first.
    pub fn interrupt(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        if let Screen::Taking(view) = &mut self.screen {
            if let Ok(snapshot) = view.attempt.exit() {
                effects.push(Effect::PersistNow(snapshot));
            }
        }
        effects.push(Effect::Quit);
        effects
    }

    fn listing_loaded(&mut self, result: Result<Vec<ListingEntry>, LoadError>) -> Reaction {
        let Screen::Listing(view) = &mut self.screen else {
            return Reaction::default();
        };
        match result {
            Ok(entries) => {
                view.selected = view.selected.min(entries.len().saturating_sub(1));
                view.entries = entries;
                view.loaded = true;
                Reaction::default()
            }
            Err(e) => {
                view.loaded = true;
                Reaction::notice(Notice::error("Error", format!("Could not list assessments: {e}")))
            }
        }
    }

    fn attempt_ready(&mut self, id: AssessmentId, result: Result<Attempt, LoadError>) -> Reaction {
        if !matches!(self.screen, Screen::Loading(loading) if loading == id) {
            return Reaction::default();
        }

        match result {
            Ok(attempt) => {
                let resumed = attempt.origin() == Origin::Resumed;
                let snapshot = attempt.snapshot();
                self.screen = Screen::Taking(TakingView::new(attempt, &mut self.rng));

                let mut reaction = Reaction::effect(Effect::Persist(snapshot));
                if resumed {
                    reaction.notice = Some(Notice::info("Resumed", "Picking up where you left off."));
                }
                reaction
            }
            Err(e) => {
                tracing::error!("failed to load assessment {id}: {e}");
                Reaction {
                    notice: Some(Notice::error(
                        "Error",
                        format!("Failed to load the assessment: {e}"),
                    )),
                    goto: Some(Goto::Listing),
                    ..Reaction::default()
                }
            }
        }
    }

    fn submitted(
        &mut self,
        assessment_id: AssessmentId,
        outcome: Result<SubmissionReceipt, ScoringError>,
        cleared: Result<(), StorageError>,
    ) -> Reaction {
        let Screen::Taking(view) = &mut self.screen else {
            return Reaction::default();
        };
        if view.attempt.assessment().id != assessment_id {
            return Reaction::default();
        }

        match outcome {
            Ok(receipt) => {
                view.attempt.finish_submit(true);
                tracing::info!(
                    "assessment {assessment_id} submitted with {} answers",
                    receipt.answered
                );
                let notice = match cleared {
                    Ok(()) => Notice::info("Submitted", "Your assessment was submitted."),
                    Err(e) => Notice::error(
                        "Submitted",
                        format!("Submitted, but saved progress could not be cleared: {e}"),
                    ),
                };
                Reaction {
                    notice: Some(notice),
                    goto: Some(Goto::Results(assessment_id)),
                    ..Reaction::default()
                }
            }
            Err(e) => {
                tracing::error!("submission of assessment {assessment_id} failed: {e}");
                view.attempt.finish_submit(false);
                view.dialog = None;
                Reaction {
                    effects: vec![Effect::Persist(view.attempt.snapshot())],
                    notice: Some(Notice::error(
                        "Submission failed",
                        "Sending failed. Please try again later.",
                    )),
                    goto: None,
                }
            }
        }
    }

    fn result_loaded(
        &mut self,
        id: AssessmentId,
        result: Result<AssessmentResult, LoadError>,
    ) -> Reaction {
        let Screen::Results(view) = &mut self.screen else {
            return Reaction::default();
        };
        if view.assessment_id != id {
            return Reaction::default();
        }

        match result {
            Ok(result) => {
                view.result = Some(result);
                Reaction::default()
            }
            Err(e) => {
                tracing::error!("failed to load results for assessment {id}: {e}");
                Reaction {
                    notice: Some(Notice::error(
                        "Error",
                        format!("Failed to load the results: {e}"),
                    )),
                    goto: Some(Goto::Listing),
                    ..Reaction::default()
                }
            }
        }
    }

    fn survey_result_loaded(
        &mut self,
        id: SurveyId,
        result: Result<SurveyReport, LoadError>,
    ) -> Reaction {
        let Screen::SurveyResults(view) = &mut self.screen else {
            return Reaction::default();
        };
        if view.survey_id != id {
            return Reaction::default();
        }

        match result {
            Ok(report) => {
                view.report = Some(report);
                Reaction::default()
            }
            Err(e) => {
                tracing::error!("failed to load survey results {id}: {e}");
                Reaction {
                    notice: Some(Notice::error(
                        "Error",
                        format!("Failed to load the survey results: {e}"),
                    )),
                    goto: Some(Goto::Listing),
                    ..Reaction::default()
                }
            }
        }
    }

    fn apply(&mut self, reaction: Reaction) -> Vec<Effect> {
        let Reaction {
            mut effects,
            notice,
            goto,
        } = reaction;

        if let Some(notice) = notice {
            self.notice = Some(notice);
        }

        match goto {
            Some(Goto::Listing) => {
                self.screen = Screen::Listing(ListingView::default());
                effects.push(Effect::LoadListing);
            }
            Some(Goto::Take(id)) => {
                self.screen = Screen::Loading(id);
                effects.push(Effect::LoadAssessment(id));
            }
            Some(Goto::Results(id)) => {
                self.screen = Screen::Results(ResultsView::loading(id));
                effects.push(Effect::LoadResult(id));
            }
            Some(Goto::SurveyResults(id)) => {
                self.screen = Screen::SurveyResults(SurveyResultsView::loading(id));
                effects.push(Effect::LoadSurveyResult(id));
            }
            None => {}
        }

        effects
    }
}

fn listing_key(view: &mut ListingView, key: KeyCode) -> Reaction {
    match key {
        KeyCode::Up | KeyCode::Char('k') => {
            view.selected = view.selected.saturating_sub(1);
            Reaction::default()
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if view.selected + 1 < view.entries.len() {
                view.selected += 1;
            }
            Reaction::default()
        }
        KeyCode::Enter => match view.entries.get(view.selected) {
            Some(entry) => Reaction::goto(Goto::Take(entry.summary.id)),
            None => Reaction::default(),
        },
        KeyCode::Char('r') => match view.entries.get(view.selected) {
            Some(entry) => Reaction::goto(Goto::Results(entry.summary.id)),
            None => Reaction::default(),
        },
        KeyCode::Char('s') => Reaction::goto(Goto::SurveyResults(LATEST_SURVEY_ID)),
        KeyCode::Char('q') | KeyCode::Esc => Reaction::effect(Effect::Quit),
        _ => Reaction::default(),
    }
}

fn results_key(view: &mut ResultsView, key: KeyCode) -> Reaction {
    match key {
        KeyCode::Down | KeyCode::Char('j') => {
            view.scroll = view.scroll.saturating_add(1);
            Reaction::default()
        }
        KeyCode::Up | KeyCode::Char('k') => {
            view.scroll = view.scroll.saturating_sub(1);
            Reaction::default()
        }
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('b') => Reaction::goto(Goto::Listing),
        _ => Reaction::default(),
    }
}

fn survey_key(view: &mut SurveyResultsView, key: KeyCode) -> Reaction {
    match key {
        KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => {
            view.tab = view.tab.next();
            view.scroll = 0;
        }
        KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h') => {
            view.tab = view.tab.previous();
            view.scroll = 0;
        }
        KeyCode::Down | KeyCode::Char('j') => view.scroll = view.scroll.saturating_add(1),
        KeyCode::Up | KeyCode::Char('k') => view.scroll = view.scroll.saturating_sub(1),
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('b') => {
            return Reaction::goto(Goto::Listing);
        }
        _ => {}
    }
    Reaction::default()
}

fn taking_key(view: &mut TakingView, rng: &mut StdRng, key: KeyCode) -> Reaction {
    if let Some(dialog) = view.dialog {
        return dialog_key(view, dialog, key);
    }

    let text = view.is_text_question();
    match key {
        KeyCode::Esc => {
            view.dialog = Some(Dialog::ConfirmExit);
            Reaction::default()
        }
        KeyCode::F(1) => {
            view.dialog = Some(Dialog::Help);
            Reaction::default()
        }
        KeyCode::Char('?') if !text => {
            view.dialog = Some(Dialog::Help);
            Reaction::default()
        }
        KeyCode::Tab | KeyCode::Right => advance(view, rng),
        KeyCode::BackTab | KeyCode::Left => {
            if view.attempt.retreat() {
                view.sync_question(rng);
                Reaction::effect(Effect::Persist(view.attempt.snapshot()))
            } else {
                Reaction::default()
            }
        }
        KeyCode::Up => {
            view.cursor = view.cursor.saturating_sub(1);
            Reaction::default()
        }
        KeyCode::Down => {
            if view.cursor + 1 < view.item_count() {
                view.cursor += 1;
            }
            Reaction::default()
        }
        KeyCode::Backspace if text => {
            let mut current = view.current_text().to_string();
            current.pop();
            record(view, Some(AnswerValue::Text(current)))
        }
        KeyCode::Enter if text => {
            let current = format!("{}\n", view.current_text());
            record(view, Some(AnswerValue::Text(current)))
        }
        KeyCode::Char(c) if text => {
            let current = format!("{}{c}", view.current_text());
            record(view, Some(AnswerValue::Text(current)))
        }
        KeyCode::Char('k') => {
            view.cursor = view.cursor.saturating_sub(1);
            Reaction::default()
        }
        KeyCode::Char('j') => {
            if view.cursor + 1 < view.item_count() {
                view.cursor += 1;
            }
            Reaction::default()
        }
        KeyCode::Char(c) if c.is_ascii_digit() => {
            let value = i64::from(c.to_digit(10).unwrap_or(0));
            match view.rating_cursor(value) {
                Some(cursor) => {
                    view.cursor = cursor;
                    record(view, Some(AnswerValue::rating(value)))
                }
                None => Reaction::default(),
            }
        }
        KeyCode::Enter | KeyCode::Char(' ') => match view.value_at_cursor() {
            Some(value) => record(view, Some(value)),
            None => Reaction::default(),
        },
        _ => Reaction::default(),
    }
}

fn advance(view: &mut TakingView, rng: &mut StdRng) -> Reaction {
    match view.attempt.advance() {
        Ok(Advance::Moved(_)) => {
            view.sync_question(rng);
            Reaction::effect(Effect::Persist(view.attempt.snapshot()))
        }
        Ok(Advance::ReadyToSubmit) => {
            view.dialog = Some(Dialog::ConfirmSubmit);
            Reaction::default()
        }
        Err(SessionError::RequiredUnanswered(_)) => Reaction::notice(Notice::error(
            "Input error",
            "This question is required.",
        )),
        Err(e) => Reaction::notice(Notice::error("Error", e.to_string())),
    }
}

fn record(view: &mut TakingView, value: Option<AnswerValue>) -> Reaction {
    match view.attempt.record_answer(value) {
        Ok(()) => Reaction::effect(Effect::Persist(view.attempt.snapshot())),
        Err(e) => Reaction::notice(Notice::error("Error", e.to_string())),
    }
}

fn dialog_key(view: &mut TakingView, dialog: Dialog, key: KeyCode) -> Reaction {
    let confirm = matches!(key, KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y'));
    let dismiss = matches!(key, KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N'));

    match dialog {
        Dialog::Help => {
            if matches!(
                key,
                KeyCode::Esc | KeyCode::Enter | KeyCode::F(1) | KeyCode::Char('?') | KeyCode::Char('q')
            ) {
                view.dialog = None;
            }
            Reaction::default()
        }
        Dialog::ConfirmExit if confirm => match view.attempt.exit() {
            Ok(snapshot) => {
                tracing::info!(
                    "leaving assessment {} at question {}",
                    snapshot.state.assessment_id,
                    snapshot.state.current_question_index + 1
                );
                Reaction {
                    effects: vec![Effect::PersistNow(snapshot)],
                    goto: Some(Goto::Listing),
                    ..Reaction::default()
                }
            }
            Err(e) => Reaction::notice(Notice::error("Error", e.to_string())),
        },
        Dialog::ConfirmExit if dismiss => {
            view.dialog = None;
            Reaction::default()
        }
        Dialog::ConfirmSubmit if view.attempt.phase() == Phase::Submitting => Reaction::default(),
        Dialog::ConfirmSubmit if confirm => match view.attempt.begin_submit() {
            Ok(submission) => Reaction {
                effects: vec![Effect::CancelAutosave, Effect::Submit(submission)],
                notice: Some(Notice::info("Sending...", "Submitting your assessment.")),
                goto: None,
            },
            Err(SessionError::SubmitInFlight) => Reaction::default(),
            Err(e) => Reaction::notice(Notice::error("Error", e.to_string())),
        },
        Dialog::ConfirmSubmit if dismiss => {
            view.dialog = None;
            Reaction::default()
        }
        Dialog::ConfirmExit | Dialog::ConfirmSubmit => Reaction::default(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rand::SeedableRng;

    use super::*;
    use crate::models::{Answers, Assessment, Question};
    use crate::session::SessionState;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn assessment() -> Assessment {
        Assessment {
            id: 9,
            title: "Scenario".into(),
            description: String::new(),
            estimated_time: "5 minutes".into(),
            questions: vec![
                Question::new(1, "Pick one", QuestionKind::Single)
                    .required()
                    .with_options([(1, "A"), (2, "B"), (3, "C")]),
                Question::new(2, "Anything else?", QuestionKind::Text),
                Question::new(3, "Rate it", QuestionKind::Rating)
                    .required()
                    .with_rating(1, 5),
            ],
        }
    }

    /// An app already taking the scenario assessment in order 1, 2, 3.
    fn taking() -> App {
        let stored = SessionState {
            assessment_id: 9,
            answers: Answers::new(),
            current_question_index: 0,
            elapsed_time: 0,
            question_order: vec![1, 2, 3],
            saved_at: Utc::now(),
        };
        let mut rng = StdRng::seed_from_u64(11);
        let attempt = Attempt::restore(assessment(), Some(stored), &mut rng);

        let mut app = App::new(rng);
        app.start(Route::Take(9));
        let effects = app.on_event(AppEvent::AttemptReady(9, Ok(attempt)));
        assert!(matches!(effects.as_slice(), [Effect::Persist(_)]));
        app
    }

    /// Multi-choice then boolean, both required.
    fn choices_assessment() -> Assessment {
        Assessment {
            id: 12,
            title: "Choices".into(),
            description: String::new(),
            estimated_time: String::new(),
            questions: vec![
                Question::new(1, "Pick any", QuestionKind::Multiple)
                    .required()
                    .with_options([(1, "A"), (2, "B"), (3, "C")]),
                Question::new(2, "Agree?", QuestionKind::Boolean).required(),
            ],
        }
    }

    fn taking_choices() -> App {
        let stored = SessionState {
            assessment_id: 12,
            answers: Answers::new(),
            current_question_index: 0,
            elapsed_time: 0,
            question_order: vec![1, 2],
            saved_at: Utc::now(),
        };
        let mut rng = StdRng::seed_from_u64(13);
        let attempt = Attempt::restore(choices_assessment(), Some(stored), &mut rng);

        let mut app = App::new(rng);
        app.start(Route::Take(12));
        app.on_event(AppEvent::AttemptReady(12, Ok(attempt)));
        app
    }

    fn view(app: &App) -> &TakingView {
        match app.screen() {
            Screen::Taking(view) => view,
            _ => panic!("not taking an assessment"),
        }
    }

    #[test]
    fn test_start_routes_to_listing_or_assessment() {
        let mut app = App::new(StdRng::seed_from_u64(1));
        assert!(matches!(app.start(Route::Listing).as_slice(), [Effect::LoadListing]));
        assert_eq!(app.route(), Route::Listing);

        assert!(matches!(
            app.start(Route::Take(101)).as_slice(),
            [Effect::LoadAssessment(101)]
        ));
        assert_eq!(app.route(), Route::Take(101));
    }

    #[test]
    fn test_full_walk_through_to_results() {
        let mut app = taking();
        assert_eq!(app.notice().map(|n| n.title.as_str()), Some("Resumed"));

        // required and unanswered
        assert!(app.on_key(key(KeyCode::Tab)).is_empty());
        assert_eq!(app.notice().map(|n| n.level), Some(NoticeLevel::Error));
        assert_eq!(view(&app).attempt.state().current_question_index, 0);

        assert!(matches!(
            app.on_key(key(KeyCode::Enter)).as_slice(),
            [Effect::Persist(_)]
        ));
        assert!(matches!(
            app.on_key(key(KeyCode::Tab)).as_slice(),
            [Effect::Persist(_)]
        ));

        // optional text question may be skipped
        app.on_key(key(KeyCode::Tab));
        assert_eq!(view(&app).attempt.state().current_question_index, 2);

        app.on_key(key(KeyCode::Char('4')));
        assert_eq!(
            view(&app).attempt.current_answer(),
            Some(&AnswerValue::rating(4))
        );
        app.on_key(key(KeyCode::Tab));
        assert_eq!(view(&app).dialog, Some(Dialog::ConfirmSubmit));

        let effects = app.on_key(key(KeyCode::Enter));
        let submission = match effects.as_slice() {
            [Effect::CancelAutosave, Effect::Submit(submission)] => submission.clone(),
            other => panic!("unexpected effects {other:?}"),
        };
        assert_eq!(submission.answers.answered_count(), 2);

        // repeated confirmation while sending does nothing
        assert!(app.on_key(key(KeyCode::Enter)).is_empty());
        assert!(app.on_tick().is_empty());

        let effects = app.on_event(AppEvent::Submitted {
            assessment_id: 9,
            outcome: Ok(SubmissionReceipt {
                assessment_id: 9,
                answered: 2,
                elapsed_time: submission.elapsed_time,
                submitted_at: Utc::now(),
            }),
            cleared: Ok(()),
        });
        assert!(matches!(effects.as_slice(), [Effect::LoadResult(9)]));
        assert_eq!(app.route(), Route::Results(9));
    }

    #[test]
    fn test_failed_submission_returns_to_question() {
        let mut app = taking();
        app.on_key(key(KeyCode::Enter));
        app.on_key(key(KeyCode::Tab));
        app.on_key(key(KeyCode::Tab));
        app.on_key(key(KeyCode::Char('2')));
        app.on_key(key(KeyCode::Tab));
        app.on_key(key(KeyCode::Char('y')));
        assert_eq!(view(&app).attempt.phase(), Phase::Submitting);

        let effects = app.on_event(AppEvent::Submitted {
            assessment_id: 9,
            outcome: Err(ScoringError::Unavailable),
            cleared: Ok(()),
        });
        assert!(matches!(effects.as_slice(), [Effect::Persist(_)]));
        assert_eq!(view(&app).attempt.phase(), Phase::Active);
        assert_eq!(view(&app).dialog, None);
        assert_eq!(app.notice().map(|n| n.title.as_str()), Some("Submission failed"));
        assert_eq!(app.route(), Route::Take(9));
    }

    #[test]
    fn test_exit_persists_and_returns_to_listing() {
        let mut app = taking();
        app.on_key(key(KeyCode::Enter));
        app.on_key(key(KeyCode::Tab));

        assert!(app.on_key(key(KeyCode::Esc)).is_empty());
        assert_eq!(view(&app).dialog, Some(Dialog::ConfirmExit));

        // declining keeps the attempt going
        app.on_key(key(KeyCode::Char('n')));
        assert_eq!(view(&app).dialog, None);

        app.on_key(key(KeyCode::Esc));
        let effects = app.on_key(key(KeyCode::Char('y')));
        match effects.as_slice() {
            [Effect::PersistNow(snapshot), Effect::LoadListing] => {
                assert_eq!(snapshot.state.current_question_index, 1);
                assert!(snapshot.state.answers.is_answered(1));
            }
            other => panic!("unexpected effects {other:?}"),
        }
        assert_eq!(app.route(), Route::Listing);
    }

    #[test]
    fn test_ctrl_c_saves_before_quitting() {
        let mut app = taking();
        let effects = app.on_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(matches!(
            effects.as_slice(),
            [Effect::PersistNow(_), Effect::Quit]
        ));
    }

    #[test]
    fn test_tick_counts_time_and_expires_notice() {
        let mut app = taking();
        for _ in 0..NOTICE_TTL {
            assert!(matches!(app.on_tick().as_slice(), [Effect::Persist(_)]));
        }
        assert_eq!(view(&app).attempt.state().elapsed_time, u64::from(NOTICE_TTL));
        assert!(app.notice().is_none());
    }

    #[test]
    fn test_save_event_clears_unsaved_flag() {
        let mut app = taking();
        let effects = app.on_key(key(KeyCode::Enter));
        let Some(Effect::Persist(snapshot)) = effects.into_iter().next() else {
            panic!("expected a persist effect");
        };
        assert!(!view(&app).attempt.is_saved());

        app.on_save_event(SaveEvent::Saved {
            assessment_id: 9,
            revision: snapshot.revision,
            saved_at: Utc::now(),
        });
        assert!(view(&app).attempt.is_saved());

        app.on_save_event(SaveEvent::Failed {
            assessment_id: 9,
            revision: snapshot.revision,
            reason: "quota exceeded".into(),
        });
        assert_eq!(app.notice().map(|n| n.title.as_str()), Some("Autosave failed"));
    }

    #[test]
    fn test_options_reshuffle_only_on_question_change() {
        let mut app = taking();
        let first = view(&app).option_order.clone();
        let mut sorted = first.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![1, 2, 3]);

        app.on_key(key(KeyCode::Down));
        app.on_key(key(KeyCode::Enter));
        assert_eq!(view(&app).option_order, first);
        assert_eq!(view(&app).cursor, 1);

        let chosen = view(&app).attempt.current_answer().cloned();
        assert_eq!(chosen, Some(AnswerValue::choice(first[1])));

        app.on_key(key(KeyCode::Tab));
        app.on_key(key(KeyCode::BackTab));
        let back = view(&app);
        assert_eq!(back.cursor, back.option_order.iter().position(|o| *o == first[1]).unwrap());
    }

    #[test]
    fn test_text_entry_edits_answer() {
        let mut app = taking();
        app.on_key(key(KeyCode::Enter));
        app.on_key(key(KeyCode::Tab));

        for c in "ok?".chars() {
            app.on_key(key(KeyCode::Char(c)));
        }
        assert_eq!(view(&app).current_text(), "ok?");
        assert_eq!(view(&app).dialog, None);

        for _ in 0..3 {
            app.on_key(key(KeyCode::Backspace));
        }
        assert_eq!(view(&app).attempt.current_answer(), None);
    }

    #[test]
    fn test_tick_while_loading_does_nothing() {
        let mut app = App::new(StdRng::seed_from_u64(4));
        app.start(Route::Take(9));
        assert!(app.on_tick().is_empty());
        assert!(app.on_tick().is_empty());
        assert_eq!(app.route(), Route::Take(9));

        let stored = SessionState {
            assessment_id: 9,
            answers: Answers::new(),
            current_question_index: 0,
            elapsed_time: 0,
            question_order: vec![1, 2, 3],
            saved_at: Utc::now(),
        };
        let mut rng = StdRng::seed_from_u64(4);
        let attempt = Attempt::restore(assessment(), Some(stored), &mut rng);
        app.on_event(AppEvent::AttemptReady(9, Ok(attempt)));
        assert_eq!(view(&app).attempt.state().elapsed_time, 0);
    }

    #[test]
    fn test_multiple_choice_toggles_selection() {
        let mut app = taking_choices();
        let order = view(&app).option_order.clone();

        app.on_key(key(KeyCode::Enter));
        app.on_key(key(KeyCode::Down));
        app.on_key(key(KeyCode::Char(' ')));
        assert_eq!(
            view(&app).attempt.current_answer(),
            Some(&AnswerValue::Choices(vec![order[0], order[1]]))
        );

        // selecting again removes the option
        app.on_key(key(KeyCode::Enter));
        assert_eq!(
            view(&app).attempt.current_answer(),
            Some(&AnswerValue::Choices(vec![order[0]]))
        );

        app.on_key(key(KeyCode::Up));
        app.on_key(key(KeyCode::Enter));
        assert_eq!(view(&app).attempt.current_answer(), None);
        assert!(app.on_key(key(KeyCode::Tab)).is_empty());
        assert_eq!(app.notice().map(|n| n.detail.as_str()), Some("This question is required."));
        assert_eq!(view(&app).attempt.state().current_question_index, 0);
    }

    #[test]
    fn test_boolean_cursor_picks_yes_or_no() {
        let mut app = taking_choices();
        app.on_key(key(KeyCode::Enter));
        app.on_key(key(KeyCode::Tab));
        assert_eq!(view(&app).attempt.current_question().map(|q| q.id), Some(2));
        assert_eq!(view(&app).item_count(), 2);

        app.on_key(key(KeyCode::Enter));
        assert_eq!(view(&app).attempt.current_answer(), Some(&AnswerValue::Flag(true)));

        app.on_key(key(KeyCode::Down));
        app.on_key(key(KeyCode::Down));
        assert_eq!(view(&app).cursor, 1);
        app.on_key(key(KeyCode::Enter));
        assert_eq!(view(&app).attempt.current_answer(), Some(&AnswerValue::Flag(false)));

        // coming back puts the cursor on the recorded answer
        app.on_key(key(KeyCode::BackTab));
        app.on_key(key(KeyCode::Tab));
        assert_eq!(view(&app).cursor, 1);
    }

    #[test]
    fn test_interrupt_saves_only_an_attempt_in_progress() {
        let mut app = taking();
        let effects = app.interrupt();
        match effects.as_slice() {
            [Effect::PersistNow(snapshot), Effect::Quit] => {
                assert_eq!(snapshot.state.assessment_id, 9);
            }
            other => panic!("unexpected effects {other:?}"),
        }
        assert_eq!(view(&app).attempt.phase(), Phase::Exited);

        let mut listing = App::new(StdRng::seed_from_u64(6));
        listing.start(Route::Listing);
        assert!(matches!(listing.interrupt().as_slice(), [Effect::Quit]));
    }

    #[test]
    fn test_survey_results_tabs_and_back() {
        let mut app = App::new(StdRng::seed_from_u64(8));
        app.start(Route::Listing);
        assert!(matches!(
            app.on_key(key(KeyCode::Char('s'))).as_slice(),
            [Effect::LoadSurveyResult(LATEST_SURVEY_ID)]
        ));
        assert_eq!(app.route(), Route::SurveyResults(LATEST_SURVEY_ID));

        // a late report for another round is ignored
        app.on_event(AppEvent::SurveyResultLoaded(
            7,
            Ok(crate::surveys::engagement_report(7)),
        ));
        app.on_event(AppEvent::SurveyResultLoaded(
            LATEST_SURVEY_ID,
            Ok(crate::surveys::engagement_report(LATEST_SURVEY_ID)),
        ));
        let survey = |app: &App| match app.screen() {
            Screen::SurveyResults(view) => (view.tab, view.scroll, view.report.as_ref().map(|r| r.id)),
            _ => panic!("not on survey results"),
        };
        assert_eq!(survey(&app), (SurveyTab::Summary, 0, Some(LATEST_SURVEY_ID)));

        app.on_key(key(KeyCode::Down));
        app.on_key(key(KeyCode::Tab));
        assert_eq!(survey(&app).0, SurveyTab::Details);
        assert_eq!(survey(&app).1, 0);
        app.on_key(key(KeyCode::Left));
        app.on_key(key(KeyCode::Left));
        assert_eq!(survey(&app).0, SurveyTab::Comparison);

        assert!(matches!(
            app.on_key(key(KeyCode::Esc)).as_slice(),
            [Effect::LoadListing]
        ));
    }

    #[test]
    fn test_survey_load_failure_falls_back_to_listing() {
        let mut app = App::new(StdRng::seed_from_u64(9));
        app.start(Route::SurveyResults(0));
        let effects = app.on_event(AppEvent::SurveyResultLoaded(0, Err(LoadError::InvalidId(0))));
        assert!(matches!(effects.as_slice(), [Effect::LoadListing]));
        assert_eq!(app.route(), Route::Listing);
        assert_eq!(app.notice().map(|n| n.level), Some(NoticeLevel::Error));
    }

    #[test]
    fn test_load_failure_falls_back_to_listing() {
        let mut app = App::new(StdRng::seed_from_u64(2));
        app.start(Route::Take(5));
        let effects = app.on_event(AppEvent::AttemptReady(5, Err(LoadError::NotFound(5))));
        assert!(matches!(effects.as_slice(), [Effect::LoadListing]));
        assert_eq!(app.notice().map(|n| n.level), Some(NoticeLevel::Error));
    }

    #[test]
    fn test_listing_navigation() {
        let mut app = App::new(StdRng::seed_from_u64(3));
        app.start(Route::Listing);
        let entry = |id| ListingEntry {
            summary: AssessmentSummary {
                id,
                title: format!("Assessment {id}"),
                estimated_time: String::new(),
                question_count: 3,
            },
            resumable: id == 2,
        };
        app.on_event(AppEvent::ListingLoaded(Ok(vec![entry(1), entry(2)])));

        app.on_key(key(KeyCode::Down));
        app.on_key(key(KeyCode::Down));
        assert!(matches!(
            app.on_key(key(KeyCode::Char('r'))).as_slice(),
            [Effect::LoadResult(2)]
        ));
        assert!(matches!(
            app.on_key(key(KeyCode::Esc)).as_slice(),
            [Effect::LoadListing]
        ));
        assert!(matches!(
            app.on_key(key(KeyCode::Char('q'))).as_slice(),
            [Effect::Quit]
        ));
    }
}
