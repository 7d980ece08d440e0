//! Focused-practice wizard.
//!
//! [`PracticeRunner`] walks a sorted queue of dotpoints. For each dotpoint an
//! [`FpSession`] moves through the [`Stage`]s in response to explicit
//! [`PracticeEvent`]s; nothing advances on its own. Every stage change is
//! reported to the [`Navigator`] using the stage's route name.

pub mod prompts;

use std::collections::{BTreeMap, VecDeque};
use std::fmt;

use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::cloze::{self, ClozeEngine, ClozeError, ClozeItem, Score, Specificity};
use crate::config::{ClozeConfig, PracticeConfig};
use crate::selection::DotpointKey;
use crate::store::{routes, Navigator, Notice};
use crate::suggest::{Suggester, WeaknessReport};

/// Highest value on the self-rating slider.
pub const MAX_RATING: u8 = 10;

/// A screen of the wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    FpGeneralQ,
    WeakGeneral,
    ClozeGeneral,
    ClozeReview,
    WeakSpecific,
    FpSpecific,
    ClozeSpecific,
    FpMore,
    Decision,
}

impl Stage {
    pub fn route(self) -> &'static str {
        match self {
            Stage::FpGeneralQ => "fp_general_q",
            Stage::WeakGeneral => "weak_general",
            Stage::ClozeGeneral => "cloze_general",
            Stage::ClozeReview => "cloze_review",
            Stage::WeakSpecific => "weak_specific",
            Stage::FpSpecific => "fp_specific",
            Stage::ClozeSpecific => "cloze_specific",
            Stage::FpMore => "fp_more",
            Stage::Decision => "decision",
        }
    }

    pub fn is_cloze(self) -> bool {
        matches!(self, Stage::ClozeGeneral | Stage::ClozeSpecific)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.route())
    }
}

/// A learner action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PracticeEvent {
    /// Answer to a first-principles question (general or specific).
    SubmitAnswer {
        answer: String,
        #[serde(default)]
        rating: Option<u8>,
        /// Only honoured on the general question.
        #[serde(default)]
        skip_to_exam: bool,
    },
    SubmitWeaknesses {
        weaknesses: String,
        #[serde(default)]
        strengths: Option<String>,
    },
    PlaceToken {
        blank: usize,
        token: String,
    },
    ClearBlank {
        blank: usize,
    },
    /// `None` grades the tokens already placed.
    SubmitCloze {
        #[serde(default)]
        fills: Option<Vec<Option<String>>>,
    },
    ContinueReview {
        #[serde(default)]
        rating: Option<u8>,
        #[serde(default)]
        specifics: String,
    },
    /// `None` keeps the merged list; `Some` replaces it.
    ConfirmSpecifics {
        #[serde(default)]
        specifics: Option<String>,
    },
    SubmitMore {
        #[serde(default)]
        rating: Option<u8>,
    },
    NextDotpoint,
    ExamMode,
    Quit,
}

impl PracticeEvent {
    pub fn name(&self) -> &'static str {
        match self {
            PracticeEvent::SubmitAnswer { .. } => "submit_answer",
            PracticeEvent::SubmitWeaknesses { .. } => "submit_weaknesses",
            PracticeEvent::PlaceToken { .. } => "place_token",
            PracticeEvent::ClearBlank { .. } => "clear_blank",
            PracticeEvent::SubmitCloze { .. } => "submit_cloze",
            PracticeEvent::ContinueReview { .. } => "continue_review",
            PracticeEvent::ConfirmSpecifics { .. } => "confirm_specifics",
            PracticeEvent::SubmitMore { .. } => "submit_more",
            PracticeEvent::NextDotpoint => "next_dotpoint",
            PracticeEvent::ExamMode => "exam_mode",
            PracticeEvent::Quit => "quit",
        }
    }

    fn rating(&self) -> Option<u8> {
        match self {
            PracticeEvent::SubmitAnswer { rating, .. }
            | PracticeEvent::ContinueReview { rating, .. }
            | PracticeEvent::SubmitMore { rating } => *rating,
            _ => None,
        }
    }
}

/// How a dotpoint ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProgressStatus {
    Incomplete,
    Completed { rating: Option<u8> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub dotpoint: DotpointKey,
    #[serde(flatten)]
    pub status: ProgressStatus,
}

/// Choices offered when the learner tries to leave mid-flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveResolution {
    SaveIncomplete,
    SaveWithRating(u8),
    Cancel,
}

/// What a handled event led to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PracticeOutcome {
    /// The wizard is showing this stage.
    At(Stage),
    /// Navigated to exam mode; the session is kept.
    ExamMode,
    /// Every queued dotpoint is done.
    Finished,
    /// The learner quit from the decision screen.
    Quit,
    /// The learner left mid-flow through the navigation guard.
    Left,
}

/// Errors from practice operations.
#[derive(Debug, thiserror::Error)]
pub enum PracticeError {
    #[error("no dotpoints to practise")]
    EmptyQueue,
    #[error("practice is not running")]
    NotRunning,
    #[error("event '{event}' does not apply at stage '{stage}'")]
    UnexpectedEvent { stage: Stage, event: &'static str },
    #[error("rating {0} is outside 0-10")]
    InvalidRating(u8),
    #[error("no cloze item is active")]
    NoActiveCloze,
    #[error("cloze error: {0}")]
    Cloze(#[from] ClozeError),
}

/// Collaborators a transition may call.
pub struct PracticeContext<'a> {
    pub suggester: &'a dyn Suggester,
    pub navigator: &'a mut dyn Navigator,
    pub rng: &'a mut dyn RngCore,
}

/// Scratch state for the active dotpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FpSession {
    pub stage: Stage,
    pub active_dotpoint: DotpointKey,
    pub question: String,
    pub answer: String,
    /// Suggestions pre-filled into the weakness editor.
    pub report: WeaknessReport,
    pub strengths: Vec<String>,
    pub general_weaknesses: Vec<String>,
    /// Indexes `general_weaknesses`; equal to its length once exhausted.
    pub general_index: usize,
    pub specific_weaknesses_by_general: BTreeMap<String, Vec<String>>,
    pub specific_queue: VecDeque<String>,
    pub current_specific: Option<String>,
    pub last_rating: Option<u8>,
    pub general_specificity: Specificity,
    pub current_cloze: Option<ClozeItem>,
    pub last_graded: Option<ClozeItem>,
}

impl FpSession {
    pub fn new(dotpoint: DotpointKey) -> Self {
        let question = prompts::general_question(&dotpoint.subject, &dotpoint.dotpoint);
        Self {
            stage: Stage::FpGeneralQ,
            active_dotpoint: dotpoint,
            question,
            answer: String::new(),
            report: WeaknessReport::default(),
            strengths: Vec::new(),
            general_weaknesses: Vec::new(),
            general_index: 0,
            specific_weaknesses_by_general: BTreeMap::new(),
            specific_queue: VecDeque::new(),
            current_specific: None,
            last_rating: None,
            general_specificity: Specificity::General,
            current_cloze: None,
            last_graded: None,
        }
    }

    pub fn current_general(&self) -> Option<&str> {
        self.general_weaknesses
            .get(self.general_index)
            .map(String::as_str)
    }

    pub fn generals_exhausted(&self) -> bool {
        self.general_index >= self.general_weaknesses.len()
    }

    /// Specifics recorded for the current general weakness.
    pub fn current_specifics(&self) -> &[String] {
        self.current_general()
            .and_then(|g| self.specific_weaknesses_by_general.get(g))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Follow-up questions for the current specific weakness.
    pub fn followups(&self) -> Option<[String; 2]> {
        self.current_specific.as_deref().map(|specific| {
            prompts::followup_questions(
                &self.active_dotpoint.subject,
                &self.active_dotpoint.dotpoint,
                specific,
            )
        })
    }

    pub fn last_score(&self) -> Option<Score> {
        self.last_graded.as_ref().map(ClozeItem::score)
    }
}

/// Split a free-text list on `delimiter`, trimming, dropping empties and
/// case-insensitive repeats, keeping the first `cap` entries in order.
pub fn split_weaknesses(text: &str, delimiter: char, cap: usize) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for part in text.split(delimiter) {
        let part = part.trim();
        if part.is_empty() || out.iter().any(|w| cloze::fold(w) == cloze::fold(part)) {
            continue;
        }
        if out.len() == cap {
            break;
        }
        out.push(part.to_string());
    }
    out
}

/// Drives focused practice across the selected dotpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PracticeRunner {
    queue: Vec<DotpointKey>,
    position: usize,
    session: Option<FpSession>,
    progress: Vec<ProgressRecord>,
    #[serde(skip)]
    config: PracticeConfig,
    #[serde(skip)]
    engine: ClozeEngine,
}

impl PracticeRunner {
    /// Start on the first of `dotpoints` (sorted, duplicates dropped).
    pub fn begin(
        dotpoints: impl IntoIterator<Item = DotpointKey>,
        config: PracticeConfig,
        cloze: ClozeConfig,
        navigator: &mut dyn Navigator,
    ) -> Result<Self, PracticeError> {
        let mut queue: Vec<DotpointKey> = dotpoints.into_iter().collect();
        queue.sort();
        queue.dedup();
        let first = queue.first().cloned().ok_or(PracticeError::EmptyQueue)?;

        info!(dotpoints = queue.len(), "starting focused practice");
        let session = FpSession::new(first);
        navigator.navigate(session.stage.route());
        Ok(Self {
            queue,
            position: 0,
            session: Some(session),
            progress: Vec::new(),
            config,
            engine: ClozeEngine::new(cloze),
        })
    }

    /// Reattach configuration after deserializing.
    pub fn configure(&mut self, config: PracticeConfig, cloze: ClozeConfig) {
        self.config = config;
        self.engine = ClozeEngine::new(cloze);
    }

    pub fn queue(&self) -> &[DotpointKey] {
        &self.queue
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn session(&self) -> Option<&FpSession> {
        self.session.as_ref()
    }

    pub fn stage(&self) -> Option<Stage> {
        self.session.as_ref().map(|s| s.stage)
    }

    pub fn active_dotpoint(&self) -> Option<&DotpointKey> {
        self.session.as_ref().map(|s| &s.active_dotpoint)
    }

    pub fn progress(&self) -> &[ProgressRecord] {
        &self.progress
    }

    pub fn is_running(&self) -> bool {
        self.session.is_some()
    }

    /// Apply one learner action. Events that do not fit the current stage
    /// are rejected and change nothing.
    pub fn handle_event(
        &mut self,
        event: PracticeEvent,
        ctx: &mut PracticeContext<'_>,
    ) -> Result<PracticeOutcome, PracticeError> {
        let stage = self.stage().ok_or(PracticeError::NotRunning)?;
        if let Some(rating) = event.rating() {
            check_rating(rating)?;
        }

        match (stage, event) {
            (
                Stage::FpGeneralQ,
                PracticeEvent::SubmitAnswer {
                    answer,
                    rating,
                    skip_to_exam,
                },
            ) => self.submit_general_answer(answer, rating, skip_to_exam, ctx),
            (Stage::WeakGeneral, PracticeEvent::SubmitWeaknesses { weaknesses, strengths }) => {
                self.submit_weaknesses(&weaknesses, strengths.as_deref(), ctx)
            }
            (s, PracticeEvent::PlaceToken { blank, token }) if s.is_cloze() => {
                self.active_cloze()?.place(blank, &token)?;
                Ok(PracticeOutcome::At(s))
            }
            (s, PracticeEvent::ClearBlank { blank }) if s.is_cloze() => {
                self.active_cloze()?.clear(blank)?;
                Ok(PracticeOutcome::At(s))
            }
            (Stage::ClozeGeneral, PracticeEvent::SubmitCloze { fills }) => {
                self.grade_cloze(fills)?;
                self.enter(Stage::ClozeReview, ctx)
            }
            (Stage::ClozeReview, PracticeEvent::ContinueReview { rating, specifics }) => {
                self.continue_review(rating, &specifics, ctx)
            }
            (Stage::WeakSpecific, PracticeEvent::ConfirmSpecifics { specifics }) => {
                self.confirm_specifics(specifics.as_deref(), ctx)
            }
            (Stage::FpSpecific, PracticeEvent::SubmitAnswer { answer, rating, .. }) => {
                self.submit_specific_answer(answer, rating, ctx)
            }
            (Stage::ClozeSpecific, PracticeEvent::SubmitCloze { fills }) => {
                self.grade_cloze(fills)?;
                self.next_specific(ctx)
            }
            (Stage::FpMore, PracticeEvent::SubmitMore { rating }) => self.submit_more(rating, ctx),
            (Stage::Decision, PracticeEvent::NextDotpoint) => self.next_dotpoint(ctx),
            (Stage::Decision, PracticeEvent::ExamMode) => {
                ctx.navigator.navigate(routes::EXAM_MODE);
                Ok(PracticeOutcome::ExamMode)
            }
            (Stage::Decision, PracticeEvent::Quit) => {
                info!("focused practice quit");
                self.session = None;
                ctx.navigator.navigate(routes::HOME);
                Ok(PracticeOutcome::Quit)
            }
            (stage, event) => Err(PracticeError::UnexpectedEvent {
                stage,
                event: event.name(),
            }),
        }
    }

    /// Navigation guard for leaving mid-flow to `route`.
    pub fn request_leave(
        &mut self,
        resolution: LeaveResolution,
        route: &str,
        navigator: &mut dyn Navigator,
    ) -> Result<PracticeOutcome, PracticeError> {
        let stage = self.stage().ok_or(PracticeError::NotRunning)?;
        let status = match resolution {
            LeaveResolution::Cancel => return Ok(PracticeOutcome::At(stage)),
            LeaveResolution::SaveIncomplete => ProgressStatus::Incomplete,
            LeaveResolution::SaveWithRating(rating) => {
                check_rating(rating)?;
                ProgressStatus::Completed {
                    rating: Some(rating),
                }
            }
        };

        if let Some(session) = self.session.take() {
            info!(dotpoint = %session.active_dotpoint, ?status, "leaving focused practice");
            self.progress.push(ProgressRecord {
                dotpoint: session.active_dotpoint,
                status,
            });
        }
        navigator.navigate(route);
        Ok(PracticeOutcome::Left)
    }

    fn session_mut(&mut self) -> Result<&mut FpSession, PracticeError> {
        self.session.as_mut().ok_or(PracticeError::NotRunning)
    }

    fn active_cloze(&mut self) -> Result<&mut ClozeItem, PracticeError> {
        self.session_mut()?
            .current_cloze
            .as_mut()
            .ok_or(PracticeError::NoActiveCloze)
    }

    fn enter(
        &mut self,
        to: Stage,
        ctx: &mut PracticeContext<'_>,
    ) -> Result<PracticeOutcome, PracticeError> {
        let session = self.session_mut()?;
        debug!(from = %session.stage, to = %to, "practice transition");
        session.stage = to;
        ctx.navigator.navigate(to.route());
        Ok(PracticeOutcome::At(to))
    }

    fn should_retry(&self, rating: Option<u8>) -> bool {
        rating.is_some_and(|r| r <= self.config.retry_threshold)
    }

    fn submit_general_answer(
        &mut self,
        answer: String,
        rating: Option<u8>,
        skip_to_exam: bool,
        ctx: &mut PracticeContext<'_>,
    ) -> Result<PracticeOutcome, PracticeError> {
        let session = self.session_mut()?;
        session.answer = answer;
        if rating.is_some() {
            session.last_rating = rating;
        }
        if skip_to_exam {
            debug!("skipping to exam mode");
            ctx.navigator.navigate(routes::EXAM_MODE);
            return Ok(PracticeOutcome::ExamMode);
        }

        session.report = match ctx
            .suggester
            .weakness_report(&session.active_dotpoint, &session.answer)
        {
            Ok(report) => report,
            Err(e) => {
                warn!(suggester = ctx.suggester.name(), error = %e, "no weakness suggestions");
                WeaknessReport::default()
            }
        };
        self.enter(Stage::WeakGeneral, ctx)
    }

    fn submit_weaknesses(
        &mut self,
        weaknesses: &str,
        strengths: Option<&str>,
        ctx: &mut PracticeContext<'_>,
    ) -> Result<PracticeOutcome, PracticeError> {
        let delimiter = self.config.weakness_delimiter;
        let generals = split_weaknesses(weaknesses, delimiter, self.config.weakness_cap);

        let session = self.session_mut()?;
        session.strengths = match strengths {
            Some(text) => split_weaknesses(text, delimiter, usize::MAX),
            None => session.report.strengths.clone(),
        };
        session.general_weaknesses = generals;
        session.general_index = 0;
        session.specific_queue.clear();
        session.current_specific = None;
        debug!(generals = ?session.general_weaknesses, "general weaknesses set");

        if session.generals_exhausted() {
            return self.enter(Stage::FpMore, ctx);
        }
        self.start_general_cloze(Specificity::General, ctx)?;
        self.enter(Stage::ClozeGeneral, ctx)
    }

    fn grade_cloze(&mut self, fills: Option<Vec<Option<String>>>) -> Result<(), PracticeError> {
        let session = self.session_mut()?;
        let mut item = session
            .current_cloze
            .take()
            .ok_or(PracticeError::NoActiveCloze)?;
        match fills {
            Some(fills) => item = item.submit(&fills),
            None => item.grade(),
        }
        let score = item.score();
        debug!(label = %item.label, correct = score.correct, total = score.total, "cloze graded");
        session.last_graded = Some(item);
        Ok(())
    }

    fn continue_review(
        &mut self,
        rating: Option<u8>,
        specifics: &str,
        ctx: &mut PracticeContext<'_>,
    ) -> Result<PracticeOutcome, PracticeError> {
        let cap = self.config.weakness_cap;
        let entered = split_weaknesses(specifics, self.config.weakness_delimiter, cap);
        let retry = self.should_retry(rating);
        let max_specificity = self.config.max_specificity;

        let session = self.session_mut()?;
        if rating.is_some() {
            session.last_rating = rating;
        }

        if !entered.is_empty() {
            let general = session.current_general().unwrap_or_default().to_string();
            let merged = session
                .specific_weaknesses_by_general
                .entry(general)
                .or_default();
            for specific in entered {
                let folded = cloze::fold(&specific);
                if merged.len() < cap && !merged.iter().any(|m| cloze::fold(m) == folded) {
                    merged.push(specific);
                }
            }
            return self.enter(Stage::WeakSpecific, ctx);
        }

        if retry {
            if let Some(raised) = session.general_specificity.raised(max_specificity) {
                debug!(level = raised.level(), "retrying with a more specific cloze");
                self.start_general_cloze(raised, ctx)?;
                return self.enter(Stage::ClozeGeneral, ctx);
            }
        }
        self.enter(Stage::FpMore, ctx)
    }

    fn confirm_specifics(
        &mut self,
        replacement: Option<&str>,
        ctx: &mut PracticeContext<'_>,
    ) -> Result<PracticeOutcome, PracticeError> {
        let delimiter = self.config.weakness_delimiter;
        let cap = self.config.weakness_cap;

        let session = self.session_mut()?;
        let general = session.current_general().unwrap_or_default().to_string();
        if let Some(text) = replacement {
            session
                .specific_weaknesses_by_general
                .insert(general.clone(), split_weaknesses(text, delimiter, cap));
        }
        session.specific_queue = session
            .specific_weaknesses_by_general
            .get(&general)
            .map(|list| list.iter().cloned().collect())
            .unwrap_or_default();
        session.current_specific = session.specific_queue.pop_front();

        if session.current_specific.is_some() {
            self.enter(Stage::FpSpecific, ctx)
        } else {
            self.enter(Stage::FpMore, ctx)
        }
    }

    fn submit_specific_answer(
        &mut self,
        answer: String,
        rating: Option<u8>,
        ctx: &mut PracticeContext<'_>,
    ) -> Result<PracticeOutcome, PracticeError> {
        let session = self.session_mut()?;
        session.answer = answer;
        if rating.is_some() {
            session.last_rating = rating;
        }
        let label = session.current_specific.clone().unwrap_or_default();
        let item = build_cloze(&self.engine, &label, Specificity::Specific, ctx)?;
        self.session_mut()?.current_cloze = Some(item);
        self.enter(Stage::ClozeSpecific, ctx)
    }

    fn next_specific(&mut self, ctx: &mut PracticeContext<'_>) -> Result<PracticeOutcome, PracticeError> {
        let session = self.session_mut()?;
        session.current_specific = session.specific_queue.pop_front();
        if session.current_specific.is_some() {
            self.enter(Stage::FpSpecific, ctx)
        } else {
            self.enter(Stage::FpMore, ctx)
        }
    }

    fn submit_more(
        &mut self,
        rating: Option<u8>,
        ctx: &mut PracticeContext<'_>,
    ) -> Result<PracticeOutcome, PracticeError> {
        let retry = self.should_retry(rating);
        let max_specificity = self.config.max_specificity;

        let session = self.session_mut()?;
        if rating.is_some() {
            session.last_rating = rating;
        }

        if retry && !session.generals_exhausted() {
            if let Some(raised) = session.general_specificity.raised(max_specificity) {
                debug!(level = raised.level(), "retrying with a more specific cloze");
                self.start_general_cloze(raised, ctx)?;
                return self.enter(Stage::ClozeGeneral, ctx);
            }
        }

        if !session.generals_exhausted() {
            session.general_index += 1;
        }
        session.specific_queue.clear();
        session.current_specific = None;
        session.current_cloze = None;

        if session.generals_exhausted() {
            debug!(dotpoint = %session.active_dotpoint, "weakness cycle complete");
            return self.enter(Stage::Decision, ctx);
        }
        self.start_general_cloze(Specificity::General, ctx)?;
        self.enter(Stage::ClozeGeneral, ctx)
    }

    fn next_dotpoint(&mut self, ctx: &mut PracticeContext<'_>) -> Result<PracticeOutcome, PracticeError> {
        let finished = self.session.take().ok_or(PracticeError::NotRunning)?;
        info!(dotpoint = %finished.active_dotpoint, "dotpoint completed");
        self.progress.push(ProgressRecord {
            dotpoint: finished.active_dotpoint,
            status: ProgressStatus::Completed {
                rating: finished.last_rating,
            },
        });

        self.position += 1;
        match self.queue.get(self.position) {
            Some(next) => {
                info!(dotpoint = %next, position = self.position, "next dotpoint");
                let session = FpSession::new(next.clone());
                ctx.navigator.navigate(session.stage.route());
                let stage = session.stage;
                self.session = Some(session);
                Ok(PracticeOutcome::At(stage))
            }
            None => {
                info!(completed = self.progress.len(), "all selected dotpoints done");
                ctx.navigator
                    .notify(Notice::Success("All selected dotpoints done.".to_string()));
                ctx.navigator.navigate(routes::HOME);
                Ok(PracticeOutcome::Finished)
            }
        }
    }

    /// Fresh cloze for the current general weakness at `specificity`.
    fn start_general_cloze(
        &mut self,
        specificity: Specificity,
        ctx: &mut PracticeContext<'_>,
    ) -> Result<(), PracticeError> {
        let session = self.session.as_mut().ok_or(PracticeError::NotRunning)?;
        let label = session.current_general().unwrap_or_default().to_string();
        let item = build_cloze(&self.engine, &label, specificity, ctx)?;
        session.general_specificity = specificity;
        session.current_cloze = Some(item);
        Ok(())
    }
}

fn check_rating(rating: u8) -> Result<(), PracticeError> {
    if rating > MAX_RATING {
        return Err(PracticeError::InvalidRating(rating));
    }
    Ok(())
}

/// Prefer a suggester-generated template, falling back to the library.
fn build_cloze(
    engine: &ClozeEngine,
    label: &str,
    specificity: Specificity,
    ctx: &mut PracticeContext<'_>,
) -> Result<ClozeItem, PracticeError> {
    match ctx.suggester.cloze_template(label, specificity) {
        Ok(Some(template)) => {
            match engine.build_from_template(label, specificity, &template, &mut *ctx.rng) {
                Ok(item) => return Ok(item),
                Err(e) => warn!(error = %e, "generated cloze template rejected"),
            }
        }
        Ok(None) => {}
        Err(e) => warn!(suggester = ctx.suggester.name(), error = %e, "cloze template unavailable"),
    }
    Ok(engine.build(label, specificity, &mut *ctx.rng)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::RecordingNavigator;
    use crate::suggest::{MockSuggester, PlaceholderSuggester};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct Harness {
        suggester: Box<dyn Suggester>,
        nav: RecordingNavigator,
        rng: StdRng,
    }

    impl Harness {
        fn new() -> Self {
            Self::with_suggester(Box::new(PlaceholderSuggester::new()))
        }

        fn with_suggester(suggester: Box<dyn Suggester>) -> Self {
            Self {
                suggester,
                nav: RecordingNavigator::new(),
                rng: StdRng::seed_from_u64(11),
            }
        }

        fn send(
            &mut self,
            runner: &mut PracticeRunner,
            event: PracticeEvent,
        ) -> Result<PracticeOutcome, PracticeError> {
            let mut ctx = PracticeContext {
                suggester: self.suggester.as_ref(),
                navigator: &mut self.nav,
                rng: &mut self.rng,
            };
            runner.handle_event(event, &mut ctx)
        }
    }

    fn key(dp: &str) -> DotpointKey {
        DotpointKey::new("Biology", "Module 6", "IQ1", dp)
    }

    fn runner(h: &mut Harness, dotpoints: &[&str]) -> PracticeRunner {
        PracticeRunner::begin(
            dotpoints.iter().map(|d| key(d)),
            PracticeConfig::default(),
            ClozeConfig::default(),
            &mut h.nav,
        )
        .unwrap()
    }

    fn answer(text: &str) -> PracticeEvent {
        PracticeEvent::SubmitAnswer {
            answer: text.into(),
            rating: None,
            skip_to_exam: false,
        }
    }

    fn weaknesses(text: &str) -> PracticeEvent {
        PracticeEvent::SubmitWeaknesses {
            weaknesses: text.into(),
            strengths: None,
        }
    }

    fn submit_cloze() -> PracticeEvent {
        PracticeEvent::SubmitCloze { fills: None }
    }

    fn review(rating: Option<u8>, specifics: &str) -> PracticeEvent {
        PracticeEvent::ContinueReview {
            rating,
            specifics: specifics.into(),
        }
    }

    fn more(rating: Option<u8>) -> PracticeEvent {
        PracticeEvent::SubmitMore { rating }
    }

    fn to_weak_general(h: &mut Harness, r: &mut PracticeRunner) {
        h.send(r, answer("blurt")).unwrap();
    }

    #[test]
    fn test_begin_sorts_and_dedups_queue() {
        let mut h = Harness::new();
        let r = runner(&mut h, &["Explain Y", "Describe X", "Explain Y"]);
        assert_eq!(r.queue(), &[key("Describe X"), key("Explain Y")]);
        assert_eq!(r.active_dotpoint(), Some(&key("Describe X")));
        assert_eq!(r.stage(), Some(Stage::FpGeneralQ));
        assert_eq!(h.nav.current(), Some("fp_general_q"));
    }

    #[test]
    fn test_begin_empty_queue() {
        let mut nav = RecordingNavigator::new();
        let err = PracticeRunner::begin(
            Vec::new(),
            PracticeConfig::default(),
            ClozeConfig::default(),
            &mut nav,
        )
        .unwrap_err();
        assert!(matches!(err, PracticeError::EmptyQueue));
        assert!(nav.routes.is_empty());
    }

    #[test]
    fn test_general_question_uses_subject() {
        let mut h = Harness::new();
        let r = runner(&mut h, &["Describe X"]);
        assert!(r.session().unwrap().question.contains("structure→function"));
    }

    #[test]
    fn test_answer_prefills_suggestions() {
        let mut h = Harness::new();
        let mut r = runner(&mut h, &["Describe X"]);
        let out = h.send(&mut r, answer("my answer")).unwrap();
        assert_eq!(out, PracticeOutcome::At(Stage::WeakGeneral));
        let session = r.session().unwrap();
        assert_eq!(session.answer, "my answer");
        assert_eq!(
            session.report.weaknesses_text(';'),
            "definition gap; unclear mechanism; weak example"
        );
    }

    #[test]
    fn test_failing_suggester_degrades_to_empty_report() {
        let mut h = Harness::with_suggester(Box::new(MockSuggester::new("empty")));
        let mut r = runner(&mut h, &["Describe X"]);
        h.send(&mut r, answer("a")).unwrap();
        let session = r.session().unwrap();
        assert_eq!(session.stage, Stage::WeakGeneral);
        assert!(session.report.weaknesses.is_empty());
    }

    #[test]
    fn test_exam_skip_keeps_stage() {
        let mut h = Harness::new();
        let mut r = runner(&mut h, &["Describe X"]);
        let out = h
            .send(
                &mut r,
                PracticeEvent::SubmitAnswer {
                    answer: "a".into(),
                    rating: Some(6),
                    skip_to_exam: true,
                },
            )
            .unwrap();
        assert_eq!(out, PracticeOutcome::ExamMode);
        assert_eq!(h.nav.current(), Some("exam_mode"));
        assert_eq!(r.stage(), Some(Stage::FpGeneralQ));
    }

    #[test]
    fn test_weakness_list_capped_at_five() {
        let mut h = Harness::new();
        let mut r = runner(&mut h, &["Describe X"]);
        to_weak_general(&mut h, &mut r);
        h.send(&mut r, weaknesses("a; b;; c ; d; e; f; g")).unwrap();
        let session = r.session().unwrap();
        assert_eq!(session.general_weaknesses, vec!["a", "b", "c", "d", "e"]);
        assert_eq!(session.general_index, 0);
        assert_eq!(session.stage, Stage::ClozeGeneral);
        assert!(session.current_cloze.is_some());
    }

    #[test]
    fn test_split_weaknesses_dedups() {
        assert_eq!(
            split_weaknesses("Osmosis; osmosis ; diffusion", ';', 5),
            vec!["Osmosis", "diffusion"]
        );
        assert!(split_weaknesses(" ; ; ", ';', 5).is_empty());
    }

    #[test]
    fn test_split_weaknesses_folds_like_grading() {
        assert_eq!(
            split_weaknesses("Élan vital; élan VITAL; ΔG sign; δg SIGN", ';', 5),
            vec!["Élan vital", "ΔG sign"]
        );
        assert!(cloze::answer_matches("Élan vital", Some("élan VITAL")));
    }

    #[test]
    fn test_strengths_default_to_suggestions() {
        let mut h = Harness::new();
        let mut r = runner(&mut h, &["Describe X"]);
        to_weak_general(&mut h, &mut r);
        h.send(&mut r, weaknesses("a")).unwrap();
        assert_eq!(
            r.session().unwrap().strengths,
            vec!["correct terms", "coherent structure"]
        );
    }

    #[test]
    fn test_empty_weaknesses_skip_to_fp_more() {
        let mut h = Harness::new();
        let mut r = runner(&mut h, &["Describe X"]);
        to_weak_general(&mut h, &mut r);
        let out = h.send(&mut r, weaknesses("  ;  ")).unwrap();
        assert_eq!(out, PracticeOutcome::At(Stage::FpMore));
        assert!(r.session().unwrap().generals_exhausted());

        let out = h.send(&mut r, more(Some(2))).unwrap();
        assert_eq!(out, PracticeOutcome::At(Stage::Decision));
        assert_eq!(r.session().unwrap().general_index, 0);
    }

    #[test]
    fn test_two_generals_reach_decision_after_two_passes() {
        let mut h = Harness::new();
        let mut r = runner(&mut h, &["Describe X"]);
        to_weak_general(&mut h, &mut r);
        h.send(&mut r, weaknesses("A; B")).unwrap();

        for expected_index in 0..2 {
            let session = r.session().unwrap();
            assert_eq!(session.stage, Stage::ClozeGeneral);
            assert_eq!(session.general_index, expected_index);
            h.send(&mut r, submit_cloze()).unwrap();
            assert_eq!(r.stage(), Some(Stage::ClozeReview));
            h.send(&mut r, review(None, "")).unwrap();
            assert_eq!(r.stage(), Some(Stage::FpMore));
            h.send(&mut r, more(None)).unwrap();
        }
        let session = r.session().unwrap();
        assert_eq!(session.stage, Stage::Decision);
        assert_eq!(session.general_index, 2);
    }

    #[test]
    fn test_low_rating_retries_once_at_higher_specificity() {
        let mut h = Harness::new();
        let mut r = runner(&mut h, &["Describe X"]);
        to_weak_general(&mut h, &mut r);
        h.send(&mut r, weaknesses("osmosis")).unwrap();
        h.send(&mut r, submit_cloze()).unwrap();

        let out = h.send(&mut r, review(Some(4), "")).unwrap();
        assert_eq!(out, PracticeOutcome::At(Stage::ClozeGeneral));
        let session = r.session().unwrap();
        assert_eq!(session.general_specificity, Specificity::Specific);
        assert_eq!(
            session.current_cloze.as_ref().unwrap().specificity,
            Specificity::Specific
        );

        // Already at the cap: a second low rating moves on.
        h.send(&mut r, submit_cloze()).unwrap();
        let out = h.send(&mut r, review(Some(3), "")).unwrap();
        assert_eq!(out, PracticeOutcome::At(Stage::FpMore));
        let out = h.send(&mut r, more(Some(2))).unwrap();
        assert_eq!(out, PracticeOutcome::At(Stage::Decision));
    }

    #[test]
    fn test_high_rating_does_not_retry() {
        let mut h = Harness::new();
        let mut r = runner(&mut h, &["Describe X"]);
        to_weak_general(&mut h, &mut r);
        h.send(&mut r, weaknesses("osmosis")).unwrap();
        h.send(&mut r, submit_cloze()).unwrap();
        let out = h.send(&mut r, review(Some(7), "")).unwrap();
        assert_eq!(out, PracticeOutcome::At(Stage::FpMore));
    }

    #[test]
    fn test_low_rating_at_fp_more_retries_current_general() {
        let mut h = Harness::new();
        let mut r = runner(&mut h, &["Describe X"]);
        to_weak_general(&mut h, &mut r);
        h.send(&mut r, weaknesses("A; B")).unwrap();
        h.send(&mut r, submit_cloze()).unwrap();
        h.send(&mut r, review(None, "")).unwrap();

        let out = h.send(&mut r, more(Some(6))).unwrap();
        assert_eq!(out, PracticeOutcome::At(Stage::ClozeGeneral));
        let session = r.session().unwrap();
        assert_eq!(session.general_index, 0);
        assert_eq!(session.general_specificity, Specificity::Specific);

        h.send(&mut r, submit_cloze()).unwrap();
        h.send(&mut r, review(None, "")).unwrap();
        h.send(&mut r, more(Some(6))).unwrap();
        let session = r.session().unwrap();
        assert_eq!(session.general_index, 1);
        assert_eq!(session.general_specificity, Specificity::General);
    }

    #[test]
    fn test_specific_weakness_loop() {
        let mut h = Harness::new();
        let mut r = runner(&mut h, &["Describe X"]);
        to_weak_general(&mut h, &mut r);
        h.send(&mut r, weaknesses("membrane transport")).unwrap();
        h.send(&mut r, submit_cloze()).unwrap();

        let out = h.send(&mut r, review(Some(9), "channels; carriers")).unwrap();
        assert_eq!(out, PracticeOutcome::At(Stage::WeakSpecific));
        assert_eq!(
            r.session().unwrap().current_specifics(),
            &["channels".to_string(), "carriers".to_string()]
        );

        h.send(&mut r, PracticeEvent::ConfirmSpecifics { specifics: None })
            .unwrap();
        let session = r.session().unwrap();
        assert_eq!(session.stage, Stage::FpSpecific);
        assert_eq!(session.current_specific.as_deref(), Some("channels"));
        assert!(session.followups().unwrap()[0].contains("'channels'"));

        h.send(&mut r, answer("spec answer")).unwrap();
        let session = r.session().unwrap();
        assert_eq!(session.stage, Stage::ClozeSpecific);
        assert_eq!(
            session.current_cloze.as_ref().unwrap().specificity,
            Specificity::Specific
        );

        h.send(&mut r, submit_cloze()).unwrap();
        assert_eq!(r.stage(), Some(Stage::FpSpecific));
        assert_eq!(
            r.session().unwrap().current_specific.as_deref(),
            Some("carriers")
        );

        h.send(&mut r, answer("b")).unwrap();
        let out = h.send(&mut r, submit_cloze()).unwrap();
        assert_eq!(out, PracticeOutcome::At(Stage::FpMore));
        assert!(r.session().unwrap().current_specific.is_none());
    }

    #[test]
    fn test_confirm_specifics_can_replace_or_clear() {
        let mut h = Harness::new();
        let mut r = runner(&mut h, &["Describe X"]);
        to_weak_general(&mut h, &mut r);
        h.send(&mut r, weaknesses("osmosis")).unwrap();
        h.send(&mut r, submit_cloze()).unwrap();
        h.send(&mut r, review(None, "x")).unwrap();

        let out = h
            .send(
                &mut r,
                PracticeEvent::ConfirmSpecifics {
                    specifics: Some("  ".into()),
                },
            )
            .unwrap();
        assert_eq!(out, PracticeOutcome::At(Stage::FpMore));
        assert!(r.session().unwrap().current_specifics().is_empty());
    }

    #[test]
    fn test_specifics_merge_without_duplicates() {
        let mut h = Harness::new();
        let mut r = runner(&mut h, &["Describe X"]);
        to_weak_general(&mut h, &mut r);
        h.send(&mut r, weaknesses("osmosis")).unwrap();
        h.send(&mut r, submit_cloze()).unwrap();
        h.send(&mut r, review(None, "tonicity")).unwrap();
        h.send(&mut r, PracticeEvent::ConfirmSpecifics { specifics: None })
            .unwrap();
        h.send(&mut r, answer("a")).unwrap();
        h.send(&mut r, submit_cloze()).unwrap();
        assert_eq!(r.stage(), Some(Stage::FpMore));

        // Retry the same general and add overlapping specifics.
        h.send(&mut r, more(Some(1))).unwrap();
        h.send(&mut r, submit_cloze()).unwrap();
        h.send(&mut r, review(None, "Tonicity; water potential")).unwrap();
        assert_eq!(
            r.session().unwrap().current_specifics(),
            &["tonicity".to_string(), "water potential".to_string()]
        );
    }

    #[test]
    fn test_placements_graded_on_submit() {
        let mut h = Harness::new();
        let mut r = runner(&mut h, &["Describe X"]);
        to_weak_general(&mut h, &mut r);
        h.send(&mut r, weaknesses("vectors")).unwrap();

        let answers = r
            .session()
            .unwrap()
            .current_cloze
            .as_ref()
            .unwrap()
            .answers()
            .to_vec();
        for (blank, token) in answers.iter().enumerate() {
            let out = h
                .send(
                    &mut r,
                    PracticeEvent::PlaceToken {
                        blank,
                        token: token.clone(),
                    },
                )
                .unwrap();
            assert_eq!(out, PracticeOutcome::At(Stage::ClozeGeneral));
        }
        h.send(&mut r, PracticeEvent::ClearBlank { blank: 0 }).unwrap();
        h.send(
            &mut r,
            PracticeEvent::PlaceToken {
                blank: 0,
                token: answers[0].clone(),
            },
        )
        .unwrap();

        h.send(&mut r, submit_cloze()).unwrap();
        let session = r.session().unwrap();
        assert!(session.current_cloze.is_none());
        let score = session.last_score().unwrap();
        assert!(score.is_perfect());
        assert_eq!(score.total, answers.len());
    }

    #[test]
    fn test_explicit_fills_are_graded() {
        let mut h = Harness::new();
        let mut r = runner(&mut h, &["Describe X"]);
        to_weak_general(&mut h, &mut r);
        h.send(&mut r, weaknesses("vectors")).unwrap();
        h.send(
            &mut r,
            PracticeEvent::SubmitCloze {
                fills: Some(vec![Some(" UNDERSTANDING ".into())]),
            },
        )
        .unwrap();
        let graded = r.session().unwrap().last_graded.clone().unwrap();
        assert!(graded.correct_flags().unwrap()[0]);
        assert_eq!(graded.score().correct, 1);
    }

    #[test]
    fn test_bad_token_is_rejected() {
        let mut h = Harness::new();
        let mut r = runner(&mut h, &["Describe X"]);
        to_weak_general(&mut h, &mut r);
        h.send(&mut r, weaknesses("vectors")).unwrap();
        let err = h
            .send(
                &mut r,
                PracticeEvent::PlaceToken {
                    blank: 0,
                    token: "not in bank".into(),
                },
            )
            .unwrap_err();
        assert!(matches!(
            err,
            PracticeError::Cloze(ClozeError::TokenNotAvailable(_))
        ));
    }

    #[test]
    fn test_unexpected_event_changes_nothing() {
        let mut h = Harness::new();
        let mut r = runner(&mut h, &["Describe X"]);
        let before = r.session().cloned();
        let routes_before = h.nav.routes.len();

        let err = h.send(&mut r, submit_cloze()).unwrap_err();
        assert!(matches!(
            err,
            PracticeError::UnexpectedEvent {
                stage: Stage::FpGeneralQ,
                event: "submit_cloze"
            }
        ));
        assert_eq!(r.session().cloned(), before);
        assert_eq!(h.nav.routes.len(), routes_before);
        assert_eq!(
            err.to_string(),
            "event 'submit_cloze' does not apply at stage 'fp_general_q'"
        );
    }

    #[test]
    fn test_rating_out_of_range() {
        let mut h = Harness::new();
        let mut r = runner(&mut h, &["Describe X"]);
        let err = h
            .send(
                &mut r,
                PracticeEvent::SubmitAnswer {
                    answer: "a".into(),
                    rating: Some(11),
                    skip_to_exam: false,
                },
            )
            .unwrap_err();
        assert!(matches!(err, PracticeError::InvalidRating(11)));
        assert_eq!(r.stage(), Some(Stage::FpGeneralQ));
    }

    fn to_decision(h: &mut Harness, r: &mut PracticeRunner, rating: Option<u8>) {
        h.send(r, answer("a")).unwrap();
        h.send(r, weaknesses("")).unwrap();
        h.send(r, more(rating)).unwrap();
        assert_eq!(r.stage(), Some(Stage::Decision));
    }

    #[test]
    fn test_next_dotpoint_and_completion() {
        let mut h = Harness::new();
        let mut r = runner(&mut h, &["Describe X", "Explain Y"]);

        to_decision(&mut h, &mut r, Some(8));
        let out = h.send(&mut r, PracticeEvent::NextDotpoint).unwrap();
        assert_eq!(out, PracticeOutcome::At(Stage::FpGeneralQ));
        assert_eq!(r.position(), 1);
        assert_eq!(r.active_dotpoint(), Some(&key("Explain Y")));
        let fresh = r.session().unwrap();
        assert!(fresh.general_weaknesses.is_empty());
        assert!(fresh.last_rating.is_none());

        to_decision(&mut h, &mut r, None);
        let out = h.send(&mut r, PracticeEvent::NextDotpoint).unwrap();
        assert_eq!(out, PracticeOutcome::Finished);
        assert!(!r.is_running());
        assert_eq!(h.nav.current(), Some("home"));
        assert_eq!(
            h.nav.notices,
            vec![Notice::Success("All selected dotpoints done.".into())]
        );
        assert_eq!(
            r.progress(),
            &[
                ProgressRecord {
                    dotpoint: key("Describe X"),
                    status: ProgressStatus::Completed { rating: Some(8) },
                },
                ProgressRecord {
                    dotpoint: key("Explain Y"),
                    status: ProgressStatus::Completed { rating: None },
                },
            ]
        );

        let err = h.send(&mut r, PracticeEvent::NextDotpoint).unwrap_err();
        assert!(matches!(err, PracticeError::NotRunning));
    }

    #[test]
    fn test_decision_exam_mode_and_quit() {
        let mut h = Harness::new();
        let mut r = runner(&mut h, &["Describe X", "Explain Y"]);
        to_decision(&mut h, &mut r, None);

        assert_eq!(
            h.send(&mut r, PracticeEvent::ExamMode).unwrap(),
            PracticeOutcome::ExamMode
        );
        assert_eq!(h.nav.current(), Some("exam_mode"));
        assert_eq!(r.stage(), Some(Stage::Decision));

        assert_eq!(
            h.send(&mut r, PracticeEvent::Quit).unwrap(),
            PracticeOutcome::Quit
        );
        assert_eq!(h.nav.current(), Some("home"));
        assert!(!r.is_running());
        assert!(r.progress().is_empty());
    }

    #[test]
    fn test_leave_guard() {
        let mut h = Harness::new();
        let mut r = runner(&mut h, &["Describe X"]);
        h.send(&mut r, answer("a")).unwrap();

        let out = r
            .request_leave(LeaveResolution::Cancel, "home", &mut h.nav)
            .unwrap();
        assert_eq!(out, PracticeOutcome::At(Stage::WeakGeneral));
        assert!(r.is_running());
        assert_ne!(h.nav.current(), Some("home"));

        assert!(matches!(
            r.request_leave(LeaveResolution::SaveWithRating(12), "home", &mut h.nav),
            Err(PracticeError::InvalidRating(12))
        ));
        assert!(r.is_running());

        let out = r
            .request_leave(LeaveResolution::SaveIncomplete, "home", &mut h.nav)
            .unwrap();
        assert_eq!(out, PracticeOutcome::Left);
        assert!(!r.is_running());
        assert_eq!(h.nav.current(), Some("home"));
        assert_eq!(r.progress()[0].status, ProgressStatus::Incomplete);
    }

    #[test]
    fn test_leave_with_rating_counts_as_completed() {
        let mut h = Harness::new();
        let mut r = runner(&mut h, &["Describe X"]);
        r.request_leave(LeaveResolution::SaveWithRating(7), "cram_review", &mut h.nav)
            .unwrap();
        assert_eq!(
            r.progress()[0].status,
            ProgressStatus::Completed { rating: Some(7) }
        );
        assert_eq!(h.nav.current(), Some("cram_review"));
    }

    #[test]
    fn test_generated_template_preferred() {
        let mock = MockSuggester::new("gen")
            .with_report(WeaknessReport::default())
            .with_template("Osmosis moves [[water]] across a [[membrane]].");
        let mut h = Harness::with_suggester(Box::new(mock));
        let mut r = runner(&mut h, &["Describe X"]);
        to_weak_general(&mut h, &mut r);
        h.send(&mut r, weaknesses("osmosis")).unwrap();
        let item = r.session().unwrap().current_cloze.clone().unwrap();
        assert_eq!(item.answers(), &["water".to_string(), "membrane".to_string()]);
    }

    #[test]
    fn test_malformed_generated_template_falls_back() {
        let mock = MockSuggester::new("gen")
            .with_report(WeaknessReport::default())
            .with_template("broken [[blank");
        let mut h = Harness::with_suggester(Box::new(mock));
        let mut r = runner(&mut h, &["Describe X"]);
        to_weak_general(&mut h, &mut r);
        h.send(&mut r, weaknesses("vectors")).unwrap();
        let item = r.session().unwrap().current_cloze.clone().unwrap();
        assert!(item.answers().contains(&"recall".to_string()));
    }

    #[test]
    fn test_every_transition_is_navigated() {
        let mut h = Harness::new();
        let mut r = runner(&mut h, &["Describe X"]);
        to_weak_general(&mut h, &mut r);
        h.send(&mut r, weaknesses("A")).unwrap();
        h.send(&mut r, submit_cloze()).unwrap();
        h.send(&mut r, review(None, "")).unwrap();
        h.send(&mut r, more(None)).unwrap();
        assert_eq!(
            h.nav.routes,
            vec![
                "fp_general_q",
                "weak_general",
                "cloze_general",
                "cloze_review",
                "fp_more",
                "decision"
            ]
        );
    }

    #[test]
    fn test_event_json_shape() {
        let event: PracticeEvent =
            serde_json::from_str(r#"{"type":"continue_review","rating":5}"#).unwrap();
        assert_eq!(
            event,
            PracticeEvent::ContinueReview {
                rating: Some(5),
                specifics: String::new()
            }
        );
        assert_eq!(serde_json::to_string(&Stage::FpGeneralQ).unwrap(), "\"fp_general_q\"");
    }
}
