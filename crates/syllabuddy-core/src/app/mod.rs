//! Session state shared by every screen.
//!
//! [`AppState`] owns the catalog, the learner's selection, the review boards
//! and the practice runner. Screens call its operations with the
//! [`Navigator`] they render through; nothing here is global.

use std::collections::BTreeMap;
use std::path::Path;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::catalog::{self, Catalog};
use crate::config::{Config, ConfigError};
use crate::practice::{
    LeaveResolution, PracticeContext, PracticeError, PracticeEvent, PracticeOutcome,
    PracticeRunner, ProgressRecord, Stage,
};
use crate::review::{ReviewBoard, ReviewError, ReviewRoute, Tally};
use crate::selection::{DotpointKey, SelectionPath, SelectionSet};
use crate::store::{self, keys, FieldStore, Navigator, Notice, StoreError};
use crate::suggest::{SuggestError, Suggester};

/// Shown when a flow needs at least one selected dotpoint.
pub const EMPTY_SELECTION_WARNING: &str =
    "No dotpoints selected yet. Use Select/Cram → Review first.";

/// Errors surfaced to screens.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("no dotpoints selected")]
    EmptySelection,
    #[error("no review board open for '{0}'")]
    NoBoard(&'static str),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("practice error: {0}")]
    Practice(#[from] PracticeError),
    #[error("review error: {0}")]
    Review(#[from] ReviewError),
    #[error("suggestion error: {0}")]
    Suggest(#[from] SuggestError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

pub struct AppState {
    config: Config,
    catalog: Catalog,
    selection: SelectionSet,
    boards: BTreeMap<ReviewRoute, ReviewBoard>,
    runner: Option<PracticeRunner>,
    suggester: Box<dyn Suggester>,
    rng: StdRng,
}

impl AppState {
    /// Validate `config` and load the catalog it names.
    pub fn new(config: Config, suggester: Box<dyn Suggester>) -> Result<Self, AppError> {
        config.validate()?;
        let syllabus = catalog::load_or_fallback(config.catalog.path.as_deref().map(Path::new));
        let catalog = Catalog::explode(&syllabus);
        Ok(Self::with_catalog(config, catalog, suggester))
    }

    pub fn with_catalog(config: Config, catalog: Catalog, suggester: Box<dyn Suggester>) -> Self {
        let rng = match config.cloze.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        info!(
            subjects = catalog.subjects().len(),
            dotpoints = catalog.dotpoint_count(),
            suggester = suggester.name(),
            "session ready"
        );
        Self {
            config,
            catalog,
            selection: SelectionSet::new(),
            boards: BTreeMap::new(),
            runner: None,
            suggester,
            rng,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn board(&self, route: ReviewRoute) -> Option<&ReviewBoard> {
        self.boards.get(&route)
    }

    pub fn runner(&self) -> Option<&PracticeRunner> {
        self.runner.as_ref()
    }

    pub fn practice_progress(&self) -> &[ProgressRecord] {
        self.runner.as_ref().map(PracticeRunner::progress).unwrap_or(&[])
    }

    pub fn toggle(&mut self, path: &SelectionPath, on: bool) {
        self.selection.toggle_path(&self.catalog, path, on);
    }

    /// The bulk Select/Unselect button for `path`.
    pub fn toggle_at(&mut self, path: &SelectionPath) {
        self.selection.toggle_at(&self.catalog, path);
    }

    pub fn toggle_dotpoint(&mut self, key: &DotpointKey, on: bool) {
        self.selection.toggle_dotpoint(key, on);
    }

    /// Clear the selection and every review board.
    pub fn reset_selection(&mut self) {
        self.selection.clear();
        self.boards.clear();
        debug!("selection reset");
    }

    fn require_selection(&self, navigator: &mut dyn Navigator) -> Result<(), AppError> {
        if self.selection.is_empty() {
            navigator.notify(Notice::Warning(EMPTY_SELECTION_WARNING.to_string()));
            return Err(AppError::EmptySelection);
        }
        Ok(())
    }

    /// Open the cram or SRS board over the current selection. The AI board
    /// can only be reopened once suggestions exist.
    pub fn begin_review(
        &mut self,
        route: ReviewRoute,
        navigator: &mut dyn Navigator,
    ) -> Result<&ReviewBoard, AppError> {
        let candidates = match route {
            ReviewRoute::Cram | ReviewRoute::Srs => {
                self.require_selection(navigator)?;
                self.selection.sorted()
            }
            ReviewRoute::Ai => self
                .boards
                .get(&route)
                .map(|b| b.candidates().to_vec())
                .ok_or(AppError::NoBoard(route.key()))?,
        };
        Ok(self.open_board(route, candidates, navigator))
    }

    /// Ask the suggester for dotpoints matching `weaknesses` and open the AI
    /// board over them.
    pub fn begin_ai_review(
        &mut self,
        weaknesses: &str,
        navigator: &mut dyn Navigator,
    ) -> Result<&ReviewBoard, AppError> {
        let limit = self.config.review.suggestion_limit;
        let suggestions = match self
            .suggester
            .suggest_dotpoints(&self.catalog, weaknesses, limit)
        {
            Ok(s) => s,
            Err(e) => {
                warn!(suggester = self.suggester.name(), error = %e, "dotpoint suggestions failed");
                navigator.notify(Notice::Warning("Suggestions are unavailable right now.".into()));
                return Err(e.into());
            }
        };
        // New suggestions start with every card kept.
        self.boards.remove(&ReviewRoute::Ai);
        Ok(self.open_board(ReviewRoute::Ai, suggestions, navigator))
    }

    fn open_board(
        &mut self,
        route: ReviewRoute,
        candidates: Vec<DotpointKey>,
        navigator: &mut dyn Navigator,
    ) -> &ReviewBoard {
        let mut board = ReviewBoard::new(route, candidates);
        if let Some(previous) = self.boards.get(&route) {
            board.restore_marks(previous.removed_keys().iter().cloned());
        }
        debug!(route = route.key(), cards = board.candidates().len(), "review board opened");
        navigator.navigate(route.route());
        self.boards.insert(route, board);
        &self.boards[&route]
    }

    pub fn toggle_card(&mut self, route: ReviewRoute, stable_key: &str) -> Result<bool, AppError> {
        let board = self
            .boards
            .get_mut(&route)
            .ok_or(AppError::NoBoard(route.key()))?;
        Ok(board.toggle(stable_key)?)
    }

    /// "Apply" (stay) or "Submit" (apply and move on) on a board.
    pub fn apply_review(
        &mut self,
        route: ReviewRoute,
        submit: bool,
        navigator: &mut dyn Navigator,
    ) -> Result<Tally, AppError> {
        let board = self
            .boards
            .get_mut(&route)
            .ok_or(AppError::NoBoard(route.key()))?;
        let tally = if submit {
            board.submit(&mut self.selection, navigator)
        } else {
            let tally = board.apply(&mut self.selection);
            navigator.notify(Notice::Success("Selection updated.".to_string()));
            tally
        };
        Ok(tally)
    }

    /// Start focused practice over the selection, replacing any run in progress.
    pub fn begin_focused_practice(
        &mut self,
        navigator: &mut dyn Navigator,
    ) -> Result<Stage, AppError> {
        self.require_selection(navigator)?;
        let runner = PracticeRunner::begin(
            self.selection.sorted(),
            self.config.practice.clone(),
            self.config.cloze.clone(),
            navigator,
        )?;
        let stage = runner.stage().unwrap_or(Stage::FpGeneralQ);
        self.runner = Some(runner);
        Ok(stage)
    }

    pub fn handle_practice_event(
        &mut self,
        event: PracticeEvent,
        navigator: &mut dyn Navigator,
    ) -> Result<PracticeOutcome, AppError> {
        let runner = self.runner.as_mut().ok_or(PracticeError::NotRunning)?;
        let mut ctx = PracticeContext {
            suggester: self.suggester.as_ref(),
            navigator,
            rng: &mut self.rng,
        };
        Ok(runner.handle_event(event, &mut ctx)?)
    }

    /// Navigation guard: leave practice for `route`.
    pub fn leave_practice(
        &mut self,
        resolution: LeaveResolution,
        route: &str,
        navigator: &mut dyn Navigator,
    ) -> Result<PracticeOutcome, AppError> {
        match self.runner.as_mut() {
            Some(runner) if runner.is_running() => {
                Ok(runner.request_leave(resolution, route, navigator)?)
            }
            _ => {
                navigator.navigate(route);
                Ok(PracticeOutcome::Left)
            }
        }
    }

    /// Write the session's fields to `store`.
    pub fn persist(&self, store: &mut dyn FieldStore) -> Result<(), AppError> {
        store::put(store, keys::SELECTION, &self.selection.sorted())?;
        for route in ReviewRoute::ALL {
            let marks: Vec<&String> = self
                .boards
                .get(&route)
                .map(|b| b.removed_keys().iter().collect())
                .unwrap_or_default();
            store::put(store, &keys::review_removed(route.key()), &marks)?;
        }
        match self.boards.get(&ReviewRoute::Ai) {
            Some(board) => store::put(store, keys::AI_SUGGESTED, board.candidates())?,
            None => {
                store.remove(keys::AI_SUGGESTED)?;
            }
        }
        match &self.runner {
            Some(runner) => store::put(store, keys::PRACTICE, runner)?,
            None => {
                store.remove(keys::PRACTICE)?;
            }
        }
        debug!(selected = self.selection.len(), "session persisted");
        Ok(())
    }

    /// Load the session's fields from `store`. Absent keys leave defaults.
    pub fn restore(&mut self, store: &dyn FieldStore) -> Result<(), AppError> {
        let selected: Vec<DotpointKey> = store::fetch_or_default(store, keys::SELECTION)?;
        self.selection.replace(selected);

        self.boards.clear();
        let suggested: Option<Vec<DotpointKey>> = store::fetch(store, keys::AI_SUGGESTED)?;
        for route in ReviewRoute::ALL {
            let marks: Vec<String> =
                store::fetch_or_default(store, &keys::review_removed(route.key()))?;
            let candidates = match route {
                ReviewRoute::Ai => match &suggested {
                    Some(s) => s.clone(),
                    None => continue,
                },
                _ if marks.is_empty() => continue,
                _ => self.selection.sorted(),
            };
            let mut board = ReviewBoard::new(route, candidates);
            board.restore_marks(marks);
            self.boards.insert(route, board);
        }

        self.runner = store::fetch::<PracticeRunner>(store, keys::PRACTICE)?.map(|mut r| {
            r.configure(self.config.practice.clone(), self.config.cloze.clone());
            r
        });
        info!(
            selected = self.selection.len(),
            practice = self.runner.is_some(),
            "session restored"
        );
        Ok(())
    }
}
