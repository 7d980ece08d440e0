//! Review/triage boards.
//!
//! A board shows candidate dotpoints as cards that start out kept. Marks are
//! tracked by content key, so they survive reordering and re-rendering.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::selection::{DotpointKey, SelectionSet};
use crate::store::{routes, Navigator, Notice};

/// How kept cards are written back to the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplyMode {
    /// The selection becomes exactly the kept cards.
    Replace,
    /// Kept cards are added to the selection.
    Merge,
}

/// Which screen a board belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewRoute {
    Cram,
    Srs,
    Ai,
}

impl ReviewRoute {
    pub const ALL: [ReviewRoute; 3] = [ReviewRoute::Cram, ReviewRoute::Srs, ReviewRoute::Ai];

    pub fn key(self) -> &'static str {
        match self {
            ReviewRoute::Cram => "cram",
            ReviewRoute::Srs => "srs",
            ReviewRoute::Ai => "ai",
        }
    }

    pub fn apply_mode(self) -> ApplyMode {
        match self {
            ReviewRoute::Cram | ReviewRoute::Srs => ApplyMode::Replace,
            ReviewRoute::Ai => ApplyMode::Merge,
        }
    }

    /// Screen rendering this board.
    pub fn route(self) -> &'static str {
        match self {
            ReviewRoute::Cram => routes::CRAM_REVIEW,
            ReviewRoute::Srs => routes::SRS_REVIEW,
            ReviewRoute::Ai => routes::AI_REVIEW,
        }
    }

    /// Where "Submit" goes after applying.
    pub fn submit_route(self) -> &'static str {
        match self {
            ReviewRoute::Cram => routes::CRAM_HOW,
            ReviewRoute::Srs => routes::SRS_MENU,
            ReviewRoute::Ai => routes::HOME,
        }
    }
}

/// Errors from review boards.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReviewError {
    #[error("no card with key '{0}' on this board")]
    UnknownCard(String),
}

/// One rendered card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewCard {
    pub stable_key: String,
    pub item: DotpointKey,
    pub removed: bool,
}

/// Live kept/removed counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub kept: usize,
    pub removed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewBoard {
    route: ReviewRoute,
    candidates: Vec<DotpointKey>,
    removed: BTreeSet<String>,
}

impl ReviewBoard {
    /// Board over `candidates` in the given order; repeats are dropped.
    pub fn new(route: ReviewRoute, candidates: impl IntoIterator<Item = DotpointKey>) -> Self {
        let mut seen = BTreeSet::new();
        let candidates = candidates
            .into_iter()
            .filter(|k| seen.insert(k.clone()))
            .collect();
        Self {
            route,
            candidates,
            removed: BTreeSet::new(),
        }
    }

    /// Board over the current selection, sorted.
    pub fn from_selection(route: ReviewRoute, selection: &SelectionSet) -> Self {
        Self::new(route, selection.sorted())
    }

    pub fn route(&self) -> ReviewRoute {
        self.route
    }

    pub fn candidates(&self) -> &[DotpointKey] {
        &self.candidates
    }

    pub fn removed_keys(&self) -> &BTreeSet<String> {
        &self.removed
    }

    /// Restore saved marks, ignoring keys that match no card.
    pub fn restore_marks(&mut self, marks: impl IntoIterator<Item = String>) {
        let known: BTreeSet<String> = self.candidates.iter().map(|k| k.stable_key()).collect();
        self.removed = marks.into_iter().filter(|m| known.contains(m)).collect();
    }

    pub fn is_removed(&self, item: &DotpointKey) -> bool {
        self.removed.contains(&item.stable_key())
    }

    /// Flip one card between kept and removed. Returns the new removed state.
    pub fn toggle(&mut self, stable_key: &str) -> Result<bool, ReviewError> {
        if !self.candidates.iter().any(|k| k.stable_key() == stable_key) {
            return Err(ReviewError::UnknownCard(stable_key.to_string()));
        }
        let removed = if self.removed.remove(stable_key) {
            false
        } else {
            self.removed.insert(stable_key.to_string());
            true
        };
        debug!(route = self.route.key(), key = stable_key, removed, "card toggled");
        Ok(removed)
    }

    pub fn toggle_item(&mut self, item: &DotpointKey) -> Result<bool, ReviewError> {
        self.toggle(&item.stable_key())
    }

    pub fn cards(&self) -> Vec<ReviewCard> {
        self.candidates
            .iter()
            .map(|item| {
                let stable_key = item.stable_key();
                let removed = self.removed.contains(&stable_key);
                ReviewCard {
                    stable_key,
                    item: item.clone(),
                    removed,
                }
            })
            .collect()
    }

    pub fn tally(&self) -> Tally {
        let removed = self
            .candidates
            .iter()
            .filter(|k| self.removed.contains(&k.stable_key()))
            .count();
        Tally {
            kept: self.candidates.len() - removed,
            removed,
        }
    }

    pub fn kept(&self) -> Vec<DotpointKey> {
        self.candidates
            .iter()
            .filter(|k| !self.removed.contains(&k.stable_key()))
            .cloned()
            .collect()
    }

    /// Write kept cards into `selection` and clear the marks.
    pub fn apply(&mut self, selection: &mut SelectionSet) -> Tally {
        let tally = self.tally();
        let kept = self.kept();
        match self.route.apply_mode() {
            ApplyMode::Replace => selection.replace(kept),
            ApplyMode::Merge => selection.extend(kept),
        }
        self.removed.clear();
        info!(
            route = self.route.key(),
            kept = tally.kept,
            removed = tally.removed,
            selected = selection.len(),
            "review applied"
        );
        tally
    }

    /// Apply, then move on to the route's next screen.
    pub fn submit(&mut self, selection: &mut SelectionSet, navigator: &mut dyn Navigator) -> Tally {
        let tally = self.apply(selection);
        navigator.notify(Notice::Success("Selection updated.".to_string()));
        navigator.navigate(self.route.submit_route());
        tally
    }
}
