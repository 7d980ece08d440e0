use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::catalog::Catalog;

/// One dotpoint, identified by its full syllabus path.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DotpointKey {
    pub subject: String,
    pub module: String,
    pub inquiry_question: String,
    pub dotpoint: String,
}

impl DotpointKey {
    pub fn new(
        subject: impl Into<String>,
        module: impl Into<String>,
        inquiry_question: impl Into<String>,
        dotpoint: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            module: module.into(),
            inquiry_question: inquiry_question.into(),
            dotpoint: dotpoint.into(),
        }
    }

    /// Short deterministic key derived from content only, so it survives
    /// reordering and re-rendering.
    pub fn stable_key(&self) -> String {
        let joined = [
            self.subject.as_str(),
            self.module.as_str(),
            self.inquiry_question.as_str(),
            self.dotpoint.as_str(),
        ]
        .join("\u{1f}");
        let digest = Sha256::digest(joined.as_bytes());
        let mut key = hex::encode(digest);
        key.truncate(12);
        key
    }

    /// "Subject → Module → IQ" heading.
    pub fn breadcrumb(&self) -> String {
        format!(
            "{} → {} → {}",
            self.subject, self.module, self.inquiry_question
        )
    }

    pub fn matches(&self, path: &SelectionPath) -> bool {
        match path {
            SelectionPath::Subject(s) => &self.subject == s,
            SelectionPath::Module(s, m) => &self.subject == s && &self.module == m,
            SelectionPath::InquiryQuestion(s, m, iq) => {
                &self.subject == s && &self.module == m && &self.inquiry_question == iq
            }
        }
    }
}

impl fmt::Display for DotpointKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.breadcrumb(), self.dotpoint)
    }
}

/// A prefix of a dotpoint path at one hierarchy level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPath {
    Subject(String),
    Module(String, String),
    InquiryQuestion(String, String, String),
}

/// How much of a path's catalog descendants are selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Coverage {
    None,
    Partial,
    Full,
}

/// The learner's current study targets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionSet {
    items: BTreeSet<DotpointKey>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, key: &DotpointKey) -> bool {
        self.items.contains(key)
    }

    /// Selected keys in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &DotpointKey> {
        self.items.iter()
    }

    pub fn sorted(&self) -> Vec<DotpointKey> {
        self.items.iter().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Replace the whole set.
    pub fn replace(&mut self, items: impl IntoIterator<Item = DotpointKey>) {
        self.items = items.into_iter().collect();
    }

    pub fn extend(&mut self, items: impl IntoIterator<Item = DotpointKey>) {
        self.items.extend(items);
    }

    pub fn toggle_dotpoint(&mut self, key: &DotpointKey, on: bool) {
        if on {
            self.items.insert(key.clone());
        } else {
            self.items.remove(key);
        }
    }

    /// Add or remove every dotpoint under `path`. Unknown paths are a no-op.
    pub fn toggle_path(&mut self, catalog: &Catalog, path: &SelectionPath, on: bool) {
        if !catalog.contains_path(path) {
            debug!(?path, "toggle on unknown catalog path ignored");
            return;
        }
        let keys = catalog.keys_under(path);
        debug!(?path, on, count = keys.len(), "bulk toggle");
        for key in &keys {
            self.toggle_dotpoint(key, on);
        }
    }

    pub fn toggle_subject(&mut self, catalog: &Catalog, subject: &str, on: bool) {
        for module in catalog.modules(subject) {
            self.toggle_module(catalog, subject, module, on);
        }
    }

    pub fn toggle_module(&mut self, catalog: &Catalog, subject: &str, module: &str, on: bool) {
        for iq in catalog.inquiry_questions(subject, module) {
            self.toggle_iq(catalog, subject, module, iq, on);
        }
    }

    pub fn toggle_iq(
        &mut self,
        catalog: &Catalog,
        subject: &str,
        module: &str,
        iq: &str,
        on: bool,
    ) {
        self.toggle_path(
            catalog,
            &SelectionPath::InquiryQuestion(subject.into(), module.into(), iq.into()),
            on,
        );
    }

    /// True iff any selected dotpoint lies under `path`. Partial selection
    /// counts as selected.
    pub fn is_selected_at(&self, path: &SelectionPath) -> bool {
        self.items.iter().any(|k| k.matches(path))
    }

    pub fn coverage_at(&self, catalog: &Catalog, path: &SelectionPath) -> Coverage {
        let keys = catalog.keys_under(path);
        let selected = keys.iter().filter(|k| self.items.contains(*k)).count();
        if selected == 0 {
            // Selected keys can outlive a catalog reload.
            if self.is_selected_at(path) {
                Coverage::Partial
            } else {
                Coverage::None
            }
        } else if selected == keys.len() {
            Coverage::Full
        } else {
            Coverage::Partial
        }
    }

    /// Bulk "Select"/"Unselect" button: clears the path if anything under it is
    /// selected, otherwise selects all of it.
    pub fn toggle_at(&mut self, catalog: &Catalog, path: &SelectionPath) {
        let on = !self.is_selected_at(path);
        if on {
            self.toggle_path(catalog, path, true);
        } else {
            self.items.retain(|k| !k.matches(path));
        }
    }
}
