mod mock;

pub use mock::MockSuggester;

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::cloze::Specificity;
use crate::selection::DotpointKey;

/// Weaknesses and strengths proposed after a first-principles answer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaknessReport {
    pub weaknesses: Vec<String>,
    pub strengths: Vec<String>,
}

impl WeaknessReport {
    /// Weaknesses joined for the editable text field.
    pub fn weaknesses_text(&self, delimiter: char) -> String {
        join_list(&self.weaknesses, delimiter)
    }

    pub fn strengths_text(&self, delimiter: char) -> String {
        join_list(&self.strengths, delimiter)
    }
}

fn join_list(items: &[String], delimiter: char) -> String {
    items.join(&format!("{delimiter} "))
}

/// Errors from a suggestion backend.
#[derive(Debug, thiserror::Error)]
pub enum SuggestError {
    #[error("suggestion request failed: {0}")]
    RequestFailed(String),
}

/// Source of AI-style suggestions.
///
/// Callers treat every error as recoverable: the learner edits suggestions
/// anyway, so a failing backend degrades to empty suggestions.
pub trait Suggester {
    fn name(&self) -> &str;

    /// Suggested weaknesses and strengths for an answer to `dotpoint`.
    fn weakness_report(
        &self,
        dotpoint: &DotpointKey,
        answer: &str,
    ) -> Result<WeaknessReport, SuggestError>;

    /// Dotpoints matching free-text weaknesses, at most `limit`.
    fn suggest_dotpoints(
        &self,
        catalog: &Catalog,
        weaknesses: &str,
        limit: usize,
    ) -> Result<Vec<DotpointKey>, SuggestError>;

    /// A generated `[[answer]]` template for a weakness. `Ok(None)` selects
    /// the built-in template library.
    fn cloze_template(
        &self,
        _label: &str,
        _specificity: Specificity,
    ) -> Result<Option<String>, SuggestError> {
        Ok(None)
    }
}

const PLACEHOLDER_WEAKNESSES: &[&str] = &["definition gap", "unclear mechanism", "weak example"];
const PLACEHOLDER_STRENGTHS: &[&str] = &["correct terms", "coherent structure"];

/// Fixed suggestions with no backend behind them.
#[derive(Debug, Clone, Default)]
pub struct PlaceholderSuggester;

impl PlaceholderSuggester {
    pub fn new() -> Self {
        Self
    }
}

impl Suggester for PlaceholderSuggester {
    fn name(&self) -> &str {
        "placeholder"
    }

    fn weakness_report(
        &self,
        _dotpoint: &DotpointKey,
        _answer: &str,
    ) -> Result<WeaknessReport, SuggestError> {
        Ok(WeaknessReport {
            weaknesses: PLACEHOLDER_WEAKNESSES.iter().map(|s| s.to_string()).collect(),
            strengths: PLACEHOLDER_STRENGTHS.iter().map(|s| s.to_string()).collect(),
        })
    }

    /// Ignores the text and proposes the first `limit` dotpoints in catalog order.
    fn suggest_dotpoints(
        &self,
        catalog: &Catalog,
        _weaknesses: &str,
        limit: usize,
    ) -> Result<Vec<DotpointKey>, SuggestError> {
        Ok(catalog.all_keys().into_iter().take(limit).collect())
    }
}
