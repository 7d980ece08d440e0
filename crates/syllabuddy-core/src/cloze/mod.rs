//! Fill-in-the-blank practice items.
//!
//! A template marks each blank as `[[answer]]`. Building an item splits the
//! template into the prose around the blanks and the expected answers, then
//! deals a shuffled word bank. Grading is exact after trimming and case
//! folding.

mod templates;

use rand::seq::{IteratorRandom, SliceRandom};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ClozeConfig;

pub const BLANK_OPEN: &str = "[[";
pub const BLANK_CLOSE: &str = "]]";

/// Upper bound on blanks in a single item.
pub const MAX_BLANKS: usize = 6;

/// Tokens that may pad the word bank.
pub const DISTRACTORS: &[&str] = &["assumptions", "units", "notation", "context", "estimate"];

/// How narrowly an item targets a weakness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Specificity {
    General,
    Specific,
}

impl Specificity {
    pub fn level(self) -> u8 {
        match self {
            Specificity::General => 0,
            Specificity::Specific => 1,
        }
    }

    /// Levels above 1 clamp to `Specific`.
    pub fn from_level(level: u8) -> Self {
        if level == 0 {
            Specificity::General
        } else {
            Specificity::Specific
        }
    }

    /// One level more specific, or `None` if that would pass `cap`.
    pub fn raised(self, cap: u8) -> Option<Self> {
        let next = self.level() + 1;
        if next > cap || next > Specificity::Specific.level() {
            None
        } else {
            Some(Specificity::from_level(next))
        }
    }
}

/// Correct blanks out of total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub correct: usize,
    pub total: usize,
}

impl Score {
    /// Share of blanks answered wrongly, 0.0 when there are no blanks.
    pub fn percent_wrong(&self) -> f32 {
        if self.total == 0 {
            return 0.0;
        }
        (self.total - self.correct) as f32 * 100.0 / self.total as f32
    }

    pub fn is_perfect(&self) -> bool {
        self.correct == self.total
    }
}

/// A single cloze exercise and the learner's placements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClozeItem {
    pub label: String,
    pub specificity: Specificity,
    template: String,
    segments: Vec<String>,
    answers: Vec<String>,
    bank: Vec<String>,
    fills: Vec<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    correct_flags: Option<Vec<bool>>,
}

impl ClozeItem {
    /// Item with an empty bank and no placements.
    pub fn from_template(
        label: impl Into<String>,
        specificity: Specificity,
        template: impl Into<String>,
    ) -> Result<Self, ClozeError> {
        let template = template.into();
        let (segments, answers) = parse_template(&template)?;
        let fills = vec![None; answers.len()];
        Ok(Self {
            label: label.into(),
            specificity,
            template,
            segments,
            answers,
            bank: Vec::new(),
            fills,
            correct_flags: None,
        })
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn answers(&self) -> &[String] {
        &self.answers
    }

    pub fn bank(&self) -> &[String] {
        &self.bank
    }

    pub fn fills(&self) -> &[Option<String>] {
        &self.fills
    }

    /// `None` until graded.
    pub fn correct_flags(&self) -> Option<&[bool]> {
        self.correct_flags.as_deref()
    }

    pub fn blank_count(&self) -> usize {
        self.answers.len()
    }

    pub fn is_graded(&self) -> bool {
        self.correct_flags.is_some()
    }

    /// Segments and answers interleaved back into plain prose.
    pub fn reconstruct(&self) -> String {
        let mut out = String::new();
        for (i, segment) in self.segments.iter().enumerate() {
            out.push_str(segment);
            if let Some(answer) = self.answers.get(i) {
                out.push_str(answer);
            }
        }
        out
    }

    /// Move `token` into `blank`. The token comes from the bank or from
    /// another blank; whatever occupied `blank` goes back to the bank.
    pub fn place(&mut self, blank: usize, token: &str) -> Result<(), ClozeError> {
        if blank >= self.fills.len() {
            return Err(ClozeError::BlankOutOfRange {
                blank,
                blanks: self.fills.len(),
            });
        }
        if let Some(pos) = self.bank.iter().position(|t| t == token) {
            self.bank.remove(pos);
        } else if let Some(from) = self
            .fills
            .iter()
            .position(|f| f.as_deref() == Some(token))
        {
            self.fills[from] = None;
        } else {
            return Err(ClozeError::TokenNotAvailable(token.to_string()));
        }

        if let Some(previous) = self.fills[blank].take() {
            self.bank.push(previous);
        }
        self.fills[blank] = Some(token.to_string());
        self.correct_flags = None;
        Ok(())
    }

    /// Return the token in `blank` to the bank.
    pub fn clear(&mut self, blank: usize) -> Result<Option<String>, ClozeError> {
        let slot = self
            .fills
            .get_mut(blank)
            .ok_or(ClozeError::BlankOutOfRange {
                blank,
                blanks: self.answers.len(),
            })?;
        let token = slot.take();
        if let Some(ref t) = token {
            self.bank.push(t.clone());
        }
        self.correct_flags = None;
        Ok(token)
    }

    /// Graded copy using `fills`. Missing positions count as empty, extra
    /// positions are ignored.
    pub fn submit(&self, fills: &[Option<String>]) -> ClozeItem {
        let mut graded = self.clone();
        graded.fills = (0..self.answers.len())
            .map(|i| fills.get(i).cloned().flatten())
            .collect();
        graded.grade();
        graded
    }

    /// Grade the current placements in place.
    pub fn grade(&mut self) {
        let flags = self
            .answers
            .iter()
            .zip(&self.fills)
            .map(|(answer, fill)| answer_matches(answer, fill.as_deref()))
            .collect();
        self.correct_flags = Some(flags);
    }

    /// Correct count over total. Ungraded items score zero correct.
    pub fn score(&self) -> Score {
        let correct = self
            .correct_flags
            .as_ref()
            .map(|flags| flags.iter().filter(|ok| **ok).count())
            .unwrap_or(0);
        Score {
            correct,
            total: self.answers.len(),
        }
    }
}

/// Trim and fold case. Shared by grading and weakness de-duplication.
pub fn fold(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Exact match after trimming and case folding; an empty fill never matches.
pub fn answer_matches(answer: &str, fill: Option<&str>) -> bool {
    let fill = fold(fill.unwrap_or(""));
    if fill.is_empty() {
        return false;
    }
    fold(answer) == fill
}

/// Split a `[[answer]]` template into `(segments, answers)`.
/// `segments.len() == answers.len() + 1` always holds.
pub fn parse_template(template: &str) -> Result<(Vec<String>, Vec<String>), ClozeError> {
    let mut segments = Vec::new();
    let mut answers = Vec::new();
    let mut rest = template;
    let mut offset = 0;

    while let Some(open) = rest.find(BLANK_OPEN) {
        let after = &rest[open + BLANK_OPEN.len()..];
        let close = after
            .find(BLANK_CLOSE)
            .ok_or(ClozeError::UnclosedBlank(offset + open))?;
        let answer = &after[..close];
        if answer.trim().is_empty() {
            return Err(ClozeError::EmptyBlank(offset + open));
        }
        segments.push(rest[..open].to_string());
        answers.push(answer.to_string());

        let consumed = open + BLANK_OPEN.len() + close + BLANK_CLOSE.len();
        offset += consumed;
        rest = &rest[consumed..];
    }
    segments.push(rest.to_string());
    Ok((segments, answers))
}

/// Builds cloze items from the template library or supplied templates.
#[derive(Debug, Clone, Default)]
pub struct ClozeEngine {
    config: ClozeConfig,
}

impl ClozeEngine {
    pub fn new(config: ClozeConfig) -> Self {
        Self { config }
    }

    /// Item for `label` at `specificity` from the built-in template library.
    pub fn build<R: Rng + ?Sized>(
        &self,
        label: &str,
        specificity: Specificity,
        rng: &mut R,
    ) -> Result<ClozeItem, ClozeError> {
        let template = templates::template_for(label, specificity);
        self.build_from_template(label, specificity, &template, rng)
    }

    /// Item from an externally supplied template.
    pub fn build_from_template<R: Rng + ?Sized>(
        &self,
        label: &str,
        specificity: Specificity,
        template: &str,
        rng: &mut R,
    ) -> Result<ClozeItem, ClozeError> {
        let mut item = ClozeItem::from_template(label, specificity, template)?;
        if item.blank_count() > MAX_BLANKS {
            return Err(ClozeError::TooManyBlanks(item.blank_count()));
        }
        item.bank = self.deal_bank(&item.answers, rng);
        debug!(
            label,
            specificity = specificity.level(),
            blanks = item.blank_count(),
            bank = item.bank.len(),
            "built cloze item"
        );
        Ok(item)
    }

    /// Answers plus up to `max_distractors` distractors, shuffled.
    fn deal_bank<R: Rng + ?Sized>(&self, answers: &[String], rng: &mut R) -> Vec<String> {
        let mut bank = answers.to_vec();
        if self.config.pad_bank && self.config.max_distractors > 0 {
            let taken: Vec<String> = answers.iter().map(|a| a.trim().to_lowercase()).collect();
            let extra = DISTRACTORS
                .iter()
                .filter(|d| !taken.contains(&d.to_string()))
                .choose_multiple(&mut *rng, self.config.max_distractors);
            bank.extend(extra.into_iter().map(|d| d.to_string()));
        }
        bank.shuffle(rng);
        bank
    }
}

/// Errors from cloze construction and interaction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClozeError {
    #[error("blank opened at byte {0} is never closed")]
    UnclosedBlank(usize),
    #[error("blank at byte {0} has no answer")]
    EmptyBlank(usize),
    #[error("template has {0} blanks, more than the allowed maximum")]
    TooManyBlanks(usize),
    #[error("blank {blank} out of range (item has {blanks})")]
    BlankOutOfRange { blank: usize, blanks: usize },
    #[error("token '{0}' is not in the bank or any blank")]
    TokenNotAvailable(String),
}
