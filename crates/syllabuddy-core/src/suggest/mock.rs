use std::cell::RefCell;

use super::*;

/// A mock suggester for testing. Replies are consumed in order; an empty
/// queue is an error.
pub struct MockSuggester {
    name: String,
    reports: RefCell<Vec<WeaknessReport>>,
    dotpoints: RefCell<Vec<Vec<DotpointKey>>>,
    templates: RefCell<Vec<Option<String>>>,
}

impl MockSuggester {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reports: RefCell::new(Vec::new()),
            dotpoints: RefCell::new(Vec::new()),
            templates: RefCell::new(Vec::new()),
        }
    }

    pub fn with_report(self, report: WeaknessReport) -> Self {
        self.reports.borrow_mut().push(report);
        self
    }

    pub fn with_dotpoints(self, keys: Vec<DotpointKey>) -> Self {
        self.dotpoints.borrow_mut().push(keys);
        self
    }

    pub fn with_template(self, template: impl Into<String>) -> Self {
        self.templates.borrow_mut().push(Some(template.into()));
        self
    }

    pub fn remaining_reports(&self) -> usize {
        self.reports.borrow().len()
    }
}

impl Suggester for MockSuggester {
    fn name(&self) -> &str {
        &self.name
    }

    fn weakness_report(
        &self,
        _dotpoint: &DotpointKey,
        _answer: &str,
    ) -> Result<WeaknessReport, SuggestError> {
        let mut reports = self.reports.borrow_mut();
        if reports.is_empty() {
            return Err(SuggestError::RequestFailed(
                "no mock reports remaining".to_string(),
            ));
        }
        Ok(reports.remove(0))
    }

    fn suggest_dotpoints(
        &self,
        _catalog: &Catalog,
        _weaknesses: &str,
        limit: usize,
    ) -> Result<Vec<DotpointKey>, SuggestError> {
        let mut queued = self.dotpoints.borrow_mut();
        if queued.is_empty() {
            return Err(SuggestError::RequestFailed(
                "no mock dotpoints remaining".to_string(),
            ));
        }
        let mut keys = queued.remove(0);
        keys.truncate(limit);
        Ok(keys)
    }

    /// Falls back to the template library once the queue is empty.
    fn cloze_template(
        &self,
        _label: &str,
        _specificity: Specificity,
    ) -> Result<Option<String>, SuggestError> {
        let mut templates = self.templates.borrow_mut();
        if templates.is_empty() {
            return Ok(None);
        }
        Ok(templates.remove(0))
    }
}
