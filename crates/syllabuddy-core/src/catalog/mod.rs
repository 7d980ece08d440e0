//! Syllabus catalog: Subject → Module → Inquiry Question → Dotpoint.
//!
//! The syllabus document is a nested JSON object
//! `{ subject: { module: { inquiry_question: [dotpoint, ...] } } }`.
//! Key order in the document is preserved throughout.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::selection::{DotpointKey, SelectionPath};

/// An inquiry question with its dotpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InquiryNode {
    pub name: String,
    pub dotpoints: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleNode {
    pub name: String,
    pub inquiry_questions: Vec<InquiryNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectNode {
    pub name: String,
    pub modules: Vec<ModuleNode>,
}

/// The nested syllabus exactly as loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Syllabus {
    pub subjects: Vec<SubjectNode>,
}

impl Syllabus {
    /// Parse the nested JSON document.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| CatalogError::Parse(e.to_string()))?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Self, CatalogError> {
        let root = value
            .as_object()
            .ok_or_else(|| CatalogError::Malformed("root must be an object of subjects".into()))?;

        let mut subjects = Vec::with_capacity(root.len());
        for (subject, modules) in root {
            let modules = modules.as_object().ok_or_else(|| {
                CatalogError::Malformed(format!("subject '{subject}' must map to an object"))
            })?;

            let mut module_nodes = Vec::with_capacity(modules.len());
            for (module, iqs) in modules {
                let iqs = iqs.as_object().ok_or_else(|| {
                    CatalogError::Malformed(format!(
                        "module '{subject}/{module}' must map to an object"
                    ))
                })?;

                let mut iq_nodes = Vec::with_capacity(iqs.len());
                for (iq, dotpoints) in iqs {
                    let list = dotpoints.as_array().ok_or_else(|| {
                        CatalogError::Malformed(format!(
                            "inquiry question '{subject}/{module}/{iq}' must map to an array"
                        ))
                    })?;
                    let dotpoints = list
                        .iter()
                        .map(|dp| {
                            dp.as_str().map(str::to_string).ok_or_else(|| {
                                CatalogError::Malformed(format!(
                                    "dotpoint under '{subject}/{module}/{iq}' must be a string"
                                ))
                            })
                        })
                        .collect::<Result<Vec<_>, _>>()?;
                    iq_nodes.push(InquiryNode {
                        name: iq.clone(),
                        dotpoints,
                    });
                }

                module_nodes.push(ModuleNode {
                    name: module.clone(),
                    inquiry_questions: iq_nodes,
                });
            }

            subjects.push(SubjectNode {
                name: subject.clone(),
                modules: module_nodes,
            });
        }

        Ok(Self { subjects })
    }

    /// Small catalog used when no syllabus file is available.
    pub fn builtin() -> Self {
        fn iq(name: &str, dotpoints: &[&str]) -> InquiryNode {
            InquiryNode {
                name: name.to_string(),
                dotpoints: dotpoints.iter().map(|d| d.to_string()).collect(),
            }
        }

        Self {
            subjects: vec![
                SubjectNode {
                    name: "Biology".to_string(),
                    modules: vec![ModuleNode {
                        name: "Module 6: Genetic Change".to_string(),
                        inquiry_questions: vec![
                            iq(
                                "IQ1: Mutations",
                                &[
                                    "Describe point vs frameshift mutations",
                                    "Explain mutagens and mutation rates",
                                ],
                            ),
                            iq(
                                "IQ2: Biotechnology",
                                &[
                                    "Outline PCR steps and applications",
                                    "Summarise CRISPR-Cas9 mechanism",
                                ],
                            ),
                        ],
                    }],
                },
                SubjectNode {
                    name: "Chemistry".to_string(),
                    modules: vec![ModuleNode {
                        name: "Module 5: Equilibrium".to_string(),
                        inquiry_questions: vec![iq(
                            "IQ1: Le Chatelier",
                            &[
                                "Predict shifts for concentration, pressure, temperature changes",
                                "Relate Kc to reaction quotient Q",
                            ],
                        )],
                    }],
                },
            ],
        }
    }
}

/// Read a syllabus file.
pub fn load(path: &Path) -> Result<Syllabus, CatalogError> {
    let data = fs::read_to_string(path)
        .map_err(|e| CatalogError::Io(format!("{}: {e}", path.display())))?;
    let syllabus = Syllabus::from_json(&data)?;
    debug!(path = %path.display(), subjects = syllabus.subjects.len(), "loaded syllabus");
    Ok(syllabus)
}

/// Load the syllabus at `path`, falling back to [`Syllabus::builtin`] when the
/// path is unset, missing, unreadable or malformed.
pub fn load_or_fallback(path: Option<&Path>) -> Syllabus {
    let Some(path) = path else {
        info!("no syllabus path configured, using built-in catalog");
        return Syllabus::builtin();
    };
    if !path.exists() {
        info!(path = %path.display(), "syllabus file not found, using built-in catalog");
        return Syllabus::builtin();
    }
    match load(path) {
        Ok(syllabus) => syllabus,
        Err(e) => {
            warn!(error = %e, "syllabus could not be loaded, using built-in catalog");
            Syllabus::builtin()
        }
    }
}

/// Flattened lookup tables over a [`Syllabus`].
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    subjects: Vec<String>,
    modules_by_subject: HashMap<String, Vec<String>>,
    iqs_by_subject_module: HashMap<(String, String), Vec<String>>,
    dotpoints_by_smi: HashMap<(String, String, String), Vec<String>>,
}

impl Catalog {
    /// Flatten a nested syllabus into lookup tables.
    pub fn explode(syllabus: &Syllabus) -> Self {
        let mut catalog = Catalog::default();
        for subject in &syllabus.subjects {
            catalog.subjects.push(subject.name.clone());
            let modules = catalog
                .modules_by_subject
                .entry(subject.name.clone())
                .or_default();
            for module in &subject.modules {
                modules.push(module.name.clone());
                let iqs = catalog
                    .iqs_by_subject_module
                    .entry((subject.name.clone(), module.name.clone()))
                    .or_default();
                for iq in &module.inquiry_questions {
                    iqs.push(iq.name.clone());
                    catalog
                        .dotpoints_by_smi
                        .entry((subject.name.clone(), module.name.clone(), iq.name.clone()))
                        .or_default()
                        .extend(iq.dotpoints.iter().cloned());
                }
            }
        }
        catalog
    }

    pub fn subjects(&self) -> &[String] {
        &self.subjects
    }

    pub fn modules(&self, subject: &str) -> &[String] {
        self.modules_by_subject
            .get(subject)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn inquiry_questions(&self, subject: &str, module: &str) -> &[String] {
        self.iqs_by_subject_module
            .get(&(subject.to_string(), module.to_string()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn dotpoints(&self, subject: &str, module: &str, iq: &str) -> &[String] {
        self.dotpoints_by_smi
            .get(&(subject.to_string(), module.to_string(), iq.to_string()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether the path names something in the catalog.
    pub fn contains_path(&self, path: &SelectionPath) -> bool {
        match path {
            SelectionPath::Subject(s) => self.modules_by_subject.contains_key(s),
            SelectionPath::Module(s, m) => self
                .iqs_by_subject_module
                .contains_key(&(s.clone(), m.clone())),
            SelectionPath::InquiryQuestion(s, m, iq) => self
                .dotpoints_by_smi
                .contains_key(&(s.clone(), m.clone(), iq.clone())),
        }
    }

    /// Every dotpoint under `path`, in catalog order.
    pub fn keys_under(&self, path: &SelectionPath) -> Vec<DotpointKey> {
        let mut keys = Vec::new();
        match path {
            SelectionPath::Subject(s) => {
                for m in self.modules(s) {
                    keys.extend(self.keys_under(&SelectionPath::Module(s.clone(), m.clone())));
                }
            }
            SelectionPath::Module(s, m) => {
                for iq in self.inquiry_questions(s, m) {
                    keys.extend(self.keys_under(&SelectionPath::InquiryQuestion(
                        s.clone(),
                        m.clone(),
                        iq.clone(),
                    )));
                }
            }
            SelectionPath::InquiryQuestion(s, m, iq) => {
                for dp in self.dotpoints(s, m, iq) {
                    keys.push(DotpointKey::new(s, m, iq, dp));
                }
            }
        }
        keys
    }

    /// Every dotpoint in the catalog, in catalog order.
    pub fn all_keys(&self) -> Vec<DotpointKey> {
        self.subjects
            .iter()
            .flat_map(|s| self.keys_under(&SelectionPath::Subject(s.clone())))
            .collect()
    }

    pub fn dotpoint_count(&self) -> usize {
        self.dotpoints_by_smi.values().map(Vec::len).sum()
    }
}

/// Errors from catalog loading.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read syllabus: {0}")]
    Io(String),
    #[error("failed to parse syllabus: {0}")]
    Parse(String),
    #[error("malformed syllabus: {0}")]
    Malformed(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "Physics": {
            "Module 5: Motion": {
                "IQ2": ["Projectile motion", "Circular motion"],
                "IQ1": ["Newton's laws"]
            }
        },
        "Biology": {
            "Module 6": {
                "IQ1": ["Describe X", "Explain Y"]
            }
        }
    }"#;

    #[test]
    fn test_syllabus_preserves_document_order() {
        let syllabus = Syllabus::from_json(SAMPLE).unwrap();
        let names: Vec<&str> = syllabus.subjects.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Physics", "Biology"]);
        let iqs: Vec<&str> = syllabus.subjects[0].modules[0]
            .inquiry_questions
            .iter()
            .map(|iq| iq.name.as_str())
            .collect();
        assert_eq!(iqs, vec!["IQ2", "IQ1"]);
    }

    #[test]
    fn test_explode_lookup_tables() {
        let catalog = Catalog::explode(&Syllabus::from_json(SAMPLE).unwrap());
        assert_eq!(catalog.subjects(), &["Physics".to_string(), "Biology".to_string()]);
        assert_eq!(catalog.modules("Biology"), &["Module 6".to_string()]);
        assert_eq!(catalog.inquiry_questions("Physics", "Module 5: Motion").len(), 2);
        assert_eq!(
            catalog.dotpoints("Biology", "Module 6", "IQ1"),
            &["Describe X".to_string(), "Explain Y".to_string()]
        );
        assert_eq!(catalog.dotpoint_count(), 5);
    }

    #[test]
    fn test_unknown_paths_are_empty() {
        let catalog = Catalog::explode(&Syllabus::from_json(SAMPLE).unwrap());
        assert!(catalog.modules("Chemistry").is_empty());
        assert!(catalog.inquiry_questions("Biology", "Module 9").is_empty());
        assert!(catalog.dotpoints("Biology", "Module 6", "IQ7").is_empty());
        assert!(!catalog.contains_path(&SelectionPath::Subject("Chemistry".into())));
        assert!(catalog.keys_under(&SelectionPath::Subject("Chemistry".into())).is_empty());
    }

    #[test]
    fn test_keys_under_subject_in_catalog_order() {
        let catalog = Catalog::explode(&Syllabus::from_json(SAMPLE).unwrap());
        let keys = catalog.keys_under(&SelectionPath::Subject("Physics".into()));
        let texts: Vec<&str> = keys.iter().map(|k| k.dotpoint.as_str()).collect();
        assert_eq!(texts, vec!["Projectile motion", "Circular motion", "Newton's laws"]);
        assert_eq!(catalog.all_keys().len(), 5);
    }

    #[test]
    fn test_malformed_dotpoint_list() {
        let json = r#"{"Biology": {"Module 6": {"IQ1": "not a list"}}}"#;
        let err = Syllabus::from_json(json).unwrap_err();
        assert!(matches!(err, CatalogError::Malformed(_)));
        assert!(err.to_string().contains("Biology/Module 6/IQ1"));
    }

    #[test]
    fn test_malformed_root() {
        assert!(matches!(
            Syllabus::from_json("[1, 2]").unwrap_err(),
            CatalogError::Malformed(_)
        ));
        assert!(matches!(
            Syllabus::from_json("{ nope").unwrap_err(),
            CatalogError::Parse(_)
        ));
    }

    #[test]
    fn test_non_string_dotpoint_is_rejected() {
        let json = r#"{"Biology": {"Module 6": {"IQ1": ["ok", 3]}}}"#;
        assert!(matches!(
            Syllabus::from_json(json).unwrap_err(),
            CatalogError::Malformed(_)
        ));
    }

    #[test]
    fn test_builtin_catalog_shape() {
        let catalog = Catalog::explode(&Syllabus::builtin());
        assert_eq!(catalog.subjects().len(), 2);
        assert_eq!(catalog.modules("Biology").len(), 1);
        assert_eq!(catalog.modules("Chemistry").len(), 1);
        assert_eq!(catalog.dotpoint_count(), 6);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let syllabus = load(file.path()).unwrap();
        assert_eq!(syllabus.subjects.len(), 2);
    }

    #[test]
    fn test_load_or_fallback_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let syllabus = load_or_fallback(Some(&dir.path().join("syllabus.json")));
        assert_eq!(syllabus, Syllabus::builtin());
    }

    #[test]
    fn test_load_or_fallback_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{\"Biology\": 4}").unwrap();
        assert_eq!(load_or_fallback(Some(file.path())), Syllabus::builtin());
    }

    #[test]
    fn test_load_or_fallback_no_path() {
        assert_eq!(load_or_fallback(None), Syllabus::builtin());
    }

    #[test]
    fn test_load_unreadable_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, CatalogError::Io(_)));
    }
}
