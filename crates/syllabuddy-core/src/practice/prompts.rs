//! Question text shown at each practice stage.

/// Fixed consolidation questions for `fp_more`.
pub const CONSOLIDATION: [&str; 2] = [
    "State two ‘gotchas’ in this area and how to avoid them.",
    "Write a one-minute explanation for a friend.",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SubjectFamily {
    Physical,
    Biology,
    Other,
}

fn family(subject: &str) -> SubjectFamily {
    match subject.trim().to_lowercase().as_str() {
        "physics" | "chemistry" => SubjectFamily::Physical,
        "biology" => SubjectFamily::Biology,
        _ => SubjectFamily::Other,
    }
}

/// Opening first-principles question for a dotpoint.
pub fn general_question(subject: &str, dotpoint: &str) -> String {
    match family(subject) {
        SubjectFamily::Physical => format!(
            "Starting from definitions and conservation laws, derive/explain the key relation \
             for “{dotpoint}”. State assumptions, show each step of reasoning, and discuss \
             limiting cases."
        ),
        SubjectFamily::Biology => format!(
            "Using first principles (structure→function), explain the mechanism behind \
             “{dotpoint}”, identify necessary conditions, and predict outcomes if a key \
             assumption is violated."
        ),
        SubjectFamily::Other => format!(
            "From first principles, explain and derive: “{dotpoint}”. Include assumptions and \
             edge cases."
        ),
    }
}

/// Two follow-up questions aimed at one specific weakness.
pub fn followup_questions(subject: &str, dotpoint: &str, weakness: &str) -> [String; 2] {
    match family(subject) {
        SubjectFamily::Physical => [
            format!(
                "From definitions, derive or justify the relationship most sensitive to \
                 '{weakness}' in “{dotpoint}”. State assumptions."
            ),
            format!(
                "Test '{weakness}' in an extreme case: predict behavior and explain each step \
                 causally."
            ),
        ],
        SubjectFamily::Biology => [
            format!(
                "Explain the mechanism in “{dotpoint}” where '{weakness}' plays a role. \
                 Identify structures and conditions."
            ),
            format!(
                "Predict an outcome if '{weakness}' is violated or removed, and justify \
                 physiologically."
            ),
        ],
        SubjectFamily::Other => [
            format!("Derive or justify the principle connected to '{weakness}' in “{dotpoint}”."),
            format!(
                "Provide a boundary-case analysis focused on '{weakness}' and explain \
                 implications."
            ),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_general_question_by_subject() {
        assert!(general_question("Chemistry", "Relate Kc to Q").starts_with("Starting from"));
        assert!(general_question(" physics ", "x").contains("conservation laws"));
        assert!(general_question("Biology", "PCR").contains("structure→function"));
        let other = general_question("Maths", "vectors");
        assert!(other.starts_with("From first principles"));
        assert!(other.contains("“vectors”"));
    }

    #[test]
    fn test_followups_name_the_weakness() {
        for subject in ["Physics", "Biology", "English"] {
            let qs = followup_questions(subject, "dp", "osmosis");
            assert!(qs.iter().all(|q| q.contains("'osmosis'")));
        }
    }
}
