use super::Specificity;

const TRANSPORT_KEYWORDS: &[&str] = &[
    "diffusion",
    "osmosis",
    "membrane",
    "transport",
    "concentration",
];

const TRANSPORT_GENERAL: &str = "{topic} is the net movement of particles from \
[[higher concentration]] to [[lower concentration]] down a [[concentration gradient]]. \
The rate increases with [[temperature]] and decreases with larger [[molecular size]]. \
Small nonpolar molecules cross the [[phospholipid bilayer]] directly.";

const TRANSPORT_SPECIFIC: &str = "Facilitated {topic} employs [[membrane proteins]] such as \
[[channel proteins]] or [[carrier proteins]] to move solutes down a [[concentration gradient]] \
without [[ATP hydrolysis]]. Saturation arises when all [[binding sites]] are occupied.";

const STUDY_GENERAL: &str = "{topic} is about [[understanding]] the [[core ideas]]. \
A useful strategy is to [[recall]], [[apply]], then [[reflect]].";

const STUDY_SPECIFIC: &str = "{topic} often requires [[stepwise]] [[reasoning]] using \
[[definitions]] and [[laws]]. Start by [[identifying]] variables, then [[relate]] them.";

/// Weakness labels are free text; keep them from opening or closing blanks.
pub(crate) fn sanitize_label(label: &str) -> String {
    let cleaned: String = label.chars().filter(|c| *c != '[' && *c != ']').collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        "this topic".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Pick the library template for a weakness and fill in its label.
pub(crate) fn template_for(label: &str, specificity: Specificity) -> String {
    let topic = sanitize_label(label);
    let lower = topic.to_lowercase();
    let transport = TRANSPORT_KEYWORDS.iter().any(|kw| lower.contains(kw));

    let template = match (transport, specificity) {
        (true, Specificity::General) => TRANSPORT_GENERAL,
        (true, Specificity::Specific) => TRANSPORT_SPECIFIC,
        (false, Specificity::General) => STUDY_GENERAL,
        (false, Specificity::Specific) => STUDY_SPECIFIC,
    };
    template.replace("{topic}", &topic)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloze::{parse_template, MAX_BLANKS};

    #[test]
    fn test_every_template_parses_within_blank_limit() {
        for label in ["osmosis", "vectors"] {
            for spec in [Specificity::General, Specificity::Specific] {
                let (segments, answers) = parse_template(&template_for(label, spec)).unwrap();
                assert!(!answers.is_empty());
                assert!(answers.len() <= MAX_BLANKS);
                assert_eq!(segments.len(), answers.len() + 1);
            }
        }
    }

    #[test]
    fn test_label_is_sanitized() {
        assert_eq!(sanitize_label("  [[osmosis]] "), "osmosis");
        assert_eq!(sanitize_label("   "), "this topic");
        let text = template_for("[[tricky", Specificity::General);
        assert!(text.starts_with("tricky is about"));
    }

    #[test]
    fn test_transport_keywords_select_topic_template() {
        assert!(template_for("Osmosis", Specificity::General).contains("[[concentration gradient]]"));
        assert!(template_for("equilibrium Kc", Specificity::General).contains("[[recall]]"));
        assert!(template_for("membrane transport", Specificity::Specific)
            .contains("[[carrier proteins]]"));
    }
}
