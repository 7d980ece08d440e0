//! # Scenario: Focused Practice on Genetic Change
//!
//! **Actor**: Year 12 student revising Biology Module 6
//! **Goal**: Work both IQ1 dotpoints through the first-principles wizard
//!
//! Demonstrates:
//! - Bulk selection of an inquiry question
//! - Suggested weaknesses pre-filled from the answer
//! - Word-bank cloze with placements, grading and a low-rating retry
//! - Specific weaknesses with follow-up questions
//! - Progress records and session persistence through the field store
//!
//! Pass a config JSON path as the first argument to override defaults.

use anyhow::{bail, Context, Result};
use syllabuddy_core::app::AppState;
use syllabuddy_core::cloze::{ClozeItem, Specificity};
use syllabuddy_core::config::Config;
use syllabuddy_core::practice::{prompts, FpSession, PracticeEvent, PracticeOutcome, Stage};
use syllabuddy_core::selection::SelectionPath;
use syllabuddy_core::store::{keys, FieldStore, InMemoryStore, Navigator, Notice};
use syllabuddy_core::suggest::PlaceholderSuggester;
use tracing::info;
use tracing_subscriber::EnvFilter;

const MAX_STEPS: usize = 200;

fn sep(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("  {title}");
    println!("{}\n", "=".repeat(60));
}

#[derive(Default)]
struct ConsoleNavigator {
    route: String,
}

impl Navigator for ConsoleNavigator {
    fn navigate(&mut self, route: &str) {
        println!("  -> [{route}]");
        self.route = route.to_string();
    }

    fn notify(&mut self, notice: Notice) {
        match notice {
            Notice::Info(text) => println!("  (i) {text}"),
            Notice::Success(text) => println!("  (ok) {text}"),
            Notice::Warning(text) => println!("  (!) {text}"),
        }
    }
}

fn load_config() -> Result<Config> {
    match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("reading config {path}"))?;
            Ok(Config::from_json(&json)?)
        }
        None => {
            let mut config = Config::default();
            config.cloze.seed = Some(42);
            Ok(config)
        }
    }
}

fn init_tracing(default_filter: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();
}

fn render_cloze(item: &ClozeItem) -> String {
    let mut out = String::new();
    for (i, segment) in item.segments().iter().enumerate() {
        out.push_str(segment);
        if let Some(fill) = item.fills().get(i) {
            match fill {
                Some(token) => out.push_str(&format!("[{token}]")),
                None => out.push_str("[____]"),
            }
        }
    }
    out
}

/// The scripted learner: one action for whatever the wizard shows.
fn respond(session: &FpSession) -> Result<PracticeEvent> {
    let event = match session.stage {
        Stage::FpGeneralQ => {
            println!("  Q: {}", session.question);
            PracticeEvent::SubmitAnswer {
                answer: "Mutations change the DNA base sequence...".into(),
                rating: Some(5),
                skip_to_exam: false,
            }
        }
        Stage::WeakGeneral => {
            println!("  Suggested weaknesses: {}", session.report.weaknesses_text(';'));
            println!("  Suggested strengths:  {}", session.report.strengths_text(';'));
            let first = session
                .report
                .weaknesses
                .first()
                .map(String::as_str)
                .unwrap_or("definition gap");
            PracticeEvent::SubmitWeaknesses {
                weaknesses: format!("{first}; osmosis"),
                strengths: None,
            }
        }
        Stage::ClozeGeneral | Stage::ClozeSpecific => {
            let Some(item) = session.current_cloze.as_ref() else {
                bail!("cloze stage without an item");
            };
            // Fill every blank but the last, then submit.
            let open = item
                .fills()
                .iter()
                .take(item.blank_count().saturating_sub(1))
                .position(Option::is_none);
            match open {
                Some(blank) => PracticeEvent::PlaceToken {
                    blank,
                    token: item.answers()[blank].clone(),
                },
                None => {
                    println!("  Cloze ({}): {}", item.label, render_cloze(item));
                    PracticeEvent::SubmitCloze { fills: None }
                }
            }
        }
        Stage::ClozeReview => {
            if let Some(score) = session.last_score() {
                println!(
                    "  Score {}/{} ({:.0}% wrong)",
                    score.correct,
                    score.total,
                    score.percent_wrong()
                );
            }
            let first = session.general_index == 0;
            match (first, session.general_specificity) {
                (true, Specificity::General) => PracticeEvent::ContinueReview {
                    rating: Some(4),
                    specifics: String::new(),
                },
                (true, Specificity::Specific) => PracticeEvent::ContinueReview {
                    rating: Some(7),
                    specifics: "base substitution; reading frame".into(),
                },
                (false, _) => PracticeEvent::ContinueReview {
                    rating: Some(8),
                    specifics: String::new(),
                },
            }
        }
        Stage::WeakSpecific => {
            println!("  Specifics: {}", session.current_specifics().join("; "));
            PracticeEvent::ConfirmSpecifics { specifics: None }
        }
        Stage::FpSpecific => {
            if let Some([q1, q2]) = session.followups() {
                println!("  Q1: {q1}");
                println!("  Q2: {q2}");
            }
            PracticeEvent::SubmitAnswer {
                answer: "Specific answer".into(),
                rating: Some(6),
                skip_to_exam: false,
            }
        }
        Stage::FpMore => {
            for q in prompts::CONSOLIDATION {
                println!("  - {q}");
            }
            PracticeEvent::SubmitMore { rating: Some(8) }
        }
        Stage::Decision => PracticeEvent::NextDotpoint,
    };
    Ok(event)
}

fn main() -> Result<()> {
    let config = load_config()?;
    init_tracing(&config.logging.filter);

    println!("==========================================================");
    println!("  SCENARIO: Focused Practice");
    println!("  Biology / Module 6 / IQ1, two dotpoints");
    println!("==========================================================");

    let mut nav = ConsoleNavigator::default();
    let mut app = AppState::new(config, Box::new(PlaceholderSuggester::new()))?;

    sep("Select IQ1: Mutations");
    let iq = SelectionPath::InquiryQuestion(
        "Biology".into(),
        "Module 6: Genetic Change".into(),
        "IQ1: Mutations".into(),
    );
    app.toggle_at(&iq);
    for key in app.selection().iter() {
        println!("  * {key}");
    }

    sep("Run the wizard");
    app.begin_focused_practice(&mut nav)?;
    let mut steps = 0;
    loop {
        steps += 1;
        if steps > MAX_STEPS {
            bail!("wizard did not finish within {MAX_STEPS} steps");
        }
        let Some(session) = app.runner().and_then(|r| r.session()) else {
            bail!("practice stopped unexpectedly");
        };
        if session.stage == Stage::FpGeneralQ {
            println!("\n  == {} ==", session.active_dotpoint.dotpoint);
        }
        let event = respond(session)?;
        match app.handle_practice_event(event, &mut nav)? {
            PracticeOutcome::Finished => break,
            PracticeOutcome::At(_) => {}
            other => bail!("unexpected outcome {other:?}"),
        }
    }
    info!(steps, route = %nav.route, "wizard finished");

    sep("Progress");
    for record in app.practice_progress() {
        println!("  {:?}  {}", record.status, record.dotpoint);
    }

    sep("Persist session");
    let mut store = InMemoryStore::new();
    app.persist(&mut store)?;
    for key in store.keys() {
        println!("  {key}");
    }
    if let Some(practice) = store.get(keys::PRACTICE) {
        println!("\n{}", serde_json::to_string_pretty(&practice["progress"])?);
    }

    Ok(())
}
