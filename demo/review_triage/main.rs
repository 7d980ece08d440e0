//! # Scenario: Cram Review and AI Suggestions
//!
//! **Actor**: Student narrowing a cram list before an exam
//! **Goal**: Select broadly, triage the list, then add AI-suggested dotpoints
//!
//! Demonstrates:
//! - Subject/module/IQ bulk toggles and partial coverage
//! - Kept/removed cards keyed by content, with a live tally
//! - Replace (cram) vs merge (AI) apply modes
//! - The empty-selection warning
//!
//! Pass a config JSON path as the first argument to override defaults.

use anyhow::{Context, Result};
use syllabuddy_core::app::{AppError, AppState};
use syllabuddy_core::config::Config;
use syllabuddy_core::review::{ReviewBoard, ReviewRoute};
use syllabuddy_core::selection::SelectionPath;
use syllabuddy_core::store::{Navigator, Notice};
use syllabuddy_core::suggest::PlaceholderSuggester;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn sep(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("  {title}");
    println!("{}\n", "=".repeat(60));
}

#[derive(Default)]
struct ConsoleNavigator;

impl Navigator for ConsoleNavigator {
    fn navigate(&mut self, route: &str) {
        println!("  -> [{route}]");
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
        None => Ok(Config::default()),
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

fn print_board(board: &ReviewBoard) {
    for card in board.cards() {
        let mark = if card.removed { "REMOVED" } else { "kept   " };
        println!("  [{mark}] {}  {}", card.stable_key, card.item);
    }
    let tally = board.tally();
    println!("  Kept: {}   |   Removed: {}", tally.kept, tally.removed);
}

fn print_selection(app: &AppState) {
    println!("  Selection ({}):", app.selection().len());
    for key in app.selection().iter() {
        println!("    * {key}");
    }
}

fn main() -> Result<()> {
    let config = load_config()?;
    init_tracing(&config.logging.filter);

    println!("==========================================================");
    println!("  SCENARIO: Review & Triage");
    println!("==========================================================");

    let mut nav = ConsoleNavigator;
    let mut app = AppState::new(config, Box::new(PlaceholderSuggester::new()))?;

    sep("Empty selection guard");
    match app.begin_review(ReviewRoute::Cram, &mut nav) {
        Err(AppError::EmptySelection) => println!("  Review refused: nothing selected"),
        other => println!("  Unexpected: {:?}", other.map(|b| b.tally())),
    }

    sep("Select all of Biology, then drop IQ2");
    let biology = SelectionPath::Subject("Biology".into());
    let iq2 = SelectionPath::InquiryQuestion(
        "Biology".into(),
        "Module 6: Genetic Change".into(),
        "IQ2: Biotechnology".into(),
    );
    app.toggle(&biology, true);
    println!("  Biology coverage: {:?}", app.selection().coverage_at(app.catalog(), &biology));
    app.toggle(&iq2, false);
    println!("  Biology coverage: {:?}", app.selection().coverage_at(app.catalog(), &biology));
    println!("  Biology shows selected: {}", app.selection().is_selected_at(&biology));
    print_selection(&app);

    sep("Cram review: remove one card and submit");
    let board = app.begin_review(ReviewRoute::Cram, &mut nav)?;
    print_board(board);
    let drop_key = board
        .cards()
        .last()
        .map(|c| c.stable_key.clone())
        .context("cram board has no cards")?;
    app.toggle_card(ReviewRoute::Cram, &drop_key)?;
    if let Some(board) = app.board(ReviewRoute::Cram) {
        print_board(board);
    }
    app.apply_review(ReviewRoute::Cram, true, &mut nav)?;
    print_selection(&app);

    sep("AI selection: keep only Chemistry suggestions");
    let board = app.begin_ai_review("equilibrium; reaction quotient", &mut nav)?;
    let to_remove: Vec<String> = board
        .cards()
        .into_iter()
        .filter(|c| c.item.subject != "Chemistry")
        .map(|c| c.stable_key)
        .collect();
    for key in &to_remove {
        app.toggle_card(ReviewRoute::Ai, key)?;
    }
    if let Some(board) = app.board(ReviewRoute::Ai) {
        print_board(board);
    }
    app.apply_review(ReviewRoute::Ai, true, &mut nav)?;
    print_selection(&app);

    info!(selected = app.selection().len(), "scenario complete");
    Ok(())
}
