//! Study-flow engine behind Syllabuddy.
//!
//! The crate holds no UI. Presentation layers drive it through
//! [`app::AppState`] and supply the collaborators in [`store`]: a keyed field
//! store for session values and a navigator that switches the active route.

pub mod app;
pub mod catalog;
pub mod cloze;
pub mod config;
pub mod practice;
pub mod review;
pub mod selection;
pub mod store;
pub mod suggest;
