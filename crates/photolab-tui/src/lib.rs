//! Photo Lab TUI Library
//!
//! Terminal front end that keeps the photo editor behind the PIN gate from
//! `photolab-auth`.

pub mod app;
pub mod ui;

pub use app::App;
