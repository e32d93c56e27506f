// Public API for integration tests and potential library usage

pub mod api;
pub mod config;
pub mod discovery;
pub mod geo;
pub mod prefs;
pub mod state;
pub mod types;
