//! Command-line front end for the student records service.
//!
//! Executes the requests built by `student_core` with reqwest and renders
//! results as terminal tables. Configuration comes from flags, environment
//! and `~/.config/students/config.toml`.

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod executor;
pub mod logging;
pub mod render;

pub use api::StudentApi;
pub use config::{Config, ConfigError, Overrides};
pub use executor::ReqwestExecutor;
