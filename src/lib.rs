// minsave - Save-triggered minification pipeline for editor hosts
//
// This is the library crate containing the pipeline and the host-collaborator
// traits. The binary crate (main.rs) provides a headless dependency-check
// entry point; an embedding editor wires its own document, settings, and
// notification surfaces into the traits in `host` and forwards save events
// to `services::SaveDispatcher`.

pub mod config;
pub mod host;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use models::{MinifyOutcome, MinsaveConfig, PipelineConfig, ToolFamily, Toolchain};
pub use services::{DependencySnapshot, ProcessRunner, SaveDispatcher};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
