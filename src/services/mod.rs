//! Services module - Core pipeline logic for save-triggered minification.
//!
//! This module contains everything between a save event and a reported
//! outcome. The services are **host-agnostic**: the editor's document model,
//! settings store, and notification UI only appear as the traits in
//! [`crate::host`], making every piece testable without an editor.
//!
//! # Components
//!
//! - [`ProcessRunner`]: spawns one external tool per job, streams optional
//!   input to its stdin, and accumulates stdout/stderr until exit. Reports
//!   faithfully; spawn failure is distinguishable from a non-zero exit.
//!
//! - [`DependencySnapshot`]: startup-time availability probe of the runtime
//!   and both minifier entry points, immutable for the life of the process.
//!
//! - [`DiagnosticExtractor`]: normalizes the two tool families' raw error
//!   text into `{line, column, message, kind}` via named regex rules.
//!
//! - [`MinifyPipeline`]: per-job orchestration parameterized by a
//!   [`ToolProfile`] - path validation, stream-mode or file-path-mode
//!   invocation, persistence, size and timing measurement.
//!
//! - [`SaveDispatcher`]: routes save events by content type, applies fresh
//!   per-family configuration, and reports outcomes without ever letting a
//!   fault escape into the host's save handling.
//!
//! # Tool contract
//!
//! Both minifiers are invoked through the configured runtime:
//! 1. JS family: `<runtime> <minifier> --compress --mangle`, source on
//!    stdin, minified output on stdout
//! 2. CSS family: `<runtime> <minifier> --minify <input> -o <output>`, the
//!    tool writes the output file itself
//!
//! Exit status 0 is the only success signal either way.

pub mod diagnostics;
pub mod dispatch;
pub mod pipeline;
pub mod probe;
pub mod process;

pub use diagnostics::DiagnosticExtractor;
pub use dispatch::SaveDispatcher;
pub use pipeline::{InvocationMode, MinifyPipeline, ToolProfile, output_path};
pub use probe::{DependencySnapshot, ToolStatus, probe};
pub use process::{ProcessError, ProcessRunner};
