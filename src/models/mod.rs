//! Data models for the minsave pipeline.
//!
//! This module contains the data structures shared across the crate:
//! - [`MinifyJob`] / [`MinifyOutcome`]: one save-triggered attempt and its terminal result
//! - [`ProcessOutput`]: captured exit status and accumulated streams of a child process
//! - [`Diagnostic`]: normalized error location extracted from raw tool output
//! - [`MinsaveConfig`]: YAML-backed settings shape behind [`ConfigManager`](crate::config::ConfigManager)
//! - [`PipelineConfig`] / [`Toolchain`]: per-save and startup views assembled from the settings store
//!
//! # Architecture Note
//!
//! Jobs and their outcomes are transient values, created per save and dropped
//! once reported. The only long-lived model is the dependency snapshot built
//! at startup (see [`crate::services::probe`]); nothing here is globally
//! mutable.

pub mod config;
pub mod job;

pub use config::{MinsaveConfig, PipelineConfig, Toolchain};
pub use job::{
    Diagnostic, MinifyFailure, MinifyJob, MinifyOutcome, ProcessOutput, Savings, SkipReason,
    ToolFamily,
};
