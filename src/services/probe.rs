//! Startup dependency probing.
//!
//! Each external tool is probed exactly once with a version-style invocation
//! and the answers are frozen into a [`DependencySnapshot`] that every later
//! job consults read-only. There are no mutable availability flags anywhere;
//! a tool installed mid-session is picked up on the next startup.

use crate::host::{Notice, Notifier};
use crate::models::{Toolchain, ToolFamily};
use crate::services::process::ProcessRunner;
use camino::Utf8Path;
use indexmap::IndexMap;

/// Presence and reported version of one external tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolStatus {
    pub available: bool,
    pub version: Option<String>,
}

impl ToolStatus {
    fn missing() -> Self {
        Self {
            available: false,
            version: None,
        }
    }
}

/// Probe one tool with a version-check invocation.
///
/// Exit status 0 means available, with the trimmed standard output as the
/// version text. A spawn failure or non-zero exit both mean unavailable;
/// the caller cannot tell the two apart and does not need to.
pub async fn probe(runner: &ProcessRunner, command: &Utf8Path, args: &[String]) -> ToolStatus {
    match runner.run(command, args, None).await {
        Ok(output) if output.success() => {
            let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
            tracing::debug!("{} is available ({})", command, version);
            ToolStatus {
                available: true,
                version: Some(version),
            }
        }
        Ok(output) => {
            tracing::warn!(
                "{} exited with status {} during version probe",
                command,
                output.exit_status
            );
            ToolStatus::missing()
        }
        Err(e) => {
            tracing::warn!("{} could not be probed: {}", command, e);
            ToolStatus::missing()
        }
    }
}

/// Immutable availability snapshot, built once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencySnapshot {
    pub runtime: ToolStatus,
    pub js_minifier: ToolStatus,
    pub css_minifier: ToolStatus,
}

impl DependencySnapshot {
    /// Probe the runtime and both minifier entry points.
    ///
    /// Minifier scripts are invoked through the runtime, matching how the
    /// pipeline will call them later.
    pub async fn detect(runner: &ProcessRunner, toolchain: &Toolchain) -> Self {
        let version_arg = "--version".to_string();

        let runtime = probe(runner, &toolchain.runtime, std::slice::from_ref(&version_arg)).await;

        let js_args = vec![toolchain.js_minifier.to_string(), version_arg.clone()];
        let js_minifier = probe(runner, &toolchain.runtime, &js_args).await;

        let css_args = vec![toolchain.css_minifier.to_string(), version_arg];
        let css_minifier = probe(runner, &toolchain.runtime, &css_args).await;

        let snapshot = Self {
            runtime,
            js_minifier,
            css_minifier,
        };

        tracing::info!(
            "Dependency probe - runtime: {}, js: {}, css: {}",
            snapshot.runtime.available,
            snapshot.js_minifier.available,
            snapshot.css_minifier.available
        );

        snapshot
    }

    /// Whether a family's full tool stack is present
    pub fn family_available(&self, family: ToolFamily) -> bool {
        self.runtime.available
            && match family {
                ToolFamily::Js => self.js_minifier.available,
                ToolFamily::Css => self.css_minifier.available,
            }
    }

    pub fn fully_available(&self) -> bool {
        self.runtime.available && self.js_minifier.available && self.css_minifier.available
    }

    /// Emit one persistent notification per missing tool.
    ///
    /// Hints are keyed by the tool's file stem (e.g. `terser`) and become the
    /// notification's single action link. Returns how many tools are missing.
    pub fn report_missing(
        &self,
        toolchain: &Toolchain,
        notifier: &dyn Notifier,
        hints: &IndexMap<String, String>,
    ) -> usize {
        let mut missing = 0;

        let checks: [(&ToolStatus, &Utf8Path, &str); 3] = [
            (&self.runtime, &toolchain.runtime, "minification"),
            (&self.js_minifier, &toolchain.js_minifier, "JavaScript minification"),
            (&self.css_minifier, &toolchain.css_minifier, "CSS minification"),
        ];

        for (status, path, feature) in checks {
            if status.available {
                continue;
            }
            missing += 1;

            let name = path.file_stem().unwrap_or(path.as_str());
            let mut notice = Notice::new(format!(
                "{name} was not found; {feature} on save is disabled"
            ))
            .with_title("Missing dependency");

            if let Some(url) = hints.get(name) {
                notice = notice.with_action("Install", url);
            }

            notifier.notify(notice);
        }

        missing
    }
}
