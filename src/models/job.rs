use camino::{Utf8Path, Utf8PathBuf};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Tool family a saved document is routed to.
///
/// Families differ in how content travels to the external tool:
/// JS-like tools read stdin and write stdout, CSS-like tools take
/// input and output paths as arguments and write the file themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolFamily {
    Js,
    Css,
}

impl ToolFamily {
    /// Human-readable family label for logs and notifications
    pub fn label(&self) -> &'static str {
        match self {
            ToolFamily::Js => "JavaScript",
            ToolFamily::Css => "CSS",
        }
    }
}

/// One save-triggered minification attempt for a single file.
///
/// Created when a save is accepted for processing and discarded after the
/// result is reported. The output path is guaranteed to differ from the
/// input path before any subprocess is spawned.
#[derive(Debug, Clone)]
pub struct MinifyJob {
    pub input_path: Utf8PathBuf,
    pub output_path: Utf8PathBuf,
    pub original_size: u64,
    started: Instant,
}

impl MinifyJob {
    pub fn new(input_path: Utf8PathBuf, output_path: Utf8PathBuf, original_size: u64) -> Self {
        Self {
            input_path,
            output_path,
            original_size,
            started: Instant::now(),
        }
    }

    /// Wall-clock time since the job was accepted
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Captured result of one child process run.
///
/// Exit status 0 is the only success signal; non-zero is always an error
/// regardless of what landed on stdout. Streams are accumulated byte-exact
/// in arrival order.
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub exit_status: i32,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_status == 0
    }

    /// Lossy UTF-8 view of stderr for diagnostics and notifications
    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

/// Normalized error location extracted from a tool's raw error text.
///
/// Line and column are 0-based, taken directly as found in the raw text.
/// `kind` is best-effort and absent when the text carries no classifiable tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub line: usize,
    pub column: usize,
    pub message: String,
    pub kind: Option<String>,
}

/// Byte sizes before and after minification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Savings {
    pub original: u64,
    pub minified: u64,
}

impl Savings {
    /// Bytes saved; negative when the output grew
    pub fn saved_bytes(&self) -> i64 {
        self.original as i64 - self.minified as i64
    }

    /// Get a summary string of the size delta, e.g. "0.6 KB"
    pub fn format_saved(&self) -> String {
        let saved = self.saved_bytes();
        if saved <= 0 {
            "no size reduction".to_string()
        } else {
            format!("{:.1} KB", saved as f64 / 1000.0)
        }
    }
}

/// Why a save was skipped before any subprocess was spawned
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The input path could not be stat'ed (remote or inaccessible file)
    Unreachable,
    /// The computed output path would overwrite the input file
    OutputCollision,
}

impl SkipReason {
    pub fn describe(&self, path: &Utf8Path) -> String {
        match self {
            SkipReason::Unreachable => {
                format!("{path} is not locally accessible, skipped")
            }
            SkipReason::OutputCollision => {
                format!("output path for {path} would overwrite the source, skipped")
            }
        }
    }
}

/// Terminal failure categories for a job
///
/// `Write` is kept distinct from `Tool`: the tool itself succeeded but the
/// result was never committed to disk.
#[derive(Debug, Clone, Error)]
pub enum MinifyFailure {
    #[error("could not launch minifier: {message}")]
    Launch { message: String },

    #[error("minifier failed: {message}")]
    Tool {
        message: String,
        diagnostic: Option<Diagnostic>,
    },

    #[error("file is empty, nothing to minify")]
    EmptyInput,

    #[error("minifier produced no output")]
    EmptyOutput,

    #[error("could not write minified output: {message}")]
    Write { message: String },
}

impl MinifyFailure {
    /// Located diagnostic, when the raw tool text yielded one
    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            MinifyFailure::Tool { diagnostic, .. } => diagnostic.as_ref(),
            _ => None,
        }
    }
}

/// Outcome of one minification job
#[derive(Debug, Clone)]
pub enum MinifyOutcome {
    /// The tool ran and the output was committed. Savings are absent when a
    /// size query failed after the fact; the job still counts as a success.
    Minified {
        duration: Duration,
        savings: Option<Savings>,
    },
    Skipped(SkipReason),
    Failed(MinifyFailure),
}
