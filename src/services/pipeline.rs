use crate::host::HostFs;
use crate::models::{
    MinifyFailure, MinifyJob, MinifyOutcome, PipelineConfig, Savings, SkipReason, ToolFamily,
    Toolchain,
};
use crate::services::diagnostics::DiagnosticExtractor;
use crate::services::process::ProcessRunner;
use camino::{Utf8Path, Utf8PathBuf};
use std::sync::Arc;

/// How content travels between the pipeline and the external tool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationMode {
    /// Content via the child's stdin, minified result from its stdout;
    /// the pipeline persists the output itself
    Stream,
    /// Input and output paths as command arguments; the tool writes the
    /// output file directly
    FilePath,
}

/// Invocation descriptor for one tool family.
///
/// The same pipeline flow serves both families; everything family-specific
/// (invoker, entry point, argument template, transport) lives here.
#[derive(Debug, Clone)]
pub struct ToolProfile {
    pub family: ToolFamily,
    pub runtime: Utf8PathBuf,
    pub script: Utf8PathBuf,
    pub mode: InvocationMode,
}

impl ToolProfile {
    pub fn js(toolchain: &Toolchain) -> Self {
        Self {
            family: ToolFamily::Js,
            runtime: toolchain.runtime.clone(),
            script: toolchain.js_minifier.clone(),
            mode: InvocationMode::Stream,
        }
    }

    pub fn css(toolchain: &Toolchain) -> Self {
        Self {
            family: ToolFamily::Css,
            runtime: toolchain.runtime.clone(),
            script: toolchain.css_minifier.clone(),
            mode: InvocationMode::FilePath,
        }
    }

    /// Build the argument list for one job
    fn arguments(&self, input: &Utf8Path, output: &Utf8Path) -> Vec<String> {
        match self.mode {
            InvocationMode::Stream => vec![
                self.script.to_string(),
                "--compress".to_string(),
                "--mangle".to_string(),
            ],
            InvocationMode::FilePath => vec![
                self.script.to_string(),
                "--minify".to_string(),
                input.to_string(),
                "-o".to_string(),
                output.to_string(),
            ],
        }
    }
}

/// Compute the sibling output path by replacing the input's final extension
/// with the configured suffix (`app.js` + `.min.js` -> `app.min.js`).
pub fn output_path(input: &Utf8Path, suffix: &str) -> Utf8PathBuf {
    let stripped = if input.extension().is_some() {
        input.with_extension("")
    } else {
        input.to_path_buf()
    };
    Utf8PathBuf::from(format!("{stripped}{suffix}"))
}

/// Per-save orchestration: validate the path, invoke the tool, persist and
/// measure, or normalize the failure.
///
/// One parameterized flow covers both tool families; the
/// [`ToolProfile`] decides transport and arguments. All filesystem access
/// goes through the host facade, and nothing here ever panics a save.
pub struct MinifyPipeline {
    fs: Arc<dyn HostFs>,
    runner: ProcessRunner,
    extractor: DiagnosticExtractor,
}

impl MinifyPipeline {
    pub fn new(fs: Arc<dyn HostFs>) -> Self {
        Self {
            fs,
            runner: ProcessRunner::new(),
            extractor: DiagnosticExtractor::new(),
        }
    }

    /// Run one job to a terminal outcome.
    ///
    /// `content` is the saved document text when the host has it in memory;
    /// stream-mode jobs fall back to reading the input path through the
    /// filesystem facade when it is absent. File-path-mode jobs never need
    /// it. Skips are decided before any subprocess is spawned.
    pub async fn process(
        &self,
        profile: &ToolProfile,
        config: &PipelineConfig,
        input_path: &Utf8Path,
        content: Option<Vec<u8>>,
    ) -> MinifyOutcome {
        let original_size = match self.fs.file_size(input_path).await {
            Ok(Some(size)) => size,
            Ok(None) => {
                tracing::debug!("{} is not locally accessible, skipping", input_path);
                return MinifyOutcome::Skipped(SkipReason::Unreachable);
            }
            Err(e) => {
                tracing::warn!("could not stat {}: {}", input_path, e);
                return MinifyOutcome::Skipped(SkipReason::Unreachable);
            }
        };

        let output = output_path(input_path, &config.output_suffix);
        if output.as_path() == input_path {
            tracing::warn!(
                "output suffix {:?} maps {} onto itself, skipping",
                config.output_suffix,
                input_path
            );
            return MinifyOutcome::Skipped(SkipReason::OutputCollision);
        }

        let job = MinifyJob::new(input_path.to_path_buf(), output, original_size);
        match profile.mode {
            InvocationMode::Stream => self.process_stream(profile, &job, content).await,
            InvocationMode::FilePath => self.process_file_path(profile, &job).await,
        }
    }

    async fn process_stream(
        &self,
        profile: &ToolProfile,
        job: &MinifyJob,
        content: Option<Vec<u8>>,
    ) -> MinifyOutcome {
        let content = match content {
            Some(bytes) => bytes,
            None => match self.fs.read(&job.input_path).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    // Readable a moment ago at stat time; treat as gone
                    tracing::warn!("could not read {}: {}", job.input_path, e);
                    return MinifyOutcome::Skipped(SkipReason::Unreachable);
                }
            },
        };

        if content.is_empty() {
            return MinifyOutcome::Failed(MinifyFailure::EmptyInput);
        }

        let args = profile.arguments(&job.input_path, &job.output_path);
        let output = match self.runner.run(&profile.runtime, &args, Some(&content)).await {
            Ok(output) => output,
            Err(e) => {
                return MinifyOutcome::Failed(MinifyFailure::Launch {
                    message: e.to_string(),
                });
            }
        };

        if !output.success() {
            return MinifyOutcome::Failed(self.tool_failure(profile.family, &output));
        }

        if output.stdout.is_empty() {
            return MinifyOutcome::Failed(MinifyFailure::EmptyOutput);
        }

        if let Err(e) = self.fs.write(&job.output_path, &output.stdout).await {
            return MinifyOutcome::Failed(MinifyFailure::Write {
                message: format!("{}: {}", job.output_path, e),
            });
        }

        let savings = self.measure(job).await;
        MinifyOutcome::Minified {
            duration: job.elapsed(),
            savings,
        }
    }

    async fn process_file_path(&self, profile: &ToolProfile, job: &MinifyJob) -> MinifyOutcome {
        let args = profile.arguments(&job.input_path, &job.output_path);
        let output = match self.runner.run(&profile.runtime, &args, None).await {
            Ok(output) => output,
            Err(e) => {
                return MinifyOutcome::Failed(MinifyFailure::Launch {
                    message: e.to_string(),
                });
            }
        };

        if !output.success() {
            return MinifyOutcome::Failed(self.tool_failure(profile.family, &output));
        }

        // The tool wrote the file itself; a missing output on a success exit
        // is still a tool failure, not ours
        match self.fs.file_size(&job.output_path).await {
            Ok(Some(minified)) => MinifyOutcome::Minified {
                duration: job.elapsed(),
                savings: Some(Savings {
                    original: job.original_size,
                    minified,
                }),
            },
            Ok(None) => MinifyOutcome::Failed(MinifyFailure::EmptyOutput),
            Err(e) => {
                tracing::debug!("could not measure {}: {}", job.output_path, e);
                MinifyOutcome::Minified {
                    duration: job.elapsed(),
                    savings: None,
                }
            }
        }
    }

    /// Normalize a non-zero exit into a failure, localized when possible
    fn tool_failure(
        &self,
        family: ToolFamily,
        output: &crate::models::ProcessOutput,
    ) -> MinifyFailure {
        let raw = output.stderr_text();
        let message = match raw.trim() {
            "" => format!("exited with status {}", output.exit_status),
            text => text.to_string(),
        };

        MinifyFailure::Tool {
            diagnostic: self.extractor.extract(&raw, family),
            message,
        }
    }

    /// Post-hoc size query; a failure here only suppresses the savings line
    async fn measure(&self, job: &MinifyJob) -> Option<Savings> {
        match self.fs.file_size(&job.output_path).await {
            Ok(Some(minified)) => Some(Savings {
                original: job.original_size,
                minified,
            }),
            Ok(None) => None,
            Err(e) => {
                tracing::debug!("could not measure {}: {}", job.output_path, e);
                None
            }
        }
    }
}
