use crate::host::{Document, HostFs, Notice, Notifier, SettingsSource};
use crate::metrics::Metrics;
use crate::models::{MinifyFailure, MinifyOutcome, PipelineConfig, ToolFamily, Toolchain};
use crate::services::pipeline::{InvocationMode, MinifyPipeline, ToolProfile};
use crate::services::probe::DependencySnapshot;
use anyhow::Result;
use camino::Utf8Path;
use std::sync::Arc;

/// Maps save events onto per-family minification jobs.
///
/// This is the boundary between the host's save handling and everything
/// else: `on_save` never propagates an error, so a minification fault can
/// never block or corrupt the save itself. Configuration is consulted fresh
/// on every event; the dependency snapshot is the read-only one built at
/// startup.
pub struct SaveDispatcher {
    settings: Arc<dyn SettingsSource>,
    notifier: Arc<dyn Notifier>,
    pipeline: MinifyPipeline,
    dependencies: DependencySnapshot,
    metrics: Arc<Metrics>,
}

impl SaveDispatcher {
    pub fn new(
        settings: Arc<dyn SettingsSource>,
        fs: Arc<dyn HostFs>,
        notifier: Arc<dyn Notifier>,
        dependencies: DependencySnapshot,
    ) -> Self {
        Self {
            settings,
            notifier,
            pipeline: MinifyPipeline::new(fs),
            dependencies,
            metrics: Arc::new(Metrics::new()),
        }
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Handle one save event, fire-and-forget.
    ///
    /// Anything the inner dispatch cannot handle is caught here, logged, and
    /// reported as a generic unexpected-error notification.
    pub async fn on_save(&self, doc: &dyn Document) {
        if let Err(e) = self.dispatch(doc).await {
            tracing::error!("unexpected error while handling save: {:#}", e);
            self.metrics.record_job_failed();
            self.notify(
                Notice::new(format!("Unexpected error while minifying: {e}"))
                    .with_title("Minify on save"),
            );
        }
    }

    async fn dispatch(&self, doc: &dyn Document) -> Result<()> {
        let Some(syntax) = doc.syntax() else {
            return Ok(());
        };

        // Classification is by content-type tag against each family's
        // configured list, in fixed order
        let Some((family, config)) = self.classify(syntax) else {
            tracing::trace!("syntax {:?} has no minifier family", syntax);
            return Ok(());
        };

        if !config.enabled {
            tracing::debug!("{} minification disabled in settings", family.label());
            return Ok(());
        }

        let Some(path) = doc.path() else {
            tracing::debug!("unsaved or virtual buffer, nothing to minify");
            return Ok(());
        };

        // Already-minified files never re-enter the pipeline
        if path.as_str().ends_with(config.output_suffix.as_str()) {
            tracing::debug!("{} already carries the output suffix, skipping", path);
            return Ok(());
        }

        if !self.dependencies.family_available(family) {
            // The startup notification already told the user; refusing
            // quietly avoids a notice on every save
            tracing::warn!(
                "{} minifier unavailable, refusing {} without spawning",
                family.label(),
                path
            );
            return Ok(());
        }

        let toolchain = Toolchain::from_settings(self.settings.as_ref());
        let profile = match family {
            ToolFamily::Js => ToolProfile::js(&toolchain),
            ToolFamily::Css => ToolProfile::css(&toolchain),
        };

        let content = match profile.mode {
            InvocationMode::Stream => Some(doc.text()?.into_bytes()),
            InvocationMode::FilePath => None,
        };

        let outcome = self.pipeline.process(&profile, &config, path, content).await;
        self.report(doc, path, outcome);
        Ok(())
    }

    /// Route a content-type tag to a family using the current configuration
    fn classify(&self, syntax: &str) -> Option<(ToolFamily, PipelineConfig)> {
        for family in [ToolFamily::Js, ToolFamily::Css] {
            let config = PipelineConfig::for_family(self.settings.as_ref(), family);
            if config.matches_content_type(syntax) {
                return Some((family, config));
            }
        }
        None
    }

    fn report(&self, doc: &dyn Document, path: &Utf8Path, outcome: MinifyOutcome) {
        let name = path.file_name().unwrap_or(path.as_str());

        match outcome {
            MinifyOutcome::Minified { duration, savings } => {
                self.metrics.record_job_minified();
                self.metrics.record_minify_time(duration);

                let ms = duration.as_millis();
                let body = match savings {
                    Some(s) if s.saved_bytes() > 0 => {
                        self.metrics.record_bytes_saved(s.saved_bytes() as u64);
                        format!("Saved {} in {} ms", s.format_saved(), ms)
                    }
                    Some(_) => format!("Minified in {} ms, no size reduction", ms),
                    None => format!("Minified in {} ms", ms),
                };

                tracing::info!("minified {} in {} ms", path, ms);
                self.notify(Notice::new(body).with_title(name));
            }
            MinifyOutcome::Skipped(reason) => {
                self.metrics.record_job_skipped();
                tracing::info!("skipped {}: {:?}", path, reason);
                self.notify(Notice::new(reason.describe(path)));
            }
            MinifyOutcome::Failed(failure) => {
                self.metrics.record_job_failed();
                tracing::warn!("minification of {} failed: {}", path, failure);

                if let Some(diagnostic) = failure.diagnostic() {
                    doc.seek_to(diagnostic.line, diagnostic.column);
                }
                self.notify(self.failure_notice(name, &failure));
            }
        }
    }

    fn failure_notice(&self, name: &str, failure: &MinifyFailure) -> Notice {
        let body = match failure.diagnostic() {
            Some(d) => match &d.kind {
                Some(kind) => format!(
                    "{} at line {}, column {}: {}",
                    kind, d.line, d.column, d.message
                ),
                None => format!("Error at line {}, column {}: {}", d.line, d.column, d.message),
            },
            None => failure.to_string(),
        };

        Notice::new(body).with_title(format!("Could not minify {name}"))
    }

    fn notify(&self, notice: Notice) {
        self.metrics.record_notification();
        self.notifier.notify(notice);
    }
}
