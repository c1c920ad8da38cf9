//! minsave - Save-triggered minification pipeline
//!
//! Headless entry point: initializes logging, loads the YAML configuration,
//! probes the external toolchain once, and reports what is missing. An
//! embedding editor performs the same startup sequence and then keeps the
//! [`DependencySnapshot`] and a [`SaveDispatcher`](minsave::SaveDispatcher)
//! alive for the session; this binary exists so a user can verify their
//! toolchain without opening an editor.
//!
//! # Execution Flow
//!
//! 1. Initialize logging -> logs/minsave_<date>.log (plus console)
//! 2. Load minsave-data/minsave.yaml (defaults when absent)
//! 3. Probe runtime and minifier entry points via `--version` invocations
//! 4. Emit one notification per missing tool, with an install hint link
//! 5. Exit non-zero when any tool is missing

use anyhow::Result;
use minsave::host::LogNotifier;
use minsave::{APP_NAME, ConfigManager, DependencySnapshot, ProcessRunner, Toolchain, VERSION};

#[tokio::main]
async fn main() -> Result<()> {
    let _guard = minsave::logging::setup_logging("logs", "minsave", false, true)?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    let config_manager = ConfigManager::new("minsave-data")?;
    let config = config_manager.load()?;
    tracing::info!(
        "Loaded configuration from {} - js enabled: {}, css enabled: {}",
        config_manager.config_path(),
        config.settings.javascript.enabled,
        config.settings.css.enabled
    );

    let toolchain = Toolchain::from_settings(&config_manager);
    let runner = ProcessRunner::new();
    let snapshot = DependencySnapshot::detect(&runner, &toolchain).await;

    for (name, status) in [
        (toolchain.runtime.as_str(), &snapshot.runtime),
        (toolchain.js_minifier.as_str(), &snapshot.js_minifier),
        (toolchain.css_minifier.as_str(), &snapshot.css_minifier),
    ] {
        match (status.available, status.version.as_deref()) {
            (true, Some(version)) if !version.is_empty() => {
                tracing::info!("{}: available ({})", name, version);
            }
            (true, _) => tracing::info!("{}: available", name),
            (false, _) => tracing::warn!("{}: not found", name),
        }
    }

    let notifier = LogNotifier;
    let missing = snapshot.report_missing(&toolchain, &notifier, &config.settings.install_hints);

    if missing > 0 {
        anyhow::bail!("{missing} minifier dependency(ies) missing, see log for install hints");
    }

    tracing::info!("All minifier dependencies available");
    Ok(())
}
