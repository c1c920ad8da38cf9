//! Integration tests for SaveDispatcher
//!
//! These wire the dispatcher to the real pipeline and real fake-tool
//! subprocesses, with recording implementations of the host traits, and
//! verify the end-to-end save handling:
//! - routing by content type and per-family configuration
//! - notification and cursor-seek behavior for every outcome
//! - the zero-spawn guarantees for disabled and unreachable cases
//! - the same-file save race the design accepts

use camino::{Utf8Path, Utf8PathBuf};
use minsave::host::{Document, HostFs, LocalFs, Notice, Notifier, SettingsSource};
use minsave::models::config::keys;
use minsave::services::probe::{DependencySnapshot, ToolStatus};
use minsave::SaveDispatcher;
use std::collections::HashMap;
use std::fs;
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

fn utf8(path: &std::path::Path) -> Utf8PathBuf {
    Utf8PathBuf::try_from(path.to_path_buf()).unwrap()
}

fn write_script(dir: &Utf8Path, name: &str, body: &str) -> Utf8PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    path
}

/// Settings store backed by plain maps, answering defaults otherwise
#[derive(Default)]
struct MapSettings {
    bools: HashMap<String, bool>,
    strings: HashMap<String, String>,
}

impl MapSettings {
    fn with_tools(runtime: &str, js: &Utf8Path, css: &Utf8Path) -> Self {
        let mut settings = Self::default();
        settings
            .strings
            .insert(keys::TOOL_RUNTIME.to_string(), runtime.to_string());
        settings
            .strings
            .insert(keys::TOOL_JS_MINIFIER.to_string(), js.to_string());
        settings
            .strings
            .insert(keys::TOOL_CSS_MINIFIER.to_string(), css.to_string());
        settings
    }
}

impl SettingsSource for MapSettings {
    fn bool_setting(&self, key: &str, default: bool) -> bool {
        self.bools.get(key).copied().unwrap_or(default)
    }

    fn string_setting(&self, key: &str, default: &str) -> String {
        self.strings
            .get(key)
            .cloned()
            .unwrap_or_else(|| default.to_string())
    }
}

struct TestDocument {
    syntax: String,
    path: Utf8PathBuf,
    text: String,
    seeks: Mutex<Vec<(usize, usize)>>,
}

impl TestDocument {
    fn new(syntax: &str, path: Utf8PathBuf, text: &str) -> Self {
        Self {
            syntax: syntax.to_string(),
            path,
            text: text.to_string(),
            seeks: Mutex::new(Vec::new()),
        }
    }
}

impl Document for TestDocument {
    fn syntax(&self) -> Option<&str> {
        Some(&self.syntax)
    }

    fn path(&self) -> Option<&Utf8Path> {
        Some(&self.path)
    }

    fn text(&self) -> anyhow::Result<String> {
        Ok(self.text.clone())
    }

    fn seek_to(&self, line: usize, column: usize) {
        self.seeks.lock().unwrap().push((line, column));
    }
}

#[derive(Default)]
struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    fn bodies(&self) -> Vec<String> {
        self.notices
            .lock()
            .unwrap()
            .iter()
            .map(|n| n.body.clone())
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}

fn all_available() -> DependencySnapshot {
    let present = ToolStatus {
        available: true,
        version: Some("1.0.0".to_string()),
    };
    DependencySnapshot {
        runtime: present.clone(),
        js_minifier: present.clone(),
        css_minifier: present,
    }
}

fn dispatcher(settings: MapSettings) -> (SaveDispatcher, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::default());
    let fs: Arc<dyn HostFs> = Arc::new(LocalFs);
    let dispatcher = SaveDispatcher::new(
        Arc::new(settings),
        fs,
        notifier.clone(),
        all_available(),
    );
    (dispatcher, notifier)
}

#[tokio::test]
async fn test_js_save_minifies_and_reports_savings() {
    let temp = TempDir::new().unwrap();
    let dir = utf8(temp.path());
    let content = "a".repeat(1000);
    let input = dir.join("app.js");
    fs::write(&input, &content).unwrap();

    let js = write_script(&dir, "terser.sh", "head -c 400\n");
    let css = write_script(&dir, "css.sh", "cat\n");

    let (dispatcher, notifier) =
        dispatcher(MapSettings::with_tools("/bin/sh", &js, &css));
    let doc = TestDocument::new("javascript", input, &content);
    dispatcher.on_save(&doc).await;

    let notices = notifier.notices.lock().unwrap();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].title.as_deref(), Some("app.js"));
    assert!(notices[0].body.contains("Saved 0.6 KB"));
    assert!(doc.seeks.lock().unwrap().is_empty());

    assert_eq!(fs::read(dir.join("app.min.js")).unwrap().len(), 400);
    assert_eq!(
        dispatcher.metrics().jobs_minified.load(Ordering::Relaxed),
        1
    );
    assert_eq!(
        dispatcher.metrics().total_bytes_saved.load(Ordering::Relaxed),
        600
    );
}

#[tokio::test]
async fn test_js_failure_seeks_cursor_to_reported_location() {
    let temp = TempDir::new().unwrap();
    let dir = utf8(temp.path());
    let input = dir.join("broken.js");
    fs::write(&input, "function (((\n").unwrap();

    let js = write_script(
        &dir,
        "terser.sh",
        "echo 'Parse error at 0:114,5' >&2\nexit 1\n",
    );
    let css = write_script(&dir, "css.sh", "cat\n");

    let (dispatcher, notifier) =
        dispatcher(MapSettings::with_tools("/bin/sh", &js, &css));
    let doc = TestDocument::new("javascript", input, "function (((\n");
    dispatcher.on_save(&doc).await;

    assert_eq!(doc.seeks.lock().unwrap().as_slice(), &[(114, 5)]);

    let notices = notifier.notices.lock().unwrap();
    assert_eq!(notices.len(), 1);
    assert_eq!(
        notices[0].title.as_deref(),
        Some("Could not minify broken.js")
    );
    assert!(notices[0].body.contains("line 114"));
    assert!(notices[0].body.contains("column 5"));
    assert_eq!(dispatcher.metrics().jobs_failed.load(Ordering::Relaxed), 1);
}

#[tokio::test]
async fn test_css_save_runs_in_file_path_mode() {
    let temp = TempDir::new().unwrap();
    let dir = utf8(temp.path());
    let input = dir.join("styles.css");
    fs::write(&input, "body { color: red }\n").unwrap();

    let js = write_script(&dir, "terser.sh", "cat\n");
    let css = write_script(&dir, "css.sh", "cp \"$2\" \"$4\"\n");

    let (dispatcher, notifier) =
        dispatcher(MapSettings::with_tools("/bin/sh", &js, &css));
    let doc = TestDocument::new("css", input, "body { color: red }\n");
    dispatcher.on_save(&doc).await;

    assert!(dir.join("styles.min.css").exists());
    let notices = notifier.notices.lock().unwrap();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].title.as_deref(), Some("styles.css"));
}

#[tokio::test]
async fn test_scss_routes_to_css_family_by_configuration() {
    let temp = TempDir::new().unwrap();
    let dir = utf8(temp.path());
    let input = dir.join("theme.scss");
    fs::write(&input, ".card { margin: 0 }\n").unwrap();

    let js = write_script(&dir, "terser.sh", "cat\n");
    let css = write_script(&dir, "css.sh", "cp \"$2\" \"$4\"\n");

    let mut settings = MapSettings::with_tools("/bin/sh", &js, &css);
    settings.strings.insert(
        keys::CSS_CONTENT_TYPES.to_string(),
        "css,scss,less".to_string(),
    );

    let (dispatcher, notifier) = dispatcher(settings);
    let doc = TestDocument::new("scss", input, ".card { margin: 0 }\n");
    dispatcher.on_save(&doc).await;

    assert!(dir.join("theme.min.css").exists());
    assert_eq!(notifier.notices.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_disabled_family_spawns_nothing_and_says_nothing() {
    let temp = TempDir::new().unwrap();
    let dir = utf8(temp.path());
    let input = dir.join("app.js");
    fs::write(&input, "var x;\n").unwrap();

    // The script leaves a trace if it is ever invoked
    let js = write_script(&dir, "terser.sh", ": > \"$0.ran\"\ncat\n");
    let css = write_script(&dir, "css.sh", "cat\n");

    let mut settings = MapSettings::with_tools("/bin/sh", &js, &css);
    settings.bools.insert(keys::JS_ENABLED.to_string(), false);

    let (dispatcher, notifier) = dispatcher(settings);
    let doc = TestDocument::new("javascript", input, "var x;\n");
    dispatcher.on_save(&doc).await;

    assert!(notifier.notices.lock().unwrap().is_empty());
    assert!(!Utf8PathBuf::from(format!("{js}.ran")).exists());
    assert!(!dir.join("app.min.js").exists());
}

#[tokio::test]
async fn test_unreachable_file_notifies_skip_once_without_spawning() {
    let temp = TempDir::new().unwrap();
    let dir = utf8(temp.path());

    let js = write_script(&dir, "terser.sh", ": > \"$0.ran\"\ncat\n");
    let css = write_script(&dir, "css.sh", "cat\n");

    let (dispatcher, notifier) =
        dispatcher(MapSettings::with_tools("/bin/sh", &js, &css));
    let missing = dir.join("vanished.js");
    let doc = TestDocument::new("javascript", missing, "var x;\n");
    dispatcher.on_save(&doc).await;

    let bodies = notifier.bodies();
    assert_eq!(bodies.len(), 1);
    assert!(bodies[0].contains("not locally accessible"));
    assert!(!Utf8PathBuf::from(format!("{js}.ran")).exists());
    assert_eq!(dispatcher.metrics().jobs_skipped.load(Ordering::Relaxed), 1);
}

#[tokio::test]
async fn test_concurrent_saves_of_same_file_both_complete() {
    let temp = TempDir::new().unwrap();
    let dir = utf8(temp.path());
    let content = "const shared = true;\n";
    let input = dir.join("shared.js");
    fs::write(&input, content).unwrap();

    let js = write_script(&dir, "terser.sh", "cat\n");
    let css = write_script(&dir, "css.sh", "cat\n");

    let (dispatcher, notifier) =
        dispatcher(MapSettings::with_tools("/bin/sh", &js, &css));
    let first = TestDocument::new("javascript", input.clone(), content);
    let second = TestDocument::new("javascript", input, content);

    // No per-path serialization: both jobs race and the last writer wins
    tokio::join!(dispatcher.on_save(&first), dispatcher.on_save(&second));

    assert_eq!(
        dispatcher.metrics().jobs_minified.load(Ordering::Relaxed),
        2
    );
    assert_eq!(notifier.notices.lock().unwrap().len(), 2);
    assert_eq!(
        fs::read_to_string(dir.join("shared.min.js")).unwrap(),
        content
    );
}

#[tokio::test]
async fn test_write_failure_reports_its_own_category() {
    let temp = TempDir::new().unwrap();
    let dir = utf8(temp.path());
    let input = dir.join("app.js");
    fs::write(&input, "var x = 1;\n").unwrap();
    fs::create_dir(dir.join("app.min.js")).unwrap();

    let js = write_script(&dir, "terser.sh", "cat\n");
    let css = write_script(&dir, "css.sh", "cat\n");

    let (dispatcher, notifier) =
        dispatcher(MapSettings::with_tools("/bin/sh", &js, &css));
    let doc = TestDocument::new("javascript", input, "var x = 1;\n");
    dispatcher.on_save(&doc).await;

    let bodies = notifier.bodies();
    assert_eq!(bodies.len(), 1);
    assert!(bodies[0].contains("could not write minified output"));
    assert_eq!(dispatcher.metrics().jobs_failed.load(Ordering::Relaxed), 1);
}
