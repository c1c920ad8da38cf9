//! Host editor collaborator seams.
//!
//! The editor that embeds this crate owns the document model, the settings
//! store, and the notification UI. None of that is implemented here: each
//! surface the pipeline needs is a trait, and the host supplies the real
//! implementation. Two minimal implementations ship with the crate:
//!
//! - [`LocalFs`]: the filesystem facade over `tokio::fs`, suitable for any
//!   host whose documents live on a local disk.
//! - [`LogNotifier`]: routes notices into the log, used by the binary and
//!   as a presentation-free fallback.

use async_trait::async_trait;
use camino::Utf8Path;
use std::io;

/// A saved document as the dispatcher sees it.
///
/// `path()` returns `None` for unsaved or virtual buffers, which are never
/// processed. Line and column passed to `seek_to` are 0-based.
pub trait Document: Send + Sync {
    /// Content-type tag assigned by the editor (e.g. "javascript", "css")
    fn syntax(&self) -> Option<&str>;

    /// Absolute on-disk path, if the document is backed by a file
    fn path(&self) -> Option<&Utf8Path>;

    /// Full text content as of the save
    fn text(&self) -> anyhow::Result<String>;

    /// Reposition the active cursor to the given 0-based location
    fn seek_to(&self, line: usize, column: usize);
}

/// Boolean and string settings with caller-supplied defaults.
///
/// Implementations must answer with the store's current value on every call;
/// the dispatcher queries fresh on each save so configuration changes take
/// effect without a restart.
#[cfg_attr(test, mockall::automock)]
pub trait SettingsSource: Send + Sync {
    fn bool_setting(&self, key: &str, default: bool) -> bool;
    fn string_setting(&self, key: &str, default: &str) -> String;
}

/// Filesystem facade consumed by the pipeline.
#[async_trait]
pub trait HostFs: Send + Sync {
    /// Size in bytes of the file at `path`.
    ///
    /// `Ok(None)` means the path does not exist or is not locally accessible
    /// as a file; `Err` is reserved for hard I/O errors. Callers rely on
    /// this distinction to report skips rather than failures.
    async fn file_size(&self, path: &Utf8Path) -> io::Result<Option<u64>>;

    async fn read(&self, path: &Utf8Path) -> io::Result<Vec<u8>>;

    async fn write(&self, path: &Utf8Path, bytes: &[u8]) -> io::Result<()>;
}

/// [`HostFs`] over the local disk via `tokio::fs`
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

#[async_trait]
impl HostFs for LocalFs {
    async fn file_size(&self, path: &Utf8Path) -> io::Result<Option<u64>> {
        match tokio::fs::metadata(path).await {
            Ok(meta) if meta.is_file() => Ok(Some(meta.len())),
            // Directories and other non-file entries are not minifiable
            Ok(_) => Ok(None),
            Err(e)
                if e.kind() == io::ErrorKind::NotFound
                    || e.kind() == io::ErrorKind::PermissionDenied =>
            {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn read(&self, path: &Utf8Path) -> io::Result<Vec<u8>> {
        tokio::fs::read(path).await
    }

    async fn write(&self, path: &Utf8Path, bytes: &[u8]) -> io::Result<()> {
        tokio::fs::write(path, bytes).await
    }
}

/// User-facing notification with an optional title and a single action link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: Option<String>,
    pub body: String,
    pub action: Option<NoticeAction>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoticeAction {
    pub label: String,
    pub url: String,
}

impl Notice {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            title: None,
            body: body.into(),
            action: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_action(mut self, label: impl Into<String>, url: impl Into<String>) -> Self {
        self.action = Some(NoticeAction {
            label: label.into(),
            url: url.into(),
        });
        self
    }
}

/// Notification sink supplied by the host
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// [`Notifier`] that writes notices to the log instead of a UI
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        match (&notice.title, &notice.action) {
            (Some(title), Some(action)) => {
                tracing::info!("{}: {} ({}: {})", title, notice.body, action.label, action.url);
            }
            (Some(title), None) => tracing::info!("{}: {}", title, notice.body),
            (None, Some(action)) => {
                tracing::info!("{} ({}: {})", notice.body, action.label, action.url);
            }
            (None, None) => tracing::info!("{}", notice.body),
        }
    }
}
