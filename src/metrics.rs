// Performance metrics module
//
// Lightweight counters for observing pipeline behavior over a session

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Session-wide pipeline metrics
///
/// Uses atomic operations for thread-safe tracking without locks; concurrent
/// jobs record independently. Collected for the lifetime of the dispatcher
/// and logged on shutdown for diagnostics.
#[derive(Debug)]
pub struct Metrics {
    /// Jobs that produced and committed minified output
    pub jobs_minified: AtomicUsize,

    /// Jobs that ended in any failure category
    pub jobs_failed: AtomicUsize,

    /// Jobs refused before a subprocess was spawned
    pub jobs_skipped: AtomicUsize,

    /// Total wall-clock minification time in milliseconds
    pub total_minify_time_ms: AtomicU64,

    /// Total bytes shaved off across all successful jobs
    pub total_bytes_saved: AtomicU64,

    /// Notifications handed to the host
    pub notifications_sent: AtomicU64,

    /// Dispatcher start time
    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            jobs_minified: AtomicUsize::new(0),
            jobs_failed: AtomicUsize::new(0),
            jobs_skipped: AtomicUsize::new(0),
            total_minify_time_ms: AtomicU64::new(0),
            total_bytes_saved: AtomicU64::new(0),
            notifications_sent: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_job_minified(&self) {
        self.jobs_minified.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_job_failed(&self) {
        self.jobs_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_job_skipped(&self) {
        self.jobs_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_minify_time(&self, duration: Duration) {
        self.total_minify_time_ms
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn record_bytes_saved(&self, bytes: u64) {
        self.total_bytes_saved.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn record_notification(&self) {
        self.notifications_sent.fetch_add(1, Ordering::Relaxed);
    }

    /// Time since the dispatcher came up
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Average wall-clock time per successful job in milliseconds
    pub fn avg_minify_time_ms(&self) -> f64 {
        let total = self.total_minify_time_ms.load(Ordering::Relaxed);
        let count = self.jobs_minified.load(Ordering::Relaxed);
        if count > 0 {
            total as f64 / count as f64
        } else {
            0.0
        }
    }

    /// Log a metrics summary
    pub fn log_summary(&self) {
        tracing::info!("=== Minification Metrics Summary ===");
        tracing::info!("Uptime: {:.2}s", self.uptime().as_secs_f64());
        tracing::info!(
            "Jobs: {} minified, {} failed, {} skipped",
            self.jobs_minified.load(Ordering::Relaxed),
            self.jobs_failed.load(Ordering::Relaxed),
            self.jobs_skipped.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Total minify time: {:.2}s (avg: {:.2}ms per job), {} bytes saved",
            self.total_minify_time_ms.load(Ordering::Relaxed) as f64 / 1000.0,
            self.avg_minify_time_ms(),
            self.total_bytes_saved.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Notifications sent: {}",
            self.notifications_sent.load(Ordering::Relaxed)
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_metrics_start_at_zero() {
        let metrics = Metrics::new();
        assert_eq!(metrics.jobs_minified.load(Ordering::Relaxed), 0);
        assert_eq!(metrics.jobs_failed.load(Ordering::Relaxed), 0);
        assert_eq!(metrics.total_bytes_saved.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_record_job_outcomes() {
        let metrics = Metrics::new();

        metrics.record_job_minified();
        metrics.record_job_minified();
        metrics.record_job_failed();
        metrics.record_job_skipped();

        assert_eq!(metrics.jobs_minified.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.jobs_failed.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.jobs_skipped.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_average_minify_time() {
        let metrics = Metrics::new();

        metrics.record_job_minified();
        metrics.record_minify_time(Duration::from_millis(100));
        metrics.record_job_minified();
        metrics.record_minify_time(Duration::from_millis(200));

        assert_eq!(metrics.total_minify_time_ms.load(Ordering::Relaxed), 300);
        assert_eq!(metrics.avg_minify_time_ms(), 150.0);
    }

    #[test]
    fn test_average_with_no_jobs() {
        let metrics = Metrics::new();
        assert_eq!(metrics.avg_minify_time_ms(), 0.0);
    }

    #[test]
    fn test_bytes_saved_accumulates() {
        let metrics = Metrics::new();
        metrics.record_bytes_saved(600);
        metrics.record_bytes_saved(150);
        assert_eq!(metrics.total_bytes_saved.load(Ordering::Relaxed), 750);
    }

    #[test]
    fn test_uptime() {
        let metrics = Metrics::new();
        thread::sleep(Duration::from_millis(10));
        assert!(metrics.uptime().as_millis() >= 10);
    }
}
