//! Progress-callback trait for ingestion and generation events.
//!
//! Attach an [`Arc<dyn ReportProgressCallback>`] to a
//! [`crate::wizard::WizardSession`] via
//! [`crate::wizard::WizardSession::with_progress`] to receive events while
//! data photos are read and while the model call is in flight.
//!
//! # Example
//!
//! ```rust
//! use labreport::{ReportProgressCallback, WizardSession};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct SkipCounter {
//!     skipped: AtomicUsize,
//! }
//!
//! impl ReportProgressCallback for SkipCounter {
//!     fn on_file_skipped(&self, name: &str, _index: usize, _total: usize, error: String) {
//!         self.skipped.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("skipped {name}: {error}");
//!     }
//! }
//!
//! let cb = Arc::new(SkipCounter { skipped: AtomicUsize::new(0) });
//! let session = WizardSession::new().with_progress(cb as Arc<dyn ReportProgressCallback>);
//! ```

use std::sync::Arc;

/// Called by the wizard session as it ingests files and generates a report.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Implementations must be `Send + Sync` so they can be
/// shared with spawned tasks.
pub trait ReportProgressCallback: Send + Sync {
    /// Called once before a batch of data photos is read.
    fn on_batch_start(&self, total_files: usize) {
        let _ = total_files;
    }

    /// Called after a photo was read and appended.
    ///
    /// `index` is 1-based within the batch.
    fn on_file_ingested(&self, name: &str, index: usize, total: usize) {
        let _ = (name, index, total);
    }

    /// Called when a photo could not be read and was skipped.
    fn on_file_skipped(&self, name: &str, index: usize, total: usize, error: String) {
        let _ = (name, index, total, error);
    }

    /// Called just before the model request is sent.
    ///
    /// `attachments` counts binary parts (guide PDF and photos).
    fn on_generation_start(&self, attachments: usize) {
        let _ = attachments;
    }

    /// Called when the model returned usable LaTeX.
    fn on_generation_complete(&self, latex_len: usize) {
        let _ = latex_len;
    }

    /// Called when the generation attempt failed.
    fn on_generation_error(&self, error: String) {
        let _ = error;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ReportProgressCallback for NoopProgressCallback {}

/// Convenience alias for the type stored in the session.
pub type ProgressCallback = Arc<dyn ReportProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Tracking {
        ingested: AtomicUsize,
        skipped: AtomicUsize,
        completed_len: AtomicUsize,
    }

    impl ReportProgressCallback for Tracking {
        fn on_file_ingested(&self, _name: &str, _index: usize, _total: usize) {
            self.ingested.fetch_add(1, Ordering::SeqCst);
        }

        fn on_file_skipped(&self, _name: &str, _index: usize, _total: usize, _error: String) {
            self.skipped.fetch_add(1, Ordering::SeqCst);
        }

        fn on_generation_complete(&self, latex_len: usize) {
            self.completed_len.store(latex_len, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_batch_start(3);
        cb.on_file_ingested("a.jpg", 1, 3);
        cb.on_file_skipped("b.jpg", 2, 3, "bad".to_string());
        cb.on_generation_start(4);
        cb.on_generation_complete(100);
        cb.on_generation_error("quota".to_string());
    }

    #[test]
    fn tracking_callback_receives_events() {
        let t = Tracking::default();
        t.on_file_ingested("a.jpg", 1, 3);
        t.on_file_skipped("b.jpg", 2, 3, "bad".to_string());
        t.on_file_ingested("c.jpg", 3, 3);
        t.on_generation_complete(42);

        assert_eq!(t.ingested.load(Ordering::SeqCst), 2);
        assert_eq!(t.skipped.load(Ordering::SeqCst), 1);
        assert_eq!(t.completed_len.load(Ordering::SeqCst), 42);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_generation_start(2);
    }
}
