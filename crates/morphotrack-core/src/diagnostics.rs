//! Run-scoped diagnostics
//!
//! Pipeline stages report what they did through a [`DiagnosticSink`] handed
//! to them by the caller. Nothing here installs a global logger: the sink's
//! lifetime is one pipeline run, and the application decides where the
//! messages end up.
//!
//! # Examples
//!
//! ```
//! use morphotrack_core::{CollectingSink, DiagnosticSink, Severity};
//!
//! let sink = CollectingSink::new();
//! sink.warn(Some(3), "threshold", "histogram has no half maximum");
//! let collected = sink.take();
//! assert_eq!(collected.len(), 1);
//! assert_eq!(collected[0].severity, Severity::Warning);
//! assert_eq!(collected[0].frame, Some(3));
//! ```

use parking_lot::Mutex;
use std::fmt;

/// Log target used by [`LogSink`]
pub const LOG_TARGET: &str = "morphotrack";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Debug,
    Info,
    Warning,
}

/// One message emitted by a pipeline stage
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// Frame index within the series, if the message belongs to a frame
    pub frame: Option<usize>,
    /// Stage name, e.g. `"threshold"` or `"tracking"`
    pub stage: &'static str,
    pub severity: Severity,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.frame {
            Some(frame) => write!(f, "[frame {frame}] {}: {}", self.stage, self.message),
            None => write!(f, "{}: {}", self.stage, self.message),
        }
    }
}

/// Receiver for diagnostics emitted during a run
pub trait DiagnosticSink: Send + Sync {
    fn emit(&self, diagnostic: Diagnostic);

    fn debug(&self, frame: Option<usize>, stage: &'static str, message: impl Into<String>)
    where
        Self: Sized,
    {
        self.emit(Diagnostic {
            frame,
            stage,
            severity: Severity::Debug,
            message: message.into(),
        });
    }

    fn info(&self, frame: Option<usize>, stage: &'static str, message: impl Into<String>)
    where
        Self: Sized,
    {
        self.emit(Diagnostic {
            frame,
            stage,
            severity: Severity::Info,
            message: message.into(),
        });
    }

    fn warn(&self, frame: Option<usize>, stage: &'static str, message: impl Into<String>)
    where
        Self: Sized,
    {
        self.emit(Diagnostic {
            frame,
            stage,
            severity: Severity::Warning,
            message: message.into(),
        });
    }
}

/// Emit a diagnostic through a trait object
///
/// The convenience methods on [`DiagnosticSink`] need a sized receiver;
/// stages that hold a `&dyn DiagnosticSink` use this instead.
pub fn report(
    sink: &dyn DiagnosticSink,
    frame: Option<usize>,
    stage: &'static str,
    severity: Severity,
    message: impl Into<String>,
) {
    sink.emit(Diagnostic {
        frame,
        stage,
        severity,
        message: message.into(),
    });
}

/// Forwards diagnostics to the `log` facade under target `morphotrack`
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn emit(&self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Debug => log::debug!(target: LOG_TARGET, "{diagnostic}"),
            Severity::Info => log::info!(target: LOG_TARGET, "{diagnostic}"),
            Severity::Warning => log::warn!(target: LOG_TARGET, "{diagnostic}"),
        }
    }
}

/// Buffers diagnostics in memory
#[derive(Debug, Default)]
pub struct CollectingSink {
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything collected so far
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.lock().clone()
    }

    /// Drain the buffer
    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.diagnostics.lock())
    }

    /// Diagnostics of at least `severity`
    pub fn at_least(&self, severity: Severity) -> Vec<Diagnostic> {
        self.diagnostics
            .lock()
            .iter()
            .filter(|d| d.severity >= severity)
            .cloned()
            .collect()
    }

    /// Whether a warning was emitted by `stage`
    pub fn has_warning(&self, stage: &str) -> bool {
        self.diagnostics
            .lock()
            .iter()
            .any(|d| d.severity == Severity::Warning && d.stage == stage)
    }
}

impl DiagnosticSink for CollectingSink {
    fn emit(&self, diagnostic: Diagnostic) {
        self.diagnostics.lock().push(diagnostic);
    }
}

/// Discards every diagnostic
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn emit(&self, _diagnostic: Diagnostic) {}
}
