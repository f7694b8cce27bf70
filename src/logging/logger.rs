//! The emission unit.
//!
//! A `Logger` is two things glued together:
//! - shared per-subsystem state (name, threshold, sink) behind an `Arc`, so a
//!   level change reaches every holder of that subsystem at once
//! - a request-local correlation identifier, owned by the `Logger` value
//!
//! Cloning shares the first and copies the second. A request binds its own
//! clone, which keeps concurrent requests from overwriting each other's
//! identifiers.

use std::fmt::{self, Display};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use chrono::Utc;

use crate::logging::fields::FieldBag;
use crate::logging::level::Severity;
use crate::logging::sink::{Record, Sink};
use crate::logging::template;
use crate::logging::{CORRELATION_ID_KEY, SUBSYSTEM_KEY};
use crate::observability::metrics;

/// Configuration point shared by every `Logger` of one subsystem.
pub(crate) struct SubsystemState {
    name: Arc<str>,
    threshold: AtomicU8,
    sink: Arc<dyn Sink>,
}

impl SubsystemState {
    pub(crate) fn new(name: &str, threshold: Severity, sink: Arc<dyn Sink>) -> Self {
        Self {
            name: Arc::from(name),
            threshold: AtomicU8::new(threshold as u8),
            sink,
        }
    }

    pub(crate) fn threshold(&self) -> Severity {
        Severity::from(self.threshold.load(Ordering::Relaxed))
    }

    pub(crate) fn set_threshold(&self, level: Severity) {
        self.threshold.store(level as u8, Ordering::Relaxed);
    }
}

/// Structured logger bound to a subsystem and, optionally, a request.
#[derive(Clone)]
pub struct Logger {
    state: Arc<SubsystemState>,
    correlation_id: Option<Arc<str>>,
}

impl Logger {
    /// Create a standalone logger outside any registry.
    pub fn new(subsystem: &str, threshold: Severity, sink: Arc<dyn Sink>) -> Self {
        Self::from_state(Arc::new(SubsystemState::new(subsystem, threshold, sink)))
    }

    pub(crate) fn from_state(state: Arc<SubsystemState>) -> Self {
        Self {
            state,
            correlation_id: None,
        }
    }

    pub fn subsystem(&self) -> &str {
        &self.state.name
    }

    /// Current minimum emitted severity.
    pub fn level(&self) -> Severity {
        self.state.threshold()
    }

    /// Change the threshold for every holder of this subsystem.
    pub fn set_level(&self, threshold: Severity) {
        self.state.set_threshold(threshold);
    }

    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    /// Set the identifier attached to future emissions from this value only.
    pub fn set_correlation_id(&mut self, id: impl Into<String>) {
        self.correlation_id = Some(Arc::from(id.into()));
    }

    /// Consuming form of [`Logger::set_correlation_id`].
    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.set_correlation_id(id);
        self
    }

    /// Whether both loggers share the same subsystem state.
    pub fn same_subsystem_state(&self, other: &Logger) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }

    /// Whether a record at `level` would reach the sink.
    pub fn enabled(&self, level: Severity) -> bool {
        level >= self.level()
    }

    pub fn debug(&self, fields: FieldBag, template: &str, args: &[&dyn Display]) {
        self.log(Severity::Debug, fields, template, args);
    }

    pub fn info(&self, fields: FieldBag, template: &str, args: &[&dyn Display]) {
        self.log(Severity::Info, fields, template, args);
    }

    pub fn warn(&self, fields: FieldBag, template: &str, args: &[&dyn Display]) {
        self.log(Severity::Warn, fields, template, args);
    }

    pub fn error(&self, fields: FieldBag, template: &str, args: &[&dyn Display]) {
        self.log(Severity::Error, fields, template, args);
    }

    /// Emit at `level` with a runtime template. Suppressed levels return
    /// before any rendering or merging.
    pub fn log(&self, level: Severity, fields: FieldBag, template: &str, args: &[&dyn Display]) {
        if !self.enabled(level) {
            return;
        }
        self.dispatch(level, fields, template::render_lossy(template, args));
    }

    /// Emit pre-formatted arguments. Used by the `log_*!` macros, which check
    /// [`Logger::enabled`] before building anything.
    pub fn emit_fmt(&self, level: Severity, fields: FieldBag, args: fmt::Arguments<'_>) {
        if !self.enabled(level) {
            return;
        }
        self.dispatch(level, fields, fmt::format(args));
    }

    fn dispatch(&self, level: Severity, fields: FieldBag, message: String) {
        let mut merged = FieldBag::new().with(SUBSYSTEM_KEY, &*self.state.name);
        if let Some(id) = &self.correlation_id {
            merged.insert(CORRELATION_ID_KEY, &**id);
        }
        for (key, value) in fields {
            if !merged.contains_key(&key) {
                merged.insert(key, value);
            }
        }

        let record = Record {
            timestamp: Utc::now(),
            subsystem: self.state.name.to_string(),
            severity: level,
            correlation_id: self.correlation_id.as_deref().map(str::to_string),
            fields: merged,
            message,
        };

        metrics::record_log_emitted(level, &self.state.name);
        self.state.sink.deliver(&record);
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("subsystem", &self.subsystem())
            .field("level", &self.level())
            .field("correlation_id", &self.correlation_id())
            .finish()
    }
}
