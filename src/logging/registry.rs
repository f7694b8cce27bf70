//! Process-wide logger cache.

use std::sync::{Arc, OnceLock};

use dashmap::DashMap;

use crate::logging::level::Severity;
use crate::logging::logger::{Logger, SubsystemState};
use crate::logging::sink::{Sink, TracingSink};

static GLOBAL: OnceLock<LoggerRegistry> = OnceLock::new();

/// Maps subsystem names to their shared logger state.
///
/// Cloning the registry shares the underlying map.
#[derive(Clone)]
pub struct LoggerRegistry {
    loggers: Arc<DashMap<String, Arc<SubsystemState>>>,
    sink: Arc<dyn Sink>,
}

impl LoggerRegistry {
    /// Create an isolated registry delivering to `sink`.
    pub fn new(sink: Arc<dyn Sink>) -> Self {
        Self {
            loggers: Arc::new(DashMap::new()),
            sink,
        }
    }

    /// The process-wide registry, delivering into `tracing`.
    pub fn global() -> LoggerRegistry {
        GLOBAL
            .get_or_init(|| LoggerRegistry::new(Arc::new(TracingSink)))
            .clone()
    }

    /// Acquire the logger for `subsystem`.
    ///
    /// The first call creates it with `default_threshold`; later calls get a
    /// logger sharing the same state and ignore their threshold argument.
    /// Returned loggers carry no correlation identifier.
    pub fn get_logger(&self, subsystem: &str, default_threshold: Severity) -> Logger {
        let existing = self.loggers.get(subsystem).map(|entry| Arc::clone(entry.value()));
        let state = match existing {
            Some(state) => state,
            None => {
                let entry = self.loggers.entry(subsystem.to_string()).or_insert_with(|| {
                    tracing::debug!(subsystem, level = %default_threshold, "Registering logger");
                    Arc::new(SubsystemState::new(
                        subsystem,
                        default_threshold,
                        Arc::clone(&self.sink),
                    ))
                });
                Arc::clone(entry.value())
            }
        };
        Logger::from_state(state)
    }

    /// Set the threshold of a registered subsystem. Returns `false` when the
    /// subsystem has never been acquired.
    pub fn set_level(&self, subsystem: &str, level: Severity) -> bool {
        match self.loggers.get(subsystem) {
            Some(state) => {
                state.set_threshold(level);
                true
            }
            None => false,
        }
    }

    /// Whether `subsystem` has been acquired.
    pub fn contains(&self, subsystem: &str) -> bool {
        self.loggers.contains_key(subsystem)
    }

    /// Snapshot of every subsystem and its threshold, sorted by name.
    pub fn levels(&self) -> Vec<(String, Severity)> {
        let mut levels: Vec<_> = self
            .loggers
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().threshold()))
            .collect();
        levels.sort_by(|a, b| a.0.cmp(&b.0));
        levels
    }

    pub fn len(&self) -> usize {
        self.loggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loggers.is_empty()
    }
}

impl std::fmt::Debug for LoggerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoggerRegistry")
            .field("subsystems", &self.levels())
            .finish()
    }
}
