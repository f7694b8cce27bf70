//! Record delivery.
//!
//! The core renders a `Record` and hands it to a `Sink`; where the bytes go is
//! the sink's business. Delivery is fire-and-forget and synchronous, so the
//! records of one request arrive in the order they were emitted.

use std::fmt;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::logging::fields::FieldBag;
use crate::logging::level::Severity;
use crate::logging::{CORRELATION_ID_KEY, SUBSYSTEM_KEY};

/// A fully merged log record.
#[derive(Debug, Clone, Serialize)]
pub struct Record {
    pub timestamp: DateTime<Utc>,
    pub subsystem: String,
    pub severity: Severity,
    pub correlation_id: Option<String>,
    /// Base fields merged over the call-site fields.
    pub fields: FieldBag,
    pub message: String,
}

/// Destination for rendered records.
pub trait Sink: Send + Sync {
    fn deliver(&self, record: &Record);
}

/// Forwards records into the process's `tracing` subscriber.
///
/// Events use the `request_log` target so they can be filtered apart from the
/// crate's own diagnostics.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

macro_rules! forward {
    ($level:expr, $record:expr) => {
        tracing::event!(
            target: "request_log",
            $level,
            subsystem = %$record.subsystem,
            correlation_id = $record.correlation_id.as_deref().unwrap_or("-"),
            fields = %CallSiteFields(&$record.fields),
            "{}",
            $record.message
        )
    };
}

impl Sink for TracingSink {
    fn deliver(&self, record: &Record) {
        match record.severity {
            Severity::Debug => forward!(tracing::Level::DEBUG, record),
            Severity::Info => forward!(tracing::Level::INFO, record),
            Severity::Warn => forward!(tracing::Level::WARN, record),
            Severity::Error => forward!(tracing::Level::ERROR, record),
        }
    }
}

/// Renders the fields of a record minus the base ones the tracing event
/// already carries on its own.
struct CallSiteFields<'a>(&'a FieldBag);

impl fmt::Display for CallSiteFields<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (key, value) in self.0.iter() {
            if key == SUBSYSTEM_KEY || key == CORRELATION_ID_KEY {
                continue;
            }
            if !first {
                f.write_str(" ")?;
            }
            first = false;
            write!(f, "{}={}", key, value)?;
        }
        Ok(())
    }
}

/// Keeps every delivered record in memory.
#[derive(Clone, Default)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<Record>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything delivered so far.
    pub fn records(&self) -> Vec<Record> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Records carrying the given correlation identifier.
    pub fn records_for(&self, correlation_id: &str) -> Vec<Record> {
        self.records()
            .into_iter()
            .filter(|r| r.correlation_id.as_deref() == Some(correlation_id))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }
}

impl Sink for MemorySink {
    fn deliver(&self, record: &Record) {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(record.clone());
    }
}
