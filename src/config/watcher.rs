//! Hot reload of the logging section.
//!
//! Only `[logging]` takes effect without a restart, so reloads that leave it
//! untouched are not forwarded.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::{load_config, ConfigError};
use crate::config::schema::{LoggingConfig, ServiceConfig};

/// Watches a config file and forwards validated reloads.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<ServiceConfig>,
    last_logging: Option<LoggingConfig>,
}

impl ConfigWatcher {
    /// Returns the watcher and the receiving end for reloaded configs.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<ServiceConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let watcher = Self {
            path: path.to_path_buf(),
            update_tx,
            last_logging: None,
        };
        (watcher, update_rx)
    }

    /// Seed the logging section already in effect, so an identical reload
    /// is not forwarded.
    pub fn with_current(mut self, logging: &LoggingConfig) -> Self {
        self.last_logging = Some(logging.clone());
        self
    }

    /// Start watching. Dropping the returned handle stops the watch.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let Self {
            path,
            update_tx,
            last_logging,
        } = self;
        let watch_path = path.clone();
        let last_logging = Mutex::new(last_logging);

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                let event = match res {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::warn!(error = %e, "Config watch error");
                        return;
                    }
                };
                if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                    return;
                }

                let mut last = last_logging.lock().unwrap_or_else(|p| p.into_inner());
                match reload(&path, &mut last) {
                    Ok(Some(config)) => {
                        tracing::info!(
                            path = %path.display(),
                            level = %config.logging.level,
                            subsystem = %config.logging.subsystem,
                            "Logging configuration reloaded"
                        );
                        let _ = update_tx.send(config);
                    }
                    Ok(None) => {
                        tracing::debug!(path = %path.display(), "Config changed outside [logging], ignored");
                    }
                    Err(e) => {
                        tracing::error!(
                            path = %path.display(),
                            error = %e,
                            "Config reload rejected, keeping current configuration"
                        );
                    }
                }
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&watch_path, RecursiveMode::NonRecursive)?;
        tracing::info!(path = %watch_path.display(), "Config watcher started");
        Ok(watcher)
    }
}

/// Load `path` and return the config if its logging section differs from
/// `last`, updating `last` on change.
pub fn reload(
    path: &Path,
    last: &mut Option<LoggingConfig>,
) -> Result<Option<ServiceConfig>, ConfigError> {
    let config = load_config(path)?;
    if last.as_ref() == Some(&config.logging) {
        return Ok(None);
    }
    *last = Some(config.logging.clone());
    Ok(Some(config))
}
