//! Debug and tracing configuration

use rootcamp_commons::expand_home;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::constants::{HOME_DIR_NAME, defaults};

/// Trace level for structured logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TraceLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl TraceLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "error" => Some(Self::Error),
            "warn" => Some(Self::Warn),
            "info" => Some(Self::Info),
            "debug" => Some(Self::Debug),
            "trace" => Some(Self::Trace),
            _ => None,
        }
    }
}

impl std::fmt::Display for TraceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TraceLevel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw).unwrap_or_default())
    }
}

/// Debug and tracing configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DebugConfig {
    /// Write structured logs while the TUI is running
    #[serde(default)]
    pub enable_tracing: bool,

    /// Trace level (error, warn, info, debug, trace)
    #[serde(default)]
    pub trace_level: TraceLevel,

    /// Tracing targets to enable, e.g. "rootcamp_lab"
    #[serde(default)]
    pub trace_targets: Vec<String>,

    /// Directory for log files
    #[serde(default)]
    pub debug_log_dir: Option<String>,
}

impl DebugConfig {
    /// Log directory with `~` expanded; defaults to `~/.rootcamp/logs`.
    pub fn debug_log_path(&self) -> PathBuf {
        match self.debug_log_dir.as_deref() {
            Some(dir) => expand_home(dir),
            None => dirs::home_dir()
                .map(|home| home.join(HOME_DIR_NAME).join(defaults::LOG_DIR_NAME))
                .unwrap_or_else(|| PathBuf::from(HOME_DIR_NAME).join(defaults::LOG_DIR_NAME)),
        }
    }

    /// `EnvFilter` directive built from the configured targets and level.
    pub fn filter_directive(&self) -> String {
        let targets = if self.trace_targets.is_empty() {
            vec![
                "rootcamp".to_string(),
                "rootcamp_core".to_string(),
                "rootcamp_lab".to_string(),
                "rootcamp_progress_store".to_string(),
            ]
        } else {
            self.trace_targets.clone()
        };

        targets
            .iter()
            .map(|target| format!("{}={}", target, self.trace_level))
            .collect::<Vec<_>>()
            .join(",")
    }
}
