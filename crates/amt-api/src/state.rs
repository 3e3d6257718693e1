//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor, plus the environment-derived configuration.

use std::time::Duration;

use amt_engine::WorkflowService;

/// Application configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Period of the exam auto-progress task. `None` disables it.
    pub auto_progress_interval: Option<Duration>,
    /// Emit logs as JSON lines instead of human-readable text.
    pub json_logs: bool,
    /// Name and email of the exams officer seeded at startup when none exists.
    pub bootstrap_exams_officer: Option<(String, String)>,
}

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_AUTO_PROGRESS_SECS: u64 = 86_400;

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup. Malformed values
    /// fall back to defaults with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let port = match lookup("PORT") {
            None => DEFAULT_PORT,
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "PORT is not a valid port, using {DEFAULT_PORT}");
                DEFAULT_PORT
            }),
        };

        let interval_secs = match lookup("AUTO_PROGRESS_INTERVAL_SECS") {
            None => DEFAULT_AUTO_PROGRESS_SECS,
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                tracing::warn!(
                    value = %raw,
                    "AUTO_PROGRESS_INTERVAL_SECS is not a number, using {DEFAULT_AUTO_PROGRESS_SECS}"
                );
                DEFAULT_AUTO_PROGRESS_SECS
            }),
        };
        let auto_progress_interval = (interval_secs > 0).then(|| Duration::from_secs(interval_secs));

        let json_logs = lookup("LOG_FORMAT").is_some_and(|v| v.eq_ignore_ascii_case("json"));

        let bootstrap_exams_officer = match (
            lookup("BOOTSTRAP_EXAMS_OFFICER_NAME"),
            lookup("BOOTSTRAP_EXAMS_OFFICER_EMAIL"),
        ) {
            (Some(name), Some(email)) => Some((name, email)),
            _ => None,
        };

        Self {
            port,
            auto_progress_interval,
            json_logs,
            bootstrap_exams_officer,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            auto_progress_interval: Some(Duration::from_secs(DEFAULT_AUTO_PROGRESS_SECS)),
            json_logs: false,
            bootstrap_exams_officer: None,
        }
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field(
                "auto_progress_interval_secs",
                &self.auto_progress_interval.map(|d| d.as_secs()),
            )
            .field("json_logs", &self.json_logs)
            .field(
                "bootstrap_exams_officer",
                &self.bootstrap_exams_officer.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

/// Shared application state passed to all route handlers.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub service: WorkflowService,
    pub config: AppConfig,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AppConfig) -> Self {
        Self {
            service: WorkflowService::default(),
            config,
        }
    }

    /// Use a pre-built service (tests inject one with a fixed clock).
    pub fn with_service(service: WorkflowService, config: AppConfig) -> Self {
        Self { service, config }
    }
}
