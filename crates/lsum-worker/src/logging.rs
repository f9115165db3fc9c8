//! Structured logging.
//!
//! [`init_tracing`] installs the subscriber for the binary. [`RecordingLogger`]
//! gives per-recording lifecycle events consistent fields.

use tracing::{error, info, warn, Span};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use lsum_models::RecordingId;

/// Install the global subscriber: ANSI text by default, JSON when `LOG_FORMAT=json`.
pub fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("lsum_worker=info,lsum_media=info,warn"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
}

/// Logger carrying the recording and the stage working on it.
#[derive(Debug, Clone)]
pub struct RecordingLogger {
    recording: String,
    operation: String,
}

impl RecordingLogger {
    pub fn new(recording: &RecordingId, operation: &str) -> Self {
        Self {
            recording: recording.to_string(),
            operation: operation.to_string(),
        }
    }

    pub fn log_start(&self, message: &str) {
        info!(
            recording = %self.recording,
            operation = %self.operation,
            "Started: {}", message
        );
    }

    pub fn log_progress(&self, message: &str) {
        info!(
            recording = %self.recording,
            operation = %self.operation,
            "Progress: {}", message
        );
    }

    pub fn log_warning(&self, message: &str) {
        warn!(
            recording = %self.recording,
            operation = %self.operation,
            "Warning: {}", message
        );
    }

    pub fn log_error(&self, message: &str) {
        error!(
            recording = %self.recording,
            operation = %self.operation,
            "Failed: {}", message
        );
    }

    pub fn log_completion(&self, message: &str) {
        info!(
            recording = %self.recording,
            operation = %self.operation,
            "Completed: {}", message
        );
    }

    pub fn recording(&self) -> &str {
        &self.recording
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Span to instrument the recording's futures with.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "recording",
            recording = %self.recording,
            operation = %self.operation
        )
    }
}
