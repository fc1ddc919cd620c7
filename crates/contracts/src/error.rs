//! Layered error definitions
//!
//! Categorized by source: config / log / conversion / resource / sink.
//! Per-message errors (malformed record, image conversion, topic type
//! mismatch) are recovered by skipping; the rest abort the run.

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum EvalError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Log Errors =====
    /// Log container cannot be opened
    #[error("cannot open log '{path}': {message}")]
    LogOpen { path: String, message: String },

    /// One record failed to parse mid-stream (recoverable)
    #[error("malformed record in stream '{stream}' at line {line}: {message}")]
    MalformedRecord {
        stream: String,
        line: u64,
        message: String,
    },

    // ===== Conversion Errors =====
    /// Image payload conversion failed (recoverable)
    #[error("image conversion failed for frame {seq}: {message}")]
    ImageConversion { seq: u64, message: String },

    /// Ground-truth topic carried an unexpected payload shape (recoverable)
    #[error("unexpected payload shape on ground-truth topic '{topic}'")]
    TopicTypeMismatch { topic: String },

    // ===== Resource Errors =====
    /// OS resource counters could not be read
    #[error("resource query failed: {message}")]
    ResourceQuery { message: String },

    // ===== Sink Errors =====
    /// Sink write error
    #[error("sink '{sink}' write error: {message}")]
    SinkWrite { sink: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl EvalError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create log open error
    pub fn log_open(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::LogOpen {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create malformed record error
    pub fn malformed_record(
        stream: impl Into<String>,
        line: u64,
        message: impl Into<String>,
    ) -> Self {
        Self::MalformedRecord {
            stream: stream.into(),
            line,
            message: message.into(),
        }
    }

    /// Create sink write error
    pub fn sink_write(sink: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkWrite {
            sink: sink.into(),
            message: message.into(),
        }
    }

    /// Create resource query error
    pub fn resource_query(message: impl Into<String>) -> Self {
        Self::ResourceQuery {
            message: message.into(),
        }
    }

    /// Whether the run can continue after this error by skipping the message
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::MalformedRecord { .. }
                | Self::ImageConversion { .. }
                | Self::TopicTypeMismatch { .. }
        )
    }
}
