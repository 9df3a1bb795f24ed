//! Error types for mount device operations.
//!
//! Every error carries an [`ErrorContext`] naming the device operation that
//! failed, so a log line is enough to tell which command went wrong.

use std::fmt;

use crate::models::Axis;

/// Result type for device operations.
pub type DeviceResult<T> = Result<T, DeviceError>;

/// Structured context for device errors.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// The device operation being performed (e.g. "slew_async", "move_axis")
    pub operation: Option<String>,
    /// Axis involved, for jog commands
    pub axis: Option<Axis>,
    /// Additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with an operation name.
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: Some(operation.into()),
            ..Default::default()
        }
    }

    pub fn with_axis(mut self, axis: Axis) -> Self {
        self.axis = Some(axis);
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(ref op) = self.operation {
            parts.push(format!("operation={}", op));
        }
        if let Some(axis) = self.axis {
            parts.push(format!("axis={}", axis));
        }
        if let Some(ref details) = self.details {
            parts.push(format!("details={}", details));
        }
        write!(f, "[{}]", parts.join(", "))
    }
}

/// Error type for mount device operations.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// The device could not be reached or the session could not be opened.
    #[error("Connection error: {message} {context}")]
    ConnectionError {
        message: String,
        context: ErrorContext,
    },

    /// The device rejected or failed a command.
    #[error("Command error: {message} {context}")]
    CommandError {
        message: String,
        context: ErrorContext,
    },

    /// The device session is not open.
    #[error("Device not connected {context}")]
    NotConnected { context: ErrorContext },

    /// Invalid device configuration.
    #[error("Configuration error: {message} {context}")]
    ConfigurationError {
        message: String,
        context: ErrorContext,
    },

    /// Internal/unexpected errors.
    #[error("Internal error: {message} {context}")]
    InternalError {
        message: String,
        context: ErrorContext,
    },
}

impl DeviceError {
    pub fn connection(operation: &str, message: impl Into<String>) -> Self {
        Self::ConnectionError {
            message: message.into(),
            context: ErrorContext::new(operation),
        }
    }

    pub fn command(operation: &str, message: impl Into<String>) -> Self {
        Self::CommandError {
            message: message.into(),
            context: ErrorContext::new(operation),
        }
    }

    pub fn not_connected(operation: &str) -> Self {
        Self::NotConnected {
            context: ErrorContext::new(operation),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
            context: ErrorContext::new("configure"),
        }
    }

    pub fn internal(operation: &str, message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
            context: ErrorContext::new(operation),
        }
    }

    pub fn context(&self) -> &ErrorContext {
        match self {
            Self::ConnectionError { context, .. }
            | Self::CommandError { context, .. }
            | Self::NotConnected { context }
            | Self::ConfigurationError { context, .. }
            | Self::InternalError { context, .. } => context,
        }
    }

    /// Replace the context's axis, keeping the rest.
    pub fn with_axis(mut self, axis: Axis) -> Self {
        match &mut self {
            Self::ConnectionError { context, .. }
            | Self::CommandError { context, .. }
            | Self::NotConnected { context }
            | Self::ConfigurationError { context, .. }
            | Self::InternalError { context, .. } => context.axis = Some(axis),
        }
        self
    }
}
