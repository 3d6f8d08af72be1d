use thiserror::Error;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Remote error ({status}): {message}")]
    RemoteTransport { status: u16, message: String },

    #[error("Remote timeout: {message}")]
    RemoteTimeout { message: String },

    #[error("Remote permission denied: {message}")]
    RemotePermissionDenied { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn remote(status: u16, message: impl Into<String>) -> Self {
        Self::RemoteTransport {
            status,
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::RemoteTimeout {
            message: message.into(),
        }
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::RemotePermissionDenied {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// HTTP-like status code carried by (or implied by) this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::RemoteTransport { status, .. } => *status,
            Self::RemoteTimeout { .. } => 408,
            Self::RemotePermissionDenied { .. } => 403,
            Self::Validation { .. } => 400,
            Self::Configuration { .. } | Self::Serialization { .. } | Self::Internal { .. } => 500,
        }
    }

    /// Short label used for logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RemoteTransport { .. } => "remote_transport",
            Self::RemoteTimeout { .. } => "remote_timeout",
            Self::RemotePermissionDenied { .. } => "remote_permission_denied",
            Self::Validation { .. } => "validation",
            Self::Configuration { .. } => "configuration",
            Self::Serialization { .. } => "serialization",
            Self::Internal { .. } => "internal",
        }
    }

    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::RemotePermissionDenied { .. })
    }
}
