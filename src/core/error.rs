//! Error types for the log shipper

pub type Result<T> = std::result::Result<T, ShipperError>;

#[derive(Debug, thiserror::Error)]
pub enum ShipperError {
    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Gzip compression of a batch failed
    #[error("Compression failed: {message}")]
    Compression {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Request could not be delivered (DNS, TLS, timeout, connection reset)
    #[error("Transport error for '{endpoint}': {message}")]
    Transport { endpoint: String, message: String },

    /// Collector answered with a non-success status
    #[error("Collector '{endpoint}' rejected batch with status {status}")]
    HttpStatus { endpoint: String, status: u16 },

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// Endpoint URL failed to parse
    #[error("Invalid endpoint URL: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl ShipperError {
    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        ShipperError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a compression error
    pub fn compression(message: impl Into<String>, source: std::io::Error) -> Self {
        ShipperError::Compression {
            message: message.into(),
            source,
        }
    }

    /// Create a transport error
    pub fn transport(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        ShipperError::Transport {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(endpoint: impl Into<String>, status: u16) -> Self {
        ShipperError::HttpStatus {
            endpoint: endpoint.into(),
            status,
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        ShipperError::Other(msg.into())
    }
}
