//! Error types, one enum per concern.

use thiserror::Error;

/// Why a single portal request did not produce data.
///
/// Every variant renders to the human-readable message stored in
/// `LoaderState::error`. `Api` renders as exactly the server's message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// The request never completed (connection refused, DNS, TLS, ...).
    #[error("request failed: {0}")]
    Transport(String),
    /// The response body was not a JSON object.
    #[error("invalid response from server: {0}")]
    Parse(String),
    /// The server answered with `success: false`.
    #[error("{message}")]
    Api {
        message: String,
        /// Per-item messages from the `errors` list, when the server sent one.
        details: Vec<String>,
    },
    /// The envelope was fine but its `data` did not have the expected shape.
    #[error("unexpected response data: {0}")]
    Decode(String),
    /// A newer fetch on the same loader started before this one completed.
    #[error("request was superseded by a newer request")]
    Superseded,
}

impl LoadError {
    pub fn is_superseded(&self) -> bool {
        matches!(self, LoadError::Superseded)
    }
}

/// Problems building the portal HTTP client from configuration.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid portal base URL '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("invalid endpoint '{0}'")]
    InvalidEndpoint(String),
    #[error("invalid header '{0}'")]
    InvalidHeader(String),
    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Reverse-routing failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("no route named '{0}'")]
    UnknownRoute(String),
    #[error("route '{route}' needs parameter '{param}'")]
    MissingParam { route: String, param: String },
}

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid logging.level '{0}'. Valid values: trace, debug, info, warn, error")]
    InvalidLevel(String),
    #[error("invalid logging.format '{0}'. Valid values: json, console")]
    InvalidFormat(String),
    #[error("failed to install log subscriber: {0}")]
    Init(String),
}
