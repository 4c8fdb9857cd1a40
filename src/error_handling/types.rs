//! Error type definitions.
//!
//! This module defines the gateway error taxonomy, the import-level errors, and
//! the counter categories used for end-of-run statistics.

use std::time::Duration;

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),

    /// The remote API base URL could not be parsed.
    #[error("Invalid API base URL '{0}'")]
    InvalidBaseUrlError(String),
}

/// A throttling response from the remote API.
///
/// Carries the advisory wait (when the server sent one) and a label identifying the
/// request that was throttled, for log correlation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThrottleSignal {
    /// Advisory wait parsed from `Retry-After`, if present and understood
    pub retry_after: Option<Duration>,
    /// Opaque identifier of the originating request
    pub request: String,
}

impl ThrottleSignal {
    /// Creates a signal for `request` with an optional advisory wait.
    pub fn new(request: impl Into<String>, retry_after: Option<Duration>) -> Self {
        Self {
            retry_after,
            request: request.into(),
        }
    }

    /// The wait to honor: the advisory value, or `default` when the header was absent.
    pub fn wait(&self, default: Duration) -> Duration {
        self.retry_after.unwrap_or(default)
    }
}

/// Failure of a single outbound call through the gateway.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The server throttled the call (HTTP 429).
    #[error("Throttled by remote API (request: {}, retry after: {:?})", .0.request, .0.retry_after)]
    Throttled(ThrottleSignal),

    /// A 4xx response other than throttling. Never retried.
    #[error("Client error {status}: {message}")]
    ClientError {
        /// HTTP status code
        status: u16,
        /// Response body or reason phrase
        message: String,
    },

    /// A 5xx response. Retried and counted toward the breaker's failure threshold.
    #[error("Server error {status}: {message}")]
    ServerError {
        /// HTTP status code
        status: u16,
        /// Response body or reason phrase
        message: String,
    },

    /// Transport-level failure (connect, timeout, reset).
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Rejected without being issued because the traffic breaker is open.
    #[error("Circuit open: outbound traffic is paused")]
    CircuitOpen,

    /// No permit could be obtained within the gate timeout.
    #[error("Rate exceeded: no permit available within {waited:?}")]
    RateExceeded {
        /// The admission timeout that would have been exceeded
        waited: Duration,
    },

    /// The response body could not be decoded. Never retried.
    #[error("Response decode error: {0}")]
    Decode(String),
}

impl GatewayError {
    /// Whether the general retry layer should resubmit the call.
    ///
    /// Everything is transient except non-throttling client errors and undecodable
    /// responses, which would fail the same way on every attempt.
    pub fn is_retriable(&self) -> bool {
        !matches!(
            self,
            GatewayError::ClientError { .. } | GatewayError::Decode(_)
        )
    }

    /// Whether this is a confirmed throttling response.
    pub fn is_throttle(&self) -> bool {
        matches!(self, GatewayError::Throttled(_))
    }

    /// Whether this failure counts toward opening the breaker (5xx or transport).
    pub fn is_breaker_failure(&self) -> bool {
        matches!(
            self,
            GatewayError::ServerError { .. } | GatewayError::NetworkError(_)
        )
    }
}

/// Errors that abort a whole import.
#[derive(Error, Debug)]
pub enum ImportError {
    /// No parser recognizes the uploaded file.
    #[error("Unsupported playlist format: {0}")]
    UnsupportedFormat(String),

    /// The file parsed, but contained no tracks.
    #[error("Playlist contains no tracks")]
    EmptyPlaylist,

    /// The playlist file could not be read.
    #[error("Failed to read playlist file: {0}")]
    Io(#[from] std::io::Error),

    /// The iTunes library document is malformed.
    #[error("Malformed iTunes library: {0}")]
    Xml(String),

    /// A new playlist was requested but no name could be derived.
    #[error("Cannot determine a name for the new playlist")]
    MissingPlaylistName,

    /// The caller cancelled the import.
    #[error("Import cancelled")]
    Cancelled,

    /// A call the whole import depends on failed (user lookup, playlist creation).
    #[error("Remote API call failed: {0}")]
    Gateway(#[from] GatewayError),
}

/// Gateway error categories counted during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum ErrorType {
    Throttled,
    ClientError,
    ServerError,
    NetworkError,
    CircuitOpen,
    RateExceeded,
    DecodeError,
}

/// Per-item or per-batch problems that do not abort the import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum WarningType {
    /// A track could not be matched to a remote id
    UnresolvedTrack,
    /// A bulk-apply batch failed definitively
    BatchFailed,
}

/// Notable gateway events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum InfoType {
    /// The adaptive controller shrank the permit budget
    BudgetShrink,
    /// A throttling response forced the breaker open
    BreakerForcedOpen,
    /// Consecutive failures opened the breaker
    BreakerOpened,
    /// A call was resubmitted by a retry layer
    RetryAttempt,
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ErrorType {
    /// Returns a human-readable string representation of the error type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::Throttled => "Throttled (429)",
            ErrorType::ClientError => "Client error (4xx)",
            ErrorType::ServerError => "Server error (5xx)",
            ErrorType::NetworkError => "Network error",
            ErrorType::CircuitOpen => "Circuit open rejection",
            ErrorType::RateExceeded => "Rate exceeded at gate",
            ErrorType::DecodeError => "Response decode error",
        }
    }
}

impl WarningType {
    /// Returns a human-readable string representation of the warning type.
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningType::UnresolvedTrack => "Unresolved track",
            WarningType::BatchFailed => "Failed batch",
        }
    }
}

impl InfoType {
    /// Returns a human-readable string representation of the info type.
    pub fn as_str(&self) -> &'static str {
        match self {
            InfoType::BudgetShrink => "Budget shrink",
            InfoType::BreakerForcedOpen => "Breaker forced open",
            InfoType::BreakerOpened => "Breaker opened on failures",
            InfoType::RetryAttempt => "Retry attempt",
        }
    }
}
