//! Error types for sinkmap.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`SinkMapError`] - Failures raised while routing events to mapped sinks
//! - [`ConfigError`] - Invalid configuration, rejected before any event is seen
//! - [`BoxError`] - Opaque failures from collaborators (factories, sinks)

use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while emitting to or disposing a mapped sink.
#[derive(Error, Debug)]
pub enum SinkMapError {
    /// The mapped sink was disposed; no further events are accepted.
    #[error("the mapped sink has been disposed")]
    Disposed,

    /// The sink factory failed to build a sink for a key.
    #[error("sink factory failed for key {key}")]
    Factory {
        /// Debug rendering of the routing key.
        key: String,
        /// The factory's error.
        #[source]
        source: BoxError,
    },

    /// A routed sink failed to accept an event.
    #[error("sink for key {key} failed to emit")]
    Emit {
        /// Debug rendering of the routing key.
        key: String,
        /// The sink's error.
        #[source]
        source: BoxError,
    },

    /// A routed sink failed while being torn down.
    #[error("sink for key {key} failed to dispose")]
    Dispose {
        /// Debug rendering of the routing key.
        key: String,
        /// The sink's error.
        #[source]
        source: BoxError,
    },

    /// One or more resident sinks failed during shutdown.
    ///
    /// Every resident sink is still disposed; this collects all failures.
    #[error("{} sink(s) failed to dispose during shutdown", .0.len())]
    Shutdown(Vec<SinkMapError>),
}

impl SinkMapError {
    /// Returns `true` if this error reports use after disposal.
    pub fn is_disposed(&self) -> bool {
        matches!(self, SinkMapError::Disposed)
    }
}

/// Errors reported when a mapped sink is configured incorrectly.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No key selector was supplied.
    #[error("a key selector is required")]
    MissingKeySelector,

    /// No sink factory was supplied.
    #[error("a sink factory is required")]
    MissingFactory,

    /// The sink count limit was negative.
    #[error("sink map count limit must not be negative, got {0}")]
    NegativeCountLimit(i64),

    /// The key property name was empty.
    #[error("key property name must not be empty")]
    EmptyPropertyName,

    /// A key selector was supplied more than once.
    #[error("a key selector is already configured")]
    ConflictingKeySelector,

    /// Retention was selected more than once.
    #[error("retention already configured as {existing}, cannot also set {requested}")]
    ConflictingRetention {
        /// The retention chosen first.
        existing: String,
        /// The retention requested afterwards.
        requested: String,
    },
}
