//! # sinkmap-core
//!
//! Core traits for keyed sink routing.
//!
//! This crate has minimal dependencies and is meant to be imported by sink
//! implementations that don't need the full `sinkmap-std` machinery.
//!
//! # Collaborators
//!
//! A mapped sink routes each event to one of many downstream sinks. It only
//! needs three things from the outside world:
//!
//! - A [`KeySelector`] that derives a routing key from an event (or skips it).
//! - A [`SinkFactory`] that builds a [`Sink`] for a key on first use.
//! - The [`Sink`] itself, which accepts events and can be disposed.
//!
//! How long created sinks stay resident is governed by a [`Retention`].
//!
//! # Error Types
//!
//! - [`SinkMapError`] - Routing and lifecycle failures
//! - [`ConfigError`] - Configuration rejected at build time
//! - [`BoxError`] - Opaque collaborator failures

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod error;
mod factory;
mod message;
mod retention;
mod selector;
mod sink;

// Re-exports
pub use error::{BoxError, ConfigError, SinkMapError};
pub use factory::{FnFactory, SinkFactory};
pub use message::Message;
pub use retention::{Retention, SinkLifetime};
pub use selector::{FnSelector, KeySelector, RoutingKey};
pub use sink::{BoxSink, Filter, Sink, SinkExt};
