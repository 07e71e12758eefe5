//! Keyed routing to lazily created sinks.
//!
//! [`MappedSink`] owns a table of sinks keyed by a value selected from each
//! event. Configure one with [`MappedSinkBuilder`].

pub mod builder;
pub mod sink;
mod table;

pub use builder::MappedSinkBuilder;
pub use sink::MappedSink;
