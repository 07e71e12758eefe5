//! # sinkmap-std
//!
//! Standard implementations for keyed sink routing.
//!
//! This crate provides:
//! - **Mapped sink**: [`MappedSink`](map::MappedSink) and its builder
//! - **Event model**: [`LogEvent`](event::LogEvent), levels and property values
//! - **Selectors**: [`PropertySelector`](selectors::PropertySelector)
//! - **Level filtering**: [`LevelSwitch`](level::LevelSwitch)
//! - **Utility sinks**: [`NullSink`](sinks::NullSink), [`FnSink`](sinks::FnSink)
//! - **Test doubles**: the [`testing`] module

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core traits
pub use sinkmap_core;

// Modules
pub mod event;
pub mod level;
pub mod map;
pub mod selectors;
pub mod sinks;
pub mod testing;
