//! # sinkmap - Keyed Sink Routing
//!
//! `sinkmap` dispatches structured log events to downstream sinks selected
//! by a key taken from each event. Sinks are created on first use by a
//! factory, reused while resident, and torn down according to a retention
//! policy: kept for the life of the pipeline, capped at a count, or created
//! per event.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sinkmap::prelude::*;
//!
//! let map = MappedSink::builder()
//!     .key_property("Tenant", String::from("shared"))
//!     .factory_fn(|tenant: &String| Ok(open_tenant_log(tenant)?))
//!     .count_limit(32)
//!     .build()?;
//!
//! map.emit(&LogEvent::new(Level::Information, "Signed in")
//!     .with_property("Tenant", "acme"))?;
//!
//! map.dispose()?;
//! ```

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

pub use sinkmap_core::{
    // Error types
    BoxError,
    // Sink
    BoxSink,
    ConfigError,
    Filter,
    // Factory
    FnFactory,
    // Selection
    FnSelector,
    KeySelector,
    // Message
    Message,
    // Retention
    Retention,
    RoutingKey,
    Sink,
    SinkExt,
    SinkFactory,
    SinkLifetime,
    SinkMapError,
};

// Mapped sink
pub use sinkmap_std::map::{MappedSink, MappedSinkBuilder};

/// Structured event model.
pub mod event {
    pub use sinkmap_std::event::{
        HasLevel, HasProperties, Level, LogEvent, LogValue, ParseLevelError, ScalarValue,
    };
}

/// Standard key selectors.
pub mod selectors {
    pub use sinkmap_std::selectors::{FromScalar, PropertySelector};
}

/// Minimum-level filtering.
pub mod level {
    pub use sinkmap_std::level::{LevelSinkExt, LevelSwitch, Restricted};
}

/// Utility sinks.
pub mod sinks {
    pub use sinkmap_std::sinks::{FnSink, NullSink};
}

/// Testing utilities.
pub mod testing {
    #![allow(clippy::wildcard_imports)]
    pub use sinkmap_std::testing::*;
}

/// Prelude module - common imports for sinkmap.
///
/// # Usage
///
/// ```rust,ignore
/// use sinkmap::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Errors
        BoxError,
        ConfigError,
        // Core traits
        KeySelector,
        // Mapped sink
        MappedSink,
        MappedSinkBuilder,
        Message,
        // Retention
        Retention,
        Sink,
        SinkExt,
        SinkFactory,
        SinkLifetime,
        SinkMapError,
        // Event model
        event::{HasLevel, HasProperties, Level, LogEvent, ScalarValue},
        level::{LevelSinkExt, LevelSwitch},
        selectors::PropertySelector,
    };
}
