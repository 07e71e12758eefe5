//! Standard key selectors.
//!
//! For ad hoc selection logic, wrap a closure in
//! [`FnSelector`](sinkmap_core::FnSelector) instead.

pub mod property;

pub use property::{FromScalar, PropertySelector};
