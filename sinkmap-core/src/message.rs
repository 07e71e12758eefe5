//! The bound shared by every routed event type.

/// Marks a type as an event a mapped sink can route.
///
/// A mapped sink is shared between threads and holds boxed selectors and
/// factories, so its events must be `Send + Sync + 'static`.
///
/// # Example
///
/// ```rust,ignore
/// struct AuditRecord { tenant: String }
///
/// impl Message for AuditRecord {}
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be routed by a mapped sink",
    label = "routed events must be `Send + Sync + 'static`",
    note = "implement `Message` for your event type"
)]
pub trait Message: Send + Sync + 'static {}

// Plain-text events and the unit event used by tests.
impl Message for String {}
impl Message for () {}
