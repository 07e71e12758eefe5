//! # Sink
//!
//! A sink is the terminal consumer of routed events: a file writer, a network
//! forwarder, an in-memory buffer. The routing layer treats it as opaque and
//! relies on exactly two capabilities:
//!
//! - [`Sink::emit`] accepts one event at a time.
//! - [`Sink::dispose`] tears the sink down. Callers in this workspace invoke
//!   it at most once per sink, so implementations need not be idempotent.
//!
//! Sinks may buffer internally; the routing layer only serializes admission.
//!
//! # Combinators
//!
//! [`SinkExt`] offers declarative wrappers (`filter`, `boxed`) that are
//! themselves sinks.

use crate::{error::BoxError, message::Message};

/// A consumer of events.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a `Sink` for `{E}`",
    label = "missing `Sink` implementation",
    note = "Sinks must implement the `emit` method to consume `{E}`."
)]
pub trait Sink<E: ?Sized>: Send + Sync + 'static {
    /// Writes one event to the sink.
    fn emit(&self, event: &E) -> Result<(), BoxError>;

    /// Releases the sink's resources.
    ///
    /// The default implementation does nothing.
    fn dispose(&mut self) -> Result<(), BoxError> {
        Ok(())
    }
}

/// A type-erased sink.
pub type BoxSink<E> = Box<dyn Sink<E>>;

impl<E, S> Sink<E> for Box<S>
where
    E: ?Sized,
    S: Sink<E> + ?Sized,
{
    fn emit(&self, event: &E) -> Result<(), BoxError> {
        (**self).emit(event)
    }

    fn dispose(&mut self) -> Result<(), BoxError> {
        (**self).dispose()
    }
}

/// Declarative combinators over [`Sink`].
pub trait SinkExt<E: Message>: Sink<E> + Sized {
    /// Only forwards events for which `predicate` returns `true`.
    fn filter<F>(self, predicate: F) -> Filter<Self, F>
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        Filter {
            sink: self,
            predicate,
        }
    }

    /// Boxes the sink.
    fn boxed(self) -> BoxSink<E> {
        Box::new(self)
    }
}

impl<E: Message, S: Sink<E>> SinkExt<E> for S {}

/// A sink that drops events rejected by a predicate.
pub struct Filter<S, F> {
    sink: S,
    predicate: F,
}

impl<S, F> Filter<S, F> {
    /// Returns the wrapped sink.
    pub fn inner(&self) -> &S {
        &self.sink
    }
}

impl<E, S, F> Sink<E> for Filter<S, F>
where
    E: Message,
    S: Sink<E>,
    F: Fn(&E) -> bool + Send + Sync + 'static,
{
    fn emit(&self, event: &E) -> Result<(), BoxError> {
        if (self.predicate)(event) {
            self.sink.emit(event)
        } else {
            Ok(())
        }
    }

    fn dispose(&mut self) -> Result<(), BoxError> {
        self.sink.dispose()
    }
}
