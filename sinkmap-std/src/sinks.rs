//! Utility sinks.

use sinkmap_core::{BoxError, Message, Sink};
use std::marker::PhantomData;

/// A sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl<E: ?Sized> Sink<E> for NullSink {
    fn emit(&self, _event: &E) -> Result<(), BoxError> {
        Ok(())
    }
}

/// A sink that hands every event to a closure.
pub struct FnSink<F, E> {
    write: F,
    _event: PhantomData<fn(&E)>,
}

impl<F, E> FnSink<F, E>
where
    F: Fn(&E) -> Result<(), BoxError> + Send + Sync + 'static,
{
    /// Create a sink that calls `write` for each event.
    pub fn new(write: F) -> Self {
        Self {
            write,
            _event: PhantomData,
        }
    }
}

impl<F, E> Sink<E> for FnSink<F, E>
where
    E: Message,
    F: Fn(&E) -> Result<(), BoxError> + Send + Sync + 'static,
{
    fn emit(&self, event: &E) -> Result<(), BoxError> {
        (self.write)(event)
    }
}
