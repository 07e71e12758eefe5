//! Sink factories build one sink for one routing key.

use crate::{error::BoxError, message::Message, selector::RoutingKey, sink::Sink};
use std::marker::PhantomData;

/// Builds a sink for a routing key.
///
/// Called once per cache miss. The factory may have side effects (opening
/// files, connecting sockets) and may fail; failures propagate to the caller
/// of the emit that triggered the miss.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot build sinks for keys of type `{K}`",
    label = "missing `SinkFactory` implementation",
    note = "Wrap a closure with `FnFactory::new` to build sinks ad hoc."
)]
pub trait SinkFactory<K, E>: Send + Sync + 'static {
    /// The sink type produced.
    type Sink: Sink<E>;

    /// Builds the sink that will receive events routed to `key`.
    fn create(&self, key: &K) -> Result<Self::Sink, BoxError>;
}

impl<K, E, F> SinkFactory<K, E> for Box<F>
where
    F: SinkFactory<K, E> + ?Sized,
{
    type Sink = F::Sink;

    fn create(&self, key: &K) -> Result<Self::Sink, BoxError> {
        (**self).create(key)
    }
}

/// A sink factory backed by a closure.
pub struct FnFactory<F, K> {
    f: F,
    _key: PhantomData<fn(&K)>,
}

impl<F, K, S> FnFactory<F, K>
where
    F: Fn(&K) -> Result<S, BoxError> + Send + Sync + 'static,
{
    /// Wraps `f`.
    pub fn new(f: F) -> Self {
        Self {
            f,
            _key: PhantomData,
        }
    }
}

impl<F, K, E, S> SinkFactory<K, E> for FnFactory<F, K>
where
    K: RoutingKey,
    E: Message,
    S: Sink<E>,
    F: Fn(&K) -> Result<S, BoxError> + Send + Sync + 'static,
{
    type Sink = S;

    fn create(&self, key: &K) -> Result<S, BoxError> {
        (self.f)(key)
    }
}
