//! The mapped sink: a keyed routing cache over lazily created sinks.

use super::{builder::MappedSinkBuilder, table::RoutingTable};
use sinkmap_core::{
    BoxError, KeySelector, Message, Retention, RoutingKey, Sink, SinkFactory, SinkMapError,
};
use std::{
    fmt,
    marker::PhantomData,
    num::NonZeroUsize,
    sync::{Mutex, MutexGuard, PoisonError},
};

/// Routes each event to a sink selected by the event's key.
///
/// Sinks are created through the configured [`SinkFactory`] the first time a
/// key is seen and kept according to the [`Retention`]:
///
/// - [`Retention::Unbounded`]: kept until the mapped sink is disposed.
/// - [`Retention::BoundedCount`]: a new key past the limit evicts (and
///   disposes) an arbitrary other resident sink.
/// - [`Retention::PerEvent`]: created, used once, disposed.
///
/// # Concurrency
///
/// A single mutex guards the table. Lookup, creation, dispatch to the sink
/// and eviction all happen inside it, so at most one event is admitted at a
/// time and a sink is never written to after it has been disposed. A sink
/// must not emit back into the mapped sink that owns it.
pub struct MappedSink<E, K, S>
where
    E: 'static,
    K: RoutingKey,
    S: Sink<E>,
{
    selector: Box<dyn KeySelector<E, Key = K>>,
    factory: Box<dyn SinkFactory<K, E, Sink = S>>,
    retention: Retention,
    state: Mutex<State<K, S>>,
}

struct State<K, S> {
    table: RoutingTable<K, S>,
    disposed: bool,
}

impl<E, K, S> MappedSink<E, K, S>
where
    E: 'static,
    K: RoutingKey,
    S: Sink<E>,
{
    /// Starts configuring a mapped sink.
    pub fn builder() -> MappedSinkBuilder<E, K, S> {
        MappedSinkBuilder::new()
    }

    pub(crate) fn from_parts(
        selector: Box<dyn KeySelector<E, Key = K>>,
        factory: Box<dyn SinkFactory<K, E, Sink = S>>,
        retention: Retention,
    ) -> Self {
        Self {
            selector,
            factory,
            retention,
            state: Mutex::new(State {
                table: RoutingTable::new(),
                disposed: false,
            }),
        }
    }

    /// The retention this mapped sink was configured with.
    pub fn retention(&self) -> Retention {
        self.retention
    }

    /// The number of sinks currently held open.
    pub fn resident_count(&self) -> usize {
        self.lock().table.len()
    }

    /// Returns `true` once [`MappedSink::dispose`] has run.
    pub fn is_disposed(&self) -> bool {
        self.lock().disposed
    }

    /// Routes `event` to the sink for its key, creating the sink if needed.
    ///
    /// Events whose selector yields no key are dropped without error.
    ///
    /// # Errors
    ///
    /// - [`SinkMapError::Disposed`] after [`MappedSink::dispose`].
    /// - [`SinkMapError::Factory`] when the sink cannot be built.
    /// - [`SinkMapError::Emit`] when the sink rejects the event.
    /// - [`SinkMapError::Dispose`] when a sink torn down by this call fails.
    pub fn emit(&self, event: &E) -> Result<(), SinkMapError> {
        let Some(key) = self.selector.select(event) else {
            #[cfg(feature = "tracing")]
            tracing::trace!("no routing key selected, event skipped");
            return Ok(());
        };

        let mut state = self.lock();
        if state.disposed {
            return Err(SinkMapError::Disposed);
        }

        if let Some(sink) = state.table.get(&key) {
            return sink.emit(event).map_err(|source| emit_error(&key, source));
        }

        let sink = self
            .factory
            .create(&key)
            .map_err(|source| SinkMapError::Factory {
                key: render_key(&key),
                source,
            })?;

        #[cfg(feature = "tracing")]
        tracing::debug!(key = ?key, retention = %self.retention, "created sink");

        match self.retention {
            Retention::Unbounded => state
                .table
                .insert(key.clone(), sink)
                .emit(event)
                .map_err(|source| emit_error(&key, source)),
            Retention::BoundedCount(limit) => {
                // Eviction runs on every exit, a panicking sink included.
                let mut evict = EvictOnExit::<E, _, _>::new(&mut state.table, &key, limit);
                let emitted = evict.table.insert(key.clone(), sink).emit(event);
                let evicted = evict.finish();
                settle(&key, emitted, evicted)
            }
            Retention::PerEvent => {
                let once = DisposeOnExit::<E, _, _>::new(&key, sink);
                let emitted = once.sink.emit(event);
                let disposed = once.finish();
                settle(&key, emitted, disposed)
            }
        }
    }

    /// Closes the mapped sink and disposes every resident sink.
    ///
    /// The table is detached under the lock and the sinks are disposed after
    /// it is released. Every sink is attempted even if earlier ones fail.
    /// Calling this again is a no-op.
    ///
    /// # Errors
    ///
    /// [`SinkMapError::Shutdown`] listing each sink that failed to dispose.
    pub fn dispose(&self) -> Result<(), SinkMapError> {
        let detached = {
            let mut state = self.lock();
            if state.disposed {
                return Ok(());
            }
            state.disposed = true;
            state.table.drain()
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(resident = detached.len(), "disposing mapped sink");

        let failures: Vec<SinkMapError> = detached
            .into_iter()
            .filter_map(|(key, mut sink)| {
                sink.dispose().err().map(|source| SinkMapError::Dispose {
                    key: render_key(&key),
                    source,
                })
            })
            .collect();

        if failures.is_empty() {
            Ok(())
        } else {
            Err(SinkMapError::Shutdown(failures))
        }
    }

    // A sink that panicked mid-emit poisons the lock; the table itself is
    // still consistent, so keep going.
    fn lock(&self) -> MutexGuard<'_, State<K, S>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Evicts until the table fits `limit`, never touching `current`.
///
/// Every victim is disposed; the first disposal failure is returned and any
/// further ones are logged.
fn evict_past_limit<E, K, S>(
    table: &mut RoutingTable<K, S>,
    current: &K,
    limit: NonZeroUsize,
) -> Result<(), SinkMapError>
where
    K: RoutingKey,
    S: Sink<E>,
{
    let mut result = Ok(());
    while table.len() > limit.get() {
        let Some((victim, mut sink)) = table.evict_other(current) else {
            break;
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(key = ?victim, current = ?current, "evicted sink");

        if let Err(source) = sink.dispose() {
            let err = SinkMapError::Dispose {
                key: render_key(&victim),
                source,
            };
            if result.is_ok() {
                result = Err(err);
            } else {
                #[cfg(feature = "tracing")]
                tracing::warn!(error = %err, "additional eviction failure");
            }
        }
    }
    result
}

/// Trims the table back to its limit when dropped, unless
/// [`finish`](Self::finish) already did.
struct EvictOnExit<'a, E, K, S>
where
    K: RoutingKey,
    S: Sink<E>,
{
    table: &'a mut RoutingTable<K, S>,
    current: &'a K,
    limit: NonZeroUsize,
    done: bool,
    _event: PhantomData<fn(&E)>,
}

impl<'a, E, K, S> EvictOnExit<'a, E, K, S>
where
    K: RoutingKey,
    S: Sink<E>,
{
    fn new(table: &'a mut RoutingTable<K, S>, current: &'a K, limit: NonZeroUsize) -> Self {
        Self {
            table,
            current,
            limit,
            done: false,
            _event: PhantomData,
        }
    }

    fn finish(mut self) -> Result<(), SinkMapError> {
        self.done = true;
        evict_past_limit::<E, _, _>(&mut *self.table, self.current, self.limit)
    }
}

impl<E, K, S> Drop for EvictOnExit<'_, E, K, S>
where
    K: RoutingKey,
    S: Sink<E>,
{
    fn drop(&mut self) {
        if self.done {
            return;
        }
        if let Err(_err) = evict_past_limit::<E, _, _>(&mut *self.table, self.current, self.limit) {
            #[cfg(feature = "tracing")]
            tracing::warn!(error = %_err, "eviction failed while unwinding");
        }
    }
}

/// Owns a per-event sink and disposes it when dropped, unless
/// [`finish`](Self::finish) already did.
struct DisposeOnExit<'a, E, K, S>
where
    K: RoutingKey,
    S: Sink<E>,
{
    key: &'a K,
    sink: S,
    done: bool,
    _event: PhantomData<fn(&E)>,
}

impl<'a, E, K, S> DisposeOnExit<'a, E, K, S>
where
    K: RoutingKey,
    S: Sink<E>,
{
    fn new(key: &'a K, sink: S) -> Self {
        Self {
            key,
            sink,
            done: false,
            _event: PhantomData,
        }
    }

    fn finish(mut self) -> Result<(), SinkMapError> {
        self.done = true;
        self.dispose()
    }

    fn dispose(&mut self) -> Result<(), SinkMapError> {
        #[cfg(feature = "tracing")]
        tracing::trace!(key = ?self.key, "disposing per-event sink");

        self.sink.dispose().map_err(|source| SinkMapError::Dispose {
            key: render_key(self.key),
            source,
        })
    }
}

impl<E, K, S> Drop for DisposeOnExit<'_, E, K, S>
where
    K: RoutingKey,
    S: Sink<E>,
{
    fn drop(&mut self) {
        if self.done {
            return;
        }
        if let Err(_err) = self.dispose() {
            #[cfg(feature = "tracing")]
            tracing::warn!(error = %_err, "per-event disposal failed while unwinding");
        }
    }
}

/// Combines a dispatch result with the teardown it triggered. A dispatch
/// failure wins; the teardown failure is then only logged.
fn settle<K: RoutingKey>(
    key: &K,
    emitted: Result<(), BoxError>,
    teardown: Result<(), SinkMapError>,
) -> Result<(), SinkMapError> {
    match (emitted, teardown) {
        (Err(source), Err(_teardown_err)) => {
            #[cfg(feature = "tracing")]
            tracing::warn!(key = ?key, error = %_teardown_err, "sink teardown failed after emit failure");
            Err(emit_error(key, source))
        }
        (Err(source), Ok(())) => Err(emit_error(key, source)),
        (Ok(()), teardown) => teardown,
    }
}

fn emit_error<K: RoutingKey>(key: &K, source: BoxError) -> SinkMapError {
    SinkMapError::Emit {
        key: render_key(key),
        source,
    }
}

fn render_key<K: fmt::Debug>(key: &K) -> String {
    format!("{key:?}")
}

impl<E, K, S> Sink<E> for MappedSink<E, K, S>
where
    E: Message,
    K: RoutingKey,
    S: Sink<E>,
{
    fn emit(&self, event: &E) -> Result<(), BoxError> {
        MappedSink::emit(self, event).map_err(|e| Box::new(e) as BoxError)
    }

    fn dispose(&mut self) -> Result<(), BoxError> {
        MappedSink::dispose(self).map_err(|e| Box::new(e) as BoxError)
    }
}

impl<E, K, S> Drop for MappedSink<E, K, S>
where
    E: 'static,
    K: RoutingKey,
    S: Sink<E>,
{
    fn drop(&mut self) {
        if let Err(_err) = MappedSink::dispose(self) {
            #[cfg(feature = "tracing")]
            tracing::warn!(error = %_err, "mapped sink dropped with failing sinks");
        }
    }
}

impl<E, K, S> fmt::Debug for MappedSink<E, K, S>
where
    E: 'static,
    K: RoutingKey,
    S: Sink<E>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("MappedSink")
            .field("retention", &self.retention)
            .field("resident", &state.table.len())
            .field("disposed", &state.disposed)
            .finish_non_exhaustive()
    }
}
