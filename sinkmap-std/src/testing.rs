//! Testing utilities for sinkmap.
//!
//! This module provides doubles for exercising mapped sinks without real
//! downstream sinks.
//!
//! # Features
//!
//! - [`RecordingSink`]: A sink that records all events it receives
//! - [`DisposeTrackingSink`]: A sink that counts emits and disposals, and can
//!   be told to fail or panic
//! - [`CountingFactory`]: A factory that builds tracking sinks and remembers
//!   every sink it created, per key

use sinkmap_core::{BoxError, Message, RoutingKey, Sink, SinkFactory};
use std::sync::{
    Arc, Mutex, PoisonError,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

// ============================================================================
// Recording Sink
// ============================================================================

/// A sink that records all events it receives.
///
/// Clones share the same record.
///
/// # Example
///
/// ```rust,ignore
/// let recorder = RecordingSink::<LogEvent>::new();
/// let sink = recorder.clone();
///
/// sink.emit(&event)?;
///
/// assert_eq!(recorder.count(), 1);
/// ```
pub struct RecordingSink<E> {
    events: Arc<Mutex<Vec<E>>>,
    disposals: Arc<AtomicUsize>,
}

impl<E: Clone> RecordingSink<E> {
    /// Create a new, empty recording sink.
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
            disposals: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Get a clone of the recorded events.
    pub fn events(&self) -> Vec<E> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Get the number of recorded events.
    pub fn count(&self) -> usize {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// How many times any clone was disposed.
    pub fn disposals(&self) -> usize {
        self.disposals.load(Ordering::SeqCst)
    }
}

impl<E: Clone> Default for RecordingSink<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for RecordingSink<E> {
    fn clone(&self) -> Self {
        Self {
            events: self.events.clone(),
            disposals: self.disposals.clone(),
        }
    }
}

impl<E: Message + Clone> Sink<E> for RecordingSink<E> {
    fn emit(&self, event: &E) -> Result<(), BoxError> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).push(event.clone());
        Ok(())
    }

    fn dispose(&mut self) -> Result<(), BoxError> {
        self.disposals.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ============================================================================
// Dispose Tracking Sink
// ============================================================================

/// Shared counters observed through a [`DisposeTrackingSink`].
#[derive(Debug, Default)]
pub struct SinkProbe {
    id: usize,
    emitted: AtomicUsize,
    disposed: AtomicUsize,
}

impl SinkProbe {
    /// Creation order of the sink, starting at 0.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Events the sink accepted (or rejected, when failing).
    pub fn emitted(&self) -> usize {
        self.emitted.load(Ordering::SeqCst)
    }

    /// How many times the sink was disposed.
    pub fn disposed(&self) -> usize {
        self.disposed.load(Ordering::SeqCst)
    }

    /// Returns `true` if the sink was disposed at least once.
    pub fn is_disposed(&self) -> bool {
        self.disposed() > 0
    }
}

/// A sink that counts emits and disposals, optionally failing either.
pub struct DisposeTrackingSink {
    probe: Arc<SinkProbe>,
    fail_emit: bool,
    panic_emit: bool,
    fail_dispose: bool,
}

impl DisposeTrackingSink {
    /// Create a tracking sink and the probe that observes it.
    pub fn new(id: usize) -> (Self, Arc<SinkProbe>) {
        let probe = Arc::new(SinkProbe {
            id,
            ..SinkProbe::default()
        });
        let sink = Self {
            probe: probe.clone(),
            fail_emit: false,
            panic_emit: false,
            fail_dispose: false,
        };
        (sink, probe)
    }

    /// Make every emit fail.
    pub fn failing_emit(mut self) -> Self {
        self.fail_emit = true;
        self
    }

    /// Make every emit panic after it is counted.
    pub fn panicking_emit(mut self) -> Self {
        self.panic_emit = true;
        self
    }

    /// Make disposal fail (it is still counted).
    pub fn failing_dispose(mut self) -> Self {
        self.fail_dispose = true;
        self
    }
}

impl<E: ?Sized> Sink<E> for DisposeTrackingSink {
    fn emit(&self, _event: &E) -> Result<(), BoxError> {
        self.probe.emitted.fetch_add(1, Ordering::SeqCst);
        if self.probe.is_disposed() {
            return Err(format!("sink {} used after disposal", self.probe.id).into());
        }
        if self.panic_emit {
            panic!("sink {} panicked while emitting", self.probe.id);
        }
        if self.fail_emit {
            return Err(format!("sink {} rejected the event", self.probe.id).into());
        }
        Ok(())
    }

    fn dispose(&mut self) -> Result<(), BoxError> {
        self.probe.disposed.fetch_add(1, Ordering::SeqCst);
        if self.fail_dispose {
            return Err(format!("sink {} failed to close", self.probe.id).into());
        }
        Ok(())
    }
}

// ============================================================================
// Counting Factory
// ============================================================================

/// A factory that builds [`DisposeTrackingSink`]s and keeps their probes.
///
/// Clones share the same record, so a test can hand one clone to the mapped
/// sink and inspect the other.
///
/// # Example
///
/// ```rust,ignore
/// let factory = CountingFactory::<String>::new();
/// let map = MappedSink::builder()
///     .key_property("Name", String::new())
///     .factory(factory.clone())
///     .build()?;
///
/// map.emit(&event)?;
/// assert_eq!(factory.created(), 1);
/// ```
pub struct CountingFactory<K> {
    created: Arc<Mutex<Vec<(K, Arc<SinkProbe>)>>>,
    fail_create: Arc<Mutex<Vec<K>>>,
    fail_emit: Arc<AtomicBool>,
    panic_emit: Arc<AtomicBool>,
    fail_dispose: Arc<AtomicBool>,
}

impl<K: RoutingKey> CountingFactory<K> {
    /// Create a factory whose sinks always succeed.
    pub fn new() -> Self {
        Self {
            created: Arc::new(Mutex::new(Vec::new())),
            fail_create: Arc::new(Mutex::new(Vec::new())),
            fail_emit: Arc::new(AtomicBool::new(false)),
            panic_emit: Arc::new(AtomicBool::new(false)),
            fail_dispose: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Number of sinks built so far.
    pub fn created(&self) -> usize {
        self.created.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Every sink built so far, in creation order.
    pub fn probes(&self) -> Vec<(K, Arc<SinkProbe>)> {
        self.created.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// The sinks built for `key`, in creation order.
    pub fn probes_for(&self, key: &K) -> Vec<Arc<SinkProbe>> {
        self.created
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, p)| p.clone())
            .collect()
    }

    /// Sinks built but not yet disposed.
    pub fn live(&self) -> usize {
        self.created
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(_, p)| !p.is_disposed())
            .count()
    }

    /// Make creation fail for `key`.
    pub fn fail_creation_for(&self, key: K) {
        self.fail_create.lock().unwrap_or_else(PoisonError::into_inner).push(key);
    }

    /// Make sinks built from now on fail every emit.
    pub fn fail_emits(&self, fail: bool) {
        self.fail_emit.store(fail, Ordering::SeqCst);
    }

    /// Make sinks built from now on panic on every emit.
    pub fn panic_emits(&self, panic: bool) {
        self.panic_emit.store(panic, Ordering::SeqCst);
    }

    /// Make sinks built from now on fail disposal.
    pub fn fail_disposals(&self, fail: bool) {
        self.fail_dispose.store(fail, Ordering::SeqCst);
    }
}

impl<K: RoutingKey> Default for CountingFactory<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Clone for CountingFactory<K> {
    fn clone(&self) -> Self {
        Self {
            created: self.created.clone(),
            fail_create: self.fail_create.clone(),
            fail_emit: self.fail_emit.clone(),
            panic_emit: self.panic_emit.clone(),
            fail_dispose: self.fail_dispose.clone(),
        }
    }
}

impl<K, E> SinkFactory<K, E> for CountingFactory<K>
where
    K: RoutingKey,
    E: Message,
{
    type Sink = DisposeTrackingSink;

    fn create(&self, key: &K) -> Result<DisposeTrackingSink, BoxError> {
        if self.fail_create.lock().unwrap_or_else(PoisonError::into_inner).contains(key) {
            return Err(format!("cannot build sink for {key:?}").into());
        }

        let mut created = self.created.lock().unwrap_or_else(PoisonError::into_inner);
        let (mut sink, probe) = DisposeTrackingSink::new(created.len());
        if self.fail_emit.load(Ordering::SeqCst) {
            sink = sink.failing_emit();
        }
        if self.panic_emit.load(Ordering::SeqCst) {
            sink = sink.panicking_emit();
        }
        if self.fail_dispose.load(Ordering::SeqCst) {
            sink = sink.failing_dispose();
        }
        created.push((key.clone(), probe));
        Ok(sink)
    }
}
