#![allow(dead_code)]

use sinkmap::{
    BoxError, Sink,
    event::{HasProperties, Level, LogEvent},
    testing::RecordingSink,
};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, Once},
};

// ============================================================================
// Events
// ============================================================================

pub fn greeting(name: &str) -> LogEvent {
    LogEvent::new(Level::Information, "Hello, {Name}!").with_property("Name", name)
}

pub fn anonymous() -> LogEvent {
    LogEvent::new(Level::Information, "Hello, stranger!")
}

// ============================================================================
// Logging
// ============================================================================

static TRACING: Once = Once::new();

/// Route crate logs to the test writer; filter with `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

// ============================================================================
// Per-key Recorders
// ============================================================================

/// Hands out one recording sink per key and remembers which key got which.
#[derive(Clone, Default)]
pub struct Recorders {
    by_key: Arc<Mutex<HashMap<String, Vec<RecordingSink<LogEvent>>>>>,
}

impl Recorders {
    pub fn create(&self, key: &String) -> Result<RecordingSink<LogEvent>, BoxError> {
        let sink = RecordingSink::new();
        self.by_key
            .lock()
            .unwrap()
            .entry(key.clone())
            .or_default()
            .push(sink.clone());
        Ok(sink)
    }

    /// Templates and names seen by every sink built for `key`.
    pub fn names_seen_by(&self, key: &str) -> Vec<Vec<String>> {
        self.by_key
            .lock()
            .unwrap()
            .get(key)
            .map(|sinks| sinks.iter().map(names).collect())
            .unwrap_or_default()
    }
}

fn names(sink: &RecordingSink<LogEvent>) -> Vec<String> {
    sink.events()
        .iter()
        .map(|e| match e.property("Name").and_then(|v| v.as_scalar()) {
            Some(v) => v.to_string(),
            None => String::from("<none>"),
        })
        .collect()
}

/// A sink that keeps the last event it was given, for composition tests.
pub struct LastEvent(pub Arc<Mutex<Option<String>>>);

impl Sink<LogEvent> for LastEvent {
    fn emit(&self, event: &LogEvent) -> Result<(), BoxError> {
        *self.0.lock().unwrap() = Some(event.template().to_string());
        Ok(())
    }
}
