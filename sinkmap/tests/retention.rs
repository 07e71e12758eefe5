use sinkmap::{
    MappedSink, Retention, SinkLifetime, SinkMapError,
    event::LogEvent,
    testing::{CountingFactory, DisposeTrackingSink},
};
use std::{
    panic::{AssertUnwindSafe, catch_unwind},
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

mod common;
use common::{greeting, init_tracing};

fn mapped(
    factory: &CountingFactory<String>,
    limit: Option<i64>,
) -> MappedSink<LogEvent, String, DisposeTrackingSink> {
    let builder = MappedSink::builder()
        .key_property("Name", String::new())
        .factory(factory.clone());
    let builder = match limit {
        Some(n) => builder.count_limit(n),
        None => builder,
    };
    builder.build().unwrap()
}

#[test]
fn test_pipeline_lifetime_retains_sinks() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    let map = MappedSink::<LogEvent, String, _>::builder()
        .key_property("Name", String::new())
        .factory_fn(move |_: &String| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(sinkmap::sinks::NullSink)
        })
        .lifetime(SinkLifetime::Pipeline)
        .build()
        .unwrap();

    map.emit(&greeting("Alice")).unwrap();
    map.emit(&greeting("Alice")).unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_event_lifetime_recycles_sinks() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    let map = MappedSink::<LogEvent, String, _>::builder()
        .key_property("Name", String::new())
        .factory_fn(move |_: &String| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(sinkmap::sinks::NullSink)
        })
        .lifetime(SinkLifetime::Event)
        .build()
        .unwrap();

    map.emit(&greeting("Alice")).unwrap();
    map.emit(&greeting("Alice")).unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_unbounded_creates_one_sink_per_key() {
    let factory = CountingFactory::new();
    let map = mapped(&factory, None);

    for _ in 0..100 {
        map.emit(&greeting("Alice")).unwrap();
    }

    assert_eq!(factory.created(), 1);
    assert_eq!(map.resident_count(), 1);
    assert_eq!(map.retention(), Retention::Unbounded);
}

#[test]
fn test_limit_one_reuses_resident_sink() {
    let factory = CountingFactory::new();
    let map = mapped(&factory, Some(1));

    map.emit(&greeting("Alice")).unwrap();
    map.emit(&greeting("Alice")).unwrap();

    assert_eq!(factory.created(), 1);
}

#[test]
fn test_limit_one_alice_bob_alice_creates_three() {
    init_tracing();
    let factory = CountingFactory::new();
    let map = mapped(&factory, Some(1));

    map.emit(&greeting("Alice")).unwrap();
    map.emit(&greeting("Bob")).unwrap();
    map.emit(&greeting("Alice")).unwrap();

    assert_eq!(factory.created(), 3);
    assert_eq!(map.resident_count(), 1);
    assert_eq!(map.retention().limit(), Some(1));
}

#[test]
fn test_eviction_disposes_the_evicted_sink() {
    let factory = CountingFactory::new();
    let map = mapped(&factory, Some(1));

    map.emit(&greeting("Alice")).unwrap();
    map.emit(&greeting("Bob")).unwrap();

    let alice = factory.probes_for(&"Alice".to_string())[0].clone();
    let bob = factory.probes_for(&"Bob".to_string())[0].clone();
    assert_eq!(alice.disposed(), 1);
    assert!(!bob.is_disposed());
}

#[test]
fn test_full_table_evicts_a_previous_entry() {
    let factory = CountingFactory::new();
    let map = mapped(&factory, Some(2));

    map.emit(&greeting("Alice")).unwrap();
    map.emit(&greeting("Bob")).unwrap();
    map.emit(&greeting("Carol")).unwrap();

    assert_eq!(map.resident_count(), 2);
    assert_eq!(factory.live(), 2);

    // Carol was just inserted and must survive; exactly one of the
    // previous two was evicted.
    let carol = factory.probes_for(&"Carol".to_string())[0].clone();
    assert!(!carol.is_disposed());
    let evicted: Vec<_> = ["Alice", "Bob"]
        .iter()
        .filter(|name| factory.probes_for(&name.to_string())[0].is_disposed())
        .collect();
    assert_eq!(evicted.len(), 1);

    // The survivor is still resident and reused.
    map.emit(&greeting("Carol")).unwrap();
    assert_eq!(carol.emitted(), 2);
    assert_eq!(factory.created(), 3);
}

#[test]
fn test_resident_count_never_exceeds_limit() {
    let factory = CountingFactory::new();
    let map = mapped(&factory, Some(3));

    for i in 0..50 {
        map.emit(&greeting(&format!("user-{}", i % 7))).unwrap();
        assert!(map.resident_count() <= 3);
    }
    assert_eq!(factory.live(), map.resident_count());
}

#[test]
fn test_limit_zero_creates_and_disposes_per_event() {
    let factory = CountingFactory::new();
    let map = mapped(&factory, Some(0));
    assert_eq!(map.retention(), Retention::PerEvent);

    for _ in 0..5 {
        map.emit(&greeting("Alice")).unwrap();
    }

    assert_eq!(factory.created(), 5);
    assert_eq!(map.resident_count(), 0);
    for (_, probe) in factory.probes() {
        assert_eq!(probe.emitted(), 1);
        assert_eq!(probe.disposed(), 1);
    }
}

#[test]
fn test_per_event_disposes_even_when_emit_fails() {
    let factory = CountingFactory::new();
    factory.fail_emits(true);
    let map = mapped(&factory, Some(0));

    let err = map.emit(&greeting("Alice")).unwrap_err();

    assert!(matches!(err, SinkMapError::Emit { .. }));
    assert_eq!(factory.probes()[0].1.disposed(), 1);
}

#[test]
fn test_eviction_runs_even_when_emit_fails() {
    let factory = CountingFactory::new();
    let map = mapped(&factory, Some(1));

    map.emit(&greeting("Alice")).unwrap();
    factory.fail_emits(true);
    let err = map.emit(&greeting("Bob")).unwrap_err();

    assert!(matches!(err, SinkMapError::Emit { ref key, .. } if key == "\"Bob\""));
    assert!(factory.probes_for(&"Alice".to_string())[0].is_disposed());
    assert_eq!(map.resident_count(), 1);
}

#[test]
fn test_eviction_dispose_failure_is_reported() {
    let factory = CountingFactory::new();
    factory.fail_disposals(true);
    let map = mapped(&factory, Some(1));

    map.emit(&greeting("Alice")).unwrap();
    let err = map.emit(&greeting("Bob")).unwrap_err();

    assert!(matches!(err, SinkMapError::Dispose { ref key, .. } if key == "\"Alice\""));
    // Bob still received the event and stays resident.
    assert_eq!(factory.probes_for(&"Bob".to_string())[0].emitted(), 1);
    assert_eq!(map.resident_count(), 1);
    // Alice is gone for good; disposed once only.
    assert_eq!(factory.probes_for(&"Alice".to_string())[0].disposed(), 1);
}

#[test]
fn test_eviction_runs_when_a_new_sink_panics() {
    let factory = CountingFactory::new();
    let map = mapped(&factory, Some(1));

    map.emit(&greeting("Alice")).unwrap();
    factory.panic_emits(true);
    let outcome = catch_unwind(AssertUnwindSafe(|| map.emit(&greeting("Bob"))));
    assert!(outcome.is_err());

    // The limit still holds and Alice was torn down.
    assert_eq!(map.resident_count(), 1);
    assert_eq!(factory.probes_for(&"Alice".to_string())[0].disposed(), 1);
    assert!(!factory.probes_for(&"Bob".to_string())[0].is_disposed());

    // The cache keeps working afterwards.
    factory.panic_emits(false);
    map.emit(&greeting("Carol")).unwrap();
    assert_eq!(map.resident_count(), 1);
    assert_eq!(factory.live(), 1);
}

#[test]
fn test_per_event_sink_is_disposed_when_it_panics() {
    let factory = CountingFactory::new();
    factory.panic_emits(true);
    let map = mapped(&factory, Some(0));

    let outcome = catch_unwind(AssertUnwindSafe(|| map.emit(&greeting("Alice"))));

    assert!(outcome.is_err());
    assert_eq!(factory.probes()[0].1.disposed(), 1);
    assert_eq!(factory.live(), 0);
}
