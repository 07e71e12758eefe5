use sinkmap::{
    MappedSink, SinkMapError,
    event::LogEvent,
    testing::{CountingFactory, DisposeTrackingSink},
};
use std::thread;

mod common;
use common::greeting;

const THREADS: usize = 8;
const EVENTS_PER_THREAD: usize = 200;

fn mapped(
    factory: &CountingFactory<String>,
    limit: i64,
) -> MappedSink<LogEvent, String, DisposeTrackingSink> {
    MappedSink::builder()
        .key_property("Name", String::new())
        .factory(factory.clone())
        .count_limit(limit)
        .build()
        .unwrap()
}

#[test]
fn test_concurrent_emits_for_one_key_create_one_sink() {
    let factory = CountingFactory::new();
    let map = MappedSink::<LogEvent, String, _>::builder()
        .key_property("Name", String::new())
        .factory(factory.clone())
        .build()
        .unwrap();

    thread::scope(|s| {
        for _ in 0..THREADS {
            s.spawn(|| {
                for _ in 0..EVENTS_PER_THREAD {
                    map.emit(&greeting("Alice")).unwrap();
                }
            });
        }
    });

    assert_eq!(factory.created(), 1);
    assert_eq!(factory.probes()[0].1.emitted(), THREADS * EVENTS_PER_THREAD);
}

#[test]
fn test_concurrent_eviction_never_writes_to_disposed_sinks() {
    let factory = CountingFactory::new();
    let map = mapped(&factory, 2);

    thread::scope(|s| {
        for t in 0..THREADS {
            let map = &map;
            s.spawn(move || {
                for i in 0..EVENTS_PER_THREAD {
                    let name = format!("user-{}", (t + i) % 5);
                    // A tracking sink rejects writes after disposal, so any
                    // use-after-dispose would surface here.
                    map.emit(&greeting(&name)).unwrap();
                }
            });
        }
    });

    assert!(map.resident_count() <= 2);
    assert_eq!(factory.live(), map.resident_count());
    for (_, probe) in factory.probes() {
        assert!(probe.disposed() <= 1);
    }
}

#[test]
fn test_per_event_under_contention_disposes_everything() {
    let factory = CountingFactory::new();
    let map = mapped(&factory, 0);

    thread::scope(|s| {
        for t in 0..THREADS {
            let map = &map;
            s.spawn(move || {
                for _ in 0..50 {
                    map.emit(&greeting(&format!("user-{t}"))).unwrap();
                }
            });
        }
    });

    assert_eq!(factory.created(), THREADS * 50);
    assert_eq!(factory.live(), 0);
}

#[test]
fn test_dispose_races_with_emits() {
    let factory = CountingFactory::new();
    let map = mapped(&factory, 3);

    thread::scope(|s| {
        for t in 0..THREADS {
            let map = &map;
            s.spawn(move || {
                for i in 0..EVENTS_PER_THREAD {
                    match map.emit(&greeting(&format!("user-{}", (t * i) % 4))) {
                        Ok(()) | Err(SinkMapError::Disposed) => {}
                        Err(other) => panic!("unexpected failure: {other}"),
                    }
                }
            });
        }
        s.spawn(|| map.dispose().unwrap());
    });

    assert!(map.is_disposed());
    assert_eq!(map.resident_count(), 0);
    for (_, probe) in factory.probes() {
        assert_eq!(probe.disposed(), 1);
    }
}
