//! Release races between threads sharing one owning proxy

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use common::{Gate, RecordingEngine};
use rvoip_native_bridge::{
    InMemoryEngine, MsrpMessage, MsrpMessageRecord, MsrpRequestType, NativeEngine, ObjectKind,
    Owned, RawHandle,
};

const THREADS: usize = 16;

#[test]
fn test_racing_releases_destroy_once() {
    for _ in 0..50 {
        let recording = Arc::new(RecordingEngine::new());
        let native: Arc<dyn NativeEngine> = recording.clone();
        let owner = Arc::new(Owned::<MsrpMessage>::from_raw(native, RawHandle::new(42)));
        let barrier = Arc::new(Barrier::new(THREADS));
        let winners = Arc::new(AtomicUsize::new(0));

        let workers: Vec<_> = (0..THREADS)
            .map(|_| {
                let owner = Arc::clone(&owner);
                let barrier = Arc::clone(&barrier);
                let winners = Arc::clone(&winners);
                thread::spawn(move || {
                    barrier.wait();
                    if owner.release() {
                        winners.fetch_add(1, Ordering::SeqCst);
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().expect("release thread panicked");
        }

        assert_eq!(winners.load(Ordering::SeqCst), 1);
        assert_eq!(recording.destroyed(), vec![(ObjectKind::MsrpMessage, RawHandle::new(42))]);
        assert!(owner.is_null());

        drop(owner);
        assert_eq!(recording.destroyed().len(), 1);
    }
}

#[test]
fn test_readers_racing_release_observe_live_or_neutral() {
    let engine = Arc::new(InMemoryEngine::new());
    let handle = engine
        .insert_msrp_message(
            MsrpMessageRecord::request(MsrpRequestType::Send)
                .with_header("Message-ID", "race")
                .with_content(b"payload".to_vec()),
        )
        .unwrap();
    let native: Arc<dyn NativeEngine> = engine.clone();
    let owner = Arc::new(Owned::<MsrpMessage>::from_raw(native, handle));
    let barrier = Arc::new(Barrier::new(THREADS + 1));

    let readers: Vec<_> = (0..THREADS)
        .map(|_| {
            let owner = Arc::clone(&owner);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..1000 {
                    // either the live value or the neutral one, nothing in between
                    match owner.request_type() {
                        Some(MsrpRequestType::Send) | None => {}
                        other => panic!("unexpected request type {:?}", other),
                    }
                    let content = owner.read_content();
                    assert!(content.is_empty() || content == b"payload");
                }
            })
        })
        .collect();

    barrier.wait();
    owner.release();
    for reader in readers {
        reader.join().expect("reader thread panicked");
    }

    let stats = engine.stats();
    assert_eq!(stats.destroys, 1);
    assert_eq!(stats.stale_destroys, 0);
    assert_eq!(stats.live_objects, 0);
    assert!(owner.request_type().is_none());
}

#[test]
fn test_release_waits_for_query_inside_engine() {
    let gate = Arc::new(Gate::new());
    let recording = Arc::new(RecordingEngine::new().gated(Arc::clone(&gate)));
    let native: Arc<dyn NativeEngine> = recording.clone();
    let owner = Arc::new(Owned::<MsrpMessage>::from_raw(native, RawHandle::new(42)));

    let readers: Vec<_> = (0..2)
        .map(|_| {
            let owner = Arc::clone(&owner);
            thread::spawn(move || owner.code())
        })
        .collect();
    gate.wait_entered(2);

    let releaser = {
        let owner = Arc::clone(&owner);
        thread::spawn(move || owner.release())
    };
    thread::sleep(Duration::from_millis(50));
    assert!(
        recording.destroyed().is_empty(),
        "object destroyed while queries were still inside the engine"
    );

    gate.open();
    for reader in readers {
        assert_eq!(reader.join().expect("reader thread panicked"), 200);
    }
    assert!(releaser.join().expect("release thread panicked"));

    let operations: Vec<_> = recording.calls().iter().map(|call| call.operation).collect();
    assert_eq!(operations, vec!["msrp_code", "msrp_code", "destroy"]);
    assert_eq!(owner.code(), 0);
}

#[test]
fn test_many_owners_across_threads() {
    let engine = Arc::new(InMemoryEngine::new());
    let native: Arc<dyn NativeEngine> = engine.clone();

    let workers: Vec<_> = (0..THREADS)
        .map(|_| {
            let native = Arc::clone(&native);
            thread::spawn(move || {
                for _ in 0..100 {
                    let message = Owned::<MsrpMessage>::create(Arc::clone(&native));
                    assert!(!message.is_null());
                    if message.raw().get() % 2 == 0 {
                        assert!(message.release());
                    }
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().expect("owner thread panicked");
    }

    let stats = engine.stats();
    assert_eq!(stats.destroys, (THREADS * 100) as u64);
    assert_eq!(stats.stale_destroys, 0);
    assert_eq!(stats.live_objects, 0);
}
