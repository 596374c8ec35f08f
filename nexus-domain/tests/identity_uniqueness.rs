use nexus_domain::identity::{EntityId, IdStrategy, IdentityService};
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

const SEQUENTIAL: usize = 100_000;
const THREADS: usize = 8;
const PER_THREAD: usize = 12_500;

fn assert_unique(strategy: IdStrategy) {
    let ids = Arc::new(IdentityService::new(strategy));

    let mut seen: HashSet<EntityId> = (0..SEQUENTIAL).map(|_| ids.generate()).collect();
    assert_eq!(seen.len(), SEQUENTIAL, "{strategy} sequential duplicates");

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let ids = ids.clone();
            thread::spawn(move || (0..PER_THREAD).map(|_| ids.generate()).collect::<Vec<_>>())
        })
        .collect();

    for handle in handles {
        for id in handle.join().expect("generator thread") {
            assert!(seen.insert(id), "{strategy} concurrent duplicate");
        }
    }
    assert_eq!(seen.len(), SEQUENTIAL + THREADS * PER_THREAD);
}

#[test]
fn uuid_v4_never_repeats() {
    assert_unique(IdStrategy::UuidV4);
}

#[test]
fn uuid_v7_never_repeats() {
    assert_unique(IdStrategy::UuidV7);
}

#[test]
fn ulid_never_repeats() {
    assert_unique(IdStrategy::Ulid);
}

#[test]
fn first_caller_initializes_the_shared_generator() {
    let ids = Arc::new(IdentityService::new(IdStrategy::Ulid));
    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let ids = ids.clone();
            thread::spawn(move || ids.generate())
        })
        .collect();
    let generated: HashSet<EntityId> = handles
        .into_iter()
        .map(|h| h.join().expect("generator thread"))
        .collect();
    assert_eq!(generated.len(), THREADS);
}
