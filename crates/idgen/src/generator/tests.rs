use crate::{
    AtomicSnowflakeGenerator, Error, Generator, IdGenStatus, LockSnowflakeGenerator,
    MonotonicClock, Node, NodeId, SnowflakeGenerator, SnowflakeId, SystemClock, TimeSource,
};
use core::cell::Cell;
use std::collections::HashSet;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::thread::scope;

struct MockTime {
    millis: u64,
}

impl TimeSource for MockTime {
    fn current_millis(&self) -> u64 {
        self.millis
    }
}

#[derive(Clone)]
struct SharedMockStepTime {
    clock: Rc<MockStepTime>,
}

impl TimeSource for SharedMockStepTime {
    fn current_millis(&self) -> u64 {
        self.clock.values[self.clock.index.get()]
    }
}

struct MockStepTime {
    values: Vec<u64>,
    index: Cell<usize>,
}

/// Returns `readings` in order, one per read, then holds the last one.
struct ScriptedTime {
    readings: Vec<u64>,
    reads: Cell<usize>,
}

impl ScriptedTime {
    fn new(readings: impl Into<Vec<u64>>) -> Self {
        Self {
            readings: readings.into(),
            reads: Cell::new(0),
        }
    }
}

impl TimeSource for ScriptedTime {
    fn current_millis(&self) -> u64 {
        let i = self.reads.get();
        self.reads.set(i + 1);
        self.readings[i.min(self.readings.len() - 1)]
    }
}

/// Advances by one millisecond every `reads_per_tick` reads.
struct TickingTime {
    start: u64,
    reads_per_tick: usize,
    reads: Cell<usize>,
}

impl TimeSource for TickingTime {
    fn current_millis(&self) -> u64 {
        let i = self.reads.get();
        self.reads.set(i + 1);
        self.start + (i / self.reads_per_tick) as u64
    }
}

trait IdGenStatusExt {
    fn unwrap_ready(self) -> SnowflakeId;
    fn unwrap_pending(self) -> u64;
    fn unwrap_behind(self) -> u64;
}

impl IdGenStatusExt for IdGenStatus {
    fn unwrap_ready(self) -> SnowflakeId {
        match self {
            Self::Ready { id } => id,
            other => panic!("expected ready, got {other:?}"),
        }
    }

    fn unwrap_pending(self) -> u64 {
        match self {
            Self::Pending { yield_for } => yield_for,
            other => panic!("expected pending, got {other:?}"),
        }
    }

    fn unwrap_behind(self) -> u64 {
        match self {
            Self::ClockBehind { behind } => behind,
            other => panic!("expected clock behind, got {other:?}"),
        }
    }
}

fn node_id(n: i64) -> NodeId {
    NodeId::new(n).unwrap()
}

fn poll(generator: &impl SnowflakeGenerator) -> IdGenStatus {
    generator.try_poll_id().unwrap()
}

fn run_first_id_starts_at_sequence_zero<G: SnowflakeGenerator>(generator: &G) {
    let id1 = poll(generator).unwrap_ready();
    let id2 = poll(generator).unwrap_ready();

    // A reading of 0 must not be confused with "nothing produced yet".
    assert_eq!(id1.timestamp(), 0);
    assert_eq!(id1.sequence(), 0);
    assert_eq!(id2.timestamp(), 0);
    assert_eq!(id2.sequence(), 1);
}

fn run_id_sequence_increments_within_same_tick<G: SnowflakeGenerator>(generator: &G) {
    let id1 = poll(generator).unwrap_ready();
    let id2 = poll(generator).unwrap_ready();
    let id3 = poll(generator).unwrap_ready();

    assert_eq!(id1.timestamp(), 42);
    assert_eq!(id2.timestamp(), 42);
    assert_eq!(id3.timestamp(), 42);
    assert_eq!(id1.sequence(), 0);
    assert_eq!(id2.sequence(), 1);
    assert_eq!(id3.sequence(), 2);
    assert_eq!(id1.node_id(), 5);
    assert!(id1 < id2 && id2 < id3);
}

fn run_generator_returns_pending_when_sequence_exhausted<G: SnowflakeGenerator>(generator: &G) {
    assert_eq!(poll(generator).unwrap_pending(), 1);
    // Still exhausted; nothing was consumed.
    assert_eq!(poll(generator).unwrap_pending(), 1);
}

fn run_generator_handles_rollover<G: SnowflakeGenerator>(
    generator: &G,
    shared_time: &SharedMockStepTime,
) {
    for i in 0..=SnowflakeId::MAX_SEQUENCE {
        let id = poll(generator).unwrap_ready();
        assert_eq!(id.sequence(), i);
        assert_eq!(id.timestamp(), 42);
    }

    assert_eq!(poll(generator).unwrap_pending(), 1);

    shared_time.clock.index.set(1);

    let id = poll(generator).unwrap_ready();
    assert_eq!(id.timestamp(), 43);
    assert_eq!(id.sequence(), 0);
}

fn run_generator_reports_clock_behind<G: SnowflakeGenerator>(generator: &G) {
    assert_eq!(poll(generator).unwrap_behind(), 10);
    assert_eq!(poll(generator).unwrap_behind(), 10);
}

fn run_generator_rejects_timestamp_overflow<G: SnowflakeGenerator>(generator: &G) {
    let err = generator.try_poll_id().unwrap_err();
    assert_eq!(
        err,
        Error::TimestampOverflow {
            timestamp: SnowflakeId::MAX_TIMESTAMP + 1,
            max: SnowflakeId::MAX_TIMESTAMP,
        }
    );
}

fn run_generator_monotonic<G: SnowflakeGenerator>(generator: &G) {
    const TOTAL_IDS: usize = 4096 * 64;

    let mut last: Option<SnowflakeId> = None;
    for _ in 0..TOTAL_IDS {
        let id = loop {
            match poll(generator) {
                IdGenStatus::Ready { id } => break id,
                IdGenStatus::Pending { .. } => core::hint::spin_loop(),
                IdGenStatus::ClockBehind { behind } => {
                    panic!("monotonic clock went back {behind}ms")
                }
            }
        };
        if let Some(prev) = last {
            assert!(id > prev, "{id:?} not after {prev:?}");
            if id.timestamp() == prev.timestamp() {
                assert_eq!(id.sequence(), prev.sequence() + 1);
            } else {
                assert_eq!(id.sequence(), 0);
            }
        }
        assert_eq!(id.node_id(), 1);
        last = Some(id);
    }
}

fn run_generator_monotonic_threaded<G>(make_generator: impl Fn() -> G)
where
    G: SnowflakeGenerator + Send + Sync,
{
    const THREADS: usize = 8;
    const TOTAL_IDS: usize = 4096 * 64;
    const IDS_PER_THREAD: usize = TOTAL_IDS / THREADS;

    let generator = Arc::new(make_generator());
    let seen_ids = Arc::new(Mutex::new(HashSet::with_capacity(TOTAL_IDS)));

    scope(|s| {
        for _ in 0..THREADS {
            let generator = Arc::clone(&generator);
            let seen_ids = Arc::clone(&seen_ids);

            s.spawn(move || {
                for _ in 0..IDS_PER_THREAD {
                    loop {
                        match generator.try_poll_id().unwrap() {
                            IdGenStatus::Ready { id } => {
                                assert!(seen_ids.lock().unwrap().insert(id));
                                break;
                            }
                            IdGenStatus::Pending { .. } => std::thread::yield_now(),
                            IdGenStatus::ClockBehind { behind } => {
                                panic!("monotonic clock went back {behind}ms")
                            }
                        }
                    }
                }
            });
        }
    });

    assert_eq!(seen_ids.lock().unwrap().len(), TOTAL_IDS);
}

#[test]
fn lock_generator_first_id_starts_at_sequence_zero() {
    let generator = LockSnowflakeGenerator::new(node_id(0), MockTime { millis: 0 });
    run_first_id_starts_at_sequence_zero(&generator);
}

#[test]
fn atomic_generator_first_id_starts_at_sequence_zero() {
    let generator = AtomicSnowflakeGenerator::new(node_id(0), MockTime { millis: 0 });
    run_first_id_starts_at_sequence_zero(&generator);
}

#[test]
fn lock_generator_sequence_test() {
    let generator = LockSnowflakeGenerator::new(node_id(5), MockTime { millis: 42 });
    run_id_sequence_increments_within_same_tick(&generator);
}

#[test]
fn atomic_generator_sequence_test() {
    let generator = AtomicSnowflakeGenerator::new(node_id(5), MockTime { millis: 42 });
    run_id_sequence_increments_within_same_tick(&generator);
}

#[test]
fn lock_generator_pending_test() {
    let generator = LockSnowflakeGenerator::from_components(
        42,
        node_id(1),
        SnowflakeId::MAX_SEQUENCE,
        MockTime { millis: 42 },
    );
    run_generator_returns_pending_when_sequence_exhausted(&generator);
}

#[test]
fn atomic_generator_pending_test() {
    let generator = AtomicSnowflakeGenerator::from_components(
        42,
        node_id(1),
        SnowflakeId::MAX_SEQUENCE,
        MockTime { millis: 42 },
    );
    run_generator_returns_pending_when_sequence_exhausted(&generator);
}

#[test]
fn lock_generator_rollover_test() {
    let shared_time = SharedMockStepTime {
        clock: Rc::new(MockStepTime {
            values: vec![42, 43],
            index: Cell::new(0),
        }),
    };
    let generator = LockSnowflakeGenerator::new(node_id(1), shared_time.clone());
    run_generator_handles_rollover(&generator, &shared_time);
}

#[test]
fn atomic_generator_rollover_test() {
    let shared_time = SharedMockStepTime {
        clock: Rc::new(MockStepTime {
            values: vec![42, 43],
            index: Cell::new(0),
        }),
    };
    let generator = AtomicSnowflakeGenerator::new(node_id(1), shared_time.clone());
    run_generator_handles_rollover(&generator, &shared_time);
}

#[test]
fn lock_generator_clock_behind_test() {
    let generator =
        LockSnowflakeGenerator::from_components(100, node_id(1), 7, MockTime { millis: 90 });
    run_generator_reports_clock_behind(&generator);
}

#[test]
fn atomic_generator_clock_behind_test() {
    let generator =
        AtomicSnowflakeGenerator::from_components(100, node_id(1), 7, MockTime { millis: 90 });
    run_generator_reports_clock_behind(&generator);
}

#[test]
fn lock_generator_timestamp_overflow_test() {
    let generator = LockSnowflakeGenerator::new(
        node_id(1),
        MockTime {
            millis: SnowflakeId::MAX_TIMESTAMP + 1,
        },
    );
    run_generator_rejects_timestamp_overflow(&generator);
}

#[test]
fn atomic_generator_timestamp_overflow_test() {
    let generator = AtomicSnowflakeGenerator::new(
        node_id(1),
        MockTime {
            millis: SnowflakeId::MAX_TIMESTAMP + 1,
        },
    );
    run_generator_rejects_timestamp_overflow(&generator);
}

#[test]
fn lock_generator_monotonic_clock_sequence_increments() {
    let generator = LockSnowflakeGenerator::new(node_id(1), MonotonicClock::default());
    run_generator_monotonic(&generator);
}

#[test]
fn atomic_generator_monotonic_clock_sequence_increments() {
    let generator = AtomicSnowflakeGenerator::new(node_id(1), MonotonicClock::default());
    run_generator_monotonic(&generator);
}

#[test]
fn lock_generator_threaded_monotonic() {
    run_generator_monotonic_threaded(|| {
        LockSnowflakeGenerator::new(node_id(1), MonotonicClock::default())
    });
}

#[test]
fn atomic_generator_threaded_monotonic() {
    run_generator_monotonic_threaded(|| {
        AtomicSnowflakeGenerator::new(node_id(1), MonotonicClock::default())
    });
}

#[test]
fn node_accepts_every_valid_node_id() {
    for n in 0..=1023 {
        let node = Node::new(n).unwrap();
        assert_eq!(i64::from(node.node_id().get()), n);
        assert_eq!(node.produce().node_id(), n as u64);
    }
}

#[test]
fn node_rejects_out_of_range_node_ids() {
    for n in [-1, 1024, i64::MIN, i64::MAX] {
        let err = Node::new(n).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidNodeId {
                node_id: n,
                max: 1023
            }
        );
    }
}

#[test]
fn standalone_node_uses_default_node_id() {
    let node = Node::standalone().unwrap();
    assert_eq!(node.node_id().get(), 1);
    assert_eq!(node.produce().node_id(), 1);
}

#[test]
fn node_sequential_ids_are_strictly_increasing() {
    const TOTAL_IDS: usize = 100_000;

    let node = Node::new(1).unwrap();
    let mut seen = HashSet::with_capacity(TOTAL_IDS);
    let mut prev = node.produce();
    seen.insert(prev);
    for _ in 1..TOTAL_IDS {
        let id = node.produce();
        assert!(id > prev, "{id:?} not after {prev:?}");
        assert!(seen.insert(id));
        prev = id;
    }
    assert_eq!(seen.len(), TOTAL_IDS);
}

#[test]
fn node_single_node_ids_are_unique() {
    let node = Node::new(1).unwrap();
    let mut seen = HashSet::new();
    for _ in 0..1000 {
        let id = node.produce();
        assert_eq!(id.node_id(), 1);
        assert!(seen.insert(id), "duplicate ID {id}");
    }
}

fn run_node_concurrent_uniqueness<G>(node: Node<G>)
where
    G: SnowflakeGenerator + Send + Sync,
{
    const THREADS: usize = 50;
    const IDS_PER_THREAD: usize = 10_000;

    let node = &node;
    let batches: Vec<Vec<SnowflakeId>> = scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                s.spawn(move || {
                    (0..IDS_PER_THREAD)
                        .map(|_| node.produce())
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let mut seen = HashSet::with_capacity(THREADS * IDS_PER_THREAD);
    for id in batches.into_iter().flatten() {
        assert_eq!(id.node_id(), 7);
        assert!(seen.insert(id), "duplicate ID {id}");
    }
    assert_eq!(seen.len(), THREADS * IDS_PER_THREAD);
}

#[test]
fn node_concurrent_ids_are_unique_with_lock() {
    let generator = LockSnowflakeGenerator::new(node_id(7), MonotonicClock::default());
    run_node_concurrent_uniqueness(Node::from_generator(generator));
}

#[test]
fn node_concurrent_ids_are_unique_with_atomic() {
    let generator = AtomicSnowflakeGenerator::new(node_id(7), MonotonicClock::default());
    run_node_concurrent_uniqueness(Node::from_generator(generator));
}

#[test]
fn node_waits_for_next_millisecond_when_sequence_overflows() {
    let clock = TickingTime {
        start: 1_000,
        reads_per_tick: 5_000,
        reads: Cell::new(0),
    };
    let node = Node::from_generator(LockSnowflakeGenerator::new(node_id(1), clock));

    let first = node.produce();
    let mut prev = first;
    for _ in 1..=SnowflakeId::MAX_SEQUENCE {
        prev = node.produce();
        assert_eq!(prev.timestamp(), first.timestamp());
    }
    assert_eq!(prev.sequence(), SnowflakeId::MAX_SEQUENCE);

    let overflowed = node.produce();
    assert!(overflowed.timestamp() > prev.timestamp());
    assert_eq!(overflowed.sequence(), 0);
    assert!(overflowed > prev);
}

fn run_node_rollback_policy<G: SnowflakeGenerator>(node: &Node<G>) {
    assert_eq!(
        node.try_produce(),
        Err(Error::ClockMovedBackwards { behind_ms: 5 })
    );
    // The failed call left the last ID at (100, 0), so the wait resumes the
    // same millisecond.
    let id = node.produce();
    assert_eq!(id.timestamp(), 100);
    assert_eq!(id.sequence(), 1);
}

#[test]
fn lock_node_clock_rollback_policy() {
    let clock = ScriptedTime::new([95, 97, 99, 100]);
    let generator = LockSnowflakeGenerator::from_components(100, node_id(1), 0, clock);
    run_node_rollback_policy(&Node::from_generator(generator));
}

#[test]
fn atomic_node_clock_rollback_policy() {
    let clock = ScriptedTime::new([95, 97, 99, 100]);
    let generator = AtomicSnowflakeGenerator::from_components(100, node_id(1), 0, clock);
    run_node_rollback_policy(&Node::from_generator(generator));
}

#[test]
fn node_try_produce_reports_timestamp_overflow() {
    let clock = MockTime {
        millis: SnowflakeId::MAX_TIMESTAMP + 1,
    };
    let node = Node::from_generator(LockSnowflakeGenerator::new(node_id(1), clock));
    assert!(matches!(
        node.try_produce(),
        Err(Error::TimestampOverflow { .. })
    ));
}

#[test]
#[should_panic(expected = "snowflake generator exhausted")]
fn node_produce_panics_on_timestamp_overflow() {
    let clock = MockTime {
        millis: SnowflakeId::MAX_TIMESTAMP + 1,
    };
    let node = Node::from_generator(LockSnowflakeGenerator::new(node_id(1), clock));
    node.produce();
}

#[test]
fn node_is_usable_as_a_generator() {
    let generator: Arc<dyn Generator> = Arc::new(Node::new(3).unwrap());

    let a = generator.generate();
    let b = generator.generate();
    assert_ne!(a, b);
    assert!(a.as_i64() > 0);
    assert!(!a.is_zero());

    let raw = b.raw::<SnowflakeId>().unwrap();
    assert_eq!(raw.node_id(), 3);
    assert_eq!(raw.to_i64(), b.as_i64());
    assert_eq!(raw.to_string(), b.as_str());
    assert!(b.raw::<u64>().is_none());
}

#[test]
fn node_over_system_clock_produces_unique_ids() {
    let generator = AtomicSnowflakeGenerator::new(node_id(2), SystemClock::default());
    let node = Node::from_generator(generator);
    let mut seen = HashSet::new();
    for _ in 0..10_000 {
        assert!(seen.insert(node.produce()));
    }
}
