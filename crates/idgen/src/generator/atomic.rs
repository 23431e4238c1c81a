use core::{cmp, fmt};

use portable_atomic::{AtomicU64, Ordering};
#[cfg(feature = "tracing")]
use tracing::instrument;

use super::lock::{cold_clock_behind, cold_timestamp_overflow};
use crate::{IdGenStatus, NodeId, Result, SnowflakeGenerator, SnowflakeId, TimeSource};

// The reserved bit is never set in a produced ID, so this value cannot
// collide with real state.
const NO_ID: u64 = u64::MAX;

/// A lock-free Snowflake ID generator suitable for multi-threaded
/// environments.
///
/// The last ID handed out lives in a single [`AtomicU64`] and each attempt
/// publishes its successor with one compare-and-swap. A thread that loses the
/// race receives [`IdGenStatus::Pending`] with `yield_for = 0` and retries.
///
/// ## Recommended When
/// - You're generating IDs from many threads under heavy contention
/// - Fairness between callers is not required
///
/// ## See Also
/// - [`LockSnowflakeGenerator`]
///
/// [`LockSnowflakeGenerator`]: crate::LockSnowflakeGenerator
pub struct AtomicSnowflakeGenerator<T>
where
    T: TimeSource,
{
    #[cfg(feature = "cache-padded")]
    state: crossbeam_utils::CachePadded<AtomicU64>,
    #[cfg(not(feature = "cache-padded"))]
    state: AtomicU64,
    node_id: NodeId,
    time: T,
}

impl<T> AtomicSnowflakeGenerator<T>
where
    T: TimeSource,
{
    /// Creates a new [`AtomicSnowflakeGenerator`] for `node_id` that reads
    /// `time`.
    ///
    /// # Example
    /// ```
    /// use idgen::{AtomicSnowflakeGenerator, IdGenStatus, MonotonicClock, NodeId, SnowflakeId};
    ///
    /// let generator = AtomicSnowflakeGenerator::new(NodeId::new(7).unwrap(), MonotonicClock::default());
    ///
    /// let id: SnowflakeId = loop {
    ///     match generator.try_next_id().unwrap() {
    ///         IdGenStatus::Ready { id } => break id,
    ///         _ => std::thread::yield_now(),
    ///     }
    /// };
    /// assert_eq!(id.node_id(), 7);
    /// ```
    pub fn new(node_id: NodeId, time: T) -> Self {
        Self::with_raw(NO_ID, node_id, time)
    }

    /// Creates a generator whose last produced ID is `(timestamp, node_id,
    /// sequence)`.
    ///
    /// Out-of-range `timestamp` and `sequence` values are truncated to their
    /// field widths. In typical use cases, you should prefer [`Self::new`].
    pub fn from_components(timestamp: u64, node_id: NodeId, sequence: u64, time: T) -> Self {
        let last = SnowflakeId::from_components(timestamp, node_id.as_u64(), sequence);
        Self::with_raw(last.to_raw(), node_id, time)
    }

    fn with_raw(raw: u64, node_id: NodeId, time: T) -> Self {
        Self {
            #[cfg(feature = "cache-padded")]
            state: crossbeam_utils::CachePadded::new(AtomicU64::new(raw)),
            #[cfg(not(feature = "cache-padded"))]
            state: AtomicU64::new(raw),
            node_id,
            time,
        }
    }

    /// Attempts to generate the next available ID.
    ///
    /// # Returns
    /// - `Ok(IdGenStatus::Ready { id })`: A new ID is available
    /// - `Ok(IdGenStatus::Pending { yield_for: 1 })`: The sequence is
    ///   exhausted for this millisecond
    /// - `Ok(IdGenStatus::Pending { yield_for: 0 })`: Another thread won the
    ///   race; retry immediately
    /// - `Ok(IdGenStatus::ClockBehind { behind })`: The clock moved backwards
    ///
    /// # Errors
    /// - [`crate::Error::TimestampOverflow`] if the clock is past the 41-bit
    ///   range.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_next_id(&self) -> Result<IdGenStatus> {
        // Load before reading the clock: any state published earlier carries
        // a timestamp no later than the reading below.
        let current_raw = self.state.load(Ordering::Acquire);
        let now = self.time.current_millis();
        if now > SnowflakeId::MAX_TIMESTAMP {
            return Err(cold_timestamp_overflow(now));
        }

        let next_id = if current_raw == NO_ID {
            SnowflakeId::pack(now, self.node_id, 0)
        } else {
            let current_id = SnowflakeId::from_raw(current_raw);
            let current_ts = current_id.timestamp();
            match now.cmp(&current_ts) {
                cmp::Ordering::Equal => {
                    if current_id.has_sequence_room() {
                        current_id.increment_sequence()
                    } else {
                        return Ok(IdGenStatus::Pending { yield_for: 1 });
                    }
                }
                cmp::Ordering::Greater => current_id.rollover_to_timestamp(now),
                cmp::Ordering::Less => return Ok(cold_clock_behind(now, current_ts)),
            }
        };

        if self
            .state
            .compare_exchange(
                current_raw,
                next_id.to_raw(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
        {
            Ok(IdGenStatus::Ready { id: next_id })
        } else {
            Ok(IdGenStatus::Pending { yield_for: 0 })
        }
    }
}

impl<T> SnowflakeGenerator for AtomicSnowflakeGenerator<T>
where
    T: TimeSource,
{
    type Time = T;

    fn new(node_id: NodeId, time: T) -> Self {
        Self::new(node_id, time)
    }

    fn node_id(&self) -> NodeId {
        self.node_id
    }

    fn try_poll_id(&self) -> Result<IdGenStatus> {
        self.try_next_id()
    }
}

impl<T> fmt::Debug for AtomicSnowflakeGenerator<T>
where
    T: TimeSource,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let raw = self.state.load(Ordering::Relaxed);
        let last = (raw != NO_ID).then(|| SnowflakeId::from_raw(raw));
        f.debug_struct("AtomicSnowflakeGenerator")
            .field("node_id", &self.node_id)
            .field("last", &last)
            .finish_non_exhaustive()
    }
}
