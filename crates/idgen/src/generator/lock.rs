use core::{cmp::Ordering, fmt};

use parking_lot::Mutex;
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{Error, IdGenStatus, NodeId, Result, SnowflakeGenerator, SnowflakeId, TimeSource};

/// A lock-based Snowflake ID generator suitable for multi-threaded
/// environments.
///
/// The last ID handed out is kept behind a [`Mutex`]. Reading the clock,
/// comparing it to the last timestamp and storing the new state all happen
/// while the lock is held, so two callers can never interleave their steps.
///
/// ## Recommended When
/// - Fair access across threads is important
/// - You want the simplest correct generator (the default for
///   [`crate::Node`])
///
/// ## See Also
/// - [`AtomicSnowflakeGenerator`]
///
/// [`AtomicSnowflakeGenerator`]: crate::AtomicSnowflakeGenerator
pub struct LockSnowflakeGenerator<T>
where
    T: TimeSource,
{
    // `None` until the first ID is produced.
    #[cfg(feature = "cache-padded")]
    state: crossbeam_utils::CachePadded<Mutex<Option<SnowflakeId>>>,
    #[cfg(not(feature = "cache-padded"))]
    state: Mutex<Option<SnowflakeId>>,
    node_id: NodeId,
    time: T,
}

impl<T> LockSnowflakeGenerator<T>
where
    T: TimeSource,
{
    /// Creates a new [`LockSnowflakeGenerator`] for `node_id` that reads
    /// `time`.
    ///
    /// No ID has been produced yet, so the first call adopts whatever the
    /// clock reads with sequence 0.
    ///
    /// # Example
    /// ```
    /// use idgen::{IdGenStatus, LockSnowflakeGenerator, MonotonicClock, NodeId, SnowflakeId};
    ///
    /// let generator = LockSnowflakeGenerator::new(NodeId::new(0).unwrap(), MonotonicClock::default());
    ///
    /// let id: SnowflakeId = loop {
    ///     match generator.try_next_id().unwrap() {
    ///         IdGenStatus::Ready { id } => break id,
    ///         _ => std::thread::yield_now(),
    ///     }
    /// };
    /// assert_eq!(id.node_id(), 0);
    /// ```
    pub fn new(node_id: NodeId, time: T) -> Self {
        Self::with_state(None, node_id, time)
    }

    /// Creates a generator whose last produced ID is `(timestamp, node_id,
    /// sequence)`.
    ///
    /// This is primarily useful for tests and for resuming from a known
    /// point. Out-of-range `timestamp` and `sequence` values are truncated to
    /// their field widths.
    ///
    /// In typical use cases, you should prefer [`Self::new`].
    pub fn from_components(timestamp: u64, node_id: NodeId, sequence: u64, time: T) -> Self {
        let last = SnowflakeId::from_components(timestamp, node_id.as_u64(), sequence);
        Self::with_state(Some(last), node_id, time)
    }

    fn with_state(last: Option<SnowflakeId>, node_id: NodeId, time: T) -> Self {
        Self {
            #[cfg(feature = "cache-padded")]
            state: crossbeam_utils::CachePadded::new(Mutex::new(last)),
            #[cfg(not(feature = "cache-padded"))]
            state: Mutex::new(last),
            node_id,
            time,
        }
    }

    /// Attempts to generate the next available ID.
    ///
    /// # Returns
    /// - `Ok(IdGenStatus::Ready { id })`: A new ID is available
    /// - `Ok(IdGenStatus::Pending { yield_for })`: The sequence is exhausted
    ///   for this millisecond
    /// - `Ok(IdGenStatus::ClockBehind { behind })`: The clock moved backwards;
    ///   state is unchanged
    ///
    /// # Errors
    /// - [`Error::TimestampOverflow`] if the clock is past the 41-bit range.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_next_id(&self) -> Result<IdGenStatus> {
        let mut last = self.state.lock();
        let now = self.time.current_millis();
        if now > SnowflakeId::MAX_TIMESTAMP {
            return Err(cold_timestamp_overflow(now));
        }

        let Some(current) = *last else {
            let id = SnowflakeId::pack(now, self.node_id, 0);
            *last = Some(id);
            return Ok(IdGenStatus::Ready { id });
        };

        let current_ts = current.timestamp();
        match now.cmp(&current_ts) {
            Ordering::Equal => {
                if current.has_sequence_room() {
                    let id = current.increment_sequence();
                    *last = Some(id);
                    Ok(IdGenStatus::Ready { id })
                } else {
                    Ok(IdGenStatus::Pending { yield_for: 1 })
                }
            }
            Ordering::Greater => {
                let id = current.rollover_to_timestamp(now);
                *last = Some(id);
                Ok(IdGenStatus::Ready { id })
            }
            Ordering::Less => Ok(cold_clock_behind(now, current_ts)),
        }
    }
}

impl<T> SnowflakeGenerator for LockSnowflakeGenerator<T>
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

impl<T> fmt::Debug for LockSnowflakeGenerator<T>
where
    T: TimeSource,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockSnowflakeGenerator")
            .field("node_id", &self.node_id)
            .field("last", &*self.state.lock())
            .finish_non_exhaustive()
    }
}

#[cold]
#[inline(never)]
pub(crate) fn cold_clock_behind(now: u64, current_ts: u64) -> IdGenStatus {
    IdGenStatus::ClockBehind {
        behind: current_ts - now,
    }
}

#[cold]
#[inline(never)]
pub(crate) fn cold_timestamp_overflow(now: u64) -> Error {
    Error::TimestampOverflow {
        timestamp: now,
        max: SnowflakeId::MAX_TIMESTAMP,
    }
}
