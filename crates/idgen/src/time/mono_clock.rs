use crate::{EPOCH, Error, Result, TimeSource};
use core::time::Duration;
use std::{
    sync::Arc,
    time::{Instant, SystemTime, UNIX_EPOCH},
};

#[derive(Debug)]
struct Anchor {
    start: Instant,
    epoch_offset: u64, // in milliseconds
}

/// A monotonic time source that returns elapsed time since construction,
/// offset from a user-defined epoch.
///
/// The wall clock is sampled exactly once, when the clock is built. After that
/// every reading is `offset + Instant::elapsed()`, so NTP steps or manual
/// clock changes never make this source go backwards within the process.
///
/// Clones share the same anchor and therefore agree on every reading.
#[derive(Clone, Debug)]
pub struct MonotonicClock {
    anchor: Arc<Anchor>,
}

impl Default for MonotonicClock {
    /// Constructs a monotonic clock aligned to [`EPOCH`].
    ///
    /// Panics if system time is earlier than the epoch.
    fn default() -> Self {
        Self::with_epoch(EPOCH)
    }
}

impl MonotonicClock {
    /// Constructs a monotonic clock using `epoch` (a [`Duration`] since
    /// 1970-01-01 UTC) as the origin (t = 0).
    ///
    /// # Panics
    ///
    /// Panics if the current system time is earlier than the given epoch. Use
    /// [`MonotonicClock::try_with_epoch`] to handle that case.
    ///
    /// # Example
    ///
    /// ```
    /// use idgen::{MonotonicClock, TimeSource};
    /// use std::time::{Duration, SystemTime, UNIX_EPOCH};
    ///
    /// let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap();
    /// let clock = MonotonicClock::with_epoch(now);
    ///
    /// std::thread::sleep(Duration::from_millis(5));
    /// assert!(clock.current_millis() >= 5);
    /// ```
    pub fn with_epoch(epoch: Duration) -> Self {
        Self::try_with_epoch(epoch).expect("System clock before custom epoch")
    }

    /// Fallible counterpart to [`MonotonicClock::with_epoch`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::ClockBeforeEpoch`] if the system clock is earlier than
    /// `epoch` (or earlier than the Unix epoch).
    pub fn try_with_epoch(epoch: Duration) -> Result<Self> {
        let start = Instant::now();
        let offset = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .ok()
            .and_then(|now| now.checked_sub(epoch))
            .ok_or(Error::ClockBeforeEpoch)?;

        Ok(Self {
            anchor: Arc::new(Anchor {
                start,
                epoch_offset: duration_millis(offset),
            }),
        })
    }
}

impl TimeSource for MonotonicClock {
    /// Returns the number of milliseconds since the configured epoch, based on
    /// the elapsed monotonic time since construction.
    fn current_millis(&self) -> u64 {
        self.anchor.epoch_offset + duration_millis(self.anchor.start.elapsed())
    }
}

/// Milliseconds in `d`, saturating at `u64::MAX`.
pub(crate) fn duration_millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
