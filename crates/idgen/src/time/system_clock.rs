use super::mono_clock::duration_millis;
use crate::{EPOCH, TimeSource};
use core::time::Duration;
use std::time::{SystemTime, UNIX_EPOCH};

/// A wall-clock time source that reads [`SystemTime`] on every call.
///
/// Unlike [`crate::MonotonicClock`], this clock follows external adjustments,
/// including backwards steps from NTP corrections or VM pauses. Generators
/// detect those steps and refuse to hand out a timestamp earlier than one they
/// have already used.
///
/// Readings before the epoch saturate to zero.
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    epoch: Duration,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::with_epoch(EPOCH)
    }
}

impl SystemClock {
    pub const fn with_epoch(epoch: Duration) -> Self {
        Self { epoch }
    }
}

impl TimeSource for SystemClock {
    fn current_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .ok()
            .and_then(|now| now.checked_sub(self.epoch))
            .map_or(0, duration_millis)
    }
}
