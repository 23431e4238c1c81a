use core::time::Duration;
use std::sync::Arc;

/// The fixed epoch every [`crate::SnowflakeId`] timestamp is measured from:
/// Thursday, November 4, 2010 01:42:54.657 UTC.
///
/// With a 41-bit timestamp field this leaves room until roughly 2080.
pub const EPOCH: Duration = Duration::from_millis(1_288_834_974_657);

/// A source of milliseconds elapsed since a configured epoch.
///
/// Generators read the clock once per attempt and never cache the value
/// across calls, so an implementation is free to move backwards; the
/// generator detects that case instead of trusting the clock.
///
/// # Example
///
/// ```
/// use idgen::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1234
///     }
/// }
///
/// assert_eq!(FixedTime.current_millis(), 1234);
/// ```
pub trait TimeSource {
    /// Returns the current time in milliseconds since the configured epoch.
    fn current_millis(&self) -> u64;
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for Arc<T> {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}
