use crate::SnowflakeId;

/// Represents the result of one attempt to generate a Snowflake ID.
///
/// This type models the outcome of [`SnowflakeGenerator::try_poll_id`]:
///
/// - [`IdGenStatus::Ready`] indicates a new ID was successfully generated.
/// - [`IdGenStatus::Pending`] means the generator cannot produce an ID right
///   now but will be able to shortly.
/// - [`IdGenStatus::ClockBehind`] means the clock reads earlier than a
///   timestamp this generator already used. Nothing was consumed.
///
/// This allows non-blocking generation loops and clean backoff strategies;
/// [`crate::Node`] wraps one such loop.
///
/// # Example
///
/// ```
/// use idgen::{IdGenStatus, LockSnowflakeGenerator, NodeId, SnowflakeGenerator, TimeSource};
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1
///     }
/// }
///
/// let node_id = NodeId::new(1).unwrap();
/// let generator = LockSnowflakeGenerator::from_components(1, node_id, 4095, FixedTime);
/// match generator.try_poll_id().unwrap() {
///     IdGenStatus::Ready { id } => println!("ID: {id}"),
///     IdGenStatus::Pending { yield_for } => println!("Back off for {yield_for}ms"),
///     IdGenStatus::ClockBehind { behind } => println!("Clock is {behind}ms behind"),
/// }
/// ```
///
/// [`SnowflakeGenerator::try_poll_id`]: crate::SnowflakeGenerator::try_poll_id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdGenStatus {
    /// A unique ID was generated and is ready to use.
    Ready {
        /// The generated Snowflake ID.
        id: SnowflakeId,
    },
    /// The sequence for the current millisecond is exhausted (`yield_for =
    /// 1`) or another thread won a race for the state (`yield_for = 0`).
    Pending {
        /// Milliseconds to wait before trying again.
        yield_for: u64,
    },
    /// The clock moved backwards.
    ClockBehind {
        /// How far, in milliseconds, the clock is behind the last timestamp
        /// used.
        behind: u64,
    },
}
