use crate::{Id, IdGenStatus, NodeId, Result, TimeSource};

/// A minimal interface for generating Snowflake IDs.
///
/// Implementations own the (timestamp, sequence) state for one node and make
/// each [`SnowflakeGenerator::try_poll_id`] call a single atomic step over
/// that state.
pub trait SnowflakeGenerator {
    /// The clock the generator reads.
    type Time: TimeSource;

    /// Creates a new generator that has not produced any ID yet.
    fn new(node_id: NodeId, time: Self::Time) -> Self
    where
        Self: Sized;

    /// The node ID encoded into every ID from this generator.
    fn node_id(&self) -> NodeId;

    /// Makes one non-blocking attempt to generate the next ID.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::TimestampOverflow`] once the clock has run past
    /// the 41-bit timestamp field.
    fn try_poll_id(&self) -> Result<IdGenStatus>;
}

/// The single capability the rest of a system needs from an ID scheme.
///
/// Callers depend on `Generator` rather than a concrete scheme, so the scheme
/// can be swapped at construction time without touching them.
pub trait Generator: Send + Sync {
    /// Produces a new, unique ID.
    fn generate(&self) -> Id;
}
