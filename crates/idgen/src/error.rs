/// A result type defaulting to this crate's [`enum@Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All error variants that `idgen` can emit.
///
/// Configuration and registration errors are permanent for the call that
/// produced them. [`Error::ClockMovedBackwards`] is the only transient variant
/// and may be retried once the clock recovers.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The node ID does not fit in the 10-bit node field.
    #[error("node ID {node_id} is out of range (0..={max})")]
    InvalidNodeId { node_id: i64, max: u16 },

    /// [`crate::set_default`] was called while a default generator was
    /// already registered.
    #[error("default generator already initialized")]
    AlreadyInitialized,

    /// No default generator has been registered.
    #[error("default generator not initialized")]
    NotInitialized,

    /// The clock reads earlier than the last timestamp handed out by this
    /// generator.
    #[error("clock moved backwards by {behind_ms}ms")]
    ClockMovedBackwards { behind_ms: u64 },

    /// The clock has run past the 41-bit timestamp field.
    #[error("timestamp {timestamp} exceeds the maximum of {max}")]
    TimestampOverflow { timestamp: u64, max: u64 },

    /// The system clock is set before the epoch used to build a time source.
    #[error("system clock is set before the epoch")]
    ClockBeforeEpoch,

    /// A text form could not be decoded into an ID.
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Errors from decoding a text or byte form back into a
/// [`crate::SnowflakeId`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum DecodeError {
    #[error("invalid length: {len} (expected {expected})")]
    InvalidLength { len: usize, expected: usize },

    #[error("invalid ascii byte {byte:#04x} at index {index}")]
    InvalidAscii { byte: u8, index: usize },

    #[error("invalid decimal ID: {input:?}")]
    InvalidDecimal { input: String },

    #[error("invalid base64 ID: {input:?}")]
    InvalidBase64 { input: String },

    #[error("value does not fit in 64 bits")]
    Overflow,

    /// The decoded value sets the reserved sign bit.
    #[error("reserved bit set in {raw:#018x}")]
    ReservedBitSet { raw: u64 },
}
