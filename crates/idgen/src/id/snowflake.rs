use crate::{DecodeError, EPOCH, Error, NodeId, encoding};
use base64::{Engine, engine::general_purpose::STANDARD};
use core::{fmt, str::FromStr, time::Duration};
use std::time::{SystemTime, UNIX_EPOCH};

/// A 64-bit Snowflake ID.
///
/// - 1 bit reserved (always zero, keeps the value non-negative as `i64`)
/// - 41 bits timestamp (ms since [`EPOCH`])
/// - 10 bits node ID
/// - 12 bits sequence
///
/// ```text
///  Bit Index:  63           63 62            22 21          12 11             0
///              +--------------+----------------+--------------+---------------+
///  Field:      | reserved (1) | timestamp (41) | node ID (10) | sequence (12) |
///              +--------------+----------------+--------------+---------------+
///              |<----------- MSB ---------- 64 bits ---------- LSB ---------->|
/// ```
///
/// Ordering follows the raw integer, so IDs from one generator sort in the
/// order they were produced.
///
/// # Example
///
/// ```
/// use idgen::SnowflakeId;
///
/// let id = SnowflakeId::from_components(1000, 2, 1);
/// assert_eq!(id.timestamp(), 1000);
/// assert_eq!(id.node_id(), 2);
/// assert_eq!(id.sequence(), 1);
/// ```
///
/// [`EPOCH`]: crate::EPOCH
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SnowflakeId {
    id: u64,
}

impl SnowflakeId {
    pub const TIMESTAMP_BITS: u32 = 41;
    pub const NODE_ID_BITS: u32 = 10;
    pub const SEQUENCE_BITS: u32 = 12;

    /// Bitmask for the 41-bit timestamp field. Occupies bits 22 through 62.
    pub const TIMESTAMP_MASK: u64 = (1 << Self::TIMESTAMP_BITS) - 1;

    /// Bitmask for the 10-bit node ID field. Occupies bits 12 through 21.
    pub const NODE_ID_MASK: u64 = (1 << Self::NODE_ID_BITS) - 1;

    /// Bitmask for the 12-bit sequence field. Occupies bits 0 through 11.
    pub const SEQUENCE_MASK: u64 = (1 << Self::SEQUENCE_BITS) - 1;

    pub const TIMESTAMP_SHIFT: u32 = Self::NODE_ID_SHIFT + Self::NODE_ID_BITS;
    pub const NODE_ID_SHIFT: u32 = Self::SEQUENCE_SHIFT + Self::SEQUENCE_BITS;
    pub const SEQUENCE_SHIFT: u32 = 0;

    /// The reserved most-significant bit.
    pub const RESERVED_MASK: u64 = 1 << 63;

    pub const MAX_TIMESTAMP: u64 = Self::TIMESTAMP_MASK;
    pub const MAX_SEQUENCE: u64 = Self::SEQUENCE_MASK;

    /// Packs the three fields into an ID. Out-of-range values are truncated
    /// to their field width.
    pub const fn from_components(timestamp: u64, node_id: u64, sequence: u64) -> Self {
        let timestamp = (timestamp & Self::TIMESTAMP_MASK) << Self::TIMESTAMP_SHIFT;
        let node_id = (node_id & Self::NODE_ID_MASK) << Self::NODE_ID_SHIFT;
        let sequence = (sequence & Self::SEQUENCE_MASK) << Self::SEQUENCE_SHIFT;
        Self {
            id: timestamp | node_id | sequence,
        }
    }

    pub(crate) const fn pack(timestamp: u64, node_id: NodeId, sequence: u64) -> Self {
        debug_assert!(timestamp <= Self::TIMESTAMP_MASK, "timestamp overflow");
        debug_assert!(sequence <= Self::SEQUENCE_MASK, "sequence overflow");
        Self::from_components(timestamp, node_id.as_u64(), sequence)
    }

    pub const fn from_raw(raw: u64) -> Self {
        Self { id: raw }
    }

    pub const fn to_raw(&self) -> u64 {
        self.id
    }

    /// The ID as a signed integer. Non-negative for every valid ID.
    pub const fn to_i64(&self) -> i64 {
        self.id as i64
    }

    /// Extracts the timestamp (ms since [`EPOCH`]) from the packed ID.
    pub const fn timestamp(&self) -> u64 {
        (self.id >> Self::TIMESTAMP_SHIFT) & Self::TIMESTAMP_MASK
    }

    /// Extracts the node ID from the packed ID.
    pub const fn node_id(&self) -> u64 {
        (self.id >> Self::NODE_ID_SHIFT) & Self::NODE_ID_MASK
    }

    /// Extracts the sequence number from the packed ID.
    pub const fn sequence(&self) -> u64 {
        (self.id >> Self::SEQUENCE_SHIFT) & Self::SEQUENCE_MASK
    }

    /// Milliseconds since the Unix epoch at which this ID was generated.
    pub const fn unix_millis(&self) -> u64 {
        self.timestamp() + EPOCH.as_millis() as u64
    }

    /// The absolute point in time embedded in this ID.
    pub fn time(&self) -> SystemTime {
        UNIX_EPOCH + Duration::from_millis(self.unix_millis())
    }

    /// Returns `true` if the reserved bit is clear.
    pub const fn is_valid(&self) -> bool {
        self.id & Self::RESERVED_MASK == 0
    }

    /// Returns a copy with the reserved bit cleared.
    pub const fn into_valid(self) -> Self {
        Self {
            id: self.id & !Self::RESERVED_MASK,
        }
    }

    /// Returns `true` for a strictly positive value.
    ///
    /// This is the only structural check available: any positive `i64` is a
    /// plausible ID, so it cannot prove a value came from a generator.
    pub const fn is_well_formed(&self) -> bool {
        self.to_i64() > 0
    }

    pub(crate) const fn has_sequence_room(&self) -> bool {
        self.sequence() < Self::MAX_SEQUENCE
    }

    pub(crate) const fn increment_sequence(&self) -> Self {
        Self { id: self.id + 1 }
    }

    pub(crate) const fn rollover_to_timestamp(&self, ts: u64) -> Self {
        Self::from_components(ts, self.node_id(), 0)
    }

    /// Returns the ID as a zero-padded 20-digit string.
    pub fn to_padded_string(&self) -> String {
        format!("{:020}", self.id)
    }

    /// Returns the ID as a 64-character binary string.
    pub fn to_base2(&self) -> String {
        format!("{:064b}", self.id)
    }

    /// Returns the 13-character Crockford base32 form.
    ///
    /// The encoding is fixed width, so lexicographic order of the strings
    /// matches numeric order of the IDs.
    ///
    /// ```
    /// use idgen::SnowflakeId;
    ///
    /// let id = SnowflakeId::from_raw(2_424_242_424_242_424_242);
    /// assert_eq!(id.encode_base32(), "23953MG16DJDJ");
    /// ```
    pub fn encode_base32(&self) -> String {
        encoding::encode_base32(self.id)
    }

    /// Decodes a 13-character Crockford base32 string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not 13 characters, contains bytes
    /// outside the Crockford alphabet, or decodes to a value with the
    /// reserved bit set.
    pub fn decode_base32(s: impl AsRef<str>) -> Result<Self, DecodeError> {
        Self::checked(encoding::decode_base32(s.as_ref())?)
    }

    /// Returns the base58 form (Flickr alphabet).
    pub fn encode_base58(&self) -> String {
        encoding::encode_base58(self.id)
    }

    /// Decodes a base58 string (Flickr alphabet).
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, contains bytes outside the
    /// alphabet, overflows 64 bits, or sets the reserved bit.
    pub fn decode_base58(s: impl AsRef<str>) -> Result<Self, DecodeError> {
        Self::checked(encoding::decode_base58(s.as_ref())?)
    }

    /// Returns the lower-case base36 form, shortest width.
    pub fn to_base36(&self) -> String {
        encoding::encode_base36(self.id)
    }

    /// Decodes a base36 string in either case.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, contains bytes outside
    /// `0-9a-z`, overflows 64 bits, or sets the reserved bit.
    pub fn decode_base36(s: impl AsRef<str>) -> Result<Self, DecodeError> {
        Self::checked(encoding::decode_base36(s.as_ref())?)
    }

    /// Returns standard padded base64 over the decimal form.
    ///
    /// ```
    /// use idgen::SnowflakeId;
    ///
    /// assert_eq!(SnowflakeId::from_raw(1_234_567_890).to_base64(), "MTIzNDU2Nzg5MA==");
    /// ```
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.to_string())
    }

    /// Decodes the form produced by [`Self::to_base64`].
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not valid base64, does not wrap a
    /// decimal ID, or sets the reserved bit.
    pub fn decode_base64(s: impl AsRef<str>) -> Result<Self, DecodeError> {
        let s = s.as_ref();
        let bytes = STANDARD
            .decode(s)
            .map_err(|_| DecodeError::InvalidBase64 { input: s.to_owned() })?;
        let decimal = core::str::from_utf8(&bytes)
            .map_err(|_| DecodeError::InvalidBase64 { input: s.to_owned() })?;
        Self::checked(parse_decimal(decimal)?)
    }

    pub const fn to_be_bytes(&self) -> [u8; 8] {
        self.id.to_be_bytes()
    }

    pub const fn from_be_bytes(bytes: [u8; 8]) -> Self {
        Self::from_raw(u64::from_be_bytes(bytes))
    }

    pub(crate) fn checked(raw: u64) -> Result<Self, DecodeError> {
        let id = Self::from_raw(raw);
        if id.is_valid() {
            Ok(id)
        } else {
            Err(DecodeError::ReservedBitSet { raw })
        }
    }
}

impl fmt::Display for SnowflakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl fmt::Debug for SnowflakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnowflakeId")
            .field("id", &self.id)
            .field("timestamp", &self.timestamp())
            .field("node_id", &self.node_id())
            .field("sequence", &self.sequence())
            .finish()
    }
}

impl FromStr for SnowflakeId {
    type Err = Error;

    /// Parses the decimal form produced by [`fmt::Display`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::checked(parse_decimal(s)?)?)
    }
}

/// Digits only; `u64::from_str` would also take a leading `+`.
fn parse_decimal(s: &str) -> Result<u64, DecodeError> {
    let invalid = || DecodeError::InvalidDecimal {
        input: s.to_owned(),
    };
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    s.parse().map_err(|_| invalid())
}

impl From<SnowflakeId> for u64 {
    fn from(id: SnowflakeId) -> Self {
        id.to_raw()
    }
}

impl From<SnowflakeId> for i64 {
    fn from(id: SnowflakeId) -> Self {
        id.to_i64()
    }
}

impl TryFrom<i64> for SnowflakeId {
    type Error = DecodeError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::checked(value as u64)
    }
}
