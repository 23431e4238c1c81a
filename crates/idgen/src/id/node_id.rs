use crate::{Error, Result, SnowflakeId};
use core::fmt;

/// The default node ID for single-node deployments.
pub const DEFAULT_NODE_ID: NodeId = NodeId(1);

/// A validated node identifier in `[0, 1023]`.
///
/// Uniqueness of node IDs across a fleet is the caller's responsibility; this
/// type only guarantees the value fits in the 10-bit node field.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u16);

impl NodeId {
    /// Largest representable node ID.
    pub const MAX: Self = Self(SnowflakeId::NODE_ID_MASK as u16);

    /// Validates `node_id` against the 10-bit node field.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidNodeId`] if `node_id` is negative or greater
    /// than [`NodeId::MAX`].
    ///
    /// # Example
    /// ```
    /// use idgen::NodeId;
    ///
    /// assert_eq!(NodeId::new(1023).unwrap().get(), 1023);
    /// assert!(NodeId::new(1024).is_err());
    /// assert!(NodeId::new(-1).is_err());
    /// ```
    pub fn new(node_id: i64) -> Result<Self> {
        u16::try_from(node_id)
            .ok()
            .filter(|&n| n <= Self::MAX.0)
            .map(Self)
            .ok_or(Error::InvalidNodeId {
                node_id,
                max: Self::MAX.0,
            })
    }

    pub const fn get(self) -> u16 {
        self.0
    }

    pub(crate) const fn as_u64(self) -> u64 {
        self.0 as u64
    }
}

impl TryFrom<i64> for NodeId {
    type Error = Error;

    fn try_from(node_id: i64) -> Result<Self> {
        Self::new(node_id)
    }
}

impl From<NodeId> for u16 {
    fn from(node_id: NodeId) -> Self {
        node_id.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
