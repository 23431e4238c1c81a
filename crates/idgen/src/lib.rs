//! Snowflake-style 64-bit IDs: unique, roughly time-ordered, and decodable
//! back into the millisecond, node and sequence that produced them.
//!
//! ```
//! use idgen::Node;
//!
//! let node = Node::new(1).unwrap();
//! let id = node.produce();
//! assert_eq!(id.node_id(), 1);
//! assert_eq!(id.to_string().parse::<idgen::SnowflakeId>().unwrap(), id);
//! ```

mod encoding;
mod error;
mod generator;
mod id;
mod registry;
#[cfg(feature = "serde")]
pub mod serde;
mod time;

pub use crate::error::*;
pub use crate::generator::*;
pub use crate::id::*;
pub use crate::registry::*;
pub use crate::time::*;
