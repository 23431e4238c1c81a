//! Serde support, enabled with the `serde` feature.
//!
//! [`SnowflakeId`] serializes as its decimal string by default, which
//! survives JSON consumers that parse numbers as doubles. It deserializes from
//! either that string or a plain integer. Use [`as_native`] or [`as_base32`]
//! with `#[serde(with = "...")]` to pick a different wire form per field.
//!
//! [`SnowflakeId`]: crate::SnowflakeId

mod snowflake;

pub use snowflake::*;
