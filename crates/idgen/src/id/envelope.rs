use crate::SnowflakeId;
use core::{any::Any, fmt, hash};
use std::sync::Arc;

/// A scheme-agnostic identifier.
///
/// `Id` carries the normalized integer and string forms every scheme can
/// provide, plus the scheme-specific value it was built from. Most code only
/// needs [`Id::as_i64`] and [`Id::as_str`]; code that needs more (e.g. the
/// embedded timestamp of a Snowflake) recovers the original value with
/// [`Id::raw`].
///
/// Equality and hashing consider only the normalized forms.
///
/// # Example
///
/// ```
/// use idgen::{Generator, Node, SnowflakeId};
///
/// let node = Node::new(1).unwrap();
/// let id = node.generate();
/// assert!(id.as_i64() > 0);
///
/// let sf = id.raw::<SnowflakeId>().expect("snowflake-backed id");
/// assert_eq!(sf.node_id(), 1);
/// assert_eq!(sf.to_string(), id.as_str());
/// ```
#[derive(Clone, Default)]
pub struct Id {
    int_val: i64,
    str_val: String,
    raw: Option<Arc<dyn Any + Send + Sync>>,
}

impl Id {
    /// Builds an envelope around a scheme-specific value.
    pub fn new<R>(int_val: i64, str_val: impl Into<String>, raw: R) -> Self
    where
        R: Any + Send + Sync,
    {
        Self {
            int_val,
            str_val: str_val.into(),
            raw: Some(Arc::new(raw)),
        }
    }

    /// Builds an envelope with no scheme-specific value attached.
    pub fn from_parts(int_val: i64, str_val: impl Into<String>) -> Self {
        Self {
            int_val,
            str_val: str_val.into(),
            raw: None,
        }
    }

    /// The integer form. Schemes without one (e.g. UUID-like IDs) report 0.
    pub const fn as_i64(&self) -> i64 {
        self.int_val
    }

    pub fn as_str(&self) -> &str {
        &self.str_val
    }

    /// Returns `true` for the zero value (`Id::default()`).
    pub fn is_zero(&self) -> bool {
        self.int_val == 0 && self.str_val.is_empty()
    }

    /// Returns the scheme-specific value if it is a `R`.
    pub fn raw<R: Any>(&self) -> Option<&R> {
        self.raw.as_deref()?.downcast_ref::<R>()
    }

    pub fn has_raw(&self) -> bool {
        self.raw.is_some()
    }
}

impl From<SnowflakeId> for Id {
    fn from(id: SnowflakeId) -> Self {
        Self::new(id.to_i64(), id.to_string(), id)
    }
}

impl PartialEq for Id {
    fn eq(&self, other: &Self) -> bool {
        self.int_val == other.int_val && self.str_val == other.str_val
    }
}

impl Eq for Id {}

impl hash::Hash for Id {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.int_val.hash(state);
        self.str_val.hash(state);
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.str_val)
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Id")
            .field("int_val", &self.int_val)
            .field("str_val", &self.str_val)
            .field("has_raw", &self.has_raw())
            .finish()
    }
}
