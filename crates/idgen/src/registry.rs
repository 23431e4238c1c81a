//! Process-wide default generator.
//!
//! Code that cannot have a generator passed in can reach the one registered
//! here. Injecting an `Arc<dyn Generator>` is preferred wherever possible.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::{Error, Generator, Id, Result};

static DEFAULT: RwLock<Option<Arc<dyn Generator>>> = RwLock::new(None);

/// Registers `generator` as the process-wide default.
///
/// Only the first registration succeeds. Concurrent callers race on a single
/// write lock, so exactly one of them wins.
///
/// # Errors
///
/// Returns [`Error::AlreadyInitialized`] if a default is already registered.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use idgen::{Error, Node};
///
/// # idgen::reset_default();
/// idgen::set_default(Arc::new(Node::new(1).unwrap())).unwrap();
/// assert_eq!(
///     idgen::set_default(Arc::new(Node::new(2).unwrap())),
///     Err(Error::AlreadyInitialized)
/// );
///
/// let id = idgen::generate().unwrap();
/// assert!(id.as_i64() > 0);
/// # idgen::reset_default();
/// ```
pub fn set_default(generator: Arc<dyn Generator>) -> Result<()> {
    let mut slot = DEFAULT.write();
    if slot.is_some() {
        return Err(Error::AlreadyInitialized);
    }
    *slot = Some(generator);

    #[cfg(feature = "tracing")]
    tracing::debug!("default generator registered");
    Ok(())
}

/// Returns the registered default generator, if any.
pub fn default_generator() -> Option<Arc<dyn Generator>> {
    DEFAULT.read().clone()
}

/// Produces an ID from the default generator.
///
/// # Errors
///
/// Returns [`Error::NotInitialized`] if no default is registered.
pub fn generate() -> Result<Id> {
    // Release the read lock before generating; `generate` may block.
    let generator = default_generator().ok_or(Error::NotInitialized)?;
    Ok(generator.generate())
}

/// Clears the default generator so a new one can be registered.
///
/// Intended for tests.
pub fn reset_default() {
    DEFAULT.write().take();
}
