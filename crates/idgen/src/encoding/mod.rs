mod base36;
mod base58;
mod crockford;

pub(crate) use base36::*;
pub(crate) use base58::*;
pub(crate) use crockford::*;
