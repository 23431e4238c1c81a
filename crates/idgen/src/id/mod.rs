mod envelope;
mod node_id;
mod snowflake;

pub use envelope::*;
pub use node_id::*;
pub use snowflake::*;
