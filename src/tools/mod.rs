//! MCP tool implementations.

pub mod navigate;
pub mod read;
pub mod search;
pub mod structure;

// Re-export common types
pub use navigate::*;
pub use read::*;
pub use search::*;
pub use structure::*;
