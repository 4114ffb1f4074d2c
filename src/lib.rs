//! PDF Navigator MCP Server library.
//!
//! This library provides an MCP server that reads and searches PDFs using
//! MuPDF and opens them at a given page in an external viewer.

pub mod config;
pub mod document;
pub mod error;
pub mod search;
pub mod server;
pub mod state;
pub mod tools;
pub mod viewer;

pub use config::Config;
pub use error::{NavigatorError, Result};
pub use server::NavigatorServer;
pub use state::ServerState;
