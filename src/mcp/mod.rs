//! MCP (Model Context Protocol) server.
//!
//! JSON-RPC 2.0 over stdio, one message per line.
//!
//! ## Tools
//!
//! - `bake_recipe` - run a recipe against one input
//! - `batch_bake_recipe` - run a recipe against several inputs
//! - `perform_magic_operation` - let the engine guess how the input is encoded
//!
//! ## Resources
//!
//! - `data://cyberchef-operations-categories`
//! - `data://cyberchef-operations-by-category/{category}`

mod server;
pub mod types;

pub use server::McpServer;
