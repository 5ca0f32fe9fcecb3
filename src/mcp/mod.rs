//! Model Context Protocol (MCP) integration.
//!
//! The agent's calculator and weather tools live in separate subprocesses
//! that speak newline-delimited JSON-RPC over stdio. This module holds the
//! shared wire types, the client used by the agent, and the server runtime
//! used by the `calculator-mcp` and `weather-mcp` binaries.

pub mod client;
pub mod protocol;
pub mod server;

pub use client::{McpClient, McpClientError};
pub use protocol::{CallToolResult, ContentBlock, ToolDescriptor};
pub use server::{McpServer, ServerTool};
