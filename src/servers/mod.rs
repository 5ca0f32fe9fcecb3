//! Capabilities behind the MCP server binaries.
//!
//! The logic lives here in the library so it can be unit tested; the
//! `src/bin/*.rs` entry points only wire these tools into the stdio runtime.

pub mod calculator;
pub mod weather;
