//! # Study Coach
//!
//! A CLI study assistant that wires an LLM to external tools:
//! - A calculator and a mock weather lookup, each hosted in its own MCP
//!   stdio subprocess
//! - An in-process semantic search over a tiny study-notes corpus
//!
//! ## Architecture
//!
//! The agent follows the "tools in a loop" pattern:
//! 1. Read a question from the interactive shell
//! 2. Build context with system prompt and available tools
//! 3. Call LLM, parse response, execute any tool calls
//! 4. Feed results back to LLM, repeat until a final answer
//!
//! ## Example
//!
//! ```rust,ignore
//! use study_coach::{agent::Agent, config::Config};
//!
//! let config = Config::from_env()?;
//! let agent = Agent::build(config).await?;
//! let answer = agent.run("What is 123 * 45?").await?;
//! ```

pub mod agent;
pub mod config;
pub mod knowledge;
pub mod llm;
pub mod mcp;
pub mod servers;
pub mod tools;

pub use config::Config;
