//! Agent module - the core reason-act-observe logic.
//!
//! The agent follows a "tools in a loop" pattern:
//! 1. Build context with system prompt and user question
//! 2. Call LLM with available tools
//! 3. If LLM requests tool calls, execute them and feed results back
//! 4. Repeat until LLM produces final response or max iterations reached

mod agent_loop;
mod prompt;

pub use agent_loop::Agent;
pub use prompt::build_system_prompt;
