//! Tool abstraction and registry.
//!
//! Every capability the agent can invoke implements [`Tool`], whether it is
//! backed by an MCP subprocess or runs in-process. The registry is assembled
//! once at agent construction and is immutable afterwards.

mod knowledge;
mod mcp_tool;

pub use knowledge::KnowledgeSearch;
pub use mcp_tool::McpToolBridge;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::llm::ToolDefinition;

/// A callable capability exposed to the LLM.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique tool name, as the LLM will reference it.
    fn name(&self) -> &str;

    /// Description shown to the LLM for tool selection.
    fn description(&self) -> &str;

    /// JSON Schema for the tool's arguments.
    fn parameters_schema(&self) -> Value;

    /// Execute the tool with the given arguments.
    async fn execute(&self, args: Value) -> anyhow::Result<String>;
}

/// Registry of available tools, fixed after construction.
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool. Later registrations win on name collision.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        debug!("Registered tool: {}", name);
        self.tools.insert(name, tool);
    }

    /// Check if a tool exists.
    pub fn has(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Get the number of registered tools.
    pub fn count(&self) -> usize {
        self.tools.len()
    }

    /// Tool definitions for LLM function calling, sorted by name so the
    /// model sees a stable list.
    pub fn tool_definitions(&self) -> Vec<ToolDefinition> {
        let mut definitions: Vec<ToolDefinition> = self
            .tools
            .values()
            .map(|tool| ToolDefinition {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                parameters: tool.parameters_schema(),
            })
            .collect();
        definitions.sort_by(|a, b| a.name.cmp(&b.name));
        definitions
    }

    /// Execute a tool by name. An unknown name is an error, not a panic; the
    /// agent loop relays it to the model as an observation.
    pub async fn execute(&self, name: &str, args: Value) -> anyhow::Result<String> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| anyhow::anyhow!("Unknown tool: {}", name))?;
        tool.execute(args).await
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Minimal tool used by registry and agent tests.
    pub struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Echo the 'text' argument back"
        }

        fn parameters_schema(&self) -> Value {
            serde_json::json!({
                "type": "object",
                "required": ["text"],
                "properties": {"text": {"type": "string"}},
            })
        }

        async fn execute(&self, args: Value) -> anyhow::Result<String> {
            Ok(args["text"].as_str().unwrap_or_default().to_string())
        }
    }

    /// Tool that always fails, for observing error relay behavior.
    pub struct FailingTool;

    #[async_trait]
    impl Tool for FailingTool {
        fn name(&self) -> &str {
            "broken"
        }

        fn description(&self) -> &str {
            "Always fails"
        }

        fn parameters_schema(&self) -> Value {
            serde_json::json!({"type": "object", "properties": {}})
        }

        async fn execute(&self, _args: Value) -> anyhow::Result<String> {
            anyhow::bail!("tool exploded")
        }
    }
}
