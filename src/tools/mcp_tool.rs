//! Bridge exposing a remote MCP tool as a registry [`Tool`].
//!
//! The agent loop cannot tell a bridged MCP tool from an in-process one: the
//! descriptor the server published becomes the name, description and schema
//! the LLM sees, and `execute` forwards to `tools/call`.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::mcp::{McpClient, ToolDescriptor};

use super::Tool;

/// One remote tool on one MCP server.
pub struct McpToolBridge {
    client: Arc<McpClient>,
    descriptor: ToolDescriptor,
}

impl McpToolBridge {
    pub fn new(client: Arc<McpClient>, descriptor: ToolDescriptor) -> Self {
        Self { client, descriptor }
    }
}

#[async_trait]
impl Tool for McpToolBridge {
    fn name(&self) -> &str {
        &self.descriptor.name
    }

    fn description(&self) -> &str {
        &self.descriptor.description
    }

    fn parameters_schema(&self) -> Value {
        self.descriptor.input_schema.clone()
    }

    async fn execute(&self, args: Value) -> anyhow::Result<String> {
        self.client
            .call_tool(&self.descriptor.name, args)
            .await
            .map_err(anyhow::Error::from)
    }
}
