//! Stdio server runtime for MCP tool processes.
//!
//! Reads one JSON-RPC message per line from stdin, dispatches it, and writes
//! one response line to stdout. Each server is stateless across calls and
//! handles a single request at a time; concurrent dispatch is the caller's
//! concern.

use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, warn};

use super::protocol::{
    error_code, CallToolResult, JsonRpcRequest, JsonRpcResponse, ListToolsResult, ToolDescriptor,
    PROTOCOL_VERSION,
};

/// Handler for one tool: arguments in, text out. A returned `Err` becomes a
/// tool result with the error flag set, never a protocol-level failure.
pub type ToolHandler = Box<dyn Fn(&Value) -> Result<String, String> + Send + Sync>;

/// A tool hosted by the server: its published descriptor plus the handler.
pub struct ServerTool {
    pub descriptor: ToolDescriptor,
    pub handler: ToolHandler,
}

impl ServerTool {
    pub fn new(
        descriptor: ToolDescriptor,
        handler: impl Fn(&Value) -> Result<String, String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            descriptor,
            handler: Box::new(handler),
        }
    }
}

/// A single-purpose MCP server speaking newline-delimited JSON-RPC on stdio.
pub struct McpServer {
    name: String,
    tools: Vec<ServerTool>,
}

impl McpServer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tools: Vec::new(),
        }
    }

    /// Register a tool. Descriptors are served in registration order.
    pub fn with_tool(mut self, tool: ServerTool) -> Self {
        self.tools.push(tool);
        self
    }

    /// Serve requests from stdin until EOF.
    pub async fn run(&self) -> anyhow::Result<()> {
        let stdin = BufReader::new(tokio::io::stdin());
        let mut stdout = tokio::io::stdout();
        let mut lines = stdin.lines();

        while let Some(line) = lines.next_line().await? {
            let line = line.trim().to_string();
            if line.is_empty() {
                continue;
            }

            if let Some(response) = self.handle_line(&line) {
                let mut payload = serde_json::to_string(&response)?;
                payload.push('\n');
                stdout.write_all(payload.as_bytes()).await?;
                stdout.flush().await?;
            }
        }

        debug!("stdin closed, {} server exiting", self.name);
        Ok(())
    }

    /// Handle one raw input line. Returns `None` for notifications.
    fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        let request: JsonRpcRequest = match serde_json::from_str(line) {
            Ok(request) => request,
            Err(e) => {
                warn!("unparseable request: {}", e);
                // No id to echo back; 0 is the best we can do.
                return Some(JsonRpcResponse::failure(
                    0,
                    error_code::PARSE_ERROR,
                    format!("parse error: {}", e),
                ));
            }
        };

        if request.is_notification() {
            debug!("notification: {}", request.method);
            return None;
        }

        Some(self.handle_request(&request))
    }

    /// Dispatch a request to its method handler.
    pub fn handle_request(&self, request: &JsonRpcRequest) -> JsonRpcResponse {
        let id = request.id.unwrap_or(0);

        match request.method.as_str() {
            "initialize" => JsonRpcResponse::success(
                id,
                serde_json::json!({
                    "protocolVersion": PROTOCOL_VERSION,
                    "capabilities": { "tools": {} },
                    "serverInfo": {
                        "name": self.name,
                        "version": env!("CARGO_PKG_VERSION"),
                    },
                }),
            ),
            "tools/list" => {
                let result = ListToolsResult {
                    tools: self.tools.iter().map(|t| t.descriptor.clone()).collect(),
                };
                match serde_json::to_value(&result) {
                    Ok(value) => JsonRpcResponse::success(id, value),
                    Err(e) => JsonRpcResponse::failure(
                        id,
                        error_code::INVALID_PARAMS,
                        format!("failed to serialize tool list: {}", e),
                    ),
                }
            }
            "tools/call" => self.handle_call(id, request.params.as_ref()),
            other => JsonRpcResponse::failure(
                id,
                error_code::METHOD_NOT_FOUND,
                format!("unknown method: {}", other),
            ),
        }
    }

    fn handle_call(&self, id: u64, params: Option<&Value>) -> JsonRpcResponse {
        let Some(params) = params else {
            return JsonRpcResponse::failure(id, error_code::INVALID_PARAMS, "missing params");
        };
        let Some(name) = params["name"].as_str() else {
            return JsonRpcResponse::failure(id, error_code::INVALID_PARAMS, "missing tool name");
        };
        let arguments = params.get("arguments").cloned().unwrap_or(Value::Null);

        let result = self.call_tool(name, &arguments);
        match serde_json::to_value(&result) {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(e) => JsonRpcResponse::failure(
                id,
                error_code::INVALID_PARAMS,
                format!("failed to serialize result: {}", e),
            ),
        }
    }

    /// Execute a tool call. Unknown names and missing required arguments
    /// come back as error results, never as partial successes.
    pub fn call_tool(&self, name: &str, arguments: &Value) -> CallToolResult {
        let Some(tool) = self.tools.iter().find(|t| t.descriptor.name == name) else {
            return CallToolResult::error(format!("Unknown tool: {}", name));
        };

        for required in tool.descriptor.required_arguments() {
            if arguments.get(required).is_none() {
                return CallToolResult::error(format!("Missing required argument: {}", required));
            }
        }

        match (tool.handler)(arguments) {
            Ok(text) => CallToolResult::text(text),
            Err(message) => CallToolResult::error(format!("Error: {}", message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn echo_server() -> McpServer {
        let descriptor = ToolDescriptor {
            name: "echo".to_string(),
            description: "Echo the input".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "required": ["text"],
                "properties": {"text": {"type": "string"}},
            }),
        };
        McpServer::new("echo").with_tool(ServerTool::new(descriptor, |args| {
            Ok(args["text"].as_str().unwrap_or_default().to_string())
        }))
    }

    #[test]
    fn initialize_reports_protocol_version() {
        let server = echo_server();
        let response = server.handle_request(&JsonRpcRequest::initialize(1, "test"));
        let result = response.result.unwrap();
        assert_eq!(result["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(result["serverInfo"]["name"], "echo");
    }

    #[test]
    fn list_tools_returns_registered_descriptors() {
        let server = echo_server();
        let response = server.handle_request(&JsonRpcRequest::list_tools(2));
        let result: ListToolsResult = serde_json::from_value(response.result.unwrap()).unwrap();
        assert_eq!(result.tools.len(), 1);
        assert_eq!(result.tools[0].name, "echo");
    }

    #[test]
    fn unknown_tool_yields_error_result() {
        let server = echo_server();
        let result = server.call_tool("nope", &serde_json::json!({}));
        assert!(result.is_error);
        assert!(result.joined_text().contains("Unknown tool: nope"));
    }

    #[test]
    fn missing_required_argument_yields_error_result() {
        let server = echo_server();
        let result = server.call_tool("echo", &serde_json::json!({}));
        assert!(result.is_error);
        assert!(result.joined_text().contains("Missing required argument: text"));
    }

    #[test]
    fn unknown_method_is_a_protocol_error() {
        let server = echo_server();
        let response = server.handle_request(&JsonRpcRequest::new(3, "tools/unsubscribe", None));
        let error = response.error.unwrap();
        assert_eq!(error.code, error_code::METHOD_NOT_FOUND);
    }

    #[test]
    fn notifications_get_no_response() {
        let server = echo_server();
        assert!(server
            .handle_line(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .is_none());
    }
}
