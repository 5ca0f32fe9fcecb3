//! Weather capability served by the `weather-mcp` binary (mock data).

use serde_json::Value;

use crate::mcp::{ServerTool, ToolDescriptor};

/// Descriptor published via `tools/list`.
pub fn descriptor() -> ToolDescriptor {
    ToolDescriptor {
        name: "get_weather".to_string(),
        description: "Get current weather for a location (city name or place). \
                      This demo returns mock data."
            .to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "required": ["location"],
            "properties": {
                "location": {
                    "type": "string",
                    "description": "City or place name, e.g. 'San Francisco' or 'London'",
                },
            },
        }),
    }
}

/// The `get_weather` tool, ready to register with an [`crate::mcp::McpServer`].
pub fn tool() -> ServerTool {
    ServerTool::new(descriptor(), |args: &Value| {
        Ok(mock_report(args["location"].as_str().unwrap_or_default()))
    })
}

/// Deterministic templated report for any location (no API key required).
/// Empty or whitespace-only locations fall back to "Unknown".
pub fn mock_report(location: &str) -> String {
    let location = location.trim();
    let location = if location.is_empty() { "Unknown" } else { location };
    format!(
        "Weather in {}: 72°F (22°C), partly cloudy. \
         Mock data — use a real weather MCP server or API for live data.",
        location
    )
}
