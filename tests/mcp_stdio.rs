//! End-to-end tests for the MCP stdio transport: the real client talking to
//! the real server binaries over pipes.

use study_coach::config::McpServerConfig;
use study_coach::mcp::{McpClient, McpClientError};

fn calculator_config() -> McpServerConfig {
    McpServerConfig::new("calculator", env!("CARGO_BIN_EXE_calculator-mcp"))
}

fn weather_config() -> McpServerConfig {
    McpServerConfig::new("weather", env!("CARGO_BIN_EXE_weather-mcp"))
}

#[tokio::test]
async fn calculator_publishes_one_tool_with_required_expression() {
    let client = McpClient::connect(&calculator_config()).await.unwrap();
    let tools = client.list_tools().await.unwrap();

    assert_eq!(tools.len(), 1);
    assert_eq!(tools[0].name, "calculate");
    assert_eq!(tools[0].required_arguments(), vec!["expression"]);
}

#[tokio::test]
async fn calculator_evaluates_with_precedence() {
    let client = McpClient::connect(&calculator_config()).await.unwrap();

    let result = client
        .call_tool("calculate", serde_json::json!({"expression": "123 * 45"}))
        .await
        .unwrap();
    assert_eq!(result, "5535");

    let result = client
        .call_tool("calculate", serde_json::json!({"expression": "(10 - 2) / 4"}))
        .await
        .unwrap();
    assert_eq!(result, "2");
}

#[tokio::test]
async fn calculator_rejects_disallowed_characters() {
    let client = McpClient::connect(&calculator_config()).await.unwrap();

    let err = client
        .call_tool("calculate", serde_json::json!({"expression": "2 + x"}))
        .await
        .unwrap_err();
    match err {
        McpClientError::ToolError(name, text) => {
            assert_eq!(name, "calculate");
            assert!(text.contains("Only numbers and + - * / ( ) are allowed"));
        }
        other => panic!("expected ToolError, got {other}"),
    }
}

#[tokio::test]
async fn missing_required_argument_is_an_error_result() {
    let client = McpClient::connect(&calculator_config()).await.unwrap();

    let err = client
        .call_tool("calculate", serde_json::json!({}))
        .await
        .unwrap_err();
    match err {
        McpClientError::ToolError(_, text) => {
            assert!(text.contains("Missing required argument: expression"));
        }
        other => panic!("expected ToolError, got {other}"),
    }
}

#[tokio::test]
async fn unknown_tool_is_an_error_result_not_a_crash() {
    let client = McpClient::connect(&calculator_config()).await.unwrap();

    let err = client
        .call_tool("translate", serde_json::json!({"text": "hi"}))
        .await
        .unwrap_err();
    match err {
        McpClientError::ToolError(_, text) => assert!(text.contains("Unknown tool: translate")),
        other => panic!("expected ToolError, got {other}"),
    }

    // The server survives the bad call and keeps answering.
    let result = client
        .call_tool("calculate", serde_json::json!({"expression": "1 + 1"}))
        .await
        .unwrap();
    assert_eq!(result, "2");
}

#[tokio::test]
async fn weather_echoes_the_location() {
    let client = McpClient::connect(&weather_config()).await.unwrap();

    let report = client
        .call_tool("get_weather", serde_json::json!({"location": "Tokyo"}))
        .await
        .unwrap();
    assert!(report.contains("Tokyo"));
    assert!(report.contains("72°F"));
}

#[tokio::test]
async fn weather_defaults_blank_locations_to_unknown() {
    let client = McpClient::connect(&weather_config()).await.unwrap();

    let report = client
        .call_tool("get_weather", serde_json::json!({"location": "   "}))
        .await
        .unwrap();
    assert!(report.contains("Unknown"));
}

#[tokio::test]
async fn connect_fails_fast_for_a_missing_server_binary() {
    let config = McpServerConfig::new("ghost", "/nonexistent/ghost-mcp");
    let err = McpClient::connect(&config).await.unwrap_err();
    assert!(matches!(err, McpClientError::Spawn(_, _)));
}
