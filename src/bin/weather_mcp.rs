//! Weather MCP server - stdio entry point.
//!
//! Exposes the single `get_weather` tool over newline-delimited JSON-RPC.
//! Returns mock data; launched as a subprocess by the agent.

use study_coach::mcp::McpServer;
use study_coach::servers::weather;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Log to stderr; stdout belongs to the protocol.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    McpServer::new("weather")
        .with_tool(weather::tool())
        .run()
        .await
}
