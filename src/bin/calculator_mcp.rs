//! Calculator MCP server - stdio entry point.
//!
//! Exposes the single `calculate` tool over newline-delimited JSON-RPC.
//! Launched as a subprocess by the agent; can also be run by hand for
//! debugging.

use study_coach::mcp::McpServer;
use study_coach::servers::calculator;

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

    McpServer::new("calculator")
        .with_tool(calculator::tool())
        .run()
        .await
}
