//! Configuration management for Study Coach.
//!
//! Configuration can be set via environment variables (a `.env` file is
//! loaded first if present):
//! - `OPENAI_API_KEY` - Required. Your OpenAI API key.
//! - `OPENAI_MODEL` - Optional. Chat model for the agent. Defaults to `gpt-4o-mini`.
//! - `OPENAI_EMBEDDING_MODEL` - Optional. Embedding model for the knowledge base.
//!   Defaults to `text-embedding-3-small`.
//! - `USE_RAG_TOOL` - Optional. Enable the knowledge-base search tool. Defaults to `true`.
//! - `MAX_ITERATIONS` - Optional. Maximum agent loop iterations. Defaults to `10`.
//! - `CALCULATOR_MCP_COMMAND` / `WEATHER_MCP_COMMAND` - Optional. Override the
//!   command used to launch each MCP server subprocess.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Launch definition for one MCP server subprocess (stdio transport).
#[derive(Debug, Clone)]
pub struct McpServerConfig {
    /// Registry label for the server (used in logs, not on the wire).
    pub name: String,

    /// Program to execute.
    pub command: PathBuf,

    /// Arguments passed to the program.
    pub args: Vec<String>,
}

impl McpServerConfig {
    pub fn new(name: impl Into<String>, command: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            args: Vec::new(),
        }
    }
}

/// Agent configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// OpenAI API key
    pub api_key: String,

    /// Chat model identifier
    pub model: String,

    /// Embedding model identifier (knowledge base)
    pub embedding_model: String,

    /// Whether the knowledge-base search tool is registered
    pub use_rag_tool: bool,

    /// Maximum iterations for the agent loop
    pub max_iterations: usize,

    /// MCP servers to launch and discover tools from
    pub mcp_servers: Vec<McpServerConfig>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if `OPENAI_API_KEY` is not set.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| ConfigError::MissingEnvVar("OPENAI_API_KEY".to_string()))?;

        let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());

        let embedding_model = std::env::var("OPENAI_EMBEDDING_MODEL")
            .unwrap_or_else(|_| "text-embedding-3-small".to_string());

        let use_rag_tool = std::env::var("USE_RAG_TOOL")
            .ok()
            .map(|v| {
                parse_bool(&v).map_err(|e| ConfigError::InvalidValue("USE_RAG_TOOL".to_string(), e))
            })
            .transpose()?
            .unwrap_or(true);

        let max_iterations = std::env::var("MAX_ITERATIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .map_err(|e| {
                ConfigError::InvalidValue("MAX_ITERATIONS".to_string(), format!("{}", e))
            })?;

        Ok(Self {
            api_key,
            model,
            embedding_model,
            use_rag_tool,
            max_iterations,
            mcp_servers: default_mcp_servers(),
        })
    }

    /// Create a config with custom values (useful for testing).
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            embedding_model: "text-embedding-3-small".to_string(),
            use_rag_tool: true,
            max_iterations: 10,
            mcp_servers: Vec::new(),
        }
    }
}

/// Default MCP server commands: the `calculator-mcp` and `weather-mcp`
/// binaries installed next to the current executable, so the subprocesses
/// come from the same build. Overridable per server via env.
fn default_mcp_servers() -> Vec<McpServerConfig> {
    let bin_dir = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|d| d.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));

    let resolve = |env_var: &str, bin_name: &str| -> PathBuf {
        std::env::var(env_var)
            .map(PathBuf::from)
            .unwrap_or_else(|_| bin_dir.join(bin_name))
    };

    vec![
        McpServerConfig::new("calculator", resolve("CALCULATOR_MCP_COMMAND", "calculator-mcp")),
        McpServerConfig::new("weather", resolve("WEATHER_MCP_COMMAND", "weather-mcp")),
    ]
}

fn parse_bool(value: &str) -> Result<bool, String> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "t" | "yes" | "y" | "on" => Ok(true),
        "0" | "false" | "f" | "no" | "n" | "off" => Ok(false),
        other => Err(format!("expected boolean-like value, got: {}", other)),
    }
}
