//! Core agent loop implementation.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::knowledge::Retriever;
use crate::llm::{ChatMessage, ChatResponse, LlmClient, OpenAiClient, Role};
use crate::mcp::McpClient;
use crate::tools::{KnowledgeSearch, McpToolBridge, ToolRegistry};

use super::prompt::build_system_prompt;

/// The tool-calling agent.
pub struct Agent {
    config: Config,
    llm: Arc<dyn LlmClient>,
    tools: ToolRegistry,
}

impl Agent {
    /// Connect to the configured MCP servers, build the knowledge base when
    /// enabled, and assemble the tool registry.
    ///
    /// Any unreachable server or failed corpus embedding is a fatal
    /// configuration error; there is no retry and no partial registry.
    pub async fn build(config: Config) -> anyhow::Result<Self> {
        let llm = Arc::new(OpenAiClient::new(config.api_key.clone()));
        let mut tools = ToolRegistry::new();

        for server in &config.mcp_servers {
            let client = Arc::new(McpClient::connect(server).await?);
            let descriptors = client.list_tools().await?;
            if descriptors.is_empty() {
                anyhow::bail!("MCP server '{}' published no tools", client.name());
            }
            for descriptor in descriptors {
                tools.register(Arc::new(McpToolBridge::new(client.clone(), descriptor)));
            }
        }

        if config.use_rag_tool {
            let retriever = Retriever::build(&config, llm.clone()).await?;
            tools.register(Arc::new(KnowledgeSearch::new(retriever)));
        }

        info!("Agent ready with {} tools", tools.count());
        Ok(Self {
            config,
            llm,
            tools,
        })
    }

    /// Create an agent from existing parts (useful for testing).
    pub fn with_parts(config: Config, llm: Arc<dyn LlmClient>, tools: ToolRegistry) -> Self {
        Self { config, llm, tools }
    }

    /// Run one user question through the reason-act-observe loop and return
    /// the final answer.
    pub async fn run(&self, user_message: &str) -> anyhow::Result<String> {
        let mut messages = vec![
            ChatMessage::system(build_system_prompt(self.config.use_rag_tool)),
            ChatMessage::user(user_message),
        ];

        let tool_definitions = self.tools.tool_definitions();

        for iteration in 0..self.config.max_iterations {
            debug!("Agent iteration {}", iteration + 1);

            let response: ChatResponse = self
                .llm
                .chat_completion(&self.config.model, &messages, Some(&tool_definitions))
                .await?;

            if let Some(tool_calls) = &response.tool_calls {
                if !tool_calls.is_empty() {
                    messages.push(ChatMessage {
                        role: Role::Assistant,
                        content: response.content.clone(),
                        tool_calls: Some(tool_calls.clone()),
                        tool_call_id: None,
                    });

                    // Tool calls run sequentially; a failure becomes an
                    // observation the model can recover from, never a loop
                    // abort.
                    for tool_call in tool_calls {
                        debug!(
                            "Calling tool: {} with args: {}",
                            tool_call.function.name, tool_call.function.arguments
                        );

                        let args: serde_json::Value =
                            serde_json::from_str(&tool_call.function.arguments)
                                .unwrap_or(serde_json::Value::Null);

                        let observation =
                            match self.tools.execute(&tool_call.function.name, args).await {
                                Ok(output) => output,
                                Err(e) => {
                                    warn!("Tool {} failed: {}", tool_call.function.name, e);
                                    format!("Error: {}", e)
                                }
                            };

                        messages.push(ChatMessage::tool_result(&tool_call.id, observation));
                    }

                    continue;
                }
            }

            // No tool calls - this is the final response.
            if let Some(content) = response.content {
                return Ok(content);
            }

            return Err(anyhow::anyhow!("LLM returned empty response"));
        }

        Err(anyhow::anyhow!(
            "Max iterations ({}) reached without completion",
            self.config.max_iterations
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{ChatResponse, FunctionCall, ToolCall, ToolDefinition};
    use crate::tools::test_support::{EchoTool, FailingTool};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// LLM stub that replays a fixed script of responses and records the
    /// messages it was shown.
    struct ScriptedLlm {
        script: Mutex<Vec<ChatResponse>>,
        seen: Mutex<Vec<Vec<ChatMessage>>>,
    }

    impl ScriptedLlm {
        fn new(mut responses: Vec<ChatResponse>) -> Self {
            responses.reverse();
            Self {
                script: Mutex::new(responses),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LlmClient for ScriptedLlm {
        async fn chat_completion(
            &self,
            _model: &str,
            messages: &[ChatMessage],
            _tools: Option<&[ToolDefinition]>,
        ) -> anyhow::Result<ChatResponse> {
            self.seen.lock().unwrap().push(messages.to_vec());
            self.script
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| anyhow::anyhow!("script exhausted"))
        }
    }

    fn call(id: &str, name: &str, arguments: &str) -> ToolCall {
        ToolCall {
            id: id.to_string(),
            call_type: "function".to_string(),
            function: FunctionCall {
                name: name.to_string(),
                arguments: arguments.to_string(),
            },
        }
    }

    fn test_agent(llm: ScriptedLlm) -> (Agent, Arc<ScriptedLlm>) {
        let llm = Arc::new(llm);
        let mut tools = ToolRegistry::new();
        tools.register(Arc::new(EchoTool));
        tools.register(Arc::new(FailingTool));
        let config = Config::new("sk-test".to_string(), "test-model".to_string());
        (Agent::with_parts(config, llm.clone(), tools), llm)
    }

    #[tokio::test]
    async fn tool_call_result_is_fed_back_before_final_answer() {
        let llm = ScriptedLlm::new(vec![
            ChatResponse {
                content: None,
                tool_calls: Some(vec![call("call_1", "echo", r#"{"text":"5535"}"#)]),
            },
            ChatResponse {
                content: Some("The answer is 5535.".to_string()),
                tool_calls: None,
            },
        ]);
        let (agent, _) = test_agent(llm);

        let answer = agent.run("What is 123 * 45?").await.unwrap();
        assert_eq!(answer, "The answer is 5535.");
    }

    #[tokio::test]
    async fn second_llm_turn_sees_the_tool_observation() {
        let llm = ScriptedLlm::new(vec![
            ChatResponse {
                content: None,
                tool_calls: Some(vec![call("call_1", "echo", r#"{"text":"observed"}"#)]),
            },
            ChatResponse {
                content: Some("done".to_string()),
                tool_calls: None,
            },
        ]);
        let (agent, llm) = test_agent(llm);
        agent.run("hi").await.unwrap();

        // Second call: system, user, assistant w/ tool_calls, tool result.
        let seen = llm.seen.lock().unwrap();
        let second = &seen[1];
        assert_eq!(second.len(), 4);
        assert_eq!(second[3].role, Role::Tool);
        assert_eq!(second[3].content.as_deref(), Some("observed"));
        assert_eq!(second[3].tool_call_id.as_deref(), Some("call_1"));
    }

    #[tokio::test]
    async fn tool_failure_becomes_an_observation_not_an_abort() {
        let llm = ScriptedLlm::new(vec![
            ChatResponse {
                content: None,
                tool_calls: Some(vec![call("call_1", "broken", "{}")]),
            },
            ChatResponse {
                content: Some("recovered".to_string()),
                tool_calls: None,
            },
        ]);
        let (agent, _) = test_agent(llm);

        let answer = agent.run("try the broken tool").await.unwrap();
        assert_eq!(answer, "recovered");
    }

    #[tokio::test]
    async fn unknown_tool_name_becomes_an_error_observation() {
        let llm = ScriptedLlm::new(vec![
            ChatResponse {
                content: None,
                tool_calls: Some(vec![call("call_1", "no_such_tool", "{}")]),
            },
            ChatResponse {
                content: Some("noted".to_string()),
                tool_calls: None,
            },
        ]);
        let (agent, _) = test_agent(llm);

        let answer = agent.run("call something unregistered").await.unwrap();
        assert_eq!(answer, "noted");
    }

    #[tokio::test]
    async fn max_iterations_bounds_the_loop() {
        let looping = ChatResponse {
            content: None,
            tool_calls: Some(vec![call("call_1", "echo", r#"{"text":"again"}"#)]),
        };
        let llm = ScriptedLlm::new(vec![looping.clone(), looping.clone(), looping]);

        let mut config = Config::new("sk-test".to_string(), "test-model".to_string());
        config.max_iterations = 3;
        let mut tools = ToolRegistry::new();
        tools.register(Arc::new(EchoTool));
        let agent = Agent::with_parts(config, Arc::new(llm), tools);

        let err = agent.run("loop forever").await.unwrap_err();
        assert!(err.to_string().contains("Max iterations"));
    }
}
