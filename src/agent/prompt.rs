//! System prompt for the agent.

/// Build the system prompt. The knowledge-base guidance is only included
/// when the search tool is actually registered.
pub fn build_system_prompt(use_rag_tool: bool) -> String {
    let mut prompt = String::from(
        "You are a helpful assistant with access to tools. \
         Use the calculate tool for math expressions. \
         Use the get_weather tool for weather questions. ",
    );
    if use_rag_tool {
        prompt.push_str(
            "For questions about LLM agents, tools, MCP, RAG, or vector databases, \
             use the search_knowledge_base tool to find relevant notes, then answer. ",
        );
    }
    prompt.push_str("Be concise.");
    prompt
}
