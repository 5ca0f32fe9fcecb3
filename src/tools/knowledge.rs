//! In-process tool that searches the study knowledge base.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::knowledge::{Retriever, ScoredNote};

use super::Tool;

/// Semantic search over the fixed study-notes corpus.
pub struct KnowledgeSearch {
    retriever: Retriever,
}

impl KnowledgeSearch {
    pub fn new(retriever: Retriever) -> Self {
        Self { retriever }
    }
}

#[async_trait]
impl Tool for KnowledgeSearch {
    fn name(&self) -> &str {
        "search_knowledge_base"
    }

    fn description(&self) -> &str {
        "Search the local study notes. Use this tool when you need precise \
         definitions or focused explanations about LLM agents, tools, RAG, or \
         vector databases."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["query"],
            "properties": {
                "query": {
                    "type": "string",
                    "description": "What to look up in the study notes",
                },
            },
        })
    }

    async fn execute(&self, args: Value) -> anyhow::Result<String> {
        let query = args["query"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("Missing 'query' argument"))?;

        let matches = self.retriever.search(query).await?;
        Ok(format_matches(&matches))
    }
}

/// Numbered, topic-tagged block the agent can quote from.
fn format_matches(matches: &[ScoredNote]) -> String {
    if matches.is_empty() {
        return "No relevant study notes found.".to_string();
    }

    matches
        .iter()
        .enumerate()
        .map(|(i, m)| format!("[{}] (topic={}) {}", i + 1, m.note.topic, m.note.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::Note;

    #[test]
    fn empty_matches_yield_the_no_results_sentence() {
        assert_eq!(format_matches(&[]), "No relevant study notes found.");
    }

    #[test]
    fn matches_are_numbered_and_topic_tagged() {
        let matches = vec![
            ScoredNote {
                note: Note { topic: "rag", text: "RAG pairs a retriever with an LLM." },
                score: 0.9,
            },
            ScoredNote {
                note: Note { topic: "tools", text: "Tools let an LLM act." },
                score: 0.5,
            },
        ];
        let block = format_matches(&matches);
        assert!(block.starts_with("[1] (topic=rag) RAG pairs a retriever with an LLM."));
        assert!(block.contains("\n\n[2] (topic=tools) "));
    }
}
