//! Tiny in-memory knowledge base about LLM agents and vector search.
//!
//! Eight short study notes are embedded once at construction; a query is
//! embedded at search time and the notes are ranked by cosine similarity.
//! Nothing is persisted and the corpus never changes after construction.

use std::sync::Arc;

use tracing::info;

use crate::config::Config;
use crate::llm::OpenAiClient;

/// How many notes a search returns at most.
pub const TOP_K: usize = 4;

/// One note in the corpus: a short text with a topic tag.
#[derive(Debug, Clone)]
pub struct Note {
    pub topic: &'static str,
    pub text: &'static str,
}

/// A note matched by a search, with its similarity score.
#[derive(Debug, Clone)]
pub struct ScoredNote {
    pub note: Note,
    pub score: f32,
}

/// The fixed study corpus. Each note is intentionally short and concrete so
/// the agent has something it can quote when answering.
pub fn study_notes() -> Vec<Note> {
    vec![
        Note {
            topic: "langchain_overview",
            text: "LangChain is a Python and JavaScript framework for building applications \
                   with large language models (LLMs). It focuses on composing LLMs with \
                   other components such as tools, memory, and vector stores.",
        },
        Note {
            topic: "agents",
            text: "An agent couples an LLM with tools. The LLM reasons about what to do \
                   next and can decide to call tools, inspect their outputs, and iterate \
                   until it can return a final answer.",
        },
        Note {
            topic: "vector_databases",
            text: "A vector database stores numeric embeddings of text. Each piece of text \
                   is turned into a high-dimensional vector. Similar texts live close to \
                   each other in this vector space.",
        },
        Note {
            topic: "rag",
            text: "A typical retrieval-augmented generation (RAG) setup uses an embeddings \
                   model plus a vector store, exposed as a retriever, to supply relevant \
                   context to an LLM for a specific user question.",
        },
        Note {
            topic: "tools",
            text: "Tools make an LLM more \"agentic\" by letting it take actions. Examples \
                   include web search, database queries, calculators, or a vector-store \
                   retriever that looks up domain knowledge.",
        },
        Note {
            topic: "agent_design",
            text: "When designing an agentic system, keep the tools small and focused. \
                   Each tool should do one thing well and have a clear name and description \
                   so the LLM can choose it correctly.",
        },
        Note {
            topic: "chroma",
            text: "Chroma is a simple, open-source vector database with an in-process API \
                   that works well for toy projects and prototypes.",
        },
        Note {
            topic: "embeddings",
            text: "Embeddings models like text-embedding-3-small map text to vectors. \
                   You can reuse the same embeddings model for many different retrieval \
                   tasks as long as the language and domain are similar.",
        },
    ]
}

/// Cosine similarity between two vectors. Zero when either has zero norm.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// In-memory vector store over the fixed corpus.
pub struct VectorStore {
    notes: Vec<Note>,
    embeddings: Vec<Vec<f32>>,
}

impl VectorStore {
    /// Build a store from notes and their embeddings, in matching order.
    pub fn new(notes: Vec<Note>, embeddings: Vec<Vec<f32>>) -> anyhow::Result<Self> {
        if notes.len() != embeddings.len() {
            anyhow::bail!(
                "corpus/embedding length mismatch: {} notes, {} embeddings",
                notes.len(),
                embeddings.len()
            );
        }
        Ok(Self { notes, embeddings })
    }

    /// Rank all notes against the query vector and return the top `k`.
    pub fn top_k(&self, query: &[f32], k: usize) -> Vec<ScoredNote> {
        let mut scored: Vec<ScoredNote> = self
            .notes
            .iter()
            .zip(&self.embeddings)
            .map(|(note, embedding)| ScoredNote {
                note: note.clone(),
                score: cosine_similarity(query, embedding),
            })
            .collect();
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        scored
    }
}

/// Embeds queries and searches the fixed corpus.
pub struct Retriever {
    client: Arc<OpenAiClient>,
    embedding_model: String,
    store: VectorStore,
}

impl Retriever {
    /// Embed the corpus once and build the retriever.
    ///
    /// An embedding failure here is a startup error; the knowledge tool is
    /// not registered half-initialized.
    pub async fn build(config: &Config, client: Arc<OpenAiClient>) -> anyhow::Result<Self> {
        let notes = study_notes();
        let texts: Vec<String> = notes.iter().map(|n| n.text.to_string()).collect();
        let embeddings = client.embed(&config.embedding_model, &texts).await?;
        let store = VectorStore::new(notes, embeddings)?;
        info!(
            "Knowledge base ready: {} notes, model {}",
            store.notes.len(),
            config.embedding_model
        );
        Ok(Self {
            client,
            embedding_model: config.embedding_model.clone(),
            store,
        })
    }

    /// Embed the query and return the best-matching notes.
    pub async fn search(&self, query: &str) -> anyhow::Result<Vec<ScoredNote>> {
        let embedded = self
            .client
            .embed(&self.embedding_model, &[query.to_string()])
            .await?;
        let query_vector = embedded
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("embedding API returned no vector for query"))?;
        Ok(self.store.top_k(&query_vector, TOP_K))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corpus_has_eight_topic_tagged_notes() {
        let notes = study_notes();
        assert_eq!(notes.len(), 8);
        assert!(notes.iter().any(|n| n.topic == "rag"));
        assert!(notes.iter().any(|n| n.topic == "embeddings"));
    }

    #[test]
    fn cosine_similarity_basics() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn top_k_ranks_by_similarity_and_truncates() {
        let notes = vec![
            Note { topic: "a", text: "a" },
            Note { topic: "b", text: "b" },
            Note { topic: "c", text: "c" },
        ];
        let embeddings = vec![
            vec![1.0, 0.0],
            vec![0.0, 1.0],
            vec![0.7, 0.7],
        ];
        let store = VectorStore::new(notes, embeddings).unwrap();

        let ranked = store.top_k(&[1.0, 0.0], 2);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].note.topic, "a");
        assert_eq!(ranked[1].note.topic, "c");
    }

    #[test]
    fn store_rejects_length_mismatch() {
        let notes = vec![Note { topic: "a", text: "a" }];
        assert!(VectorStore::new(notes, vec![]).is_err());
    }
}
