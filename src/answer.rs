//! Answering orchestrator: embed query → retrieve → assemble → generate.
//!
//! Always returns a human-readable string, never an error. The failure
//! asymmetry is deliberate: an embedding or retrieval problem yields a
//! fixed apology (the user can do nothing about it), while a generation
//! failure surfaces its detail in the returned text so the caller can
//! see what went wrong.

use tracing::error;

use crate::provider::LlmProvider;
use crate::store::VectorStore;

/// How many records to retrieve as answer context.
pub const TOP_K: usize = 5;
/// Candidate-pool bound passed to the store's similarity search.
pub const SEARCH_BREADTH: usize = 100;

/// Returned when the query itself could not be embedded.
pub const APOLOGY: &str = "Sorry, I couldn't process your question.";
/// Returned when retrieval produces no context.
pub const NO_CONTEXT: &str = "I couldn't find any relevant information in the documents.";
/// Returned when the store could not be queried.
pub const RETRIEVAL_FAILED: &str = "Sorry, I couldn't search the documents right now.";

/// Answer a question from indexed documents.
///
/// Retrieval quality assumes `provider` is the same family that indexed
/// the store; that pairing is the caller's responsibility.
pub async fn answer(provider: &dyn LlmProvider, store: &dyn VectorStore, query: &str) -> String {
    let query_embedding = match provider.embed(query).await {
        Ok(vec) => vec,
        Err(e) => {
            error!(error = %e, "failed to embed query");
            return APOLOGY.to_string();
        }
    };

    let results = match store.nearest(&query_embedding, TOP_K, SEARCH_BREADTH).await {
        Ok(results) => results,
        Err(e) => {
            error!(error = %e, "vector search failed");
            return RETRIEVAL_FAILED.to_string();
        }
    };

    if results.is_empty() {
        return NO_CONTEXT.to_string();
    }

    let context = results
        .iter()
        .map(|r| r.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    let prompt = build_prompt(&context, query);

    match provider.generate(&prompt).await {
        Ok(text) => text,
        Err(e) => {
            error!(error = %e, "answer generation failed");
            format!("Error generating answer: {}", e)
        }
    }
}

/// Instruction template confining the model to the retrieved context.
fn build_prompt(context: &str, query: &str) -> String {
    format!(
        "Based on the following context from the documents, please answer the question.\n\
         If the context does not contain the answer, say that you couldn't find the information.\n\
         \n\
         Context:\n\
         {context}\n\
         \n\
         Question: {query}\n\
         \n\
         Answer:"
    )
}
