//! # ragline
//!
//! A minimal retrieval-augmented-generation pipeline for PDF documents:
//! split documents into paragraph chunks, embed each chunk, persist the
//! vectors in SQLite, and answer questions by retrieving the most
//! similar chunks as context for a generative model.
//!
//! ```text
//! ┌─────────┐   ┌─────────┐   ┌───────────┐   ┌──────────┐
//! │  PDF    │──▶│ Chunker │──▶│ Embedding │──▶│  SQLite  │
//! │ extract │   │         │   │ provider  │   │  store   │
//! └─────────┘   └─────────┘   └───────────┘   └────┬─────┘
//!                                                  │ top-k
//!                               ┌──────────┐   ┌───▼──────┐
//!                answer ◀───────│ Generate │◀──│ Retrieve │
//!                               └──────────┘   └──────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`chunk`] | paragraph-boundary text chunker |
//! | [`extract`] | PDF text extraction |
//! | [`models`] | stored-record and retrieval data types |
//! | [`provider`] | embedding + generation providers (Gemini, OpenAI) |
//! | [`store`] | vector-store trait and similarity helpers |
//! | [`sqlite_store`] | SQLite store backend |
//! | [`db`] | database pool construction |
//! | [`ingest`] | indexing orchestrator |
//! | [`answer`] | answering orchestrator |
//! | [`config`] | environment configuration |
//! | [`error`] | error taxonomy |

pub mod answer;
pub mod chunk;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod ingest;
pub mod models;
pub mod provider;
pub mod sqlite_store;
pub mod store;
