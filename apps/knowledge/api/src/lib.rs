//! Knowledge API
//!
//! HTTP service for document embedding and similarity search, plus a model
//! download proxy for a separately hosted Ollama server.
//!
//! ```text
//! HTTP (axum)
//!   ├── /knowledge/*        → KnowledgeService → VectorRepository + EmbeddingProvider
//!   ├── /ollama/*           → OllamaClient
//!   ├── /health, /ready
//!   └── /scalar, /redoc, /rapidoc, /api-docs/openapi.json
//! ```

pub mod api;
pub mod config;
pub mod openapi;
pub mod server;

pub use server::{build_app, run};
