//! Knowledge Domain Library
//!
//! Stores free-text documents as vector embeddings in named collections and
//! answers nearest-neighbour queries over them.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │ KnowledgeService │  ← validation, id allocation, per-collection write lock
//! └────────┬─────────┘
//!          │
//! ┌────────▼─────────┐     ┌───────────────────┐
//! │ VectorRepository │     │ EmbeddingProvider │
//! │     (trait)      │     │      (trait)      │
//! └────────┬─────────┘     └─────────┬─────────┘
//!          │                         │
//! ┌────────▼─────────┐     ┌─────────▼─────────┐
//! │ QdrantRepository │     │ FastEmbedProvider │
//! │ InMemoryVector-  │     │ OpenAIProvider    │
//! │   Repository     │     │ HashingProvider   │
//! └──────────────────┘     └───────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_knowledge::{
//!     HashingProvider, InMemoryVectorRepository, KnowledgeOptions, KnowledgeService,
//! };
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let service = KnowledgeService::initialize(
//!     Arc::new(InMemoryVectorRepository::new()),
//!     Arc::new(HashingProvider::default()),
//!     KnowledgeOptions::default(),
//! )
//! .await?;
//!
//! service.create_collection("cities").await?;
//! service
//!     .add_documents(&["Berlin is the capital of Germany".to_string()], "cities")
//!     .await?;
//! let hits = service.search("capital of Germany", "cities", 1).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod embedding;
pub mod error;
pub mod handlers;
pub mod memory;
pub mod models;
pub mod qdrant;
pub mod repository;
pub mod service;

pub use config::{KnowledgeConfig, VectorStoreKind};
#[cfg(feature = "fastembed")]
pub use embedding::{FastEmbedConfig, FastEmbedProvider};
pub use embedding::{
    DIMENSION_PROBE_TEXT, EmbeddingProvider, HashingProvider, OpenAIConfig, OpenAIProvider,
    probe_dimension,
};
pub use error::{VectorError, VectorResult};
pub use handlers::{KnowledgeApiDoc, router};
pub use memory::InMemoryVectorRepository;
pub use models::{
    CollectionAck, CollectionInfo, DistanceMetric, DocumentPoint, EmbeddingProviderType,
    PointIdStrategy, SearchQuery, SearchResult, UpsertAck, UpsertStatus, VectorConfig,
};
pub use qdrant::{QdrantConfig, QdrantRepository};
pub use repository::VectorRepository;
pub use service::{DEFAULT_SEARCH_LIMIT, KnowledgeOptions, KnowledgeService};
