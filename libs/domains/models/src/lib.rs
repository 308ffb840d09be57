//! Models Domain Library
//!
//! Proxies model downloads to an Ollama inference server so operators can
//! pre-pull models through the same API that serves the knowledge routes.

pub mod client;
pub mod config;
pub mod error;
pub mod handlers;

pub use client::{OllamaClient, PullOutcome};
pub use config::{DEFAULT_OLLAMA_URL, OllamaConfig};
pub use error::{ModelError, ModelResult};
pub use handlers::{DownloadModelRequest, DownloadModelResponse, ModelsApiDoc, router};
