mod hashing;
#[cfg(feature = "fastembed")]
mod local;
mod openai;
mod provider;

pub use hashing::{DEFAULT_HASHING_DIMENSION, HashingProvider};
#[cfg(feature = "fastembed")]
pub use local::{DEFAULT_FASTEMBED_MODEL, FastEmbedConfig, FastEmbedProvider};
pub use openai::{DEFAULT_OPENAI_BASE_URL, DEFAULT_OPENAI_MODEL, OpenAIConfig, OpenAIProvider};
pub use provider::{DIMENSION_PROBE_TEXT, EmbeddingProvider, probe_dimension};

#[cfg(test)]
pub use provider::MockEmbeddingProvider;
