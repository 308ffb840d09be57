use core_config::{AppInfo, FromEnv, app_info, server::ServerConfig};
use domain_knowledge::KnowledgeConfig;
use domain_models::OllamaConfig;

pub use core_config::Environment;

/// Application configuration, composed from the per-library configs.
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub environment: Environment,
    pub server: ServerConfig,
    pub knowledge: KnowledgeConfig,
    pub ollama: OllamaConfig,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let server = ServerConfig::from_env()?; // HOST=0.0.0.0, PORT=8080
        let knowledge = KnowledgeConfig::from_env()?;
        let ollama = OllamaConfig::from_env()?;

        Ok(Self {
            app: app_info!(),
            environment,
            server,
            knowledge,
            ollama,
        })
    }
}
