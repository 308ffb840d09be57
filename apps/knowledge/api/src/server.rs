//! Process wiring: configuration, provider and store construction, HTTP server.

use std::sync::Arc;

use axum::Router;
use axum_helpers::server::{create_production_app, create_router, health_router};
use core_config::AppInfo;
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_knowledge::{
    EmbeddingProvider, InMemoryVectorRepository, KnowledgeService, QdrantRepository,
    VectorRepository, VectorStoreKind,
};
use domain_models::OllamaClient;
use eyre::{Result, WrapErr};
use tracing::info;

use crate::api::ready_router;
use crate::config::Config;
use crate::openapi::ApiDoc;

/// Assemble the full router: domain routes, docs, middleware and health probes.
pub fn build_app<R: VectorRepository + 'static>(
    app: AppInfo,
    service: Arc<KnowledgeService<R>>,
    ollama: Arc<OllamaClient>,
) -> std::io::Result<Router> {
    let api_routes = Router::new()
        .merge(domain_knowledge::router(service.clone()))
        .merge(domain_models::router(ollama));

    let router = create_router::<ApiDoc>(api_routes)?;

    Ok(router.merge(health_router(app)).merge(ready_router(service)))
}

/// Load configuration, build the embedder and store, and serve until shutdown.
pub async fn run() -> Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    let embedder = config
        .knowledge
        .build_embedder()
        .await
        .wrap_err("Failed to initialize embedding provider")?;

    match config.knowledge.store {
        VectorStoreKind::Qdrant => {
            info!("Connecting to Qdrant at {}", config.knowledge.qdrant.url);
            let repository = QdrantRepository::new(config.knowledge.qdrant.clone())
                .wrap_err("Failed to create Qdrant client")?;
            serve(config, repository, embedder).await
        }
        VectorStoreKind::Memory => {
            info!("Using in-memory vector store; data is lost on restart");
            serve(config, InMemoryVectorRepository::new(), embedder).await
        }
    }
}

async fn serve<R: VectorRepository + 'static>(
    config: Config,
    repository: R,
    embedder: Arc<dyn EmbeddingProvider>,
) -> Result<()> {
    let service = KnowledgeService::initialize(
        Arc::new(repository),
        embedder,
        config.knowledge.options(),
    )
    .await
    .wrap_err("Failed to probe embedding dimension")?;
    let service = Arc::new(service);

    let ollama = Arc::new(OllamaClient::new(config.ollama.clone()));
    info!("Model downloads proxied to {}", config.ollama.url);

    let app = build_app(config.app, service.clone(), ollama)
        .wrap_err("Failed to build router")?;

    info!(
        "Starting {} v{} with graceful shutdown ({:?} timeout)",
        config.app.name, config.app.version, config.server.shutdown_timeout
    );

    create_production_app(app, &config.server, async move {
        // The router is gone by now, so this is the last handle.
        info!(
            references = Arc::strong_count(&service),
            "Shutting down: releasing embedding provider and vector store"
        );
        drop(service);
    })
    .await
    .wrap_err("Server error")?;

    info!("Knowledge API shutdown complete");
    Ok(())
}
