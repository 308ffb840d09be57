//! Application routes that need more than one domain.

pub mod health;

use std::sync::Arc;

use axum::{Router, routing::get};
use domain_knowledge::{KnowledgeService, VectorRepository};

/// `/ready` with the knowledge service applied as state.
pub fn ready_router<R: VectorRepository + 'static>(service: Arc<KnowledgeService<R>>) -> Router {
    Router::new()
        .route("/ready", get(health::ready_handler::<R>))
        .with_state(service)
}
