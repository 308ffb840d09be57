use std::sync::Arc;

use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use axum_helpers::server::{HealthCheckFuture, run_health_checks};
use domain_knowledge::{KnowledgeService, VectorRepository};

/// Readiness: 200 only while the vector store answers.
pub async fn ready_handler<R: VectorRepository>(
    State(service): State<Arc<KnowledgeService<R>>>,
) -> Response {
    let checks: Vec<(&str, HealthCheckFuture<'_>)> = vec![(
        "vector_store",
        Box::pin(async {
            service
                .health()
                .await
                .map_err(|e| format!("Vector store check failed: {}", e))
        }),
    )];

    match run_health_checks(checks).await {
        Ok((status, json)) => (status, json).into_response(),
        Err((status, json)) => (status, json).into_response(),
    }
}
