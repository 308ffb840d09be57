use domain_knowledge::KnowledgeApiDoc;
use domain_models::ModelsApiDoc;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    components(
        schemas(axum_helpers::ErrorResponse)
    ),
    info(
        title = "Knowledge API",
        version = "0.1.0",
        description = "Document embedding, similarity search and model downloads"
    )
)]
struct BaseDoc;

/// Combined document for every route the service mounts.
///
/// Domain routes are not nested under a prefix, so their documents are
/// merged rather than nested.
pub struct ApiDoc;

impl OpenApi for ApiDoc {
    fn openapi() -> utoipa::openapi::OpenApi {
        BaseDoc::openapi()
            .merge_from(KnowledgeApiDoc::openapi())
            .merge_from(ModelsApiDoc::openapi())
    }
}
