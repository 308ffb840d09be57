//! Knowledge API - Entry Point

#[tokio::main]
async fn main() -> eyre::Result<()> {
    knowledge_api::run().await
}
