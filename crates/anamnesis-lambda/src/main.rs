use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use anamnesis_bedrock::converse::BedrockGateway;
use anamnesis_interview::Orchestrator;
use anamnesis_lambda::config::{ServiceConfig, StoreBackend};
use anamnesis_lambda::state::AppState;
use anamnesis_storage::{FileSessionStore, MemorySessionStore, S3SessionStore, SessionStore};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Structured JSON logging for CloudWatch
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let config = ServiceConfig::from_env()?;

    let bedrock = anamnesis_bedrock::client::build_client(config.region.as_deref()).await;
    let mut gateway = BedrockGateway::new(bedrock, config.model_id.clone());
    if let Some(max_tokens) = config.max_tokens {
        gateway = gateway.with_max_tokens(max_tokens);
    }

    let store: Arc<dyn SessionStore> = match &config.store {
        StoreBackend::S3 { bucket } => {
            let s3 = anamnesis_storage::client::build_client(config.region.as_deref()).await;
            Arc::new(S3SessionStore::new(s3, bucket.clone()))
        }
        StoreBackend::File { dir } => Arc::new(FileSessionStore::new(dir.clone())),
        StoreBackend::Memory => Arc::new(MemorySessionStore::new()),
    };

    tracing::info!(
        model_id = %config.model_id,
        store = ?config.store,
        max_images = config.interview.max_images,
        "starting anamnesis"
    );

    let orchestrator = Orchestrator::new(Arc::new(gateway), store.clone(), config.interview.clone());
    let app = anamnesis_lambda::router(AppState::new(orchestrator, store));

    match config.listen_addr {
        Some(addr) => {
            let listener = tokio::net::TcpListener::bind(addr).await?;
            tracing::info!(%addr, "listening");
            axum::serve(listener, app).await?;
            Ok(())
        }
        None => lambda_http::run(app).await.map_err(|e| eyre::eyre!(e)),
    }
}
