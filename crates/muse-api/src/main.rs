use std::sync::Arc;

use muse_api::{
    build_router,
    config::{Config, StorageBackend},
    logging::init_logging,
    state::AppState,
};
use muse_chat::LlmGenerator;
use muse_llm::ChatOptions;
use muse_persist::{InMemoryPersistenceClient, PersistenceClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let config = Config::load().map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    init_logging(&config.logging);

    tracing::info!("Starting Muse API server");
    tracing::info!("Config loaded: {}:{}", config.server.host, config.server.port);

    let persist = connect_storage(&config).await?;

    let mut options = ChatOptions::new();
    if let Some(temperature) = config.chat.temperature {
        options = options.temperature(temperature);
    }
    let generator = Arc::new(LlmGenerator::new(options));

    let state = Arc::new(AppState::new(config.clone(), persist, generator));
    let model = state.seed_chat_model().await?;
    if model.api_key().is_none() {
        tracing::warn!(model = %model.name, "default chat model has no API key; set LLM_API_KEY");
    }

    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Health check: http://{}/health", addr);
    tracing::info!("API docs: http://{}/api/docs", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn connect_storage(config: &Config) -> anyhow::Result<Arc<dyn PersistenceClient>> {
    match config.storage.backend {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            Ok(Arc::new(InMemoryPersistenceClient::new()))
        }
        #[cfg(feature = "mongodb")]
        StorageBackend::Mongodb => {
            tracing::info!("Connecting to MongoDB");
            let client =
                muse_persist::MongoPersistenceClient::connect(&config.mongodb_uri, &config.mongodb.database).await?;
            tracing::info!("MongoDB connected");
            Ok(Arc::new(client))
        }
        #[cfg(not(feature = "mongodb"))]
        StorageBackend::Mongodb => Err(anyhow::anyhow!("built without the mongodb feature")),
    }
}
