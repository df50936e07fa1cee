use std::sync::Arc;
use std::time::Duration;

use muse_chat::{Generator, RelayConfig, ResponseRelay, StoreModelProvider};
use muse_persist::{ConversationLog, EntryStore, PersistenceClient};
use muse_search::{InMemoryQueryCache, QueryCache, SearchOrchestrator, TextSearcher};
use muse_types::{AccessPolicy, AiModelApi, ChatModel, DefaultAccessPolicy};

use crate::config::Config;

/// Shared application state passed to all handlers
///
/// Every component is built once at startup over the same persistence client.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub persist: Arc<dyn PersistenceClient>,
    pub access: Arc<dyn AccessPolicy>,
    pub entries: EntryStore,
    pub conversations: ConversationLog,
    pub cache: Arc<dyn QueryCache>,
    pub search: Arc<SearchOrchestrator>,
    pub models: Arc<StoreModelProvider>,
    pub relay: ResponseRelay,
}

impl AppState {
    pub fn new(config: Config, persist: Arc<dyn PersistenceClient>, generator: Arc<dyn Generator>) -> Self {
        let access: Arc<dyn AccessPolicy> = Arc::new(DefaultAccessPolicy);
        let entries = EntryStore::new(persist.clone());
        let cache: Arc<dyn QueryCache> = Arc::new(InMemoryQueryCache::with_capacity(config.search.cache_capacity));
        let search = SearchOrchestrator::new(cache.clone(), access.clone())
            .with_searcher(Arc::new(TextSearcher::new(entries.clone())));
        let models = Arc::new(StoreModelProvider::new(persist.clone()));

        let relay_config = RelayConfig {
            history_turns: config.chat.history_turns,
            generation_timeout: Duration::from_secs(config.chat.generation_timeout_secs),
            ..RelayConfig::default()
        };
        let relay = ResponseRelay::new(persist.clone(), models.clone(), generator, access.clone(), relay_config);

        Self {
            config: Arc::new(config),
            conversations: ConversationLog::new(persist.clone()),
            persist,
            access,
            entries,
            cache,
            search: Arc::new(search),
            models,
            relay,
        }
    }

    /// Make sure the configured chat model exists and is the server default
    pub async fn seed_chat_model(&self) -> muse_persist::Result<ChatModel> {
        let llm = &self.config.llm;
        let existing = self
            .persist
            .list_chat_models()
            .await?
            .into_iter()
            .find(|m| m.name == llm.default_model);

        let model = match existing {
            Some(model) => model,
            None => {
                let model = ChatModel::new(llm.default_model.clone(), llm.model_type).with_api(AiModelApi {
                    name: format!("{:?}", llm.model_type).to_lowercase(),
                    api_key: self.config.llm_api_key.clone(),
                    api_base_url: llm.base_url.clone(),
                });
                self.persist.save_chat_model(&model).await?;
                tracing::info!(model = %model.name, "seeded chat model");
                model
            }
        };

        if self.persist.get_default_chat_model_id().await?.is_none() {
            self.persist.set_default_chat_model_id(&model.id).await?;
        }
        Ok(model)
    }
}
