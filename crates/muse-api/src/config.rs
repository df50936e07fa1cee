use config::{Config as ConfigLoader, ConfigError, Environment, File};
use muse_types::ModelType;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub mongodb: MongoDbConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub logging: LoggingConfig,

    // Secrets (from ENV only)
    #[serde(default)]
    pub mongodb_uri: String,
    #[serde(default)]
    pub llm_api_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 42110,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CorsConfig {
    pub enabled: bool,
    #[serde(default)]
    pub origins: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    Mongodb,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoDbConfig {
    pub database: String,
}

impl Default for MongoDbConfig {
    fn default() -> Self {
        Self {
            database: "muse".to_string(),
        }
    }
}

/// Chat model seeded into the store at startup
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub default_model: String,
    #[serde(default)]
    pub model_type: ModelType,
    #[serde(default)]
    pub base_url: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            default_model: "gemini-2.0-flash".to_string(),
            model_type: ModelType::Google,
            base_url: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    pub history_turns: usize,
    pub generation_timeout_secs: u64,
    #[serde(default)]
    pub temperature: Option<f32>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            history_turns: muse_persist::DEFAULT_HISTORY_TURNS,
            generation_timeout_secs: 120,
            temperature: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    pub default_results: usize,
    /// Maximum cached query signatures
    pub cache_capacity: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_results: muse_search::DEFAULT_RESULT_COUNT,
            cache_capacity: 10_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// User assumed when a request carries no `x-user-id` header
    pub default_user: String,
    #[serde(default)]
    pub superusers: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            default_user: "default".to_string(),
            superusers: Vec::new(),
        }
    }
}

impl AuthConfig {
    pub fn is_superuser(&self, user_id: &str) -> bool {
        self.superusers.iter().any(|u| u == user_id)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// `config/default.toml`, overlaid by `config/$ENV.toml` (ENV defaults
    /// to `dev`), overlaid by prefixed env vars such as `SERVER_PORT` or
    /// `CHAT_HISTORY_TURNS`.
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("ENV").unwrap_or_else(|_| "dev".to_string());

        let mut builder = ConfigLoader::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false));

        for prefix in ["SERVER", "STORAGE", "MONGODB", "LLM", "LOG", "SEARCH", "CHAT", "AUTH"] {
            builder = builder.add_source(
                Environment::default()
                    .prefix(prefix)
                    .separator("_")
                    .try_parsing(true),
            );
        }

        let mut cfg: Config = builder.build()?.try_deserialize()?;

        // Secrets stay out of TOML
        cfg.mongodb_uri = std::env::var("MONGODB_URI").unwrap_or_default();
        cfg.llm_api_key = std::env::var("LLM_API_KEY").unwrap_or_default();

        if cfg.storage.backend == StorageBackend::Mongodb && cfg.mongodb_uri.is_empty() {
            return Err(ConfigError::Message(
                "MONGODB_URI environment variable is required for the mongodb backend".to_string(),
            ));
        }

        Ok(cfg)
    }

    /// Single file, no env overlay or secrets
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        ConfigLoader::builder()
            .add_source(File::from(path.as_ref()))
            .build()?
            .try_deserialize()
    }
}
