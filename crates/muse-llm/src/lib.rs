pub mod types;
pub mod traits;
pub mod streaming;
pub mod error;
pub mod openai;
pub mod config;

pub use traits::{ChatClient, ChatOptions, ChatRequest, EventStream};

pub use streaming::StreamEvent;
pub use error::ProviderError;
pub use openai::OpenAIClient;
pub use config::{ClientFactory, ProviderConfig, ProviderType};
pub use types::{Message, Content};
