pub mod models;
pub mod trait_client;
pub mod dbs;
pub mod error;
pub mod entry_store;
pub mod conversation_log;

pub use models::{
    AssistantContext, ChatEvent, ContextReference, Conversation, ConversationUpdate, EntryFilter, EntryOwner,
    Speaker, TrainOfThought, Turn, DEFAULT_CONVERSATION_TITLE,
};
pub use trait_client::PersistenceClient;
pub use dbs::memory::InMemoryPersistenceClient;
#[cfg(feature = "mongodb")]
pub use dbs::mongo::MongoPersistenceClient;
pub use error::{PersistError, Result};
pub use entry_store::{hash_content, DeleteSummary, EntryStore, IndexOutcome, CHUNK_SIZE};
pub use conversation_log::{ConversationLog, DEFAULT_HISTORY_TURNS};
