mod conversation;
mod event;
mod filter;

pub use conversation::{Conversation, ConversationUpdate, DEFAULT_CONVERSATION_TITLE};
pub use event::{AssistantContext, ChatEvent, ContextReference, Speaker, TrainOfThought, Turn};
pub use filter::{EntryFilter, EntryOwner};
