mod agent;
mod chat_model;
mod content;
mod conversation;
mod event;

pub use agent::MongoAgentRepository;
pub use chat_model::MongoChatModelRepository;
pub use content::MongoContentRepository;
pub use conversation::MongoConversationRepository;
pub use event::MongoEventRepository;
