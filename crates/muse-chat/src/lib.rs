pub mod accumulator;
pub mod error;
pub mod failure;
pub mod generator;
pub mod locks;
pub mod model;
pub mod preamble;
pub mod relay;

pub use accumulator::ReplyAccumulator;
pub use error::{RelayError, Result};
pub use generator::{Generator, LlmGenerator};
pub use locks::ConversationLocks;
pub use model::{normalize_model_name, ConfigGap, ModelProvider, ModelResolution, ResolvedModel, StoreModelProvider};
pub use preamble::{build_preamble, ASSISTANT_NAME};
pub use relay::{RelayConfig, RelayOutcome, RelayState, ResponseRelay, SendMessage};
