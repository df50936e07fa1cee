pub mod cache;
pub mod collate;
pub mod error;
pub mod orchestrator;
pub mod request;
pub mod searcher;

pub use cache::{InMemoryQueryCache, QueryCache};
pub use error::{SearchError, Result};
pub use orchestrator::SearchOrchestrator;
pub use request::{SearchRequest, DEFAULT_RESULT_COUNT};
pub use searcher::{ContentSearcher, SearchScope, TextSearcher};
