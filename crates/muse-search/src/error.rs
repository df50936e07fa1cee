use muse_persist::PersistError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Storage error: {0}")]
    Storage(#[from] PersistError),

    #[error("Searcher {name} failed: {message}")]
    Searcher { name: String, message: String },
}

pub type Result<T> = std::result::Result<T, SearchError>;
