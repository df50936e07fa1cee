pub mod agents;
pub mod content;
pub mod conversations;
pub mod health;
pub mod messages;
pub mod models;
pub mod search;

use serde::Deserialize;

pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const MAX_PAGE_SIZE: usize = 100;

#[derive(Debug, Default, Deserialize)]
pub struct Pagination {
    pub skip: Option<usize>,
    pub limit: Option<usize>,
}

impl Pagination {
    pub fn skip(&self) -> usize {
        self.skip.unwrap_or(0)
    }

    /// Capped at `MAX_PAGE_SIZE`
    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE)
    }
}
