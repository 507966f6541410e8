pub mod client;
pub mod error;
pub mod sqlite;

#[cfg(test)]
pub(crate) mod fake;

pub use client::{CardRepository, FetchCardsRequest, FetchCardsResponse, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use error::CatalogError;
pub use sqlite::SqliteCardRepository;
