use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::error::CatalogError;
use crate::models::{Card, CardSet};

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Request parameters for fetching a page of cards
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchCardsRequest {
    /// Restrict to one set
    pub set_id: Option<i64>,
    /// Case-insensitive substring of the card name
    pub search: Option<String>,
    /// Last id already seen; the page starts strictly after it
    pub cursor: Option<i64>,
    /// Page size (defaults to 20, clamped to 1..=100)
    pub limit: Option<u32>,
    #[serde(default)]
    pub tradeable_only: bool,
}

impl FetchCardsRequest {
    pub fn page_size(&self) -> u32 {
        self.limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }

    /// Search text, or None when absent or empty.
    pub fn search_text(&self) -> Option<&str> {
        self.search.as_deref().filter(|s| !s.is_empty())
    }
}

/// One page of cards
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchCardsResponse {
    pub cards: Vec<Card>,
    /// Id of the last card of this page when more pages exist
    pub next_cursor: Option<i64>,
}

impl FetchCardsResponse {
    /// Builds a page from `limit + 1` over-fetched rows.
    pub fn from_overfetch(mut cards: Vec<Card>, limit: u32) -> Self {
        let limit = limit as usize;
        let next_cursor = if cards.len() > limit {
            cards.truncate(limit);
            cards.last().map(|c| c.id)
        } else {
            None
        };
        Self { cards, next_cursor }
    }
}

/// Read-only access to the card catalog
#[async_trait]
pub trait CardRepository: Send + Sync {
    /// Fetch one page of cards matching every given filter, ascending by id
    async fn fetch_cards(
        &self,
        request: FetchCardsRequest,
    ) -> Result<FetchCardsResponse, CatalogError>;

    /// All sets, ascending by id
    async fn fetch_sets(&self) -> Result<Vec<CardSet>, CatalogError>;
}
