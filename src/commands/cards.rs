use crate::catalog::{CardRepository, FetchCardsRequest, FetchCardsResponse};
use crate::models::CardSet;

/// One page of cards. A missing request means "first page, no filter".
pub async fn fetch_cards(
    repository: &dyn CardRepository,
    request: Option<FetchCardsRequest>,
) -> Result<FetchCardsResponse, String> {
    let request = request.unwrap_or_default();
    log::debug!(
        "fetch_cards set={:?} search={:?} cursor={:?} limit={}",
        request.set_id,
        request.search_text(),
        request.cursor,
        request.page_size()
    );

    repository
        .fetch_cards(request)
        .await
        .map_err(|e| e.to_string())
}

pub async fn fetch_sets(repository: &dyn CardRepository) -> Result<Vec<CardSet>, String> {
    repository.fetch_sets().await.map_err(|e| e.to_string())
}
