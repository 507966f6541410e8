//! In-memory repository for controller and command tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::sync::oneshot;

use super::client::{CardRepository, FetchCardsRequest, FetchCardsResponse};
use super::error::CatalogError;
use crate::models::{sample_card, Card, CardSet};

#[derive(Default)]
pub(crate) struct FakeCardRepository {
    sets: Vec<CardSet>,
    cards: Vec<Card>,
    calls: Mutex<Vec<FetchCardsRequest>>,
    holds: Mutex<VecDeque<oneshot::Receiver<()>>>,
    failures: Mutex<usize>,
}

impl FakeCardRepository {
    pub fn new(sets: Vec<CardSet>, mut cards: Vec<Card>) -> Self {
        cards.sort_by_key(|c| c.id);
        Self {
            sets,
            cards,
            ..Default::default()
        }
    }

    /// Two sets: set 1 holds ids 101..=105, set 2 holds ids 201..=203.
    pub fn two_sets() -> Self {
        let names = ["Bulbasaur", "Charmander", "Charizard", "Squirtle", "Pikachu"];
        let mut cards: Vec<Card> = names
            .iter()
            .enumerate()
            .map(|(i, name)| sample_card(101 + i as i64, name, 1))
            .collect();
        cards.push(sample_card(201, "Mew", 2));
        cards.push(sample_card(202, "Charmeleon", 2));
        cards.push(sample_card(203, "Celebi", 2));
        let sets = vec![
            CardSet {
                id: 1,
                set_name: "Genetic Apex".to_string(),
                image: String::new(),
            },
            CardSet {
                id: 2,
                set_name: "Mythical Island".to_string(),
                image: String::new(),
            },
        ];
        Self::new(sets, cards)
    }

    /// The next fetch blocks until the returned sender fires (or is dropped).
    pub fn hold_next(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.holds.lock().unwrap().push_back(rx);
        tx
    }

    pub fn fail_next(&self) {
        *self.failures.lock().unwrap() += 1;
    }

    pub fn calls(&self) -> Vec<FetchCardsRequest> {
        self.calls.lock().unwrap().clone()
    }

    /// Yields until at least `n` fetches have started.
    pub async fn wait_for_calls(&self, n: usize) {
        while self.calls.lock().unwrap().len() < n {
            tokio::task::yield_now().await;
        }
    }

    fn matches(card: &Card, request: &FetchCardsRequest) -> bool {
        request.set_id.is_none_or(|id| card.set_id == id)
            && request
                .search_text()
                .is_none_or(|s| card.name.to_lowercase().contains(&s.to_lowercase()))
            && (!request.tradeable_only || card.is_tradeable)
            && request.cursor.is_none_or(|cursor| card.id > cursor)
    }
}

#[async_trait]
impl CardRepository for FakeCardRepository {
    async fn fetch_cards(
        &self,
        request: FetchCardsRequest,
    ) -> Result<FetchCardsResponse, CatalogError> {
        self.calls.lock().unwrap().push(request.clone());
        let hold = self.holds.lock().unwrap().pop_front();
        if let Some(hold) = hold {
            let _ = hold.await;
        }

        {
            let mut failures = self.failures.lock().unwrap();
            if *failures > 0 {
                *failures -= 1;
                return Err(CatalogError::Unavailable("connection refused".to_string()));
            }
        }

        let limit = request.page_size();
        let rows: Vec<Card> = self
            .cards
            .iter()
            .filter(|c| Self::matches(c, &request))
            .take(limit as usize + 1)
            .cloned()
            .collect();
        Ok(FetchCardsResponse::from_overfetch(rows, limit))
    }

    async fn fetch_sets(&self) -> Result<Vec<CardSet>, CatalogError> {
        Ok(self.sets.clone())
    }
}
