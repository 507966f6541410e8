use serde::Serialize;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use super::debounce::Debouncer;
use crate::catalog::{CardRepository, CatalogError, FetchCardsRequest, FetchCardsResponse};
use crate::models::{BrowserSettings, Card, CardSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserMode {
    /// Read-only browsing; card clicks are ignored
    #[default]
    View,
    /// Card clicks feed the selection engine
    Select,
}

#[derive(Debug, Clone)]
pub struct BrowserOptions {
    pub mode: BrowserMode,
    pub tradeable_only: bool,
    pub page_size: u32,
    pub search_debounce: Duration,
}

impl BrowserOptions {
    /// The public card dex: every card, no selection.
    pub fn view(settings: &BrowserSettings) -> Self {
        Self {
            mode: BrowserMode::View,
            tradeable_only: false,
            page_size: settings.page_size,
            search_debounce: Duration::from_millis(settings.search_debounce_ms),
        }
    }

    /// Trade creation: only tradeable cards, clicks select.
    pub fn select(settings: &BrowserSettings) -> Self {
        Self {
            mode: BrowserMode::Select,
            tradeable_only: true,
            ..Self::view(settings)
        }
    }
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self::view(&BrowserSettings::default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "lowercase")]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Failed(String),
}

/// Why the grid is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum EmptyState {
    NoSets,
    NoSearchMatches(String),
    EmptySet,
}

impl fmt::Display for EmptyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmptyState::NoSets => write!(f, "No card sets found."),
            EmptyState::NoSearchMatches(text) => write!(f, "No cards found for \"{}\"", text),
            EmptyState::EmptySet => write!(f, "No cards found in this set"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The displayed cards were replaced by a fresh first page
    Replaced(usize),
    /// A page was appended
    Appended(usize),
    /// Nothing was fetched (no cursor, or a fetch was already in flight)
    Skipped,
    /// The response belonged to a superseded filter and was dropped
    Discarded,
}

/// The filter the displayed cards were fetched with, plus those cards.
#[derive(Debug, Clone, Default)]
struct DisplayedPage {
    set_id: Option<i64>,
    search: Option<String>,
    cards: Vec<Card>,
    cursor: Option<i64>,
}

#[derive(Debug, Default)]
struct BrowserState {
    sets: Vec<CardSet>,
    active_set_id: Option<i64>,
    search_text: String,
    displayed: DisplayedPage,
    /// Bumped by every filter change; responses stamped with an older
    /// epoch are discarded.
    epoch: u64,
    in_flight: Option<u64>,
    status: LoadStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowserSnapshot {
    pub mode: BrowserMode,
    pub sets: Vec<CardSet>,
    pub active_set_id: Option<i64>,
    pub search_text: String,
    pub cards: Vec<Card>,
    pub cursor: Option<i64>,
    pub status: LoadStatus,
}

/// Owns what the card grid shows and whether more can be loaded.
///
/// The state lock is never held across a repository call, so a filter
/// change can be issued while a previous fetch is still pending.
pub struct CardBrowser {
    repository: Arc<dyn CardRepository>,
    options: BrowserOptions,
    state: Mutex<BrowserState>,
    search_debouncer: Debouncer,
}

impl CardBrowser {
    /// Loads the set list and the first page of the first set.
    pub async fn open(
        repository: Arc<dyn CardRepository>,
        options: BrowserOptions,
    ) -> Result<Arc<Self>, CatalogError> {
        let sets = repository.fetch_sets().await?;

        let mut state = BrowserState {
            active_set_id: sets.first().map(|s| s.id),
            sets,
            ..Default::default()
        };

        if let Some(set_id) = state.active_set_id {
            let request = FetchCardsRequest {
                set_id: Some(set_id),
                limit: Some(options.page_size),
                tradeable_only: options.tradeable_only,
                ..Default::default()
            };
            let page = repository.fetch_cards(request).await?;
            log::debug!(
                "Opened browser on set {} with {} cards",
                set_id,
                page.cards.len()
            );
            state.displayed = DisplayedPage {
                set_id: Some(set_id),
                search: None,
                cards: page.cards,
                cursor: page.next_cursor,
            };
        } else {
            log::warn!("Card catalog has no sets");
        }

        Ok(Arc::new(Self {
            search_debouncer: Debouncer::new(options.search_debounce),
            repository,
            options,
            state: Mutex::new(state),
        }))
    }

    fn state(&self) -> MutexGuard<'_, BrowserState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn request(&self, set_id: Option<i64>, search: Option<String>, cursor: Option<i64>) -> FetchCardsRequest {
        FetchCardsRequest {
            set_id,
            search,
            cursor,
            limit: Some(self.options.page_size),
            tradeable_only: self.options.tradeable_only,
        }
    }

    pub fn mode(&self) -> BrowserMode {
        self.options.mode
    }

    pub fn options(&self) -> &BrowserOptions {
        &self.options
    }

    /// Switches to another set, clearing any search.
    pub async fn change_set(&self, set_id: i64) -> Result<FetchOutcome, CatalogError> {
        self.search_debouncer.cancel();
        let (epoch, set_id) = {
            let mut state = self.state();
            state.search_text.clear();
            state.active_set_id = Some(set_id);
            (Self::begin_epoch(&mut state), Some(set_id))
        };
        self.replace(epoch, set_id, None).await
    }

    /// Non-empty text searches every set; empty text returns to the active set.
    pub async fn change_search(&self, text: &str) -> Result<FetchOutcome, CatalogError> {
        let (epoch, set_id, search) = {
            let mut state = self.state();
            state.search_text = text.to_string();
            let epoch = Self::begin_epoch(&mut state);
            if text.is_empty() {
                (epoch, state.active_set_id, None)
            } else {
                (epoch, None, Some(text.to_string()))
            }
        };
        self.replace(epoch, set_id, search).await
    }

    /// Debounced search input: only the value left standing once typing
    /// settles triggers a query.
    pub fn search_input(self: &Arc<Self>, text: impl Into<String>) {
        let browser = Arc::clone(self);
        let text = text.into();
        self.search_debouncer.call(async move {
            if let Err(e) = browser.change_search(&text).await {
                log::warn!("Search for {:?} failed: {}", text, e);
            }
        });
    }

    /// Clears the search box immediately, bypassing the debounce.
    pub async fn clear_search(&self) -> Result<FetchOutcome, CatalogError> {
        self.search_debouncer.cancel();
        self.change_search("").await
    }

    /// Appends the next page of the displayed filter.
    pub async fn load_more(&self) -> Result<FetchOutcome, CatalogError> {
        let (epoch, request) = {
            let mut state = self.state();
            let Some(cursor) = state.displayed.cursor else {
                return Ok(FetchOutcome::Skipped);
            };
            if state.in_flight.is_some() {
                return Ok(FetchOutcome::Skipped);
            }
            let epoch = state.epoch;
            state.in_flight = Some(epoch);
            state.status = LoadStatus::Loading;
            let request = self.request(
                state.displayed.set_id,
                state.displayed.search.clone(),
                Some(cursor),
            );
            (epoch, request)
        };

        let result = self.repository.fetch_cards(request).await;

        let mut state = self.state();
        if state.epoch != epoch {
            log::debug!("Dropping stale page from epoch {} (now {})", epoch, state.epoch);
            return Ok(FetchOutcome::Discarded);
        }
        state.in_flight = None;

        match result {
            Ok(FetchCardsResponse { cards, next_cursor }) => {
                let count = cards.len();
                debug_assert!(
                    match (state.displayed.cards.last(), cards.first()) {
                        (Some(last), Some(first)) => first.id > last.id,
                        _ => true,
                    },
                    "pages must continue in ascending id order"
                );
                state.displayed.cards.extend(cards);
                state.displayed.cursor = next_cursor;
                state.status = LoadStatus::Idle;
                Ok(FetchOutcome::Appended(count))
            }
            Err(e) => {
                log::warn!("Loading more cards failed: {}", e);
                state.status = LoadStatus::Failed(e.to_string());
                Err(e)
            }
        }
    }

    fn begin_epoch(state: &mut BrowserState) -> u64 {
        state.epoch += 1;
        state.in_flight = Some(state.epoch);
        state.status = LoadStatus::Loading;
        state.epoch
    }

    async fn replace(
        &self,
        epoch: u64,
        set_id: Option<i64>,
        search: Option<String>,
    ) -> Result<FetchOutcome, CatalogError> {
        let request = self.request(set_id, search.clone(), None);
        let result = self.repository.fetch_cards(request).await;

        let mut state = self.state();
        if state.epoch != epoch {
            log::debug!("Dropping superseded result from epoch {}", epoch);
            return Ok(FetchOutcome::Discarded);
        }
        state.in_flight = None;

        match result {
            Ok(page) => {
                let count = page.cards.len();
                state.displayed = DisplayedPage {
                    set_id,
                    search,
                    cards: page.cards,
                    cursor: page.next_cursor,
                };
                state.status = LoadStatus::Idle;
                Ok(FetchOutcome::Replaced(count))
            }
            Err(e) => {
                log::warn!("Loading cards failed: {}", e);
                state.status = LoadStatus::Failed(e.to_string());
                Err(e)
            }
        }
    }

    pub fn dismiss_error(&self) {
        let mut state = self.state();
        if matches!(state.status, LoadStatus::Failed(_)) {
            state.status = LoadStatus::Idle;
        }
    }

    pub fn snapshot(&self) -> BrowserSnapshot {
        let state = self.state();
        BrowserSnapshot {
            mode: self.options.mode,
            sets: state.sets.clone(),
            active_set_id: state.active_set_id,
            search_text: state.search_text.clone(),
            cards: state.displayed.cards.clone(),
            cursor: state.displayed.cursor,
            status: state.status.clone(),
        }
    }

    pub fn cards(&self) -> Vec<Card> {
        self.state().displayed.cards.clone()
    }

    pub fn card(&self, card_id: i64) -> Option<Card> {
        self.state()
            .displayed
            .cards
            .iter()
            .find(|c| c.id == card_id)
            .cloned()
    }

    pub fn cursor(&self) -> Option<i64> {
        self.state().displayed.cursor
    }

    pub fn status(&self) -> LoadStatus {
        self.state().status.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state().in_flight.is_some()
    }

    pub fn is_searching(&self) -> bool {
        !self.state().search_text.is_empty()
    }

    /// Every card of the displayed filter is loaded.
    pub fn is_exhausted(&self) -> bool {
        let state = self.state();
        state.displayed.cursor.is_none() && !state.displayed.cards.is_empty()
    }

    pub fn empty_state(&self) -> Option<EmptyState> {
        let state = self.state();
        if state.sets.is_empty() {
            return Some(EmptyState::NoSets);
        }
        if !state.displayed.cards.is_empty() || state.in_flight.is_some() {
            return None;
        }
        Some(match &state.displayed.search {
            Some(text) => EmptyState::NoSearchMatches(text.clone()),
            None => EmptyState::EmptySet,
        })
    }
}
