pub mod controller;
pub mod debounce;
pub mod draft;
pub mod selection;

pub use controller::{
    BrowserMode, BrowserOptions, BrowserSnapshot, CardBrowser, EmptyState, FetchOutcome,
    LoadStatus,
};
pub use debounce::Debouncer;
pub use draft::{assemble, can_submit, DraftError, TradeDraft, CONFIRM_ROUTE};
pub use selection::{Bucket, SelectedCards, SelectionEngine, SelectionState, SubscriptionId};
