use std::sync::Arc;

use crate::browser::{
    assemble, can_submit, Bucket, BrowserMode, BrowserOptions, CardBrowser, SelectedCards,
    SelectionEngine, SelectionState, TradeDraft,
};
use crate::catalog::CardRepository;
use crate::models::BrowserSettings;
use crate::session::{Access, Session, SessionGate, SessionProvider};

/// The trade-creation screen: a select-mode browser over tradeable cards
/// plus the want/give selection.
pub struct TradeBuilder {
    session: Session,
    browser: Arc<CardBrowser>,
    selection: SelectionEngine,
}

impl TradeBuilder {
    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn browser(&self) -> &Arc<CardBrowser> {
        &self.browser
    }

    pub fn selection(&self) -> &SelectionEngine {
        &self.selection
    }

    /// Subscriptions and bucket switching go through here.
    pub fn selection_mut(&mut self) -> &mut SelectionEngine {
        &mut self.selection
    }

    pub fn selected(&self) -> &SelectedCards {
        self.selection.selected()
    }

    pub fn set_active_bucket(&mut self, bucket: Bucket) {
        self.selection.set_active_bucket(bucket);
    }

    /// Toggles a displayed card into the active bucket. Returns None when the
    /// card is not on screen or the browser is view-only.
    pub fn click_card(&mut self, card_id: i64) -> Option<SelectionState> {
        if self.browser.mode() != BrowserMode::Select {
            return None;
        }
        let card = self.browser.card(card_id)?;
        Some(self.selection.toggle(&card))
    }

    pub fn remove_card(&mut self, card_id: i64, bucket: Bucket) -> bool {
        self.selection.remove(card_id, bucket)
    }

    pub fn can_submit(&self) -> bool {
        can_submit(self.selection.selected())
    }

    /// Confirmation URL carrying the selected ids.
    pub fn submit(&self) -> Result<String, String> {
        let draft = assemble(self.selection.selected()).map_err(|e| e.to_string())?;
        log::info!(
            "Trade draft for {}: want {:?}, give {:?}",
            self.session.trader_identifier(),
            draft.want,
            draft.give
        );
        Ok(draft.confirmation_url())
    }
}

/// Opens the trade builder, or redirects to sign-in before any selection
/// state is created.
pub async fn open_trade_builder<P: SessionProvider + ?Sized>(
    gate: &SessionGate<P>,
    repository: Arc<dyn CardRepository>,
    settings: &BrowserSettings,
) -> Result<Access<TradeBuilder>, String> {
    let session = match gate
        .require_authenticated(&settings.sign_in_route)
        .await
        .map_err(|e| e.to_string())?
    {
        Access::Granted(session) => session,
        Access::Redirect(to) => return Ok(Access::Redirect(to)),
    };

    let browser = CardBrowser::open(repository, BrowserOptions::select(settings))
        .await
        .map_err(|e| e.to_string())?;

    Ok(Access::Granted(TradeBuilder {
        session,
        browser,
        selection: SelectionEngine::new(),
    }))
}

/// The public card dex; no session needed.
pub async fn open_card_dex(
    repository: Arc<dyn CardRepository>,
    settings: &BrowserSettings,
) -> Result<Arc<CardBrowser>, String> {
    CardBrowser::open(repository, BrowserOptions::view(settings))
        .await
        .map_err(|e| e.to_string())
}

/// Reads the hand-off on the confirmation page, which is itself gated.
pub async fn open_trade_confirmation<P: SessionProvider + ?Sized>(
    gate: &SessionGate<P>,
    query: &str,
    settings: &BrowserSettings,
) -> Result<Access<(Session, TradeDraft)>, String> {
    match gate
        .require_authenticated(&settings.sign_in_route)
        .await
        .map_err(|e| e.to_string())?
    {
        Access::Granted(session) => {
            let draft = TradeDraft::from_query(query).map_err(|e| e.to_string())?;
            Ok(Access::Granted((session, draft)))
        }
        Access::Redirect(to) => Ok(Access::Redirect(to)),
    }
}

/// Signs out when signed in; returns where to navigate next.
pub async fn update_auth_status<P: SessionProvider + ?Sized>(
    gate: &SessionGate<P>,
    settings: &BrowserSettings,
) -> Result<String, String> {
    let session = gate.get_session().await.map_err(|e| e.to_string())?;
    gate.update_auth_status(session.as_ref(), &settings.sign_in_route)
        .await
        .map_err(|e| e.to_string())
}
