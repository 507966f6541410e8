use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::selection::SelectedCards;

pub const CONFIRM_ROUTE: &str = "/trading/create/confirm";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DraftError {
    #[error("Both want and give must contain at least one card")]
    Incomplete,

    #[error("Missing query parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid card id in {param}: {value}")]
    InvalidId { param: &'static str, value: String },

    #[error("Card {id} listed twice in {param}")]
    Duplicate { param: &'static str, id: i64 },

    #[error("Card {0} is both wanted and given")]
    Overlap(i64),
}

/// Card ids handed to the trade-confirmation step, in selection order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeDraft {
    pub want: Vec<i64>,
    pub give: Vec<i64>,
}

pub fn can_submit(selected: &SelectedCards) -> bool {
    !selected.want().is_empty() && !selected.give().is_empty()
}

pub fn assemble(selected: &SelectedCards) -> Result<TradeDraft, DraftError> {
    if !can_submit(selected) {
        return Err(DraftError::Incomplete);
    }
    Ok(TradeDraft {
        want: selected.want().iter().map(|c| c.id).collect(),
        give: selected.give().iter().map(|c| c.id).collect(),
    })
}

fn join_ids(ids: &[i64]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join("%2C")
}

fn parse_ids(param: &'static str, raw: &str) -> Result<Vec<i64>, DraftError> {
    if raw.is_empty() {
        return Err(DraftError::MissingParameter(param));
    }
    let decoded = raw.replace("%2C", ",").replace("%2c", ",");
    let mut ids: Vec<i64> = Vec::new();
    for part in decoded.split(',') {
        let id = part.parse::<i64>().map_err(|_| DraftError::InvalidId {
            param,
            value: part.to_string(),
        })?;
        if ids.contains(&id) {
            return Err(DraftError::Duplicate { param, id });
        }
        ids.push(id);
    }
    Ok(ids)
}

impl TradeDraft {
    /// `want=1%2C2&give=3`
    pub fn to_query(&self) -> String {
        format!("want={}&give={}", join_ids(&self.want), join_ids(&self.give))
    }

    pub fn confirmation_url(&self) -> String {
        format!("{}?{}", CONFIRM_ROUTE, self.to_query())
    }

    /// Parses the query string of a confirmation URL (leading `?` optional).
    pub fn from_query(query: &str) -> Result<Self, DraftError> {
        let mut want = None;
        let mut give = None;
        for pair in query.trim_start_matches('?').split('&') {
            match pair.split_once('=') {
                Some(("want", value)) => want = Some(parse_ids("want", value)?),
                Some(("give", value)) => give = Some(parse_ids("give", value)?),
                _ => {}
            }
        }

        let draft = TradeDraft {
            want: want.ok_or(DraftError::MissingParameter("want"))?,
            give: give.ok_or(DraftError::MissingParameter("give"))?,
        };
        if let Some(id) = draft.want.iter().find(|id| draft.give.contains(id)) {
            return Err(DraftError::Overlap(*id));
        }
        Ok(draft)
    }
}
