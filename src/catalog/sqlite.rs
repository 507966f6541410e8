use async_trait::async_trait;
use std::sync::Arc;

use super::client::{CardRepository, FetchCardsRequest, FetchCardsResponse};
use super::error::CatalogError;
use crate::db::Database;
use crate::models::{Card, CardSet};

const CARD_COLUMNS: &str = "c.id, c.name, c.set_id, s.set_name, c.thumbnail, c.is_tradeable, \
     c.card_type, c.rarity, c.pokedex";

/// Helper function to map a database row to a Card struct
fn map_row_to_card(row: &rusqlite::Row) -> rusqlite::Result<Card> {
    Ok(Card {
        id: row.get(0)?,
        name: row.get(1)?,
        set_id: row.get(2)?,
        set_name: row.get(3)?,
        thumbnail: row.get(4)?,
        is_tradeable: row.get::<_, i32>(5)? == 1,
        card_type: row.get(6)?,
        rarity: row.get(7)?,
        pokedex: row.get(8)?,
    })
}

/// Escapes LIKE wildcards so the search text matches literally.
fn like_pattern(search: &str) -> String {
    let mut escaped = String::with_capacity(search.len() + 2);
    escaped.push('%');
    for ch in search.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

/// Card repository over the embedded SQLite catalog
#[derive(Clone)]
pub struct SqliteCardRepository {
    db: Arc<Database>,
}

impl SqliteCardRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Arc<Database> {
        &self.db
    }

    fn query_cards(&self, request: &FetchCardsRequest) -> Result<FetchCardsResponse, CatalogError> {
        let limit = request.page_size();
        if request.cursor.is_some_and(|cursor| cursor < 0) {
            return Err(CatalogError::InvalidRequest(format!(
                "cursor must be a card id, got {:?}",
                request.cursor
            )));
        }

        let mut query = format!(
            "SELECT {} FROM cards c JOIN sets s ON s.id = c.set_id WHERE 1=1",
            CARD_COLUMNS
        );
        let mut conditions = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(set_id) = request.set_id {
            conditions.push("c.set_id = ?");
            params.push(Box::new(set_id));
        }
        if let Some(search) = request.search_text() {
            conditions.push("casefold(c.name) LIKE ? ESCAPE '\\'");
            params.push(Box::new(like_pattern(&search.to_lowercase())));
        }
        if request.tradeable_only {
            conditions.push("c.is_tradeable = 1");
        }
        if let Some(cursor) = request.cursor {
            conditions.push("c.id > ?");
            params.push(Box::new(cursor));
        }

        if !conditions.is_empty() {
            query.push_str(&format!(" AND {}", conditions.join(" AND ")));
        }

        query.push_str(" ORDER BY c.id ASC LIMIT ?");
        params.push(Box::new(limit as i64 + 1));

        let conn = self.db.conn.lock()?;
        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();
        let mut stmt = conn.prepare(&query)?;
        let rows = stmt
            .query_map(param_refs.as_slice(), map_row_to_card)?
            .collect::<Result<Vec<_>, _>>()?;

        log::debug!(
            "fetch_cards set={:?} search={:?} cursor={:?} -> {} rows",
            request.set_id,
            request.search_text(),
            request.cursor,
            rows.len()
        );

        Ok(FetchCardsResponse::from_overfetch(rows, limit))
    }

    fn query_sets(&self) -> Result<Vec<CardSet>, CatalogError> {
        let conn = self.db.conn.lock()?;
        let mut stmt = conn.prepare("SELECT id, set_name, image FROM sets ORDER BY id ASC")?;
        let sets = stmt
            .query_map([], |row| {
                Ok(CardSet {
                    id: row.get(0)?,
                    set_name: row.get(1)?,
                    image: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(sets)
    }
}

#[async_trait]
impl CardRepository for SqliteCardRepository {
    async fn fetch_cards(
        &self,
        request: FetchCardsRequest,
    ) -> Result<FetchCardsResponse, CatalogError> {
        self.query_cards(&request).map_err(|e| {
            log::warn!("Card query failed: {}", e);
            e
        })
    }

    async fn fetch_sets(&self) -> Result<Vec<CardSet>, CatalogError> {
        self.query_sets()
    }
}
