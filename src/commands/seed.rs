use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::db::Database;

#[derive(Error, Debug)]
pub enum SeedError {
    #[error("Invalid card dump: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Database lock poisoned")]
    Poisoned,
}

/// One scraped card record, as found in the per-set JSON dumps.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawCardRecord {
    pub name: Option<String>,
    pub set: Option<RawSetRef>,
    pub details: RawCardDetails,
    pub thumbnail: String,
    pub url: String,
    pub rarity: String,
    pub expansion: String,
    pub is_tradeable: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawSetRef {
    pub set_name: Option<String>,
    pub pokedex: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawCardDetails {
    #[serde(rename = "type")]
    pub card_type: String,
    pub hp: String,
}

/// A set and the card dump that belongs to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedBundle {
    pub set_name: String,
    #[serde(default)]
    pub image: String,
    pub cards: Vec<RawCardRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedCard {
    pub name: String,
    pub set_name: String,
    pub pokedex: String,
    pub card_type: String,
    pub hp: i64,
    pub rarity: String,
    pub thumbnail: String,
    pub is_tradeable: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetSeedReport {
    pub set_name: String,
    pub upserted: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedReport {
    pub sets: Vec<SetSeedReport>,
    pub total_upserted: usize,
    pub total_skipped: usize,
}

fn non_digits() -> Result<Regex, SeedError> {
    Ok(Regex::new(r"\D")?)
}

/// "/pokedex/type/grass.gif" -> "grass"
fn card_type_from_path(path: &str) -> String {
    path.rsplit('/')
        .next()
        .and_then(|file| file.split('.').next())
        .filter(|t| !t.is_empty())
        .unwrap_or("Unknown type")
        .to_string()
}

/// "Genetic Apex 001" with set "Genetic Apex" -> "001"
fn pokedex_number(pokedex: &str, set_name: &str) -> String {
    match pokedex.split_once(set_name) {
        Some((_, rest)) => rest.trim().to_string(),
        None => pokedex.trim().to_string(),
    }
}

fn parse_hp(non_digits: &Regex, hp: &str) -> i64 {
    non_digits
        .replace_all(hp, "")
        .parse::<i64>()
        .ok()
        .filter(|hp| *hp != 0)
        .unwrap_or(-1)
}

/// Normalises a raw record; None when a mandatory field is missing.
fn normalize(record: &RawCardRecord, non_digits: &Regex) -> Option<SeedCard> {
    let name = record.name.as_deref().filter(|n| !n.is_empty())?;
    let set = record.set.as_ref()?;
    let raw_pokedex = set.pokedex.as_deref().filter(|p| !p.is_empty())?;
    let set_name = set.set_name.clone().unwrap_or_default();

    Some(SeedCard {
        name: name.to_string(),
        pokedex: pokedex_number(raw_pokedex, &set_name),
        set_name,
        card_type: card_type_from_path(&record.details.card_type),
        hp: parse_hp(non_digits, &record.details.hp),
        rarity: record.rarity.clone(),
        thumbnail: record.thumbnail.clone(),
        is_tradeable: record.is_tradeable.unwrap_or(true),
    })
}

pub fn parse_bundles(bundles_json: &str) -> Result<Vec<SeedBundle>, SeedError> {
    Ok(serde_json::from_str(bundles_json)?)
}

/// Parse bundles and return the cards that would be seeded
pub async fn preview_seed(bundles_json: String) -> Result<Vec<SeedCard>, String> {
    let bundles = parse_bundles(&bundles_json).map_err(|e| e.to_string())?;
    let non_digits = non_digits().map_err(|e| e.to_string())?;

    let previews = bundles
        .iter()
        .flat_map(|bundle| bundle.cards.iter())
        .filter_map(|record| normalize(record, &non_digits))
        .collect();

    Ok(previews)
}

/// Upsert sets by name and insert their cards.
///
/// Records missing a name or pokedex entry, or naming a set that is not in
/// the bundle list, are skipped and counted rather than failing the load.
/// Cards already present (same name, set and pokedex number) are left as is.
pub fn seed_bundles(db: &Database, bundles: &[SeedBundle]) -> Result<SeedReport, SeedError> {
    let non_digits = non_digits()?;
    let mut conn = db.conn.lock().map_err(|_| SeedError::Poisoned)?;
    let tx = conn.transaction()?;

    let mut set_ids: HashMap<String, i64> = HashMap::new();
    for bundle in bundles {
        tx.execute(
            "INSERT INTO sets (set_name, image) VALUES (?, ?) ON CONFLICT(set_name) DO NOTHING",
            rusqlite::params![bundle.set_name, bundle.image],
        )?;
        let id: i64 = tx
            .query_row(
                "SELECT id FROM sets WHERE set_name = ?",
                [&bundle.set_name],
                |row| row.get(0),
            )?;
        log::info!("Set {} (id: {})", bundle.set_name, id);
        set_ids.insert(bundle.set_name.clone(), id);
    }

    let mut report = SeedReport::default();

    for bundle in bundles {
        let mut set_report = SetSeedReport {
            set_name: bundle.set_name.clone(),
            ..Default::default()
        };

        for record in &bundle.cards {
            let Some(card) = normalize(record, &non_digits) else {
                set_report.skipped += 1;
                continue;
            };
            let Some(set_id) = set_ids.get(&card.set_name) else {
                log::warn!("Unknown set name: {} (card: {})", card.set_name, card.name);
                set_report.skipped += 1;
                continue;
            };

            tx.execute(
                "INSERT INTO cards (
                    name, set_id, card_type, rarity, pokedex, expansion, url, thumbnail, hp, is_tradeable
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(name, set_id, pokedex) DO NOTHING",
                rusqlite::params![
                    card.name,
                    set_id,
                    card.card_type,
                    card.rarity,
                    card.pokedex,
                    record.expansion,
                    record.url,
                    card.thumbnail,
                    card.hp,
                    card.is_tradeable as i32
                ],
            )?;
            set_report.upserted += 1;
        }

        log::info!(
            "{}: {} cards upserted, {} skipped",
            set_report.set_name,
            set_report.upserted,
            set_report.skipped
        );
        report.total_upserted += set_report.upserted;
        report.total_skipped += set_report.skipped;
        report.sets.push(set_report);
    }

    tx.commit()?;

    log::info!(
        "Seeding complete: {} cards upserted, {} skipped",
        report.total_upserted,
        report.total_skipped
    );

    Ok(report)
}

/// Seed the catalog from parsed bundles
pub async fn seed_catalog(db: &Database, bundles: Vec<SeedBundle>) -> Result<SeedReport, String> {
    seed_bundles(db, &bundles).map_err(|e| e.to_string())
}
