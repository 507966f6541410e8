use serde::{Deserialize, Serialize};

/// A card as returned by catalog queries, with its set name joined in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: i64,
    pub name: String,
    pub set_id: i64,
    pub set_name: String,
    pub thumbnail: String,
    pub is_tradeable: bool,
    #[serde(rename = "type")]
    pub card_type: String,
    pub rarity: String,
    pub pokedex: String,
}

impl Card {
    /// Full-size image URL: thumbnails live under a `/th` path segment.
    pub fn image_url(&self, image_host: &str) -> String {
        format!(
            "{}{}",
            image_host.trim_end_matches('/'),
            self.thumbnail.replacen("/th", "", 1)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardSet {
    pub id: i64,
    pub set_name: String,
    pub image: String,
}

#[cfg(test)]
pub(crate) fn sample_card(id: i64, name: &str, set_id: i64) -> Card {
    Card {
        id,
        name: name.to_string(),
        set_id,
        set_name: format!("Set {}", set_id),
        thumbnail: format!("/tcgpocket/th/{}.jpg", id),
        is_tradeable: true,
        card_type: "grass".to_string(),
        rarity: "◊".to_string(),
        pokedex: format!("{:03}", id),
    }
}
