use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowserSettings {
    pub id: i32,
    pub page_size: u32,
    pub search_debounce_ms: u64,
    pub image_host: String,
    pub sign_in_route: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            id: 1,
            page_size: 20,
            search_debounce_ms: 300,
            image_host: "https://serebii.net".to_string(),
            sign_in_route: "/signin".to_string(),
            created_at: 0,
            updated_at: 0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsInput {
    pub page_size: Option<u32>,
    pub search_debounce_ms: Option<u64>,
    pub image_host: Option<String>,
    pub sign_in_route: Option<String>,
}
