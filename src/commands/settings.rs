use crate::db::Database;
use crate::models::{BrowserSettings, UpdateSettingsInput};

pub const MAX_SEARCH_DEBOUNCE_MS: u64 = 5_000;

pub async fn get_settings(db: &Database) -> Result<BrowserSettings, String> {
    let conn = db.conn.lock().map_err(|e| e.to_string())?;

    let settings = conn.query_row(
        "SELECT id, page_size, search_debounce_ms, image_host, sign_in_route, created_at, updated_at FROM settings WHERE id = 1",
        [],
        |row| {
            Ok(BrowserSettings {
                id: row.get(0)?,
                page_size: row.get(1)?,
                search_debounce_ms: row.get::<_, i64>(2)?.max(0) as u64,
                image_host: row.get(3)?,
                sign_in_route: row.get(4)?,
                created_at: row.get(5)?,
                updated_at: row.get(6)?,
            })
        },
    ).map_err(|e| e.to_string())?;

    Ok(settings)
}

pub async fn update_settings(
    db: &Database,
    settings: UpdateSettingsInput,
) -> Result<BrowserSettings, String> {
    {
        let conn = db.conn.lock().map_err(|e| e.to_string())?;

        let mut updates = Vec::new();
        let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(val) = settings.page_size {
            if !(1..=crate::catalog::MAX_PAGE_SIZE).contains(&val) {
                return Err(format!(
                    "Page size must be between 1 and {}",
                    crate::catalog::MAX_PAGE_SIZE
                ));
            }
            updates.push("page_size = ?");
            values.push(Box::new(val));
        }
        if let Some(val) = settings.search_debounce_ms {
            if val > MAX_SEARCH_DEBOUNCE_MS {
                return Err(format!(
                    "Search debounce must be at most {} ms",
                    MAX_SEARCH_DEBOUNCE_MS
                ));
            }
            updates.push("search_debounce_ms = ?");
            values.push(Box::new(val as i64));
        }
        if let Some(val) = settings.image_host {
            updates.push("image_host = ?");
            values.push(Box::new(val));
        }
        if let Some(val) = settings.sign_in_route {
            if !val.starts_with('/') {
                return Err("Sign-in route must be an absolute path".to_string());
            }
            updates.push("sign_in_route = ?");
            values.push(Box::new(val));
        }

        updates.push("updated_at = strftime('%s', 'now')");

        let query = format!("UPDATE settings SET {} WHERE id = 1", updates.join(", "));
        let params: Vec<&dyn rusqlite::ToSql> = values.iter().map(|v| v.as_ref()).collect();

        conn.execute(&query, params.as_slice()).map_err(|e| e.to_string())?;
    }

    get_settings(db).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_defaults_are_seeded() {
        let db = Database::open_in_memory().unwrap();
        let settings = get_settings(&db).await.unwrap();
        assert_eq!(settings.page_size, 20);
        assert_eq!(settings.search_debounce_ms, 300);
        assert_eq!(settings.image_host, "https://serebii.net");
        assert_eq!(settings.sign_in_route, "/signin");
    }

    #[tokio::test]
    async fn test_partial_update() {
        let db = Database::open_in_memory().unwrap();
        let updated = update_settings(
            &db,
            UpdateSettingsInput {
                page_size: Some(50),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.page_size, 50);
        assert_eq!(updated.search_debounce_ms, 300);
    }

    #[tokio::test]
    async fn test_rejects_invalid_values() {
        let db = Database::open_in_memory().unwrap();
        let too_big = UpdateSettingsInput {
            page_size: Some(500),
            ..Default::default()
        };
        assert!(update_settings(&db, too_big).await.is_err());

        let relative = UpdateSettingsInput {
            sign_in_route: Some("signin".to_string()),
            ..Default::default()
        };
        assert!(update_settings(&db, relative).await.is_err());
        assert_eq!(get_settings(&db).await.unwrap().sign_in_route, "/signin");
    }

    #[tokio::test]
    async fn test_debounce_is_bounded() {
        let db = Database::open_in_memory().unwrap();
        let huge = UpdateSettingsInput {
            search_debounce_ms: Some(u64::MAX),
            ..Default::default()
        };
        assert!(update_settings(&db, huge).await.is_err());
        assert_eq!(get_settings(&db).await.unwrap().search_debounce_ms, 300);

        let at_limit = UpdateSettingsInput {
            search_debounce_ms: Some(MAX_SEARCH_DEBOUNCE_MS),
            ..Default::default()
        };
        let updated = update_settings(&db, at_limit).await.unwrap();
        assert_eq!(updated.search_debounce_ms, MAX_SEARCH_DEBOUNCE_MS);
    }
}
