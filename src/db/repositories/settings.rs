use anyhow::{Context, Result};
use sea_orm::sea_query::OnConflict;
use sea_orm::{DatabaseConnection, EntityTrait, Set};

use crate::entities::{prelude::*, site_settings};

pub struct SettingsRepository {
    conn: DatabaseConnection,
}

impl SettingsRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get_all(&self) -> Result<Vec<site_settings::Model>> {
        let rows = SiteSettings::find()
            .all(&self.conn)
            .await
            .context("Failed to load site settings")?;
        Ok(rows)
    }

    /// Upsert one row per key. Existing rows keep their key and get a
    /// fresh value and timestamp.
    pub async fn upsert_many(&self, pairs: Vec<(String, String)>) -> Result<()> {
        if pairs.is_empty() {
            return Ok(());
        }

        let now = chrono::Utc::now().to_rfc3339();
        let models: Vec<site_settings::ActiveModel> = pairs
            .into_iter()
            .map(|(key, value)| site_settings::ActiveModel {
                key: Set(key),
                value: Set(value),
                updated_at: Set(now.clone()),
            })
            .collect();

        SiteSettings::insert_many(models)
            .on_conflict(
                OnConflict::column(site_settings::Column::Key)
                    .update_columns([
                        site_settings::Column::Value,
                        site_settings::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec(&self.conn)
            .await
            .context("Failed to upsert site settings")?;

        Ok(())
    }
}
