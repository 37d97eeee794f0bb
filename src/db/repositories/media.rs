use anyhow::{Context, Result};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};

use crate::entities::{media_items, prelude::*};

pub struct MediaRepository {
    conn: DatabaseConnection,
}

impl MediaRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&self) -> Result<Vec<media_items::Model>> {
        let items = MediaItems::find()
            .order_by_desc(media_items::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to list media items")?;
        Ok(items)
    }

    pub async fn add(
        &self,
        url: String,
        title: String,
        file_name: Option<String>,
    ) -> Result<media_items::Model> {
        let active = media_items::ActiveModel {
            url: Set(url),
            title: Set(title),
            file_name: Set(file_name),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert media item")?;
        Ok(model)
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = MediaItems::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete media item")?;
        Ok(result.rows_affected > 0)
    }
}
