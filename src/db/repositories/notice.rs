use anyhow::{Context, Result};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::entities::{notices, prelude::*};

pub struct NoticeRepository {
    conn: DatabaseConnection,
}

impl NoticeRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Active notices, newest first.
    pub async fn list_active(&self) -> Result<Vec<notices::Model>> {
        let items = Notices::find()
            .filter(notices::Column::Active.eq(true))
            .order_by_desc(notices::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to list notices")?;
        Ok(items)
    }

    pub async fn add(&self, content: String) -> Result<notices::Model> {
        let active = notices::ActiveModel {
            content: Set(content),
            active: Set(true),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert notice")?;
        Ok(model)
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = Notices::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete notice")?;
        Ok(result.rows_affected > 0)
    }
}
