use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::entities::{prelude::*, publications};

/// Fields accepted when creating or replacing a publication.
#[derive(Debug, Clone)]
pub struct PublicationInput {
    pub title: String,
    pub description: Option<String>,
    pub cover_url: String,
    pub flipbook_url: String,
    pub category: String,
    pub year: String,
    pub is_latest: bool,
}

pub struct PublicationRepository {
    conn: DatabaseConnection,
}

impl PublicationRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// List publications, newest first, optionally narrowed by category
    /// and/or a case-insensitive title substring.
    pub async fn list(
        &self,
        category: Option<&str>,
        search: Option<&str>,
    ) -> Result<Vec<publications::Model>> {
        let mut query = Publications::find().order_by_desc(publications::Column::CreatedAt);

        if let Some(category) = category {
            query = query.filter(publications::Column::Category.eq(category));
        }

        if let Some(search) = search {
            // SQLite LIKE is case-insensitive for ASCII
            query = query.filter(publications::Column::Title.contains(search));
        }

        let items = query
            .all(&self.conn)
            .await
            .context("Failed to list publications")?;
        Ok(items)
    }

    pub async fn get(&self, id: i32) -> Result<Option<publications::Model>> {
        let item = Publications::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to load publication")?;
        Ok(item)
    }

    pub async fn create(&self, input: PublicationInput) -> Result<publications::Model> {
        let active = publications::ActiveModel {
            title: Set(input.title),
            description: Set(input.description),
            cover_url: Set(input.cover_url),
            flipbook_url: Set(input.flipbook_url),
            category: Set(input.category),
            year: Set(input.year),
            is_latest: Set(input.is_latest),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert publication")?;
        Ok(model)
    }

    /// Full replace of every mutable field. Returns None when the id is unknown.
    pub async fn update(
        &self,
        id: i32,
        input: PublicationInput,
    ) -> Result<Option<publications::Model>> {
        let Some(existing) = Publications::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to load publication for update")?
        else {
            return Ok(None);
        };

        let mut active: publications::ActiveModel = existing.into();
        active.title = Set(input.title);
        active.description = Set(input.description);
        active.cover_url = Set(input.cover_url);
        active.flipbook_url = Set(input.flipbook_url);
        active.category = Set(input.category);
        active.year = Set(input.year);
        active.is_latest = Set(input.is_latest);

        let model = active
            .update(&self.conn)
            .await
            .context("Failed to update publication")?;
        Ok(Some(model))
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = Publications::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete publication")?;
        Ok(result.rows_affected > 0)
    }
}
