use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

use crate::entities::{prelude::*, visitor_logs};

#[derive(Debug, FromQueryResult)]
pub struct DeviceCount {
    pub device: String,
    pub count: i64,
}

pub struct AnalyticsRepository {
    conn: DatabaseConnection,
}

impl AnalyticsRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn add_visit(
        &self,
        device: String,
        platform: String,
        path: String,
    ) -> Result<visitor_logs::Model> {
        let active = visitor_logs::ActiveModel {
            device: Set(device),
            platform: Set(platform),
            path: Set(path),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to record visit")?;
        Ok(model)
    }

    pub async fn total_visits(&self) -> Result<u64> {
        let count = VisitorLogs::find()
            .count(&self.conn)
            .await
            .context("Failed to count visits")?;
        Ok(count)
    }

    /// Visits whose timestamp falls on the given UTC date (RFC3339 prefix match).
    pub async fn visits_on(&self, date: &str) -> Result<u64> {
        let count = VisitorLogs::find()
            .filter(visitor_logs::Column::CreatedAt.starts_with(date))
            .count(&self.conn)
            .await
            .context("Failed to count today's visits")?;
        Ok(count)
    }

    pub async fn device_distribution(&self) -> Result<Vec<DeviceCount>> {
        let rows = VisitorLogs::find()
            .select_only()
            .column(visitor_logs::Column::Device)
            .column_as(visitor_logs::Column::Id.count(), "count")
            .group_by(visitor_logs::Column::Device)
            .into_model::<DeviceCount>()
            .all(&self.conn)
            .await
            .context("Failed to aggregate device distribution")?;
        Ok(rows)
    }

    pub async fn recent(&self, limit: u64) -> Result<Vec<visitor_logs::Model>> {
        let rows = VisitorLogs::find()
            .order_by_desc(visitor_logs::Column::CreatedAt)
            .limit(limit)
            .all(&self.conn)
            .await
            .context("Failed to list recent visits")?;
        Ok(rows)
    }

    pub async fn prune(&self, older_than_days: i64) -> Result<u64> {
        let cutoff = (chrono::Utc::now() - chrono::Duration::days(older_than_days)).to_rfc3339();

        let result = VisitorLogs::delete_many()
            .filter(visitor_logs::Column::CreatedAt.lt(cutoff))
            .exec(&self.conn)
            .await
            .context("Failed to prune visitor logs")?;

        Ok(result.rows_affected)
    }

    pub async fn clear(&self) -> Result<()> {
        VisitorLogs::delete_many()
            .exec(&self.conn)
            .await
            .context("Failed to clear visitor logs")?;
        Ok(())
    }
}
