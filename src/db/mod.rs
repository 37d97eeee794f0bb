use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::SecurityConfig;
use crate::entities::{media_items, notices, publications, site_settings, visitor_logs};

pub mod migrator;
pub mod repositories;

pub use repositories::analytics::DeviceCount;
pub use repositories::publication::PublicationInput;
pub use repositories::user::{User, generate_api_key, hash_password};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.starts_with(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn publication_repo(&self) -> repositories::publication::PublicationRepository {
        repositories::publication::PublicationRepository::new(self.conn.clone())
    }

    fn media_repo(&self) -> repositories::media::MediaRepository {
        repositories::media::MediaRepository::new(self.conn.clone())
    }

    fn notice_repo(&self) -> repositories::notice::NoticeRepository {
        repositories::notice::NoticeRepository::new(self.conn.clone())
    }

    fn settings_repo(&self) -> repositories::settings::SettingsRepository {
        repositories::settings::SettingsRepository::new(self.conn.clone())
    }

    fn analytics_repo(&self) -> repositories::analytics::AnalyticsRepository {
        repositories::analytics::AnalyticsRepository::new(self.conn.clone())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    // --- Publications ---

    pub async fn list_publications(
        &self,
        category: Option<&str>,
        search: Option<&str>,
    ) -> Result<Vec<publications::Model>> {
        self.publication_repo().list(category, search).await
    }

    pub async fn get_publication(&self, id: i32) -> Result<Option<publications::Model>> {
        self.publication_repo().get(id).await
    }

    pub async fn create_publication(&self, input: PublicationInput) -> Result<publications::Model> {
        self.publication_repo().create(input).await
    }

    pub async fn update_publication(
        &self,
        id: i32,
        input: PublicationInput,
    ) -> Result<Option<publications::Model>> {
        self.publication_repo().update(id, input).await
    }

    pub async fn delete_publication(&self, id: i32) -> Result<bool> {
        self.publication_repo().delete(id).await
    }

    // --- Media library ---

    pub async fn list_media(&self) -> Result<Vec<media_items::Model>> {
        self.media_repo().list().await
    }

    pub async fn add_media(
        &self,
        url: String,
        title: String,
        file_name: Option<String>,
    ) -> Result<media_items::Model> {
        self.media_repo().add(url, title, file_name).await
    }

    pub async fn delete_media(&self, id: i32) -> Result<bool> {
        self.media_repo().delete(id).await
    }

    // --- Notices ---

    pub async fn list_notices(&self) -> Result<Vec<notices::Model>> {
        self.notice_repo().list_active().await
    }

    pub async fn add_notice(&self, content: String) -> Result<notices::Model> {
        self.notice_repo().add(content).await
    }

    pub async fn delete_notice(&self, id: i32) -> Result<bool> {
        self.notice_repo().delete(id).await
    }

    // --- Site settings ---

    pub async fn get_all_settings(&self) -> Result<Vec<site_settings::Model>> {
        self.settings_repo().get_all().await
    }

    pub async fn upsert_settings(&self, pairs: Vec<(String, String)>) -> Result<()> {
        self.settings_repo().upsert_many(pairs).await
    }

    // --- Visitor analytics ---

    pub async fn record_visit(
        &self,
        device: String,
        platform: String,
        path: String,
    ) -> Result<visitor_logs::Model> {
        self.analytics_repo().add_visit(device, platform, path).await
    }

    pub async fn total_visits(&self) -> Result<u64> {
        self.analytics_repo().total_visits().await
    }

    pub async fn visits_on(&self, date: &str) -> Result<u64> {
        self.analytics_repo().visits_on(date).await
    }

    pub async fn device_distribution(&self) -> Result<Vec<DeviceCount>> {
        self.analytics_repo().device_distribution().await
    }

    pub async fn recent_visits(&self, limit: u64) -> Result<Vec<visitor_logs::Model>> {
        self.analytics_repo().recent(limit).await
    }

    pub async fn prune_visits(&self, older_than_days: i64) -> Result<u64> {
        self.analytics_repo().prune(older_than_days).await
    }

    pub async fn clear_visits(&self) -> Result<()> {
        self.analytics_repo().clear().await
    }

    // --- Users ---

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.user_repo().get_by_username(username).await
    }

    pub async fn verify_user_password(&self, username: &str, password: &str) -> Result<bool> {
        self.user_repo().verify_password(username, password).await
    }

    pub async fn update_user_password(
        &self,
        username: &str,
        new_password: &str,
        config: &SecurityConfig,
    ) -> Result<()> {
        self.user_repo()
            .update_password(username, new_password, config)
            .await
    }

    pub async fn verify_api_key(&self, api_key: &str) -> Result<Option<User>> {
        self.user_repo().verify_api_key(api_key).await
    }

    pub async fn regenerate_user_api_key(&self, username: &str) -> Result<String> {
        self.user_repo().regenerate_api_key(username).await
    }
}
