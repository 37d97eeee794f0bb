use serde::Serialize;

use crate::entities::{media_items, notices, publications};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PublicationDto {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub cover_url: String,
    pub flipbook_url: String,
    pub category: String,
    pub year: String,
    pub is_latest: bool,
    pub created_at: String,
}

impl From<publications::Model> for PublicationDto {
    fn from(model: publications::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            cover_url: model.cover_url,
            flipbook_url: model.flipbook_url,
            category: model.category,
            year: model.year,
            is_latest: model.is_latest,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MediaItemDto {
    pub id: i32,
    pub url: String,
    pub title: String,
    pub file_name: Option<String>,
    pub created_at: String,
}

impl From<media_items::Model> for MediaItemDto {
    fn from(model: media_items::Model) -> Self {
        Self {
            id: model.id,
            url: model.url,
            title: model.title,
            file_name: model.file_name,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NoticeDto {
    pub id: i32,
    pub content: String,
    pub active: bool,
    pub created_at: String,
}

impl From<notices::Model> for NoticeDto {
    fn from(model: notices::Model) -> Self {
        Self {
            id: model.id,
            content: model.content,
            active: model.active,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: String,
    pub uptime: u64,
    pub total_publications: usize,
    pub total_visits: u64,
    pub database_ok: bool,
}
