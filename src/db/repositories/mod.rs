pub mod analytics;
pub mod media;
pub mod notice;
pub mod publication;
pub mod settings;
pub mod user;
