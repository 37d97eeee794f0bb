pub mod analytics;
pub mod links;
pub mod settings;
