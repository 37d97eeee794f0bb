pub use super::media_items::Entity as MediaItems;
pub use super::notices::Entity as Notices;
pub use super::publications::Entity as Publications;
pub use super::site_settings::Entity as SiteSettings;
pub use super::users::Entity as Users;
pub use super::visitor_logs::Entity as VisitorLogs;
