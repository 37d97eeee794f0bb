pub mod prelude;

pub mod media_items;
pub mod notices;
pub mod publications;
pub mod site_settings;
pub mod users;
pub mod visitor_logs;
