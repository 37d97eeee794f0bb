use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::entities::site_settings;

pub const CATEGORIES_KEY: &str = "publication_categories";
pub const LINKS_KEY: &str = "important_links";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportantLink {
    pub title: String,
    pub url: String,
}

/// The reconciled site configuration: every flat key/value row folded into one
/// map, with the two JSON-valued list settings parsed out into typed fields.
#[derive(Debug, Clone, Serialize)]
pub struct SettingsMap {
    pub values: BTreeMap<String, String>,
    pub categories: Vec<String>,
    pub links: Vec<ImportantLink>,
}

impl SettingsMap {
    /// Fold stored rows into a map. Later rows win on duplicate keys, which
    /// matches how the rows have always been merged client-side.
    pub fn from_rows(
        rows: &[site_settings::Model],
        default_categories: &[String],
        default_links: &[ImportantLink],
    ) -> Self {
        let mut values = BTreeMap::new();
        for row in rows {
            values.insert(row.key.clone(), row.value.clone());
        }

        let categories = values.remove(CATEGORIES_KEY).map_or_else(
            || default_categories.to_vec(),
            |raw| parse_list(&raw, CATEGORIES_KEY, default_categories),
        );

        let links = values.remove(LINKS_KEY).map_or_else(
            || default_links.to_vec(),
            |raw| parse_list(&raw, LINKS_KEY, default_links),
        );

        Self {
            values,
            categories,
            links,
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Fill in config-provided values for keys the table has no row for.
    /// Stored rows always take precedence.
    pub fn apply_defaults(&mut self, defaults: &[(String, String)]) {
        for (key, value) in defaults {
            self.values
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
    }

    /// Flatten back into upsert rows: one row per distinct key, with the
    /// current categories and links lists re-serialized under their keys.
    /// The map representation guarantees the dedup. Both list rows are
    /// always written, even when the list is empty, so a cleared links
    /// list persists as `[]` rather than leaving a stale row behind.
    #[must_use]
    pub fn to_rows(&self) -> Vec<(String, String)> {
        let mut rows: BTreeMap<String, String> = self.values.clone();

        if let Ok(json) = serde_json::to_string(&self.categories) {
            rows.insert(CATEGORIES_KEY.to_string(), json);
        }
        if let Ok(json) = serde_json::to_string(&self.links) {
            rows.insert(LINKS_KEY.to_string(), json);
        }

        rows.into_iter().collect()
    }
}

/// Parse a JSON-array-valued setting, falling back to the configured default
/// when the stored value is malformed. A bad row must never break the site.
fn parse_list<T: Clone + for<'de> Deserialize<'de>>(raw: &str, key: &str, default: &[T]) -> Vec<T> {
    match serde_json::from_str(raw) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("Malformed JSON in setting '{}', using defaults: {}", key, e);
            default.to_vec()
        }
    }
}
