use anyhow::Result;
use serde::Serialize;

use crate::api::events::NotificationEvent;
use crate::db::Store;
use crate::entities::visitor_logs;
use tokio::sync::broadcast;

#[derive(Debug, Serialize)]
pub struct AnalyticsSummary {
    pub total_visits: u64,
    pub visits_today: u64,
    pub publication_count: usize,
    pub device_distribution: Vec<DeviceShare>,
}

#[derive(Debug, Serialize)]
pub struct DeviceShare {
    pub device: String,
    pub count: i64,
}

/// Classify a visitor from its User-Agent string. Coarse buckets are enough
/// for the dashboard pie chart.
#[must_use]
pub fn classify_user_agent(user_agent: &str) -> (String, String) {
    let ua = user_agent.to_lowercase();

    let device = if ua.contains("ipad") || ua.contains("tablet") {
        "Tablet"
    } else if ua.contains("mobi") || ua.contains("android") || ua.contains("iphone") {
        "Mobile"
    } else {
        "Desktop"
    };

    let platform = if ua.contains("android") {
        "Android"
    } else if ua.contains("iphone") || ua.contains("ipad") || ua.contains("ios") {
        "iOS"
    } else if ua.contains("windows") {
        "Windows"
    } else if ua.contains("mac os") || ua.contains("macintosh") {
        "macOS"
    } else if ua.contains("linux") {
        "Linux"
    } else {
        "Unknown"
    };

    (device.to_string(), platform.to_string())
}

/// Record a visit and notify SSE subscribers. `device`/`platform` fall back to
/// User-Agent classification when the client did not send them.
pub async fn record_visit(
    store: &Store,
    event_bus: &broadcast::Sender<NotificationEvent>,
    device: Option<String>,
    platform: Option<String>,
    path: String,
    user_agent: &str,
) -> Result<visitor_logs::Model> {
    let (ua_device, ua_platform) = classify_user_agent(user_agent);
    let device = device.filter(|d| !d.is_empty()).unwrap_or(ua_device);
    let platform = platform.filter(|p| !p.is_empty()).unwrap_or(ua_platform);

    let log = store.record_visit(device, platform, path).await?;

    // Subscriber lag or absence is not this caller's problem
    let _ = event_bus.send(NotificationEvent::VisitRecorded {
        device: log.device.clone(),
        platform: log.platform.clone(),
        path: log.path.clone(),
    });

    Ok(log)
}

pub async fn summary(store: &Store) -> Result<AnalyticsSummary> {
    let today = chrono::Utc::now().format("%Y-%m-%d").to_string();

    let total_visits = store.total_visits().await?;
    let visits_today = store.visits_on(&today).await?;
    let publication_count = store.list_publications(None, None).await?.len();
    let device_distribution = store
        .device_distribution()
        .await?
        .into_iter()
        .map(|d| DeviceShare {
            device: d.device,
            count: d.count,
        })
        .collect();

    Ok(AnalyticsSummary {
        total_visits,
        visits_today,
        publication_count,
        device_distribution,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn android_phone_is_mobile() {
        let (device, platform) =
            classify_user_agent("Mozilla/5.0 (Linux; Android 14; Pixel 8) Mobile Safari/537.36");
        assert_eq!(device, "Mobile");
        assert_eq!(platform, "Android");
    }

    #[test]
    fn ipad_is_tablet_ios() {
        let (device, platform) =
            classify_user_agent("Mozilla/5.0 (iPad; CPU OS 17_0 like Mac OS X) Safari/604.1");
        assert_eq!(device, "Tablet");
        assert_eq!(platform, "iOS");
    }

    #[test]
    fn windows_browser_is_desktop() {
        let (device, platform) =
            classify_user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) Chrome/120.0");
        assert_eq!(device, "Desktop");
        assert_eq!(platform, "Windows");
    }

    #[test]
    fn empty_user_agent_is_unknown_desktop() {
        let (device, platform) = classify_user_agent("");
        assert_eq!(device, "Desktop");
        assert_eq!(platform, "Unknown");
    }
}
