//! Wire DTOs for `/api/v1/info/settings` (snake_case, mirrors the backend
//! setting entity).

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct InfoSetting {
    // General & UI
    pub is_dark_mode: bool,
    pub language: String,

    // Retention
    pub minute_retention_days: u32,
    pub hour_retention_months: u32,
    pub day_retention_years: u32,
    pub retention_policy: String,

    // Metrics collection
    pub scrape_interval_sec: u32,
    pub metrics_batch_size: u32,
    pub enable_gpu_metrics: bool,
    pub enable_network_metrics: bool,

    // Alerts & notifications
    pub enable_cluster_health_alert: bool,
    pub enable_rustcost_health_alert: bool,
    pub global_alert_subject: String,
    pub linkback_url: Option<String>,
    pub email_recipients: Vec<String>,
    pub slack_webhook_url: Option<String>,
    pub teams_webhook_url: Option<String>,

    // Metadata
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub version: String,
}

/// Write payload for settings upsert. Validated locally before the request
/// goes out so an obviously broken form never reaches the backend.
#[derive(Debug, Clone, Serialize, Deserialize, Default, Validate)]
pub struct InfoSettingUpsertRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_dark_mode: Option<bool>,
    #[validate(length(min = 2, max = 8))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    #[validate(range(min = 1, max = 365))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minute_retention_days: Option<u32>,
    #[validate(range(min = 1, max = 120))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hour_retention_months: Option<u32>,
    #[validate(range(min = 1, max = 30))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_retention_years: Option<u32>,

    #[validate(range(min = 5, max = 3600))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scrape_interval_sec: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_cluster_health_alert: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub global_alert_subject: Option<String>,
    #[validate(url)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkback_url: Option<String>,
    #[validate(url)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slack_webhook_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_retention() {
        let req = InfoSettingUpsertRequest {
            minute_retention_days: Some(0),
            ..Default::default()
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn accepts_partial_update() {
        let req = InfoSettingUpsertRequest {
            language: Some("ja".into()),
            is_dark_mode: Some(true),
            ..Default::default()
        };
        assert!(req.validate().is_ok());

        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"language": "ja", "is_dark_mode": true})
        );
    }
}
