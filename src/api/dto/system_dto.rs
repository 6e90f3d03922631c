//! Wire DTOs for the `/api/v1/system/*` endpoints (camelCase on the wire).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SystemHealth {
    Healthy,
    Degraded,
    Maintenance,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ComponentHealth {
    Healthy,
    Degraded,
    Warning,
    Error,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SystemComponentStatus {
    #[serde(default)]
    pub component: String,
    #[serde(default)]
    pub status: ComponentHealth,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub last_checked_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SystemStatusResponse {
    #[serde(default)]
    pub status: SystemHealth,
    #[serde(default)]
    pub components: Vec<SystemComponentStatus>,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub last_updated: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    Accepted,
    InProgress,
    Completed,
    Failed,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackupMode {
    Full,
    Incremental,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<BackupMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_metrics: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct BackupResponse {
    #[serde(default)]
    pub status: ActionStatus,
    #[serde(default)]
    pub requested_at: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub backup_id: String,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResyncScope {
    Metrics,
    Info,
    All,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResyncRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub force: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<ResyncScope>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ResyncResponse {
    #[serde(default)]
    pub status: ActionStatus,
    #[serde(default)]
    pub requested_at: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub resync_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_status_values_fall_back() {
        let decoded: SystemStatusResponse = serde_json::from_value(json!({
            "status": "on_fire",
            "components": [{"component": "scheduler", "status": "healthy"}],
            "version": "1.0.0"
        }))
        .unwrap();

        assert_eq!(decoded.status, SystemHealth::Unknown);
        assert_eq!(decoded.components[0].status, ComponentHealth::Healthy);
    }

    #[test]
    fn backup_request_omits_absent_fields() {
        let body = serde_json::to_value(BackupRequest::default()).unwrap();
        assert_eq!(body, json!({}));
    }
}
