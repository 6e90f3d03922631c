//! Client for `/api/v1/info/settings`.

use serde_json::Value;
use validator::Validate;

use crate::api::dto::info_dto::{InfoSetting, InfoSettingUpsertRequest};
use crate::api::dto::ApiResponse;
use crate::api::http::ApiClient;
use crate::core::query::cache::QueryCache;
use crate::core::query::handle::{loader, QueryHandle, QueryOptions};
use crate::core::query::key::{build_key, QueryKey};
use crate::errors::ClientError;

#[derive(Debug, Clone)]
pub struct InfoClient {
    api: ApiClient,
}

impl InfoClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub fn settings_key() -> QueryKey {
        build_key("info", "settings", &[])
    }

    pub async fn get_settings(&self) -> Result<ApiResponse<InfoSetting>, ClientError> {
        self.api.get_envelope("/info/settings", &[]).await?.decode()
    }

    /// Persists a partial settings update. The payload is validated
    /// locally first; a broken form never reaches the backend.
    pub async fn upsert_settings(
        &self,
        request: &InfoSettingUpsertRequest,
    ) -> Result<ApiResponse<Value>, ClientError> {
        request.validate()?;
        self.api.post_envelope("/info/settings", request).await
    }

    /// Cached settings query sharing one entry across every caller.
    pub fn settings_query(&self, cache: &QueryCache, options: QueryOptions) -> QueryHandle {
        let api = self.api.clone();
        QueryHandle::new(
            cache.clone(),
            Self::settings_key(),
            loader(move || {
                let api = api.clone();
                async move { api.get_envelope("/info/settings", &[]).await }
            }),
            options,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn invalid_upsert_is_rejected_before_the_wire() {
        let client = InfoClient::new(ApiClient::new("http://localhost:0"));
        let request = InfoSettingUpsertRequest {
            scrape_interval_sec: Some(0),
            ..Default::default()
        };

        let err = client
            .upsert_settings(&request)
            .await
            .expect_err("validation should fail");
        assert!(matches!(err, ClientError::Validation(_)));
    }

    #[test]
    fn settings_key_is_stable() {
        assert_eq!(InfoClient::settings_key().as_str(), "info:settings:");
    }
}
