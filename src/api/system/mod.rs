//! Client for the `/api/v1/system/*` control-plane endpoints.

use crate::api::dto::system_dto::{
    BackupRequest, BackupResponse, ResyncRequest, ResyncResponse, SystemStatusResponse,
};
use crate::api::dto::ApiResponse;
use crate::api::http::ApiClient;
use crate::core::query::cache::QueryCache;
use crate::core::query::handle::{loader, QueryHandle, QueryOptions};
use crate::core::query::key::{build_key, QueryKey};
use crate::errors::ClientError;

#[derive(Debug, Clone)]
pub struct SystemClient {
    api: ApiClient,
}

impl SystemClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub fn status_key() -> QueryKey {
        build_key("system", "status", &[])
    }

    /// Current health of the RustCost control plane.
    pub async fn status(&self) -> Result<ApiResponse<SystemStatusResponse>, ClientError> {
        self.api.get_envelope("/system/status", &[]).await?.decode()
    }

    /// Cached status query sharing one entry across every caller.
    pub fn status_query(&self, cache: &QueryCache, options: QueryOptions) -> QueryHandle {
        let api = self.api.clone();
        QueryHandle::new(
            cache.clone(),
            Self::status_key(),
            loader(move || {
                let api = api.clone();
                async move { api.get_envelope("/system/status", &[]).await }
            }),
            options,
        )
    }

    /// Triggers a backup. Imperative: callers await the returned future
    /// instead of going through the cache.
    pub async fn backup(
        &self,
        request: &BackupRequest,
    ) -> Result<ApiResponse<BackupResponse>, ClientError> {
        self.api
            .post_envelope("/system/backup", request)
            .await?
            .decode()
    }

    /// Triggers a resynchronization with upstream collectors.
    pub async fn resync(
        &self,
        request: &ResyncRequest,
    ) -> Result<ApiResponse<ResyncResponse>, ClientError> {
        self.api
            .post_envelope("/system/resync", request)
            .await?
            .decode()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_key_is_shared_by_all_consumers() {
        assert_eq!(SystemClient::status_key(), SystemClient::status_key());
        assert_eq!(SystemClient::status_key().as_str(), "system:status:");
    }
}
