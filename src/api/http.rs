//! Thin transport layer over reqwest.
//!
//! Every backend endpoint responds with an [`ApiResponse`] envelope. An
//! HTTP 200 carrying `is_successful: false` is a valid, decodable response
//! and is returned as `Ok`; only transport-level problems (rejected call,
//! non-2xx without a parsable envelope) become `Err`.

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::api::dto::ApiResponse;
use crate::errors::ClientError;

pub const API_BASE_PATH: &str = "/api/v1";
pub const DEFAULT_PAGE_SIZE: u32 = 50;

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { http, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, API_BASE_PATH, path)
    }

    /// GET an envelope; `query` pairs are appended as-is (repeated names
    /// allowed, e.g. the `metric` filter).
    pub async fn get_envelope(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<ApiResponse<Value>, ClientError> {
        let url = self.url(path);
        debug!(%url, "GET");

        let response = self.http.get(&url).query(query).send().await?;
        Self::read_envelope(response).await
    }

    /// POST a JSON body, expecting an envelope back.
    pub async fn post_envelope<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ApiResponse<Value>, ClientError> {
        let url = self.url(path);
        debug!(%url, "POST");

        let response = self.http.post(&url).json(body).send().await?;
        Self::read_envelope(response).await
    }

    async fn read_envelope(
        response: reqwest::Response,
    ) -> Result<ApiResponse<Value>, ClientError> {
        let status = response.status();
        let bytes = response.bytes().await?;

        match serde_json::from_slice::<ApiResponse<Value>>(&bytes) {
            Ok(envelope) => Ok(envelope),
            Err(_) if !status.is_success() => Err(ClientError::Transport(format!(
                "unexpected status {status}"
            ))),
            Err(err) => Err(ClientError::Decode(err.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slashes_are_normalized() {
        let client = ApiClient::new("http://localhost:8080/");
        assert_eq!(
            client.url("/system/status"),
            "http://localhost:8080/api/v1/system/status"
        );
    }
}
