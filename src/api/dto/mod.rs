pub mod info_dto;
pub mod metrics_dto;
pub mod system_dto;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::ClientError;

/// Wire-level response wrapper shared by every backend endpoint.
///
/// `is_successful: false` with HTTP 200 is a valid response: the transport
/// call worked, the backend reported a logical failure in `error_code` /
/// `error_msg`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiResponse<T> {
    pub is_successful: bool,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub error_msg: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            is_successful: true,
            data: Some(data),
            error_code: None,
            error_msg: None,
        }
    }

    pub fn error(code: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            is_successful: false,
            data: None,
            error_code: Some(code.into()),
            error_msg: Some(msg.into()),
        }
    }

    /// Payload of a logically successful response, `None` otherwise.
    pub fn payload(&self) -> Option<&T> {
        if self.is_successful {
            self.data.as_ref()
        } else {
            None
        }
    }

    /// Logical failure carried by the envelope, if any.
    pub fn logical_error(&self) -> Option<ClientError> {
        if self.is_successful {
            return None;
        }
        let message = self
            .error_msg
            .clone()
            .unwrap_or_else(|| "request was not successful".to_string());
        Some(ClientError::Api {
            code: self.error_code.clone(),
            message,
        })
    }
}

impl ApiResponse<Value> {
    /// Re-types a raw envelope into a typed one. The success/error fields
    /// pass through untouched; only a present payload is decoded.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<ApiResponse<T>, ClientError> {
        let data = match &self.data {
            Some(value) => Some(
                serde_json::from_value(value.clone())
                    .map_err(|err| ClientError::Decode(err.to_string()))?,
            ),
            None => None,
        };

        Ok(ApiResponse {
            is_successful: self.is_successful,
            data,
            error_code: self.error_code.clone(),
            error_msg: self.error_msg.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payload_is_none_on_logical_failure() {
        let envelope: ApiResponse<Value> = ApiResponse {
            is_successful: false,
            data: Some(json!({"ignored": true})),
            error_code: Some("UPSTREAM".into()),
            error_msg: Some("upstream timeout".into()),
        };

        assert!(envelope.payload().is_none());
        let err = envelope.logical_error().expect("logical error expected");
        assert_eq!(
            err,
            ClientError::Api {
                code: Some("UPSTREAM".into()),
                message: "upstream timeout".into()
            }
        );
    }

    #[test]
    fn decode_retypes_payload() {
        let envelope = ApiResponse::ok(json!({"summary": {"avg_cpu_cores": 1.5}}));
        let typed = envelope
            .decode::<crate::api::dto::metrics_dto::MetricRawSummaryResponse>()
            .expect("decode should succeed");
        assert!(typed.is_successful);
        assert_eq!(typed.data.unwrap().summary.avg_cpu_cores, 1.5);
    }
}
