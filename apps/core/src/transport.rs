use serde::{Deserialize, Serialize};

use crate::contract::{CoreRequest, CoreResponse};
use crate::core_service::{CoreService, ServiceError};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidJson,
    InvalidRequest,
    MissingRootUrl,
    SpaceKeyNotFound,
    Store,
    Browser,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TransportResponse {
    Ok { response: CoreResponse },
    Err { error: ErrorResponse },
}

pub async fn handle_request(service: &CoreService, request: CoreRequest) -> TransportResponse {
    match service.handle_command(request).await {
        Ok(response) => TransportResponse::Ok { response },
        Err(error) => {
            log::warn!("request failed: {error}");
            TransportResponse::Err {
                error: map_service_error(error),
            }
        }
    }
}

/// One JSON request in, one JSON response out.
pub async fn handle_json(service: &CoreService, payload: &str) -> String {
    let response = match serde_json::from_str::<CoreRequest>(payload) {
        Ok(request) => handle_request(service, request).await,
        Err(error) => TransportResponse::Err {
            error: ErrorResponse {
                code: ErrorCode::InvalidJson,
                message: error.to_string(),
            },
        },
    };

    serde_json::to_string(&response).unwrap_or_else(|error| {
        format!(
            r#"{{"status":"err","error":{{"code":"invalid_json","message":"{}"}}}}"#,
            error.to_string().replace('"', "'")
        )
    })
}

fn map_service_error(error: ServiceError) -> ErrorResponse {
    let code = match &error {
        ServiceError::InvalidRequest(_) => ErrorCode::InvalidRequest,
        ServiceError::MissingRootUrl => ErrorCode::MissingRootUrl,
        ServiceError::SpaceKeyNotFound => ErrorCode::SpaceKeyNotFound,
        ServiceError::Store(_) => ErrorCode::Store,
        ServiceError::Browser(_) => ErrorCode::Browser,
    };
    ErrorResponse {
        code,
        message: error.to_string(),
    }
}
