use lambda_http::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    CONTENT_TYPE,
};
use lambda_http::http::{HeaderMap, HeaderValue, StatusCode};
use lambda_http::{Body, Response};
use serde::Serialize;
use serde_json::{json, Value};
use shared::{AppError, ErrorResponse};

const ALLOWED_METHODS: &str = "GET,POST,PUT,DELETE,OPTIONS";
const ALLOWED_HEADERS: &str = "Content-Type,Authorization";

/// ハンドラーが返す応答。Lambda の `Response` へは最後に一度だけ変換する
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

impl ApiResponse {
    pub fn json<T: Serialize>(status: StatusCode, body: &T) -> Result<Self, AppError> {
        let body =
            serde_json::to_value(body).map_err(|e| AppError::Serialization(e.to_string()))?;
        Ok(Self {
            status,
            headers: cors_headers(),
            body: Some(body),
        })
    }

    /// CORS プリフライト応答（ボディなし）
    pub fn preflight() -> Self {
        Self {
            status: StatusCode::OK,
            headers: cors_headers(),
            body: None,
        }
    }

    pub fn from_error(error: &AppError, failure_message: &str, include_details: bool) -> Self {
        let response = ErrorResponse::from_app_error(error, failure_message, include_details);
        let body = serde_json::to_value(&response)
            .unwrap_or_else(|_| json!({ "message": response.message }));

        Self {
            status: StatusCode::from_u16(error.http_status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            headers: cors_headers(),
            body: Some(body),
        }
    }

    pub fn into_lambda(self) -> Response<Body> {
        let body = match self.body {
            Some(value) => Body::from(value.to_string()),
            None => Body::Empty,
        };

        let mut response = Response::new(body);
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

fn cors_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOWED_HEADERS),
    );
    headers
}
