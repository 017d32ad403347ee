use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const AUTHENTICATION_REQUIRED: &str = "Authentication required";
pub const FORBIDDEN: &str = "You do not have permission to access this To-Do item";
pub const TODO_NOT_FOUND: &str = "To-Do item not found";
pub const ROUTE_NOT_FOUND: &str = "Not Found";
pub const INVALID_JSON: &str = "Invalid JSON body";
pub const INTERNAL_SERVER_ERROR: &str = "Internal server error";

/// アプリケーション全体で使用される包括的なエラー型
#[derive(Debug, Clone, Error)]
pub enum AppError {
    // ドメインエラー
    #[error("Domain error: {0}")]
    Domain(#[from] domain::DomainError),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    // 認証・認可エラー
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Authorization failed: {0}")]
    Authorization(String),

    /// 条件付き書き込みの所有者条件が書き込み時点で成立しなかった
    #[error("Ownership condition failed at write time: {0}")]
    ConcurrentModification(String),

    // リソースエラー
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("No route for {method} {path}")]
    RouteNotFound { method: String, path: String },

    // インフラストラクチャエラー
    #[error("DynamoDB error: {0}")]
    DynamoDb(String),

    #[error("Timeout occurred: {0}")]
    Timeout(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// エラーの重要度（ログレベルの選択に使用）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl AppError {
    /// 機械可読なエラーコード
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Domain(_) | AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Deserialization(_) => "INVALID_JSON",
            AppError::Authentication(_) => "AUTHENTICATION_ERROR",
            AppError::Authorization(_) => "AUTHORIZATION_ERROR",
            AppError::ConcurrentModification(_) => "OWNERSHIP_CONFLICT",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::RouteNotFound { .. } => "ROUTE_NOT_FOUND",
            AppError::DynamoDb(_) => "DYNAMODB_ERROR",
            AppError::Timeout(_) => "TIMEOUT",
            AppError::Serialization(_) => "SERIALIZATION_ERROR",
            AppError::Configuration(_) => "CONFIGURATION_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            AppError::Domain(_)
            | AppError::Deserialization(_)
            | AppError::Validation(_)
            | AppError::NotFound(_)
            | AppError::RouteNotFound { .. } => ErrorSeverity::Info,
            AppError::Authentication(_)
            | AppError::Authorization(_)
            | AppError::ConcurrentModification(_) => ErrorSeverity::Warning,
            AppError::DynamoDb(_) | AppError::Timeout(_) => ErrorSeverity::Error,
            AppError::Serialization(_) | AppError::Configuration(_) | AppError::Internal(_) => {
                ErrorSeverity::Critical
            }
        }
    }

    /// HTTPステータスコードを取得
    pub fn http_status_code(&self) -> u16 {
        match self {
            AppError::Domain(_) | AppError::Deserialization(_) | AppError::Validation(_) => 400,
            AppError::Authentication(_) => 401,
            // 書き込み時の所有者条件違反も権限エラーとして返す
            AppError::Authorization(_) | AppError::ConcurrentModification(_) => 403,
            AppError::NotFound(_) | AppError::RouteNotFound { .. } => 404,
            AppError::DynamoDb(_)
            | AppError::Timeout(_)
            | AppError::Serialization(_)
            | AppError::Configuration(_)
            | AppError::Internal(_) => 500,
        }
    }

    pub fn is_server_error(&self) -> bool {
        self.http_status_code() >= 500
    }

    /// ユーザー向けメッセージを取得
    ///
    /// 5xx 系は呼び出し側で操作ごとの汎用メッセージに置き換えます。
    pub fn user_message(&self) -> String {
        match self {
            AppError::Domain(e) => e.to_string(),
            AppError::Validation(msg) => msg.clone(),
            AppError::Deserialization(_) => INVALID_JSON.to_string(),
            AppError::Authentication(_) => AUTHENTICATION_REQUIRED.to_string(),
            AppError::Authorization(_) | AppError::ConcurrentModification(_) => {
                FORBIDDEN.to_string()
            }
            AppError::NotFound(_) => TODO_NOT_FOUND.to_string(),
            AppError::RouteNotFound { .. } => ROUTE_NOT_FOUND.to_string(),
            _ => INTERNAL_SERVER_ERROR.to_string(),
        }
    }

    /// エラーをログに記録
    pub fn log(&self, operation: &str) {
        let code = self.code();
        let status = self.http_status_code();

        match self.severity() {
            ErrorSeverity::Critical => {
                tracing::error!(error = %self, code, status, operation, "Critical error occurred");
            }
            ErrorSeverity::Error => {
                tracing::error!(error = %self, code, status, operation, "Request failed");
            }
            ErrorSeverity::Warning => {
                tracing::warn!(error = %self, code, status, operation, "Request rejected");
            }
            ErrorSeverity::Info => {
                tracing::info!(error = %self, code, status, operation, "Request rejected");
            }
        }
    }
}

/// 標準化されたエラーレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// ユーザー向けメッセージ
    pub message: String,
    /// エラーコード
    pub code: String,
    /// 詳細情報（開発環境の 5xx のみ）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ErrorResponse {
    /// AppErrorからErrorResponseを作成
    ///
    /// `failure_message` は 5xx の場合にだけ使われる操作単位の汎用メッセージです。
    pub fn from_app_error(error: &AppError, failure_message: &str, include_details: bool) -> Self {
        if error.is_server_error() {
            Self {
                message: failure_message.to_string(),
                code: error.code().to_string(),
                error: include_details.then(|| error.to_string()),
            }
        } else {
            Self {
                message: error.user_message(),
                code: error.code().to_string(),
                error: None,
            }
        }
    }
}
