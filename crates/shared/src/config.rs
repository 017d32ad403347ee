use crate::errors::AppError;
use std::env;
use std::time::Duration;

pub const DEFAULT_OWNER_INDEX: &str = "ownerId-index";

/// 一覧取得の方式
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListStrategy {
    /// 所有者 GSI に対する Query
    OwnerIndex(String),
    /// テーブル全体の Scan + 所有者フィルタ
    Scan,
}

/// コールドスタート時に一度だけ読み込む設定
#[derive(Debug, Clone)]
pub struct Config {
    pub table_name: String,
    pub list_strategy: ListStrategy,
    pub environment: String,
    pub dynamodb_endpoint: Option<String>,
    pub store_timeout: Duration,
    pub request_timeout: Duration,
    pub store_max_attempts: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 任意の参照関数から設定を組み立てる（テストでは環境変数を汚さずに使う）
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let table_name = lookup("TABLE_NAME")
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| AppError::Configuration("TABLE_NAME must be set".to_string()))?;

        let list_strategy = match lookup("OWNER_INDEX_NAME") {
            Some(name) if name.trim().is_empty() => ListStrategy::Scan,
            Some(name) => ListStrategy::OwnerIndex(name),
            None => ListStrategy::OwnerIndex(DEFAULT_OWNER_INDEX.to_string()),
        };

        Ok(Config {
            table_name,
            list_strategy,
            environment: lookup("ENVIRONMENT").unwrap_or_else(|| "dev".to_string()),
            dynamodb_endpoint: lookup("DYNAMODB_ENDPOINT").filter(|url| !url.trim().is_empty()),
            store_timeout: Duration::from_millis(parse_number(&lookup, "STORE_TIMEOUT_MS", 3_000)?),
            request_timeout: Duration::from_millis(parse_number(
                &lookup,
                "REQUEST_TIMEOUT_MS",
                10_000,
            )?),
            store_max_attempts: parse_number(&lookup, "STORE_MAX_ATTEMPTS", 3)?,
        })
    }

    /// 5xx レスポンスにエラー詳細を含めるか
    pub fn include_error_details(&self) -> bool {
        matches!(self.environment.as_str(), "dev" | "local")
    }
}

fn parse_number<F, T>(lookup: &F, key: &str, default: T) -> Result<T, AppError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr + PartialOrd + Default,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => match raw.trim().parse::<T>() {
            Ok(value) if value > T::default() => Ok(value),
            _ => Err(AppError::Configuration(format!(
                "{key} must be a positive integer, got {raw:?}"
            ))),
        },
    }
}
