use aws_config::retry::RetryConfig;
use aws_config::timeout::TimeoutConfig;
use aws_config::BehaviorVersion;
use aws_sdk_dynamodb::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_dynamodb::Client;
use shared::{AppError, Config};
use std::fmt::Debug;

const CONDITIONAL_CHECK_FAILED: &str = "ConditionalCheckFailedException";

/// テーブル名と SDK クライアントの組
///
/// コールドスタート時に一度だけ生成し、リポジトリへ渡します。
#[derive(Clone)]
pub struct DynamoDbClient {
    client: Client,
    table_name: String,
}

impl DynamoDbClient {
    pub async fn new(config: &Config) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .timeout_config(
                TimeoutConfig::builder()
                    .operation_timeout(config.store_timeout)
                    .build(),
            )
            .retry_config(RetryConfig::standard().with_max_attempts(config.store_max_attempts));

        // DynamoDB Local などのエンドポイント上書き
        if let Some(endpoint) = &config.dynamodb_endpoint {
            loader = loader.endpoint_url(endpoint);
        }

        let aws_config = loader.load().await;

        Self {
            client: Client::new(&aws_config),
            table_name: config.table_name.clone(),
        }
    }

    pub fn from_client(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// SDK のエラーをアプリケーションエラーへ変換
    ///
    /// 条件付き書き込みの失敗は `ConcurrentModification`、タイムアウトは `Timeout` になります。
    /// ログは呼び出し側が `AppError::log` で一度だけ出力します。
    pub fn convert_error<E, R>(operation: &str, error: SdkError<E, R>) -> AppError
    where
        E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
        R: Debug,
    {
        if matches!(error, SdkError::TimeoutError(_)) {
            return AppError::Timeout(format!("DynamoDB {operation} timed out"));
        }

        if error.code() == Some(CONDITIONAL_CHECK_FAILED) {
            return AppError::ConcurrentModification(format!(
                "DynamoDB {operation} condition not met"
            ));
        }

        AppError::DynamoDb(format!("{operation}: {}", DisplayErrorContext(&error)))
    }
}
