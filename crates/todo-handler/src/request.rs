use domain::OwnerId;
use lambda_http::http::Method;
use lambda_http::request::RequestContext;
use lambda_http::{Body, Request, RequestExt};
use serde_json::Value;
use shared::{caller_from_request_context, AppError};

/// ゲートウェイイベントから取り出した、ルーティングに必要な値だけを持つリクエスト
#[derive(Debug, Clone)]
pub struct TodoRequest {
    pub method: Method,
    /// ステージ接頭辞を含まないゲートウェイ上のパス
    pub path: String,
    /// パスパラメータ `id`
    pub path_id: Option<String>,
    pub body: Option<String>,
    pub caller: Option<OwnerId>,
}

impl TodoRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            path_id: None,
            body: None,
            caller: None,
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_caller(mut self, caller: OwnerId) -> Self {
        self.caller = Some(caller);
        self
    }

    pub fn with_path_id(mut self, id: impl Into<String>) -> Self {
        self.path_id = Some(id.into());
        self
    }

    /// Lambda のリクエストを正規化
    ///
    /// バイナリボディが UTF-8 でない場合は JSON として解釈できないため 400 になります。
    pub fn from_lambda(req: &Request) -> Result<Self, AppError> {
        let raw_path = req.raw_http_path();
        let path = if raw_path.is_empty() {
            req.uri().path()
        } else {
            raw_path
        };
        // HTTP API の rawPath は名前付きステージを含む
        let stage = match req.request_context_ref() {
            Some(RequestContext::ApiGatewayV2(context)) => context.stage.as_deref(),
            _ => None,
        };
        let path = strip_stage(path, stage);

        let path_id = req
            .path_parameters_ref()
            .and_then(|params| params.first("id"))
            .map(str::to_string);

        let body = match req.body() {
            Body::Empty => None,
            Body::Text(text) => Some(text.clone()),
            Body::Binary(bytes) => Some(
                String::from_utf8(bytes.clone())
                    .map_err(|e| AppError::Deserialization(e.to_string()))?,
            ),
        };

        let caller = req
            .request_context_ref()
            .and_then(|context| serde_json::to_value(context).ok())
            .and_then(|context| caller_from_request_context(&context));

        Ok(Self {
            method: req.method().clone(),
            path,
            path_id,
            body,
            caller,
        })
    }

    /// ボディを JSON として読む。ボディが無い（空白のみを含む）場合は `Value::Null`
    pub fn json_body(&self) -> Result<Value, AppError> {
        match self.body.as_deref() {
            None => Ok(Value::Null),
            Some(text) if text.trim().is_empty() => Ok(Value::Null),
            Some(text) => {
                serde_json::from_str(text).map_err(|e| AppError::Deserialization(e.to_string()))
            }
        }
    }
}

/// `/{stage}` 接頭辞を取り除く。`$default` ステージは接頭辞を持たない
fn strip_stage(path: &str, stage: Option<&str>) -> String {
    match stage {
        Some(stage) if !stage.is_empty() && stage != "$default" => {
            let prefix = format!("/{stage}");
            match path.strip_prefix(prefix.as_str()) {
                Some("") => "/".to_string(),
                Some(rest) if rest.starts_with('/') => rest.to_string(),
                _ => path.to_string(),
            }
        }
        _ => path.to_string(),
    }
}
