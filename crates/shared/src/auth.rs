use domain::OwnerId;
use serde_json::Value;

/// オーソライザーがリクエストコンテキストに載せる呼び出し元 ID の位置
///
/// - REST API の Cognito オーソライザー: `authorizer.claims.sub`
/// - HTTP API の JWT オーソライザー: `authorizer.jwt.claims.sub`
/// - Lambda オーソライザーのコンテキスト: `authorizer.userId` / `authorizer.lambda.userId`
const SUBJECT_POINTERS: [&str; 4] = [
    "/authorizer/claims/sub",
    "/authorizer/jwt/claims/sub",
    "/authorizer/userId",
    "/authorizer/lambda/userId",
];

/// リクエストコンテキスト（JSON）から認証済み呼び出し元を取り出す
///
/// 見つからない、または空文字の場合は匿名として `None` を返します。
pub fn caller_from_request_context(context: &Value) -> Option<OwnerId> {
    SUBJECT_POINTERS
        .iter()
        .filter_map(|pointer| context.pointer(pointer))
        .filter_map(Value::as_str)
        .find_map(|subject| OwnerId::new(subject).ok())
}
