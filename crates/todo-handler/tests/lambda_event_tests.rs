//! API Gateway イベント JSON から応答までを通したテスト

use infrastructure::InMemoryTodoRepository;
use lambda_http::http::StatusCode;
use lambda_http::{Body, Request, Response};
use serde_json::{json, Value};
use shared::Config;
use std::sync::Arc;
use todo_handler::{route, AppState};

fn test_state() -> AppState {
    let config = Config::from_lookup(|key| match key {
        "TABLE_NAME" => Some("todos-test".to_string()),
        _ => None,
    })
    .unwrap();
    AppState::new(Arc::new(InMemoryTodoRepository::new()), config)
}

/// REST API (v1) のプロキシイベント。ステージ `prod` 付きでデプロイされた想定
fn rest_event(
    method: &str,
    path: &str,
    id: Option<&str>,
    body: Option<&str>,
    subject: Option<&str>,
) -> Request {
    let authorizer = match subject {
        Some(sub) => json!({ "claims": { "sub": sub, "email": "user@example.com" } }),
        None => Value::Null,
    };
    let resource = if id.is_some() { "/todos/{id}" } else { "/todos" };

    let event = json!({
        "resource": resource,
        "path": path,
        "httpMethod": method,
        "headers": {
            "Host": "abc123.execute-api.ap-northeast-1.amazonaws.com",
            "Content-Type": "application/json"
        },
        "multiValueHeaders": {},
        "queryStringParameters": null,
        "multiValueQueryStringParameters": null,
        "pathParameters": id.map(|id| json!({ "id": id })),
        "stageVariables": null,
        "requestContext": {
            "accountId": "123456789012",
            "resourceId": "res123",
            "stage": "prod",
            "requestId": "c6af9ac6-7b61-11e6-9a41-93e8deadbeef",
            "identity": { "sourceIp": "203.0.113.1", "userAgent": "test" },
            "resourcePath": resource,
            "httpMethod": method,
            "apiId": "abc123",
            "path": format!("/prod{path}"),
            "authorizer": authorizer
        },
        "body": body,
        "isBase64Encoded": false
    });

    lambda_http::request::from_str(&event.to_string()).unwrap()
}

fn json_body(response: &Response<Body>) -> Value {
    match response.body() {
        Body::Text(text) => serde_json::from_str(text).unwrap(),
        Body::Binary(bytes) => serde_json::from_slice(bytes).unwrap(),
        Body::Empty => Value::Null,
    }
}

fn assert_cors(response: &Response<Body>) {
    let headers = response.headers();
    assert_eq!(headers["content-type"], "application/json");
    assert_eq!(headers["access-control-allow-origin"], "*");
    assert_eq!(
        headers["access-control-allow-methods"],
        "GET,POST,PUT,DELETE,OPTIONS"
    );
    assert_eq!(
        headers["access-control-allow-headers"],
        "Content-Type,Authorization"
    );
}

#[tokio::test]
async fn test_rest_event_create_and_get() {
    // Arrange
    let state = test_state();
    let create = rest_event(
        "POST",
        "/todos",
        None,
        Some(r#"{"task":"Buy milk"}"#),
        Some("user-123"),
    );

    // Act
    let created = route(create, &state).await.unwrap();
    let created_body = json_body(&created);
    let id = created_body["id"].as_str().unwrap().to_string();
    let fetched = route(
        rest_event("GET", &format!("/todos/{id}"), Some(&id), None, Some("user-123")),
        &state,
    )
    .await
    .unwrap();

    // Assert
    assert_eq!(created.status(), StatusCode::CREATED);
    assert_cors(&created);
    assert_eq!(created_body["ownerId"], "user-123");
    assert_eq!(fetched.status(), StatusCode::OK);
    assert_cors(&fetched);
    assert_eq!(json_body(&fetched), created_body);
}

#[tokio::test]
async fn test_rest_event_without_authorizer_is_unauthorized() {
    let state = test_state();

    let response = route(rest_event("GET", "/todos", None, None, None), &state)
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_cors(&response);
    assert_eq!(json_body(&response)["message"], "Authentication required");
}

#[tokio::test]
async fn test_rest_event_preflight() {
    let state = test_state();

    let response = route(rest_event("OPTIONS", "/todos", None, None, None), &state)
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_cors(&response);
    assert!(matches!(response.body(), Body::Empty));
}

#[tokio::test]
async fn test_rest_event_errors_carry_cors_headers() {
    let state = test_state();

    let invalid = route(
        rest_event("POST", "/todos", None, Some("{oops"), Some("user-123")),
        &state,
    )
    .await
    .unwrap();
    let unknown = route(
        rest_event("GET", "/health", None, None, Some("user-123")),
        &state,
    )
    .await
    .unwrap();

    assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
    assert_cors(&invalid);
    assert_eq!(json_body(&invalid)["message"], "Invalid JSON body");
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
    assert_cors(&unknown);
    assert_eq!(json_body(&unknown)["message"], "Not Found");
}

#[tokio::test]
async fn test_binary_body_that_is_not_utf8_is_invalid_json() {
    let state = test_state();
    let event = json!({
        "resource": "/todos",
        "path": "/todos",
        "httpMethod": "POST",
        "headers": { "Host": "abc123.execute-api.ap-northeast-1.amazonaws.com" },
        "multiValueHeaders": {},
        "requestContext": {
            "accountId": "123456789012",
            "resourceId": "res123",
            "stage": "prod",
            "requestId": "req-binary",
            "identity": { "sourceIp": "203.0.113.1" },
            "resourcePath": "/todos",
            "httpMethod": "POST",
            "apiId": "abc123",
            "path": "/prod/todos",
            "authorizer": { "claims": { "sub": "user-123" } }
        },
        "body": "//4=",
        "isBase64Encoded": true
    });
    let req = lambda_http::request::from_str(&event.to_string()).unwrap();

    let response = route(req, &state).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(&response)["message"], "Invalid JSON body");
}

#[tokio::test]
async fn test_http_api_event_with_jwt_authorizer() {
    // Arrange: HTTP API (v2) + JWT オーソライザー
    let state = test_state();
    let event = json!({
        "version": "2.0",
        "routeKey": "GET /todos",
        "rawPath": "/todos",
        "rawQueryString": "",
        "headers": { "host": "abc123.execute-api.ap-northeast-1.amazonaws.com" },
        "requestContext": {
            "accountId": "123456789012",
            "apiId": "abc123",
            "domainName": "abc123.execute-api.ap-northeast-1.amazonaws.com",
            "domainPrefix": "abc123",
            "http": {
                "method": "GET",
                "path": "/todos",
                "protocol": "HTTP/1.1",
                "sourceIp": "203.0.113.1",
                "userAgent": "test"
            },
            "requestId": "req-v2",
            "routeKey": "GET /todos",
            "stage": "$default",
            "time": "18/Oct/2026:00:00:00 +0000",
            "timeEpoch": 1792281600000u64,
            "authorizer": { "jwt": { "claims": { "sub": "user-456" }, "scopes": null } }
        },
        "isBase64Encoded": false
    });
    let req = lambda_http::request::from_str(&event.to_string()).unwrap();

    // Act
    let response = route(req, &state).await.unwrap();

    // Assert
    assert_eq!(response.status(), StatusCode::OK);
    assert_cors(&response);
    assert_eq!(json_body(&response), json!([]));
}

/// HTTP API (v2) の名前付きステージ。rawPath にステージ名が含まれる
fn http_api_event(method: &str, raw_path: &str, body: Option<&str>, subject: &str) -> Request {
    let event = json!({
        "version": "2.0",
        "routeKey": format!("{method} /todos"),
        "rawPath": raw_path,
        "rawQueryString": "",
        "headers": {
            "host": "abc123.execute-api.ap-northeast-1.amazonaws.com",
            "content-type": "application/json"
        },
        "requestContext": {
            "accountId": "123456789012",
            "apiId": "abc123",
            "domainName": "abc123.execute-api.ap-northeast-1.amazonaws.com",
            "domainPrefix": "abc123",
            "http": {
                "method": method,
                "path": raw_path,
                "protocol": "HTTP/1.1",
                "sourceIp": "203.0.113.1",
                "userAgent": "test"
            },
            "requestId": "req-v2-prod",
            "routeKey": format!("{method} /todos"),
            "stage": "prod",
            "time": "18/Oct/2026:00:00:00 +0000",
            "timeEpoch": 1792281600000u64,
            "authorizer": { "jwt": { "claims": { "sub": subject }, "scopes": null } }
        },
        "body": body,
        "isBase64Encoded": false
    });

    lambda_http::request::from_str(&event.to_string()).unwrap()
}

#[tokio::test]
async fn test_http_api_event_on_named_stage() {
    // Arrange
    let state = test_state();
    let create = http_api_event("POST", "/prod/todos", Some(r#"{"task":"x"}"#), "user-789");

    // Act
    let created = route(create, &state).await.unwrap();
    let listed = route(
        http_api_event("GET", "/prod/todos", None, "user-789"),
        &state,
    )
    .await
    .unwrap();

    // Assert
    assert_eq!(created.status(), StatusCode::CREATED);
    assert_cors(&created);
    assert_eq!(json_body(&created)["ownerId"], "user-789");
    assert_eq!(listed.status(), StatusCode::OK);
    let items = json_body(&listed);
    assert_eq!(items.as_array().unwrap().len(), 1);
    assert_eq!(items[0]["task"], "x");
}
