use crate::handlers;
use crate::request::TodoRequest;
use crate::response::ApiResponse;
use crate::state::AppState;
use domain::TodoId;
use lambda_http::http::Method;
use lambda_http::{Body, Request, Response};
use shared::{AppError, INTERNAL_SERVER_ERROR};
use tokio::time::timeout;

/// 解決済みのルート
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Create,
    List,
    GetOne(TodoId),
    Update(TodoId),
    Delete(TodoId),
}

impl Route {
    /// メソッドとパスからルートを決定
    ///
    /// `id` はパスパラメータを優先し、無ければ `/todos/` 以降のセグメントを使います。
    pub fn resolve(method: &Method, path: &str, path_id: Option<&str>) -> Result<Self, AppError> {
        let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();

        match segments.as_slice() {
            ["todos"] => match *method {
                Method::POST => Ok(Route::Create),
                Method::GET => Ok(Route::List),
                _ => Err(not_found(method, path)),
            },
            ["todos", segment] => {
                if !matches!(*method, Method::GET | Method::PUT | Method::DELETE) {
                    return Err(not_found(method, path));
                }
                let raw_id = path_id.filter(|id| !id.is_empty()).unwrap_or(*segment);
                let id = TodoId::parse(raw_id)?;
                Ok(match *method {
                    Method::GET => Route::GetOne(id),
                    Method::PUT => Route::Update(id),
                    _ => Route::Delete(id),
                })
            }
            _ => Err(not_found(method, path)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Route::Create => "create_todo",
            Route::List => "list_todos",
            Route::GetOne(_) => "get_todo",
            Route::Update(_) => "update_todo",
            Route::Delete(_) => "delete_todo",
        }
    }

    /// 5xx 応答に使う汎用メッセージ
    pub fn failure_message(&self) -> &'static str {
        match self {
            Route::Create => "Could not create todo",
            Route::List => "Could not retrieve todos",
            Route::GetOne(_) => "Could not retrieve todo",
            Route::Update(_) => "Could not update todo",
            Route::Delete(_) => "Could not delete todo",
        }
    }
}

fn not_found(method: &Method, path: &str) -> AppError {
    AppError::RouteNotFound {
        method: method.to_string(),
        path: path.to_string(),
    }
}

/// Lambda のエントリポイント。どんな失敗でも応答を返す
pub async fn route(req: Request, state: &AppState) -> Result<Response<Body>, lambda_http::Error> {
    let response = match TodoRequest::from_lambda(&req) {
        Ok(request) => handle(request, state).await,
        Err(e) => {
            e.log("parse_request");
            ApiResponse::from_error(
                &e,
                INTERNAL_SERVER_ERROR,
                state.config.include_error_details(),
            )
        }
    };

    Ok(response.into_lambda())
}

pub async fn handle(request: TodoRequest, state: &AppState) -> ApiResponse {
    tracing::info!(
        method = %request.method,
        path = %request.path,
        authenticated = request.caller.is_some(),
        "Incoming request"
    );

    if request.method == Method::OPTIONS {
        return ApiResponse::preflight();
    }

    let include_details = state.config.include_error_details();

    let route = match Route::resolve(&request.method, &request.path, request.path_id.as_deref()) {
        Ok(route) => route,
        Err(e) => {
            e.log("route");
            return ApiResponse::from_error(&e, INTERNAL_SERVER_ERROR, include_details);
        }
    };

    let limit = state.config.request_timeout;
    let result = match timeout(limit, dispatch(&route, request, state)).await {
        Ok(result) => result,
        Err(_) => Err(AppError::Timeout(format!(
            "{} did not finish within {}ms",
            route.name(),
            limit.as_millis()
        ))),
    };

    match result {
        Ok(response) => response,
        Err(e) => {
            e.log(route.name());
            ApiResponse::from_error(&e, route.failure_message(), include_details)
        }
    }
}

async fn dispatch(
    route: &Route,
    request: TodoRequest,
    state: &AppState,
) -> Result<ApiResponse, AppError> {
    match route {
        Route::Create => handlers::create_todo(request, state).await,
        Route::List => handlers::list_todos(request, state).await,
        Route::GetOne(id) => handlers::get_todo(id, request, state).await,
        Route::Update(id) => handlers::update_todo(id, request, state).await,
        Route::Delete(id) => handlers::delete_todo(id, request, state).await,
    }
}
