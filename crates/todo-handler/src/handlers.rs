use crate::guard::{fetch_owned, require_caller};
use crate::request::TodoRequest;
use crate::response::ApiResponse;
use crate::state::AppState;
use domain::{NewTodo, Todo, TodoChanges, TodoId};
use lambda_http::http::StatusCode;
use serde::Serialize;
use shared::AppError;
use tracing::info;

pub const DELETE_SUCCESS: &str = "To-Do item deleted successfully";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DeleteResponse {
    message: &'static str,
    deleted_item: Todo,
}

pub async fn create_todo(
    request: TodoRequest,
    state: &AppState,
) -> Result<ApiResponse, AppError> {
    let owner_id = require_caller(request.caller.clone())?;
    let input = NewTodo::from_json(&request.json_body()?)?;

    let todo = Todo::create(input, owner_id, domain::now());
    state.repo.put(&todo).await?;

    info!(todo_id = %todo.id, "Todo created");
    ApiResponse::json(StatusCode::CREATED, &todo)
}

pub async fn list_todos(
    request: TodoRequest,
    state: &AppState,
) -> Result<ApiResponse, AppError> {
    let owner_id = require_caller(request.caller)?;

    let todos = state.repo.list_by_owner(&owner_id).await?;

    info!(count = todos.len(), "Todos listed");
    ApiResponse::json(StatusCode::OK, &todos)
}

pub async fn get_todo(
    id: &TodoId,
    request: TodoRequest,
    state: &AppState,
) -> Result<ApiResponse, AppError> {
    let owner_id = require_caller(request.caller)?;

    let todo = fetch_owned(state.repo.as_ref(), id, &owner_id).await?;

    ApiResponse::json(StatusCode::OK, &todo)
}

pub async fn update_todo(
    id: &TodoId,
    request: TodoRequest,
    state: &AppState,
) -> Result<ApiResponse, AppError> {
    let owner_id = require_caller(request.caller.clone())?;
    // 入力検証はストアへのアクセスより先
    let changes = TodoChanges::from_json(&request.json_body()?)?;

    fetch_owned(state.repo.as_ref(), id, &owner_id).await?;
    let updated = state
        .repo
        .update_if_owner(id, &owner_id, &changes, domain::now())
        .await?;

    info!(todo_id = %id, "Todo updated");
    ApiResponse::json(StatusCode::OK, &updated)
}

pub async fn delete_todo(
    id: &TodoId,
    request: TodoRequest,
    state: &AppState,
) -> Result<ApiResponse, AppError> {
    let owner_id = require_caller(request.caller)?;

    fetch_owned(state.repo.as_ref(), id, &owner_id).await?;
    let deleted = state.repo.delete_if_owner(id, &owner_id).await?;

    info!(todo_id = %id, "Todo deleted");
    ApiResponse::json(
        StatusCode::OK,
        &DeleteResponse {
            message: DELETE_SUCCESS,
            deleted_item: deleted,
        },
    )
}
