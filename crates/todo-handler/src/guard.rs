use domain::{OwnerId, Todo, TodoId};
use infrastructure::TodoRepository;
use shared::AppError;
use tracing::warn;

/// 認証済み呼び出し元を要求（匿名は 401）
pub fn require_caller(caller: Option<OwnerId>) -> Result<OwnerId, AppError> {
    caller.ok_or_else(|| {
        AppError::Authentication("no caller identity in request context".to_string())
    })
}

/// 所有者確認付きの読み取り
///
/// 存在しなければ `NotFound`、他人のレコードなら `Authorization` を返します。
/// 書き込み時の再確認は条件付き書き込みが担います。
pub async fn fetch_owned(
    repo: &dyn TodoRepository,
    id: &TodoId,
    caller: &OwnerId,
) -> Result<Todo, AppError> {
    let todo = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("todo {id}")))?;

    if !todo.is_owned_by(caller) {
        warn!(todo_id = %id, "Access to another user's todo denied");
        return Err(AppError::Authorization(format!(
            "todo {id} belongs to another user"
        )));
    }

    Ok(todo)
}
