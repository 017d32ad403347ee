use crate::repositories::{sort_for_listing, TodoRepository};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{OwnerId, Todo, TodoChanges, TodoId};
use shared::AppError;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// 簡易な InMemory 実装（開発/テスト用）
///
/// 条件付き書き込みは単一のロック内で確認と書き込みを行うため、DynamoDB と同じく不可分です。
#[derive(Default)]
pub struct InMemoryTodoRepository {
    items: Mutex<HashMap<TodoId, Todo>>,
}

impl InMemoryTodoRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 既存レコードを直接投入（上書き）
    pub fn seed(&self, todo: Todo) {
        self.lock().insert(todo.id.clone(), todo);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// ロックが poison されていても中身をそのまま使う
    ///
    /// ロック中の操作は単一の挿入・削除のみで、途中で panic しても map は壊れません。
    fn lock(&self) -> MutexGuard<'_, HashMap<TodoId, Todo>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn condition_failed(id: &TodoId) -> AppError {
        AppError::ConcurrentModification(format!("owner condition failed for {id}"))
    }
}

#[async_trait]
impl TodoRepository for InMemoryTodoRepository {
    async fn put(&self, todo: &Todo) -> Result<(), AppError> {
        self.lock().insert(todo.id.clone(), todo.clone());
        Ok(())
    }

    async fn get(&self, id: &TodoId) -> Result<Option<Todo>, AppError> {
        Ok(self.lock().get(id).cloned())
    }

    async fn list_by_owner(&self, owner_id: &OwnerId) -> Result<Vec<Todo>, AppError> {
        let mut todos: Vec<Todo> = self
            .lock()
            .values()
            .filter(|todo| todo.is_owned_by(owner_id))
            .cloned()
            .collect();
        sort_for_listing(&mut todos);
        Ok(todos)
    }

    async fn update_if_owner(
        &self,
        id: &TodoId,
        owner_id: &OwnerId,
        changes: &TodoChanges,
        at: DateTime<Utc>,
    ) -> Result<Todo, AppError> {
        let mut items = self.lock();
        match items.get_mut(id) {
            Some(todo) if todo.is_owned_by(owner_id) => {
                todo.apply(changes, at);
                Ok(todo.clone())
            }
            _ => Err(Self::condition_failed(id)),
        }
    }

    async fn delete_if_owner(&self, id: &TodoId, owner_id: &OwnerId) -> Result<Todo, AppError> {
        let mut items = self.lock();
        match items.get(id) {
            Some(todo) if todo.is_owned_by(owner_id) => items
                .remove(id)
                .ok_or_else(|| Self::condition_failed(id)),
            _ => Err(Self::condition_failed(id)),
        }
    }
}
