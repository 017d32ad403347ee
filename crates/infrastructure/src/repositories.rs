use crate::models::{attr, id_key, item_to_todo, timestamp_value, todo_to_item, Item};
use crate::DynamoDbClient;
use async_trait::async_trait;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use chrono::{DateTime, Utc};
use domain::{OwnerId, Todo, TodoChanges, TodoId};
use shared::{AppError, ListStrategy};
use tracing::{debug, info};

/// 所有者条件: 対象が存在し、かつ所有者が呼び出し元と一致する
const OWNER_CONDITION: &str = "attribute_exists(#id) AND #ownerId = :ownerId";

/// ToDo の永続化境界
///
/// `update_if_owner` / `delete_if_owner` は所有者の確認と書き込みを一つの不可分な操作として
/// 行い、条件が成立しなければ `AppError::ConcurrentModification` を返します。
#[async_trait]
pub trait TodoRepository: Send + Sync {
    /// 無条件の新規保存
    async fn put(&self, todo: &Todo) -> Result<(), AppError>;

    async fn get(&self, id: &TodoId) -> Result<Option<Todo>, AppError>;

    /// 所有者のレコードを `createdAt`, `id` の昇順で返す
    async fn list_by_owner(&self, owner_id: &OwnerId) -> Result<Vec<Todo>, AppError>;

    /// 所有者条件付き更新。更新後のレコードを返す
    async fn update_if_owner(
        &self,
        id: &TodoId,
        owner_id: &OwnerId,
        changes: &TodoChanges,
        at: DateTime<Utc>,
    ) -> Result<Todo, AppError>;

    /// 所有者条件付き削除。削除前のレコードを返す
    async fn delete_if_owner(&self, id: &TodoId, owner_id: &OwnerId) -> Result<Todo, AppError>;
}

pub(crate) fn sort_for_listing(todos: &mut [Todo]) {
    todos.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.id.as_str().cmp(b.id.as_str()))
    });
}

/// DynamoDB 実装
pub struct DynamoTodoRepository {
    db: DynamoDbClient,
    list_strategy: ListStrategy,
}

impl DynamoTodoRepository {
    pub fn new(db: DynamoDbClient, list_strategy: ListStrategy) -> Self {
        Self { db, list_strategy }
    }

    async fn query_owner_index(
        &self,
        index: &str,
        owner_id: &OwnerId,
    ) -> Result<Vec<Item>, AppError> {
        let mut items = Vec::new();
        let mut start_key: Option<Item> = None;

        loop {
            let output = self
                .db
                .client()
                .query()
                .table_name(self.db.table_name())
                .index_name(index)
                .key_condition_expression("#ownerId = :ownerId")
                .expression_attribute_names("#ownerId", attr::OWNER_ID)
                .expression_attribute_values(
                    ":ownerId",
                    AttributeValue::S(owner_id.as_str().to_string()),
                )
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(|e| DynamoDbClient::convert_error("Query", e))?;

            items.extend(output.items().iter().cloned());

            match output.last_evaluated_key() {
                Some(key) if !key.is_empty() => start_key = Some(key.clone()),
                _ => break,
            }
        }

        Ok(items)
    }

    async fn scan_for_owner(&self, owner_id: &OwnerId) -> Result<Vec<Item>, AppError> {
        let mut items = Vec::new();
        let mut start_key: Option<Item> = None;

        loop {
            let output = self
                .db
                .client()
                .scan()
                .table_name(self.db.table_name())
                .filter_expression("#ownerId = :ownerId")
                .expression_attribute_names("#ownerId", attr::OWNER_ID)
                .expression_attribute_values(
                    ":ownerId",
                    AttributeValue::S(owner_id.as_str().to_string()),
                )
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(|e| DynamoDbClient::convert_error("Scan", e))?;

            items.extend(output.items().iter().cloned());

            match output.last_evaluated_key() {
                Some(key) if !key.is_empty() => start_key = Some(key.clone()),
                _ => break,
            }
        }

        Ok(items)
    }
}

#[async_trait]
impl TodoRepository for DynamoTodoRepository {
    async fn put(&self, todo: &Todo) -> Result<(), AppError> {
        self.db
            .client()
            .put_item()
            .table_name(self.db.table_name())
            .set_item(Some(todo_to_item(todo)))
            .send()
            .await
            .map_err(|e| DynamoDbClient::convert_error("PutItem", e))?;

        debug!(todo_id = %todo.id, "PutItem completed");
        Ok(())
    }

    async fn get(&self, id: &TodoId) -> Result<Option<Todo>, AppError> {
        let output = self
            .db
            .client()
            .get_item()
            .table_name(self.db.table_name())
            .key(attr::ID, id_key(id))
            .consistent_read(true)
            .send()
            .await
            .map_err(|e| DynamoDbClient::convert_error("GetItem", e))?;

        output.item().map(item_to_todo).transpose()
    }

    async fn list_by_owner(&self, owner_id: &OwnerId) -> Result<Vec<Todo>, AppError> {
        let items = match &self.list_strategy {
            ListStrategy::OwnerIndex(index) => self.query_owner_index(index, owner_id).await?,
            ListStrategy::Scan => self.scan_for_owner(owner_id).await?,
        };

        let mut todos = items
            .iter()
            .map(item_to_todo)
            .collect::<Result<Vec<_>, _>>()?;
        sort_for_listing(&mut todos);

        info!(count = todos.len(), strategy = ?self.list_strategy, "Listed todos for owner");
        Ok(todos)
    }

    async fn update_if_owner(
        &self,
        id: &TodoId,
        owner_id: &OwnerId,
        changes: &TodoChanges,
        at: DateTime<Utc>,
    ) -> Result<Todo, AppError> {
        let mut update_parts = vec!["#updatedAt = :updatedAt"];
        let mut builder = self
            .db
            .client()
            .update_item()
            .table_name(self.db.table_name())
            .key(attr::ID, id_key(id))
            .condition_expression(OWNER_CONDITION)
            .expression_attribute_names("#id", attr::ID)
            .expression_attribute_names("#ownerId", attr::OWNER_ID)
            .expression_attribute_names("#updatedAt", attr::UPDATED_AT)
            .expression_attribute_values(
                ":ownerId",
                AttributeValue::S(owner_id.as_str().to_string()),
            )
            .expression_attribute_values(":updatedAt", timestamp_value(&at))
            .return_values(ReturnValue::AllNew);

        if let Some(task) = &changes.task {
            update_parts.push("#task = :task");
            builder = builder
                .expression_attribute_names("#task", attr::TASK)
                .expression_attribute_values(":task", AttributeValue::S(task.clone()));
        }

        if let Some(completed) = changes.completed {
            update_parts.push("#completed = :completed");
            builder = builder
                .expression_attribute_names("#completed", attr::COMPLETED)
                .expression_attribute_values(":completed", AttributeValue::Bool(completed));
        }

        let output = builder
            .update_expression(format!("SET {}", update_parts.join(", ")))
            .send()
            .await
            .map_err(|e| DynamoDbClient::convert_error("UpdateItem", e))?;

        let item = output.attributes().ok_or_else(|| {
            AppError::Internal("UpdateItem returned no attributes".to_string())
        })?;
        item_to_todo(item)
    }

    async fn delete_if_owner(&self, id: &TodoId, owner_id: &OwnerId) -> Result<Todo, AppError> {
        let output = self
            .db
            .client()
            .delete_item()
            .table_name(self.db.table_name())
            .key(attr::ID, id_key(id))
            .condition_expression(OWNER_CONDITION)
            .expression_attribute_names("#id", attr::ID)
            .expression_attribute_names("#ownerId", attr::OWNER_ID)
            .expression_attribute_values(
                ":ownerId",
                AttributeValue::S(owner_id.as_str().to_string()),
            )
            .return_values(ReturnValue::AllOld)
            .send()
            .await
            .map_err(|e| DynamoDbClient::convert_error("DeleteItem", e))?;

        let item = output.attributes().ok_or_else(|| {
            AppError::Internal("DeleteItem returned no attributes".to_string())
        })?;
        item_to_todo(item)
    }
}
