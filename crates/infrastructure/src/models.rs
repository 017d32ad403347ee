use aws_sdk_dynamodb::types::AttributeValue;
use chrono::{DateTime, SecondsFormat, Utc};
use domain::{OwnerId, Todo, TodoId};
use shared::AppError;
use std::collections::HashMap;

/// DynamoDB アイテムの属性名
pub mod attr {
    pub const ID: &str = "id";
    pub const TASK: &str = "task";
    pub const COMPLETED: &str = "completed";
    pub const OWNER_ID: &str = "ownerId";
    pub const CREATED_AT: &str = "createdAt";
    pub const UPDATED_AT: &str = "updatedAt";
}

pub type Item = HashMap<String, AttributeValue>;

pub fn timestamp_value(at: &DateTime<Utc>) -> AttributeValue {
    AttributeValue::S(at.to_rfc3339_opts(SecondsFormat::Millis, true))
}

pub fn id_key(id: &TodoId) -> AttributeValue {
    AttributeValue::S(id.as_str().to_string())
}

/// ToDo を DynamoDB AttributeValue マップに変換
pub fn todo_to_item(todo: &Todo) -> Item {
    let mut item = HashMap::new();

    item.insert(attr::ID.to_string(), id_key(&todo.id));
    item.insert(attr::TASK.to_string(), AttributeValue::S(todo.task.clone()));
    item.insert(attr::COMPLETED.to_string(), AttributeValue::Bool(todo.completed));
    item.insert(
        attr::OWNER_ID.to_string(),
        AttributeValue::S(todo.owner_id.as_str().to_string()),
    );
    item.insert(attr::CREATED_AT.to_string(), timestamp_value(&todo.created_at));
    item.insert(attr::UPDATED_AT.to_string(), timestamp_value(&todo.updated_at));

    item
}

/// DynamoDB アイテムを ToDo に復元
pub fn item_to_todo(item: &Item) -> Result<Todo, AppError> {
    let id = TodoId::parse(string_attr(item, attr::ID)?).map_err(|_| malformed(attr::ID))?;
    let owner_id =
        OwnerId::new(string_attr(item, attr::OWNER_ID)?).map_err(|_| malformed(attr::OWNER_ID))?;
    let completed = match item.get(attr::COMPLETED) {
        Some(value) => *value.as_bool().map_err(|_| malformed(attr::COMPLETED))?,
        None => false,
    };

    Ok(Todo {
        id,
        task: string_attr(item, attr::TASK)?.to_string(),
        completed,
        owner_id,
        created_at: timestamp_attr(item, attr::CREATED_AT)?,
        updated_at: timestamp_attr(item, attr::UPDATED_AT)?,
    })
}

fn string_attr<'a>(item: &'a Item, name: &str) -> Result<&'a str, AppError> {
    item.get(name)
        .and_then(|value| value.as_s().ok())
        .map(String::as_str)
        .ok_or_else(|| malformed(name))
}

fn timestamp_attr(item: &Item, name: &str) -> Result<DateTime<Utc>, AppError> {
    DateTime::parse_from_rfc3339(string_attr(item, name)?)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|_| malformed(name))
}

fn malformed(name: &str) -> AppError {
    AppError::Internal(format!(
        "Malformed todo item: missing or invalid attribute `{name}`"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::NewTodo;

    fn sample_todo() -> Todo {
        Todo::create(
            NewTodo::new("Buy milk").unwrap(),
            OwnerId::new("user-123").unwrap(),
            domain::now(),
        )
    }

    #[test]
    fn test_item_layout() {
        let todo = sample_todo();

        let item = todo_to_item(&todo);

        assert_eq!(item.len(), 6);
        assert_eq!(item[attr::ID].as_s().unwrap(), todo.id.as_str());
        assert_eq!(item[attr::TASK].as_s().unwrap(), "Buy milk");
        assert_eq!(item[attr::COMPLETED].as_bool().unwrap(), &false);
        assert_eq!(item[attr::OWNER_ID].as_s().unwrap(), "user-123");
        assert!(item[attr::CREATED_AT].as_s().unwrap().ends_with('Z'));
    }

    #[test]
    fn test_item_restores_identical_todo() {
        // Arrange: ミリ秒精度の時刻で作成
        let todo = sample_todo();

        // Act
        let restored = item_to_todo(&todo_to_item(&todo)).unwrap();

        // Assert: 時刻も含めて完全一致
        assert_eq!(restored, todo);
    }

    #[test]
    fn test_missing_completed_defaults_to_false() {
        let todo = sample_todo();
        let mut item = todo_to_item(&todo);
        item.remove(attr::COMPLETED);

        assert!(!item_to_todo(&item).unwrap().completed);
    }

    #[test]
    fn test_malformed_item_is_internal_error() {
        let mut item = todo_to_item(&sample_todo());
        item.remove(attr::OWNER_ID);

        let error = item_to_todo(&item).unwrap_err();

        assert!(matches!(error, AppError::Internal(ref msg) if msg.contains("ownerId")));

        let mut item = todo_to_item(&sample_todo());
        item.insert(attr::CREATED_AT.to_string(), AttributeValue::S("yesterday".into()));
        assert!(item_to_todo(&item).is_err());
    }
}
