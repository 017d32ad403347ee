use crate::errors::{
    DomainError, DomainResult, COMPLETED_NOT_BOOLEAN, NO_UPDATE_FIELDS, TASK_INVALID,
    TASK_NOT_STRING, TASK_REQUIRED,
};
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// ToDo の識別子（ULID）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(String);

impl TodoId {
    pub fn new() -> Self {
        Self(ulid::Ulid::new().to_string())
    }

    /// パスから受け取った識別子を検証して取り込む
    ///
    /// 既存データとの互換のため ULID 形式は要求せず、空白のみの値だけを拒否します。
    /// 値はトリムせず、受け取ったまま保持します。
    pub fn parse(id: &str) -> DomainResult<Self> {
        if id.trim().is_empty() {
            return Err(DomainError::MissingTodoId);
        }
        Ok(Self(id.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TodoId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 認証済み呼び出し元（レコード所有者）の識別子
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn new(id: impl Into<String>) -> DomainResult<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(DomainError::InvalidOwnerId(
                "owner id must not be empty".to_string(),
            ));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 永続化と応答に使うミリ秒精度の現在時刻
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// ToDo レコード
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: TodoId,
    pub task: String,
    pub completed: bool,
    pub owner_id: OwnerId,
    #[serde(with = "rfc3339_millis")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "rfc3339_millis")]
    pub updated_at: DateTime<Utc>,
}

/// `2024-05-01T12:00:00.000Z` 形式（常にミリ秒 3 桁）
mod rfc3339_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&at.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        DateTime::<Utc>::deserialize(deserializer)
    }
}

impl Todo {
    /// 新規 ToDo を生成（未完了、作成日時 = 更新日時）
    pub fn create(input: NewTodo, owner_id: OwnerId, at: DateTime<Utc>) -> Self {
        Self {
            id: TodoId::new(),
            task: input.task,
            completed: false,
            owner_id,
            created_at: at,
            updated_at: at,
        }
    }

    pub fn is_owned_by(&self, owner_id: &OwnerId) -> bool {
        &self.owner_id == owner_id
    }

    /// 指定されたフィールドだけを書き換え、更新日時は常に進める
    pub fn apply(&mut self, changes: &TodoChanges, at: DateTime<Utc>) {
        if let Some(task) = &changes.task {
            self.task = task.clone();
        }
        if let Some(completed) = changes.completed {
            self.completed = completed;
        }
        self.updated_at = at;
    }
}

/// POST /todos の入力
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    pub task: String,
}

impl NewTodo {
    pub fn new(task: impl Into<String>) -> DomainResult<Self> {
        Self::from_json(&serde_json::json!({ "task": task.into() }))
    }

    /// リクエストボディ（JSON）から作成入力を取り出す
    ///
    /// オブジェクト以外のボディは `task` 欠落として扱います。
    pub fn from_json(body: &Value) -> DomainResult<Self> {
        match body.get("task") {
            None | Some(Value::Null) => Err(DomainError::validation(TASK_REQUIRED)),
            Some(Value::String(task)) if task.trim().is_empty() => {
                Err(DomainError::validation(TASK_REQUIRED))
            }
            Some(Value::String(task)) => Ok(Self { task: task.clone() }),
            Some(_) => Err(DomainError::validation(TASK_NOT_STRING)),
        }
    }
}

/// PUT /todos/{id} の入力。`None` のフィールドは変更しない
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoChanges {
    pub task: Option<String>,
    pub completed: Option<bool>,
}

impl TodoChanges {
    pub fn from_json(body: &Value) -> DomainResult<Self> {
        let task = match body.get("task") {
            None | Some(Value::Null) => None,
            Some(Value::String(task)) if !task.trim().is_empty() => Some(task.clone()),
            Some(_) => return Err(DomainError::validation(TASK_INVALID)),
        };

        let completed = match body.get("completed") {
            None | Some(Value::Null) => None,
            Some(Value::Bool(completed)) => Some(*completed),
            Some(_) => return Err(DomainError::validation(COMPLETED_NOT_BOOLEAN)),
        };

        let changes = Self { task, completed };
        if changes.is_empty() {
            return Err(DomainError::validation(NO_UPDATE_FIELDS));
        }
        Ok(changes)
    }

    pub fn is_empty(&self) -> bool {
        self.task.is_none() && self.completed.is_none()
    }
}
