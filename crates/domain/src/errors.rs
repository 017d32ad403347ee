use thiserror::Error;

pub const TASK_REQUIRED: &str = "Task field is required";
pub const TASK_NOT_STRING: &str = "Task field must be a string";
pub const TASK_INVALID: &str = "Task field must be a non-empty string";
pub const COMPLETED_NOT_BOOLEAN: &str = "Completed field must be a boolean";
pub const NO_UPDATE_FIELDS: &str = "No update fields provided (task or completed)";
pub const TODO_ID_MISSING: &str = "To-Do ID missing from path";

/// ドメイン層で検出される入力エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("{0}")]
    Validation(String),

    #[error("{}", TODO_ID_MISSING)]
    MissingTodoId,

    #[error("Invalid OwnerId: {0}")]
    InvalidOwnerId(String),
}

impl DomainError {
    pub fn validation(message: &str) -> Self {
        Self::Validation(message.to_string())
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_todo_id_message() {
        assert_eq!(DomainError::MissingTodoId.to_string(), TODO_ID_MISSING);
        assert_eq!(DomainError::validation(TASK_REQUIRED).to_string(), TASK_REQUIRED);
    }
}
