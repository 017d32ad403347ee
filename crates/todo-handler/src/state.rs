use infrastructure::TodoRepository;
use shared::Config;
use std::sync::Arc;

/// コールドスタート時に組み立て、全リクエストで共有する不変の状態
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn TodoRepository>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(repo: Arc<dyn TodoRepository>, config: Config) -> Self {
        Self {
            repo,
            config: Arc::new(config),
        }
    }
}
