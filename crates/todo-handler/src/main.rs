use infrastructure::{DynamoDbClient, DynamoTodoRepository};
use lambda_http::{run, service_fn, Error, Request};
use shared::Config;
use std::sync::Arc;
use todo_handler::{router, AppState};

#[tokio::main]
async fn main() -> Result<(), Error> {
    shared::init_tracing()?;

    let config = Config::from_env()?;
    tracing::info!(
        table = %config.table_name,
        list_strategy = ?config.list_strategy,
        environment = %config.environment,
        "Starting todo handler"
    );

    let db = DynamoDbClient::new(&config).await;
    let repo = DynamoTodoRepository::new(db, config.list_strategy.clone());
    let state = AppState::new(Arc::new(repo), config);

    run(service_fn(move |req: Request| {
        let state = state.clone();
        async move { router::route(req, &state).await }
    }))
    .await
}
