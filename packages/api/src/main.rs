use lambda_http::{run, tracing, Error};
use std::env::set_var;
use std::sync::Arc;

use api::{create_app, state::AppState};
use shared::config::AppConfig;
use shared::repositories::game_repository::TableGameRepository;
use shared::repositories::player_directory::DynamoDbPlayerDirectory;
use shared::repositories::table_store::{DynamoDbTableStore, TableStore};
use shared::repositories::websocket_repository::DynamoDbWebSocketRepository;
use shared::services::chess_service::ChessService;
use shared::services::game_index_service::GameIndexService;
use shared::services::game_service::GameService;
use shared::services::notification_service::{Notifier, TracingNotifier, WebSocketNotifier};
use shared::services::token_service::TokenService;

#[tokio::main]
async fn main() -> Result<(), Error> {
    set_var("AWS_LAMBDA_HTTP_IGNORE_STAGE_IN_PATH", "true");

    // required to enable CloudWatch error logging by the runtime
    tracing::init_default_subscriber();

    let config = AppConfig::from_env()?;
    let sdk_config = aws_config::load_from_env().await;
    let client = aws_sdk_dynamodb::Client::new(&sdk_config);

    let store: Arc<dyn TableStore> = Arc::new(DynamoDbTableStore::new(
        client.clone(),
        config.tables.clone(),
    ));

    let notifier: Arc<dyn Notifier> = match &config.websocket_endpoint {
        Some(endpoint) => Arc::new(WebSocketNotifier::new(Arc::new(
            DynamoDbWebSocketRepository::new(
                client.clone(),
                &sdk_config,
                &config.tables.player_connections,
                endpoint,
            ),
        ))),
        None => {
            tracing::warn!("WEBSOCKET_API_ENDPOINT not set, turn notifications are only logged");
            Arc::new(TracingNotifier)
        }
    };

    let game_service = GameService::new(
        Arc::new(TableGameRepository::new(store.clone())),
        GameIndexService::new(store),
        ChessService::new(config.promotion_policy),
        Arc::new(DynamoDbPlayerDirectory::new(client, &config.tables.users)),
        notifier,
    )
    .with_index_write_attempts(config.index_write_attempts);

    let app_state = AppState::new(game_service, TokenService::new(&config.jwt_secret));

    run(create_app(app_state)).await
}
