use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use lambda_http::tracing::{debug, error};
use serde::{Deserialize, Serialize};

use shared::models::game::{Game, SpecialMove};
use shared::models::game_index::{GameListFilter, GamePartition};
use shared::services::game_service::GameDeletion;

use crate::{error::ApiError, middleware::auth::AuthenticatedPlayer, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/games", get(list_games).post(create_game))
        .route("/games/{id}", get(get_game).delete(delete_game))
        .route("/games/{id}/moves", get(legal_moves).post(add_move))
}

#[derive(Debug, Deserialize)]
pub struct StateQuery {
    pub state: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateGameRequest {
    pub opponent_id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AddMoveRequest {
    #[serde(rename = "move")]
    pub notation: String,
    #[serde(default)]
    pub special_move: SpecialMove,
    #[serde(default)]
    pub comment: String,
}

/// A game as sent to clients: the stored fields plus the current position.
#[derive(Debug, Serialize)]
pub struct GameView {
    #[serde(flatten)]
    pub game: Game,
    pub board: String,
}

fn view(state: &AppState, game: Game) -> Result<GameView, ApiError> {
    let board = state.game_service.board_fen(&game)?;
    Ok(GameView { game, board })
}

fn parse_state<T: std::str::FromStr<Err = String>>(
    query: &StateQuery,
) -> Result<Option<T>, ApiError> {
    query
        .state
        .as_deref()
        .map(|value| value.parse::<T>().map_err(ApiError::BadRequest))
        .transpose()
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

async fn list_games(
    State(state): State<AppState>,
    player: AuthenticatedPlayer,
    Query(query): Query<StateQuery>,
) -> Result<Json<Vec<GameView>>, ApiError> {
    let filter = parse_state::<GameListFilter>(&query)?.unwrap_or_default();
    let games = state
        .game_service
        .list_games(&player.player_id, filter)
        .await
        .map_err(|e| {
            error!("Failed to list games for {}: {}", player.player_id, e);
            ApiError::from(e)
        })?;

    games
        .into_iter()
        .map(|game| view(&state, game))
        .collect::<Result<Vec<_>, _>>()
        .map(Json)
}

async fn get_game(
    State(state): State<AppState>,
    player: AuthenticatedPlayer,
    Path(game_id): Path<String>,
    Query(query): Query<StateQuery>,
) -> Result<Json<GameView>, ApiError> {
    let partition = parse_state::<GamePartition>(&query)?;
    let game = state
        .game_service
        .get_game(&player.player_id, &game_id, partition)
        .await?;
    view(&state, game).map(Json)
}

async fn create_game(
    State(state): State<AppState>,
    player: AuthenticatedPlayer,
    payload: Result<Json<CreateGameRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<GameView>), ApiError> {
    let request = body(payload)?;
    let game = state
        .game_service
        .create_game(&player.player_id, &request.opponent_id, &request.name)
        .await
        .map_err(|e| {
            debug!("Player {} could not create a game: {}", player.player_id, e);
            ApiError::from(e)
        })?;
    Ok((StatusCode::CREATED, Json(view(&state, game)?)))
}

async fn add_move(
    State(state): State<AppState>,
    player: AuthenticatedPlayer,
    Path(game_id): Path<String>,
    payload: Result<Json<AddMoveRequest>, JsonRejection>,
) -> Result<Json<GameView>, ApiError> {
    let request = body(payload)?;
    let game = state
        .game_service
        .add_move(
            &player.player_id,
            &game_id,
            &request.notation,
            request.special_move,
            &request.comment,
        )
        .await
        .map_err(|e| {
            debug!(
                "Move {} by {} in game {} rejected: {}",
                request.notation, player.player_id, game_id, e
            );
            ApiError::from(e)
        })?;
    view(&state, game).map(Json)
}

async fn delete_game(
    State(state): State<AppState>,
    player: AuthenticatedPlayer,
    Path(game_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    match state
        .game_service
        .delete_game(&player.player_id, &game_id)
        .await?
    {
        GameDeletion::Retracted => debug!("Game {} retracted", game_id),
        GameDeletion::Resigned(_) => debug!("Game {} resigned", game_id),
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn legal_moves(
    State(state): State<AppState>,
    player: AuthenticatedPlayer,
    Path(game_id): Path<String>,
) -> Result<Json<Vec<String>>, ApiError> {
    state
        .game_service
        .legal_moves(&player.player_id, &game_id)
        .await
        .map(Json)
        .map_err(ApiError::from)
}
