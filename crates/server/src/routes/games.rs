use axum::{extract::Path, Extension, Json};
use serde_json::Value as JsonValue;
use sqlx::PgPool;

use clubchess_core::replay::GameTimeline;
use clubchess_core::rules::ShakmatyRules;

use crate::clients::storage::PgnStorage;
use crate::db::games::{self, GameRecord};
use crate::error::AppError;

fn game_json(record: &GameRecord) -> JsonValue {
    serde_json::json!({
        "id": record.id,
        "event": record.event,
        "whitePlayer": record.white_player,
        "blackPlayer": record.black_player,
        "result": record.result,
        "gameDate": record.game_date,
        "approved": record.approved,
        "storageKey": record.storage_key,
    })
}

/// GET /api/games
pub async fn get_games(Extension(pool): Extension<PgPool>) -> Result<Json<JsonValue>, AppError> {
    let records = games::list_approved(&pool).await?;
    let games_list: Vec<JsonValue> = records.iter().map(game_json).collect();

    Ok(Json(serde_json::json!({
        "games": games_list,
        "total": games_list.len(),
    })))
}

/// GET /api/games/{game_id}
pub async fn get_game_by_id(
    Extension(pool): Extension<PgPool>,
    Path(game_id): Path<i64>,
) -> Result<Json<JsonValue>, AppError> {
    let record = games::get_by_id(&pool, game_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Game not found".into()))?;

    Ok(Json(game_json(&record)))
}

/// GET /api/games/{game_id}/replay
///
/// Fetches the stored PGN for the record and rebuilds the full position
/// history: ply 0 is the initial position, ply k the position after move k.
/// The client navigates the plies itself.
pub async fn get_game_replay(
    Extension(pool): Extension<PgPool>,
    Extension(storage): Extension<PgnStorage>,
    Path(game_id): Path<i64>,
) -> Result<Json<JsonValue>, AppError> {
    let record = games::get_by_id(&pool, game_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Game not found".into()))?;

    let storage_key = record
        .storage_key
        .as_deref()
        .ok_or_else(|| AppError::NotFound("Game has no stored PGN".into()))?;

    let raw_pgn = storage
        .fetch_pgn(storage_key)
        .await
        .map_err(AppError::BadGateway)?;

    let timeline = GameTimeline::build(&ShakmatyRules, &raw_pgn)
        .map_err(|e| AppError::BadRequest(format!("Failed to parse PGN: {e}")))?;

    Ok(Json(serde_json::json!({
        "game": game_json(&record),
        "moveCount": timeline.move_count(),
        "plies": timeline.plies(),
    })))
}
