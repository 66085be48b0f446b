use axum::{extract::Path, Extension, Json};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use sqlx::PgPool;

use clubchess_core::puzzle::{PuzzleDefinition, PuzzleSession};
use clubchess_core::rules::ShakmatyRules;

use crate::db::puzzles::{self, PuzzleRow};
use crate::error::AppError;
use crate::puzzle_sessions::PuzzleSessions;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleRequest {
    pub puzzle_date: NaiveDate,
    pub fen_position: String,
    pub solution: String,
    pub moves_count: i32,
    pub hint: Option<String>,
    pub difficulty: Option<String>,
}

#[derive(Deserialize)]
pub struct AttemptRequest {
    pub from: String,
    pub to: String,
    pub promotion: Option<String>,
}

fn definition_of(row: &PuzzleRow) -> PuzzleDefinition {
    PuzzleDefinition::new(
        row.fen_position.clone(),
        &row.solution,
        row.moves_count.max(0) as usize,
        row.hint.clone(),
        row.difficulty.clone(),
    )
}

/// Public puzzle view: everything the solver may see, i.e. not the solution.
fn puzzle_json(row: &PuzzleRow) -> JsonValue {
    serde_json::json!({
        "id": row.id,
        "puzzleDate": row.puzzle_date,
        "fenPosition": row.fen_position,
        "movesCount": row.moves_count,
        "hint": row.hint,
        "difficulty": row.difficulty,
    })
}

fn session_json(session: &PuzzleSession) -> JsonValue {
    serde_json::json!({
        "position": session.current_position(),
        "status": session.status(),
        "playerMovesMade": session.player_moves_made(),
    })
}

/// GET /api/puzzles/daily
pub async fn get_daily_puzzle(
    Extension(pool): Extension<PgPool>,
) -> Result<Json<JsonValue>, AppError> {
    let today = Local::now().date_naive();
    let row = puzzles::get_by_date(&pool, today)
        .await?
        .ok_or_else(|| AppError::NotFound("No puzzle for today".into()))?;

    Ok(Json(puzzle_json(&row)))
}

/// POST /api/puzzles/daily/session
pub async fn open_daily_session(
    Extension(pool): Extension<PgPool>,
    Extension(sessions): Extension<PuzzleSessions>,
) -> Result<Json<JsonValue>, AppError> {
    let today = Local::now().date_naive();
    let row = puzzles::get_by_date(&pool, today)
        .await?
        .ok_or_else(|| AppError::NotFound("No puzzle for today".into()))?;

    let session = PuzzleSession::new(definition_of(&row));
    let snapshot = session_json(&session);
    let session_id = sessions.open(session).await;

    let mut response = puzzle_json(&row);
    response["sessionId"] = serde_json::json!(session_id);
    if let Some(map) = snapshot.as_object() {
        for (key, value) in map {
            response[key.as_str()] = value.clone();
        }
    }

    Ok(Json(response))
}

/// POST /api/puzzles/sessions/{session_id}/attempt
///
/// Validates one dragged move against the expected solution token. An
/// accepted move may schedule the automated opponent reply; a wrong move
/// schedules the transient-rejection clear. Either way the timer is armed
/// here and the session snapshot returned immediately.
pub async fn attempt_move(
    Extension(sessions): Extension<PuzzleSessions>,
    Path(session_id): Path<i64>,
    Json(req): Json<AttemptRequest>,
) -> Result<Json<JsonValue>, AppError> {
    let promotion = req.promotion.as_deref().and_then(|p| p.chars().next());

    let outcome = sessions
        .with_session(session_id, |session| {
            let submission =
                session.submit_move(&ShakmatyRules, &req.from, &req.to, promotion);
            (submission, session_json(session))
        })
        .await
        .ok_or_else(|| AppError::NotFound("No such puzzle session".into()))?;

    let (submission, mut snapshot) = outcome;
    if let Some(action) = submission.scheduled {
        sessions.arm(session_id, action);
    }

    snapshot["accepted"] = serde_json::json!(submission.accepted);
    Ok(Json(snapshot))
}

/// POST /api/puzzles/sessions/{session_id}/reset
pub async fn reset_session(
    Extension(sessions): Extension<PuzzleSessions>,
    Path(session_id): Path<i64>,
) -> Result<Json<JsonValue>, AppError> {
    let snapshot = sessions
        .with_session(session_id, |session| {
            session.reset();
            session_json(session)
        })
        .await
        .ok_or_else(|| AppError::NotFound("No such puzzle session".into()))?;

    Ok(Json(snapshot))
}

/// GET /api/puzzles
pub async fn get_puzzles(Extension(pool): Extension<PgPool>) -> Result<Json<JsonValue>, AppError> {
    let rows = puzzles::list_all(&pool).await?;

    let list: Vec<JsonValue> = rows
        .iter()
        .map(|row| {
            let mut json = puzzle_json(row);
            // Organizers see the stored solution in the management view.
            json["solution"] = serde_json::json!(row.solution);
            json
        })
        .collect();

    Ok(Json(serde_json::json!({ "puzzles": list, "total": list.len() })))
}

/// Shared validation for create/update: the definition must replay.
fn validated_definition(req: &PuzzleRequest) -> Result<(i32, String), AppError> {
    if req.moves_count < 1 {
        return Err(AppError::BadRequest(
            "movesCount must be at least 1".into(),
        ));
    }

    let difficulty = req
        .difficulty
        .clone()
        .unwrap_or_else(|| "MEDIUM".to_string());
    if !matches!(difficulty.as_str(), "EASY" | "MEDIUM" | "HARD") {
        return Err(AppError::BadRequest("Invalid difficulty".into()));
    }

    let definition = PuzzleDefinition::new(
        req.fen_position.clone(),
        &req.solution,
        req.moves_count as usize,
        req.hint.clone(),
        difficulty.clone(),
    );
    definition
        .verify(&ShakmatyRules)
        .map_err(|e| AppError::BadRequest(format!("Invalid puzzle: {e}")))?;

    Ok((req.moves_count, difficulty))
}

/// POST /api/puzzles
pub async fn create_puzzle(
    Extension(pool): Extension<PgPool>,
    Json(req): Json<PuzzleRequest>,
) -> Result<Json<JsonValue>, AppError> {
    let (moves_count, difficulty) = validated_definition(&req)?;

    let puzzle_id = puzzles::create(
        &pool,
        req.puzzle_date,
        &req.fen_position,
        &req.solution,
        moves_count,
        req.hint.as_deref(),
        &difficulty,
    )
    .await?;

    Ok(Json(serde_json::json!({
        "id": puzzle_id,
        "message": "Puzzle created successfully",
    })))
}

/// PUT /api/puzzles/{puzzle_id}
pub async fn update_puzzle(
    Extension(pool): Extension<PgPool>,
    Path(puzzle_id): Path<i64>,
    Json(req): Json<PuzzleRequest>,
) -> Result<Json<JsonValue>, AppError> {
    let (moves_count, difficulty) = validated_definition(&req)?;

    let updated = puzzles::update(
        &pool,
        puzzle_id,
        req.puzzle_date,
        &req.fen_position,
        &req.solution,
        moves_count,
        req.hint.as_deref(),
        &difficulty,
    )
    .await?;

    if !updated {
        return Err(AppError::NotFound("Puzzle not found".into()));
    }

    Ok(Json(serde_json::json!({
        "message": "Puzzle updated successfully",
    })))
}

/// DELETE /api/puzzles/{puzzle_id}
pub async fn delete_puzzle(
    Extension(pool): Extension<PgPool>,
    Path(puzzle_id): Path<i64>,
) -> Result<Json<JsonValue>, AppError> {
    if !puzzles::delete(&pool, puzzle_id).await? {
        return Err(AppError::NotFound("Puzzle not found".into()));
    }

    Ok(Json(serde_json::json!({
        "message": "Puzzle deleted successfully",
    })))
}
