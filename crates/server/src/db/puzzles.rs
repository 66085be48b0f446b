use chrono::NaiveDate;
use sqlx::PgPool;

pub struct PuzzleRow {
    pub id: i64,
    pub puzzle_date: NaiveDate,
    pub fen_position: String,
    pub solution: String,
    pub moves_count: i32,
    pub hint: Option<String>,
    pub difficulty: String,
}

type PuzzleTuple = (i64, NaiveDate, String, String, i32, Option<String>, String);

fn to_row(row: PuzzleTuple) -> PuzzleRow {
    let (id, puzzle_date, fen_position, solution, moves_count, hint, difficulty) = row;
    PuzzleRow {
        id,
        puzzle_date,
        fen_position,
        solution,
        moves_count,
        hint,
        difficulty,
    }
}

const SELECT_COLUMNS: &str =
    "id, puzzle_date, fen_position, solution, moves_count, hint, difficulty";

pub async fn get_by_date(pool: &PgPool, date: NaiveDate) -> Result<Option<PuzzleRow>, sqlx::Error> {
    let row = sqlx::query_as::<_, PuzzleTuple>(&format!(
        "SELECT {SELECT_COLUMNS} FROM daily_puzzles WHERE puzzle_date = $1"
    ))
    .bind(date)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(to_row))
}

pub async fn list_all(pool: &PgPool) -> Result<Vec<PuzzleRow>, sqlx::Error> {
    let rows = sqlx::query_as::<_, PuzzleTuple>(&format!(
        "SELECT {SELECT_COLUMNS} FROM daily_puzzles ORDER BY puzzle_date DESC"
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(to_row).collect())
}

pub async fn create(
    pool: &PgPool,
    puzzle_date: NaiveDate,
    fen_position: &str,
    solution: &str,
    moves_count: i32,
    hint: Option<&str>,
    difficulty: &str,
) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as(
        r#"
        INSERT INTO daily_puzzles (puzzle_date, fen_position, solution, moves_count, hint, difficulty)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id
        "#,
    )
    .bind(puzzle_date)
    .bind(fen_position)
    .bind(solution)
    .bind(moves_count)
    .bind(hint)
    .bind(difficulty)
    .fetch_one(pool)
    .await?;

    Ok(row.0)
}

/// Returns false when no puzzle with `puzzle_id` exists.
pub async fn update(
    pool: &PgPool,
    puzzle_id: i64,
    puzzle_date: NaiveDate,
    fen_position: &str,
    solution: &str,
    moves_count: i32,
    hint: Option<&str>,
    difficulty: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE daily_puzzles
        SET puzzle_date = $2, fen_position = $3, solution = $4,
            moves_count = $5, hint = $6, difficulty = $7
        WHERE id = $1
        "#,
    )
    .bind(puzzle_id)
    .bind(puzzle_date)
    .bind(fen_position)
    .bind(solution)
    .bind(moves_count)
    .bind(hint)
    .bind(difficulty)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn delete(pool: &PgPool, puzzle_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM daily_puzzles WHERE id = $1")
        .bind(puzzle_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
