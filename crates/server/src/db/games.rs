use chrono::NaiveDate;
use sqlx::PgPool;

pub struct GameRecord {
    pub id: i64,
    pub event: Option<String>,
    pub white_player: String,
    pub black_player: String,
    pub result: Option<String>,
    pub game_date: Option<NaiveDate>,
    pub approved: bool,
    pub storage_key: Option<String>,
}

type GameTuple = (
    i64,
    Option<String>,
    String,
    String,
    Option<String>,
    Option<NaiveDate>,
    bool,
    Option<String>,
);

fn to_record(row: GameTuple) -> GameRecord {
    let (id, event, white_player, black_player, result, game_date, approved, storage_key) = row;
    GameRecord {
        id,
        event,
        white_player,
        black_player,
        result,
        game_date,
        approved,
        storage_key,
    }
}

pub async fn list_approved(pool: &PgPool) -> Result<Vec<GameRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, GameTuple>(
        r#"
        SELECT id, event, white_player, black_player, result, game_date, approved, storage_key
        FROM games
        WHERE approved
        ORDER BY game_date DESC NULLS LAST, id DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(to_record).collect())
}

pub async fn get_by_id(pool: &PgPool, game_id: i64) -> Result<Option<GameRecord>, sqlx::Error> {
    let row = sqlx::query_as::<_, GameTuple>(
        r#"
        SELECT id, event, white_player, black_player, result, game_date, approved, storage_key
        FROM games
        WHERE id = $1
        "#,
    )
    .bind(game_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(to_record))
}
