use sqlx::postgres::{PgPool, PgPoolOptions};

pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Run the full Postgres schema migration inline.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(SCHEMA_SQL).execute(pool).await?;
    Ok(())
}

const SCHEMA_SQL: &str = r#"
-- Uploaded game records; the PGN bytes themselves live in object storage
CREATE TABLE IF NOT EXISTS games (
    id           BIGSERIAL PRIMARY KEY,
    event        TEXT,
    white_player TEXT NOT NULL,
    black_player TEXT NOT NULL,
    result       TEXT,
    game_date    DATE,
    approved     BOOLEAN NOT NULL DEFAULT FALSE,
    storage_key  TEXT,
    created_at   TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX IF NOT EXISTS idx_games_approved   ON games (approved);
CREATE INDEX IF NOT EXISTS idx_games_game_date  ON games (game_date DESC);

-- One puzzle per calendar day
CREATE TABLE IF NOT EXISTS daily_puzzles (
    id           BIGSERIAL PRIMARY KEY,
    puzzle_date  DATE UNIQUE NOT NULL,
    fen_position TEXT NOT NULL,
    solution     TEXT NOT NULL,
    moves_count  INTEGER NOT NULL DEFAULT 1,
    hint         TEXT,
    difficulty   TEXT NOT NULL DEFAULT 'MEDIUM',
    created_at   TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX IF NOT EXISTS idx_daily_puzzles_date ON daily_puzzles (puzzle_date);

-- Forum posts; content may embed [fen]/[pgn] notation blocks
CREATE TABLE IF NOT EXISTS posts (
    id         BIGSERIAL PRIMARY KEY,
    author     TEXT NOT NULL,
    content    TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX IF NOT EXISTS idx_posts_created_at ON posts (created_at DESC);
"#;
