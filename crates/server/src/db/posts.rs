use chrono::{DateTime, Utc};
use sqlx::PgPool;

pub struct PostRow {
    pub id: i64,
    pub author: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

type PostTuple = (i64, String, String, DateTime<Utc>);

fn to_row(row: PostTuple) -> PostRow {
    let (id, author, content, created_at) = row;
    PostRow {
        id,
        author,
        content,
        created_at,
    }
}

pub async fn create(pool: &PgPool, author: &str, content: &str) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as(
        r#"
        INSERT INTO posts (author, content)
        VALUES ($1, $2)
        RETURNING id
        "#,
    )
    .bind(author)
    .bind(content)
    .fetch_one(pool)
    .await?;

    Ok(row.0)
}

pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<PostRow>, sqlx::Error> {
    let rows = sqlx::query_as::<_, PostTuple>(
        r#"
        SELECT id, author, content, created_at
        FROM posts
        ORDER BY created_at DESC, id DESC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(to_row).collect())
}

pub async fn get_by_id(pool: &PgPool, post_id: i64) -> Result<Option<PostRow>, sqlx::Error> {
    let row = sqlx::query_as::<_, PostTuple>(
        r#"
        SELECT id, author, content, created_at
        FROM posts
        WHERE id = $1
        "#,
    )
    .bind(post_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(to_row))
}
