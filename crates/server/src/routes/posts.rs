use axum::{extract::Path, extract::Query, Extension, Json};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use sqlx::PgPool;

use clubchess_core::scanner;

use crate::db::posts;
use crate::error::AppError;

#[derive(Deserialize)]
pub struct CreatePostRequest {
    pub author: String,
    pub content: String,
}

#[derive(Deserialize)]
pub struct PaginationQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// POST /api/posts
pub async fn create_post(
    Extension(pool): Extension<PgPool>,
    Json(req): Json<CreatePostRequest>,
) -> Result<Json<JsonValue>, AppError> {
    let author = req.author.trim().to_string();
    let content = req.content.trim().to_string();

    if author.is_empty() {
        return Err(AppError::BadRequest("Author cannot be empty".into()));
    }
    if content.is_empty() {
        return Err(AppError::BadRequest("Content cannot be empty".into()));
    }
    if content.len() > 10000 {
        return Err(AppError::BadRequest(
            "Content must be at most 10000 characters".into(),
        ));
    }

    let post_id = posts::create(&pool, &author, &content).await?;
    let post = posts::get_by_id(&pool, post_id)
        .await?
        .ok_or_else(|| AppError::Internal("Failed to create post".into()))?;

    Ok(Json(post_json(&post, true)))
}

/// GET /api/posts
pub async fn get_posts(
    Extension(pool): Extension<PgPool>,
    Query(q): Query<PaginationQuery>,
) -> Result<Json<JsonValue>, AppError> {
    let limit = q.limit.unwrap_or(50).clamp(1, 200);
    let offset = q.offset.unwrap_or(0).max(0);

    let rows = posts::list(&pool, limit, offset).await?;
    let posts_list: Vec<JsonValue> = rows.iter().map(|p| post_json(p, false)).collect();

    Ok(Json(serde_json::json!({
        "posts": posts_list,
        "limit": limit,
        "offset": offset,
    })))
}

/// GET /api/posts/{post_id}
///
/// The single-post response carries the scanned notation segments so the
/// renderer can interleave boards and move lists with the prose. Segments are
/// recomputed on every read, never stored.
pub async fn get_post_by_id(
    Extension(pool): Extension<PgPool>,
    Path(post_id): Path<i64>,
) -> Result<Json<JsonValue>, AppError> {
    let post = posts::get_by_id(&pool, post_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".into()))?;

    Ok(Json(post_json(&post, true)))
}

fn post_json(post: &posts::PostRow, with_segments: bool) -> JsonValue {
    let mut json = serde_json::json!({
        "id": post.id,
        "author": post.author,
        "content": post.content,
        "createdAt": post.created_at,
    });

    if with_segments {
        json["segments"] = serde_json::json!(scanner::scan(&post.content));
    }

    json
}
