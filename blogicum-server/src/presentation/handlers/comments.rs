use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::comment::{Comment, CommentForm};
use crate::domain::post::post_detail_url;
use crate::presentation::AppState;
use crate::presentation::app_error::AppResult;
use crate::presentation::handlers::posts::AuthorDto;
use crate::presentation::middleware::auth::AuthenticatedUser;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct CommentInputDto {
    #[validate(length(min = 1))]
    pub(crate) text: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct CommentDto {
    pub(crate) id: i64,
    pub(crate) text: String,
    pub(crate) author: AuthorDto,
    pub(crate) post_id: i64,
    pub(crate) created_at: DateTime<Utc>,
}

impl From<Comment> for CommentDto {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            text: comment.text,
            author: comment.author.into(),
            post_id: comment.post_id,
            created_at: comment.created_at,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/posts/{id}/comments",
    tag = "comments",
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Comments, oldest first", body = Vec<CommentDto>),
        (status = 401, description = "Invalid token"),
        (status = 404, description = "Post not found or hidden"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn list_comments(
    State(state): State<AppState>,
    auth: Option<AuthenticatedUser>,
    Path(post_id): Path<i64>,
) -> AppResult<Json<Vec<CommentDto>>> {
    let viewer = auth.map(|user| user.actor());
    let comments = state
        .blog_service
        .list_comments(viewer.as_ref(), post_id)
        .await?;
    Ok(Json(comments.into_iter().map(CommentDto::from).collect()))
}

#[utoipa::path(
    post,
    path = "/api/posts/{id}/comments",
    tag = "comments",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    request_body = CommentInputDto,
    responses(
        (status = 201, description = "Comment added", body = CommentDto,
            headers(("Location" = String, description = "Detail URL of the commented post"))),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Post not found or hidden"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn add_comment(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(post_id): Path<i64>,
    Json(dto): Json<CommentInputDto>,
) -> AppResult<impl IntoResponse> {
    dto.validate()?;

    let comment = state
        .blog_service
        .add_comment(&auth.actor(), post_id, CommentForm { text: dto.text })
        .await?;

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, post_detail_url(post_id))],
        Json(CommentDto::from(comment)),
    ))
}

#[utoipa::path(
    put,
    path = "/api/posts/{id}/comments/{comment_id}",
    tag = "comments",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id"),
        ("comment_id" = i64, Path, description = "Comment id")
    ),
    request_body = CommentInputDto,
    responses(
        (status = 200, description = "Comment updated", body = CommentDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Comment not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn update_comment(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path((post_id, comment_id)): Path<(i64, i64)>,
    Json(dto): Json<CommentInputDto>,
) -> AppResult<Json<CommentDto>> {
    dto.validate()?;

    let comment = state
        .blog_service
        .update_comment(
            &auth.actor(),
            post_id,
            comment_id,
            CommentForm { text: dto.text },
        )
        .await?;
    Ok(Json(comment.into()))
}

#[utoipa::path(
    delete,
    path = "/api/posts/{id}/comments/{comment_id}",
    tag = "comments",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id"),
        ("comment_id" = i64, Path, description = "Comment id")
    ),
    responses(
        (status = 204, description = "Comment deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Comment not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn delete_comment(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path((post_id, comment_id)): Path<(i64, i64)>,
) -> AppResult<StatusCode> {
    state
        .blog_service
        .delete_comment(&auth.actor(), post_id, comment_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
