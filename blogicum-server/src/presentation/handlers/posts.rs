use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::ToSchema;
use validator::Validate;

use crate::application::blog_service::{ListPostsResult, PostScope};
use crate::domain::category::CategoryRef;
use crate::domain::error::DomainError;
use crate::domain::location::LocationRef;
use crate::domain::post::{AuthorRef, Post, PostForm};
use crate::domain::publication::{Publishable, published_by_default};
use crate::infrastructure::media::MediaStorage;
use crate::presentation::AppState;
use crate::presentation::app_error::AppResult;
use crate::presentation::middleware::auth::AuthenticatedUser;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct PostInputDto {
    #[validate(length(min = 1, max = 256))]
    pub(crate) title: String,
    #[validate(length(min = 1))]
    pub(crate) text: String,
    /// Posts dated in the future stay hidden until then.
    pub(crate) pub_date: DateTime<Utc>,
    #[serde(default = "published_by_default")]
    pub(crate) is_published: bool,
    #[validate(range(min = 1))]
    pub(crate) location_id: Option<i64>,
    #[validate(range(min = 1))]
    pub(crate) category_id: Option<i64>,
}

impl From<PostInputDto> for PostForm {
    fn from(dto: PostInputDto) -> Self {
        Self {
            title: dto.title,
            text: dto.text,
            pub_date: dto.pub_date,
            is_published: dto.is_published,
            location_id: dto.location_id,
            category_id: dto.category_id,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct PageQuery {
    #[validate(range(min = 1))]
    pub(crate) page: Option<u32>,
}

impl PageQuery {
    pub(crate) fn number(&self) -> u32 {
        self.page.unwrap_or(1)
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct AuthorDto {
    pub(crate) id: i64,
    pub(crate) username: String,
}

impl From<AuthorRef> for AuthorDto {
    fn from(author: AuthorRef) -> Self {
        Self {
            id: author.id,
            username: author.username,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct CategoryRefDto {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) slug: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct LocationRefDto {
    pub(crate) id: i64,
    pub(crate) name: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostDto {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) text: String,
    pub(crate) pub_date: DateTime<Utc>,
    pub(crate) author: AuthorDto,
    pub(crate) location: Option<LocationRefDto>,
    pub(crate) category: Option<CategoryRefDto>,
    pub(crate) image_url: Option<String>,
    pub(crate) comment_count: i64,
    pub(crate) is_published: bool,
    pub(crate) created_at: DateTime<Utc>,
}

impl From<Post> for PostDto {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            is_published: post.is_published(),
            created_at: post.created_at(),
            title: post.title,
            text: post.text,
            pub_date: post.pub_date,
            author: post.author.into(),
            location: post
                .location
                .map(|LocationRef { id, name }| LocationRefDto { id, name }),
            category: post
                .category
                .map(|CategoryRef { id, title, slug, .. }| CategoryRefDto { id, title, slug }),
            image_url: post.image.map(|path| format!("/media/{path}")),
            comment_count: post.comment_count,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ListPostsResponseDto {
    pub(crate) posts: Vec<PostDto>,
    pub(crate) page: u32,
    pub(crate) page_size: u32,
    pub(crate) total: i64,
}

impl From<ListPostsResult> for ListPostsResponseDto {
    fn from(result: ListPostsResult) -> Self {
        Self {
            posts: result.posts.into_iter().map(PostDto::from).collect(),
            page: result.page,
            page_size: result.page_size,
            total: result.total,
        }
    }
}

/// Multipart body of an image upload.
#[derive(ToSchema)]
#[allow(dead_code)]
pub(crate) struct ImageUploadDto {
    /// jpeg, png, gif or webp.
    #[schema(value_type = String, format = Binary)]
    pub(crate) image: Vec<u8>,
}

#[utoipa::path(
    get,
    path = "/api/posts",
    tag = "posts",
    params(
        ("page" = Option<u32>, Query, description = "Page number, starting at 1")
    ),
    responses(
        (status = 200, description = "Posts listed", body = ListPostsResponseDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid token"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn list_posts(
    State(state): State<AppState>,
    auth: Option<AuthenticatedUser>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<ListPostsResponseDto>> {
    query.validate()?;
    let viewer = auth.map(|user| user.actor());

    let result = state
        .blog_service
        .list_posts(
            viewer.as_ref(),
            PostScope::Feed,
            query.number(),
            state.posts_per_page,
        )
        .await?;

    Ok(Json(result.into()))
}

#[utoipa::path(
    get,
    path = "/api/posts/{id}",
    tag = "posts",
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Post found", body = PostDto),
        (status = 401, description = "Invalid token"),
        (status = 404, description = "Post not found or hidden"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn get_post(
    State(state): State<AppState>,
    auth: Option<AuthenticatedUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<PostDto>> {
    let viewer = auth.map(|user| user.actor());
    let post = state.blog_service.get_post(viewer.as_ref(), id).await?;
    Ok(Json(post.into()))
}

#[utoipa::path(
    post,
    path = "/api/posts",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    request_body = PostInputDto,
    responses(
        (status = 201, description = "Post created", body = PostDto,
            headers(("Location" = String, description = "Post detail URL"))),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn create_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Json(dto): Json<PostInputDto>,
) -> AppResult<impl IntoResponse> {
    dto.validate()?;

    let post = state
        .blog_service
        .create_post(&auth.actor(), dto.into())
        .await?;

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, post.detail_url())],
        Json(PostDto::from(post)),
    ))
}

#[utoipa::path(
    put,
    path = "/api/posts/{id}",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    request_body = PostInputDto,
    responses(
        (status = 200, description = "Post updated", body = PostDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn update_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(dto): Json<PostInputDto>,
) -> AppResult<Json<PostDto>> {
    dto.validate()?;

    let post = state
        .blog_service
        .update_post(&auth.actor(), id, dto.into())
        .await?;
    Ok(Json(post.into()))
}

#[utoipa::path(
    delete,
    path = "/api/posts/{id}",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 204, description = "Post and its comments deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn delete_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    let post = state.blog_service.delete_post(&auth.actor(), id).await?;
    if let Some(image) = post.image {
        discard_image(&state.media, &image).await;
    }
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    put,
    path = "/api/posts/{id}/image",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    request_body(content = ImageUploadDto, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Image replaced", body = PostDto),
        (status = 400, description = "Missing, empty, oversized or unsupported image"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn upload_image(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> AppResult<Json<PostDto>> {
    let actor = auth.actor();
    state.blog_service.get_post_for_edit(&actor, id).await?;

    let (content_type, data) = read_image_field(&mut multipart).await?;
    let stored = state.media.save_post_image(&content_type, &data).await?;

    let change = match state
        .blog_service
        .replace_post_image(&actor, id, Some(stored.clone()))
        .await
    {
        Ok(change) => change,
        Err(err) => {
            discard_image(&state.media, &stored).await;
            return Err(err.into());
        }
    };
    if let Some(previous) = change.previous {
        discard_image(&state.media, &previous).await;
    }

    Ok(Json(change.post.into()))
}

#[utoipa::path(
    delete,
    path = "/api/posts/{id}/image",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Image removed", body = PostDto),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn delete_image(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<Json<PostDto>> {
    let change = state
        .blog_service
        .replace_post_image(&auth.actor(), id, None)
        .await?;
    if let Some(previous) = change.previous {
        discard_image(&state.media, &previous).await;
    }
    Ok(Json(change.post.into()))
}

async fn read_image_field(multipart: &mut Multipart) -> AppResult<(String, Vec<u8>)> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("image") {
            continue;
        }
        let content_type = field.content_type().unwrap_or_default().to_string();
        let data = field.bytes().await?;
        return Ok((content_type, data.to_vec()));
    }
    Err(DomainError::invalid("image", "is required").into())
}

/// Removing an orphaned file is best effort.
pub(crate) async fn discard_image(media: &MediaStorage, path: &str) {
    if let Err(err) = media.remove_post_image(path).await {
        warn!(path, error = %err, "failed to remove post image");
    }
}
