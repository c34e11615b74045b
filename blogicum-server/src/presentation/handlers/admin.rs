use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::category::CategoryForm;
use crate::domain::location::LocationForm;
use crate::domain::publication::published_by_default;
use crate::presentation::AppState;
use crate::presentation::app_error::AppResult;
use crate::presentation::handlers::catalog::{CategoryDto, LocationDto};
use crate::presentation::handlers::comments::CommentDto;
use crate::presentation::handlers::posts::{ListPostsResponseDto, PageQuery, discard_image};
use crate::presentation::middleware::auth::AuthenticatedUser;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct CategoryInputDto {
    #[validate(length(min = 1, max = 256))]
    pub(crate) title: String,
    #[validate(length(min = 1))]
    pub(crate) description: String,
    /// Latin letters, digits, hyphen and underscore.
    #[validate(length(min = 1, max = 128))]
    pub(crate) slug: String,
    #[serde(default = "published_by_default")]
    pub(crate) is_published: bool,
}

impl From<CategoryInputDto> for CategoryForm {
    fn from(dto: CategoryInputDto) -> Self {
        Self {
            title: dto.title,
            description: dto.description,
            slug: dto.slug,
            is_published: dto.is_published,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct LocationInputDto {
    #[validate(length(min = 1, max = 256))]
    pub(crate) name: String,
    #[serde(default = "published_by_default")]
    pub(crate) is_published: bool,
}

impl From<LocationInputDto> for LocationForm {
    fn from(dto: LocationInputDto) -> Self {
        Self {
            name: dto.name,
            is_published: dto.is_published,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/admin/categories",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All categories", body = Vec<CategoryDto>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Staff only"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn list_categories(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> AppResult<Json<Vec<CategoryDto>>> {
    let categories = state.catalog_service.list_categories(&auth.actor()).await?;
    Ok(Json(categories.into_iter().map(CategoryDto::from).collect()))
}

#[utoipa::path(
    post,
    path = "/api/admin/categories",
    tag = "admin",
    security(("bearer_auth" = [])),
    request_body = CategoryInputDto,
    responses(
        (status = 201, description = "Category created", body = CategoryDto),
        (status = 400, description = "Validation error or duplicate slug"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Staff only"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn create_category(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Json(dto): Json<CategoryInputDto>,
) -> AppResult<(StatusCode, Json<CategoryDto>)> {
    dto.validate()?;
    let category = state
        .catalog_service
        .create_category(&auth.actor(), dto.into())
        .await?;
    Ok((StatusCode::CREATED, Json(category.into())))
}

#[utoipa::path(
    get,
    path = "/api/admin/categories/{id}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category found", body = CategoryDto),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Staff only"),
        (status = 404, description = "Category not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn get_category(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<Json<CategoryDto>> {
    let category = state.catalog_service.get_category(&auth.actor(), id).await?;
    Ok(Json(category.into()))
}

#[utoipa::path(
    put,
    path = "/api/admin/categories/{id}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Category id")),
    request_body = CategoryInputDto,
    responses(
        (status = 200, description = "Category updated", body = CategoryDto),
        (status = 400, description = "Validation error or duplicate slug"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Staff only"),
        (status = 404, description = "Category not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn update_category(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(dto): Json<CategoryInputDto>,
) -> AppResult<Json<CategoryDto>> {
    dto.validate()?;
    let category = state
        .catalog_service
        .update_category(&auth.actor(), id, dto.into())
        .await?;
    Ok(Json(category.into()))
}

#[utoipa::path(
    delete,
    path = "/api/admin/categories/{id}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Category id")),
    responses(
        (status = 204, description = "Category deleted, its posts left uncategorised"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Staff only"),
        (status = 404, description = "Category not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn delete_category(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state
        .catalog_service
        .delete_category(&auth.actor(), id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/admin/locations",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All locations", body = Vec<LocationDto>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Staff only"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn list_locations(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> AppResult<Json<Vec<LocationDto>>> {
    let locations = state.catalog_service.list_locations(&auth.actor()).await?;
    Ok(Json(locations.into_iter().map(LocationDto::from).collect()))
}

#[utoipa::path(
    post,
    path = "/api/admin/locations",
    tag = "admin",
    security(("bearer_auth" = [])),
    request_body = LocationInputDto,
    responses(
        (status = 201, description = "Location created", body = LocationDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Staff only"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn create_location(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Json(dto): Json<LocationInputDto>,
) -> AppResult<(StatusCode, Json<LocationDto>)> {
    dto.validate()?;
    let location = state
        .catalog_service
        .create_location(&auth.actor(), dto.into())
        .await?;
    Ok((StatusCode::CREATED, Json(location.into())))
}

#[utoipa::path(
    get,
    path = "/api/admin/locations/{id}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Location id")),
    responses(
        (status = 200, description = "Location found", body = LocationDto),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Staff only"),
        (status = 404, description = "Location not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn get_location(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<Json<LocationDto>> {
    let location = state.catalog_service.get_location(&auth.actor(), id).await?;
    Ok(Json(location.into()))
}

#[utoipa::path(
    put,
    path = "/api/admin/locations/{id}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Location id")),
    request_body = LocationInputDto,
    responses(
        (status = 200, description = "Location updated", body = LocationDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Staff only"),
        (status = 404, description = "Location not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn update_location(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(dto): Json<LocationInputDto>,
) -> AppResult<Json<LocationDto>> {
    dto.validate()?;
    let location = state
        .catalog_service
        .update_location(&auth.actor(), id, dto.into())
        .await?;
    Ok(Json(location.into()))
}

#[utoipa::path(
    delete,
    path = "/api/admin/locations/{id}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Location id")),
    responses(
        (status = 204, description = "Location deleted, its posts detached"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Staff only"),
        (status = 404, description = "Location not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn delete_location(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state
        .catalog_service
        .delete_location(&auth.actor(), id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/admin/posts",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("page" = Option<u32>, Query, description = "Page number, starting at 1")),
    responses(
        (status = 200, description = "Every post regardless of status", body = ListPostsResponseDto),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Staff only"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn list_posts(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<ListPostsResponseDto>> {
    query.validate()?;
    let result = state
        .blog_service
        .list_all_posts(&auth.actor(), query.number(), state.posts_per_page)
        .await?;
    Ok(Json(result.into()))
}

#[utoipa::path(
    get,
    path = "/api/admin/comments",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("page" = Option<u32>, Query, description = "Page number, starting at 1")),
    responses(
        (status = 200, description = "Comments, newest first", body = Vec<CommentDto>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Staff only"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn list_comments(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<Vec<CommentDto>>> {
    query.validate()?;
    let comments = state
        .blog_service
        .list_all_comments(&auth.actor(), query.number(), state.posts_per_page)
        .await?;
    Ok(Json(comments.into_iter().map(CommentDto::from).collect()))
}

#[utoipa::path(
    delete,
    path = "/api/admin/users/{id}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 204, description = "User deleted with their posts, comments and post images"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Staff only"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn delete_user(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    let images = state
        .profile_service
        .delete_user(&auth.actor(), id)
        .await?;
    for image in images {
        discard_image(&state.media, &image).await;
    }
    Ok(StatusCode::NO_CONTENT)
}
