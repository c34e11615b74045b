use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::application::blog_service::PostScope;
use crate::domain::user::{ProfileForm, User};
use crate::presentation::AppState;
use crate::presentation::app_error::AppResult;
use crate::presentation::handlers::auth::UserDto;
use crate::presentation::handlers::posts::{ListPostsResponseDto, PageQuery};
use crate::presentation::middleware::auth::AuthenticatedUser;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct ProfileInputDto {
    #[validate(length(max = 150))]
    #[serde(default)]
    pub(crate) first_name: String,
    #[validate(length(max = 150))]
    #[serde(default)]
    pub(crate) last_name: String,
    #[validate(length(min = 1, max = 150))]
    pub(crate) username: String,
    #[validate(email)]
    pub(crate) email: String,
}

impl From<ProfileInputDto> for ProfileForm {
    fn from(dto: ProfileInputDto) -> Self {
        Self {
            first_name: dto.first_name,
            last_name: dto.last_name,
            username: dto.username,
            email: dto.email,
        }
    }
}

/// Public part of an account; the email stays private.
#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PublicProfileDto {
    pub(crate) username: String,
    pub(crate) first_name: String,
    pub(crate) last_name: String,
    pub(crate) joined_at: DateTime<Utc>,
}

impl From<User> for PublicProfileDto {
    fn from(user: User) -> Self {
        Self {
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            joined_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ProfilePageDto {
    pub(crate) profile: PublicProfileDto,
    #[serde(flatten)]
    pub(crate) listing: ListPostsResponseDto,
}

#[utoipa::path(
    get,
    path = "/api/profile/{username}",
    tag = "profile",
    params(
        ("username" = String, Path, description = "Username"),
        ("page" = Option<u32>, Query, description = "Page number, starting at 1")
    ),
    responses(
        (status = 200, description = "Profile with the user's posts", body = ProfilePageDto),
        (status = 401, description = "Invalid token"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn get_profile(
    State(state): State<AppState>,
    auth: Option<AuthenticatedUser>,
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<ProfilePageDto>> {
    query.validate()?;
    let user = state.profile_service.profile(&username).await?;

    let viewer = auth.map(|user| user.actor());
    let listing = state
        .blog_service
        .list_posts(
            viewer.as_ref(),
            PostScope::Author(user.id),
            query.number(),
            state.posts_per_page,
        )
        .await?;

    Ok(Json(ProfilePageDto {
        profile: user.into(),
        listing: listing.into(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/profile",
    tag = "profile",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Current account", body = UserDto),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn me(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> AppResult<Json<UserDto>> {
    let user = state.profile_service.me(&auth.actor()).await?;
    Ok(Json(user.into()))
}

#[utoipa::path(
    put,
    path = "/api/profile",
    tag = "profile",
    security(
        ("bearer_auth" = [])
    ),
    request_body = ProfileInputDto,
    responses(
        (status = 200, description = "Profile updated", body = UserDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Username or email already taken"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn update_me(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Json(dto): Json<ProfileInputDto>,
) -> AppResult<Json<UserDto>> {
    dto.validate()?;

    let user = state
        .profile_service
        .update_profile(&auth.actor(), dto.into())
        .await?;
    Ok(Json(user.into()))
}
