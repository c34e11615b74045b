use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::presentation::handlers::admin::{CategoryInputDto, LocationInputDto};
use crate::presentation::handlers::auth::{AuthResponseDto, LoginDto, RegisterDto, UserDto};
use crate::presentation::handlers::catalog::{
    CategoryDto, CategoryPostsDto, LocationDto, LocationPostsDto,
};
use crate::presentation::handlers::comments::{CommentDto, CommentInputDto};
use crate::presentation::handlers::posts::{
    AuthorDto, CategoryRefDto, ImageUploadDto, ListPostsResponseDto, LocationRefDto, PageQuery,
    PostDto, PostInputDto,
};
use crate::presentation::handlers::profile::{ProfileInputDto, ProfilePageDto, PublicProfileDto};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::presentation::handlers::auth::register,
        crate::presentation::handlers::auth::login,
        crate::presentation::handlers::posts::list_posts,
        crate::presentation::handlers::posts::get_post,
        crate::presentation::handlers::posts::create_post,
        crate::presentation::handlers::posts::update_post,
        crate::presentation::handlers::posts::delete_post,
        crate::presentation::handlers::posts::upload_image,
        crate::presentation::handlers::posts::delete_image,
        crate::presentation::handlers::comments::list_comments,
        crate::presentation::handlers::comments::add_comment,
        crate::presentation::handlers::comments::update_comment,
        crate::presentation::handlers::comments::delete_comment,
        crate::presentation::handlers::catalog::category_posts,
        crate::presentation::handlers::catalog::location_posts,
        crate::presentation::handlers::profile::get_profile,
        crate::presentation::handlers::profile::me,
        crate::presentation::handlers::profile::update_me,
        crate::presentation::handlers::admin::list_categories,
        crate::presentation::handlers::admin::create_category,
        crate::presentation::handlers::admin::get_category,
        crate::presentation::handlers::admin::update_category,
        crate::presentation::handlers::admin::delete_category,
        crate::presentation::handlers::admin::list_locations,
        crate::presentation::handlers::admin::create_location,
        crate::presentation::handlers::admin::get_location,
        crate::presentation::handlers::admin::update_location,
        crate::presentation::handlers::admin::delete_location,
        crate::presentation::handlers::admin::list_posts,
        crate::presentation::handlers::admin::list_comments,
        crate::presentation::handlers::admin::delete_user
    ),
    components(
        schemas(
            RegisterDto,
            LoginDto,
            AuthResponseDto,
            UserDto,
            PostInputDto,
            PageQuery,
            AuthorDto,
            CategoryRefDto,
            LocationRefDto,
            PostDto,
            ListPostsResponseDto,
            ImageUploadDto,
            CommentInputDto,
            CommentDto,
            CategoryDto,
            CategoryPostsDto,
            LocationDto,
            LocationPostsDto,
            ProfileInputDto,
            PublicProfileDto,
            ProfilePageDto,
            CategoryInputDto,
            LocationInputDto
        )
    ),
    tags(
        (name = "auth", description = "Registration and login"),
        (name = "posts", description = "Posts and their images"),
        (name = "comments", description = "Comments under posts"),
        (name = "catalog", description = "Posts by category and location"),
        (name = "profile", description = "User profiles"),
        (name = "admin", description = "Staff-only moderation")
    ),
    modifiers(&SecurityAddon)
)]
pub(crate) struct ApiDoc;

pub(crate) struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let mut components = openapi.components.take().unwrap_or_default();
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
        openapi.components = Some(components);
    }
}
