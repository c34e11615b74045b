use std::sync::Arc;

use anyhow::Result;
use sqlx::PgPool;

use crate::application::auth_service::AuthService;
use crate::application::blog_service::BlogService;
use crate::application::catalog_service::CatalogService;
use crate::application::profile_service::ProfileService;
use crate::data::repositories::postgres::category_repository::PostgresCategoryRepository;
use crate::data::repositories::postgres::comment_repository::PostgresCommentRepository;
use crate::data::repositories::postgres::location_repository::PostgresLocationRepository;
use crate::data::repositories::postgres::post_repository::PostgresPostRepository;
use crate::data::repositories::postgres::user_repository::PostgresUserRepository;
use crate::infrastructure::jwt::JwtService;
use crate::infrastructure::media::MediaStorage;
use crate::infrastructure::settings::Settings;
use crate::infrastructure::templates::PageRenderer;

pub(crate) mod app_error;
pub(crate) mod handlers;
pub(crate) mod http_handlers;
pub(crate) mod middleware;
pub(crate) mod openapi;
pub(crate) mod routes;

pub(crate) type PgAuthService = AuthService<PostgresUserRepository>;
pub(crate) type PgProfileService = ProfileService<PostgresUserRepository>;
pub(crate) type PgBlogService = BlogService<PostgresPostRepository, PostgresCommentRepository>;
pub(crate) type PgCatalogService =
    CatalogService<PostgresCategoryRepository, PostgresLocationRepository>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) auth_service: Arc<PgAuthService>,
    pub(crate) profile_service: Arc<PgProfileService>,
    pub(crate) blog_service: Arc<PgBlogService>,
    pub(crate) catalog_service: Arc<PgCatalogService>,
    pub(crate) jwt: Arc<JwtService>,
    pub(crate) pages: Arc<PageRenderer>,
    pub(crate) media: Arc<MediaStorage>,
    pub(crate) trusted_origins: Arc<Vec<String>>,
    pub(crate) posts_per_page: u32,
}

impl AppState {
    /// Wires the Postgres repositories into the services.
    pub(crate) fn new(pool: PgPool, settings: &Settings) -> Result<Self> {
        let jwt = JwtService::new(&settings.jwt_secret, settings.jwt_ttl_seconds);
        let pages = PageRenderer::new()?;

        Ok(Self {
            auth_service: Arc::new(AuthService::new(
                PostgresUserRepository::new(pool.clone()),
                jwt.clone(),
            )),
            profile_service: Arc::new(ProfileService::new(PostgresUserRepository::new(
                pool.clone(),
            ))),
            blog_service: Arc::new(BlogService::new(
                PostgresPostRepository::new(pool.clone()),
                PostgresCommentRepository::new(pool.clone()),
            )),
            catalog_service: Arc::new(CatalogService::new(
                PostgresCategoryRepository::new(pool.clone()),
                PostgresLocationRepository::new(pool),
            )),
            jwt: Arc::new(jwt),
            pages: Arc::new(pages),
            media: Arc::new(MediaStorage::new(
                settings.media_root.clone(),
                settings.media_max_upload_bytes,
            )),
            trusted_origins: Arc::new(settings.cors_origins.clone()),
            posts_per_page: settings.posts_per_page,
        })
    }
}
