use anyhow::Result;
use tracing::info;

mod application;
mod data;
mod domain;
mod infrastructure;
mod presentation;
mod server;

use domain::user::RegisterRequest;
use infrastructure::database::{create_pool, run_migrations};
use infrastructure::logging::init_logging;
use infrastructure::settings::Settings;
use presentation::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let settings = Settings::from_env()?;

    init_logging(&settings.log_level)?;

    let pool = create_pool(&settings.database_url, settings.database_max_connections).await?;
    run_migrations(&pool).await?;

    let state = AppState::new(pool, &settings)?;

    if let Some(admin) = &settings.admin {
        state
            .auth_service
            .ensure_admin(RegisterRequest {
                username: admin.username.clone(),
                email: admin.email.clone(),
                password: admin.password.clone(),
            })
            .await?;
    }

    info!(media_root = %settings.media_root.display(), "starting blogicum");
    server::run_http(&settings, state).await
}
