use std::sync::Arc;

use axum::{Router, routing::get};
use secrecy::ExposeSecret;
use sqlx::postgres::PgPoolOptions;
use tower_http::services::ServeDir;

use crate::configuration::{ApplicationSettings, SeedSettings, Settings};
use crate::routes::auth::{login_page, login_post, logout_handler};
use crate::routes::dashboard::dashboard_handler;
use crate::routes::home::index;
use crate::services::auth::AuthService;
use crate::services::seed::Seeder;
use crate::services::session::SessionManager;
use crate::store::{UserRepository, UserStore};

#[derive(Clone, Debug)]
pub struct AppState {
    pub auth_service: AuthService,
    pub seeder: Seeder,
    pub sessions: SessionManager,
}

impl AppState {
    pub fn new(
        repo: Arc<dyn UserStore>,
        application: &ApplicationSettings,
        seed: SeedSettings,
    ) -> Self {
        let sessions = SessionManager::new(
            application.session_secret.expose_secret().as_bytes(),
            chrono::Duration::hours(application.session_ttl_hours),
        )
        .with_secure(application.secure_cookies);
        Self {
            auth_service: AuthService::new(repo.clone()),
            seeder: Seeder::new(repo, seed),
            sessions,
        }
    }
}

pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/login", get(login_page).post(login_post))
        .route("/dashboard", get(dashboard_handler))
        .route("/logout", get(logout_handler))
        .nest_service("/assets", ServeDir::new("public"))
        .with_state(app_state)
}

pub async fn run(cfg: Settings) -> anyhow::Result<()> {
    let pg_pool = PgPoolOptions::new()
        .acquire_timeout(std::time::Duration::from_secs(2))
        .connect_lazy_with(cfg.database.with_db());

    let user_repo: Arc<dyn UserStore> = Arc::new(UserRepository::new(pg_pool));
    let app_state = AppState::new(user_repo, &cfg.application, cfg.seed.clone());

    // First seeding attempt happens in the background; requests that arrive
    // meanwhile wait on the seed lock.
    let seeder = app_state.seeder.clone();
    tokio::spawn(async move {
        seeder.ensure_seeded().await;
    });

    let app = router(app_state);

    let address = format!("{}:{}", cfg.application.host, cfg.application.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!("Listening on {}", address);
    axum::serve(listener, app).await?;
    Ok(())
}
