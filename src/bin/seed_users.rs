//! Prepares a database by hand: applies migrations, then inserts each demo
//! account unless its email is already registered.

use doorman::{
    configuration::get_configuration,
    services::seed::DEMO_USERS,
    store::{UserRepository, UserStore},
    telemetry::{get_subscriber, init_subscriber},
};
use sqlx::postgres::PgPoolOptions;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let subscriber = get_subscriber("seed_users".into(), "info".into(), None, std::io::stdout)?;
    init_subscriber(subscriber)?;

    let cfg = get_configuration()?;
    let pool = PgPoolOptions::new()
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect_with(cfg.database.with_db())
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    let repo = UserRepository::new(pool);
    for demo in &DEMO_USERS {
        let user = demo.to_new_user()?;
        if repo.insert_if_absent(&user).await? {
            tracing::info!("Created user: {} ({})", user.name, user.email);
        } else {
            tracing::info!("Skipped existing user: {}", user.email);
        }
    }

    tracing::info!("Demo users are in place");
    Ok(())
}
