use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use tracing::instrument;

use crate::models::user::{NewUser, UserModel};
use crate::store::UserStore;

#[derive(Clone, Debug)]
pub struct UserRepository {
    pool: Pool<Postgres>,
}

impl UserRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    #[instrument(name = "Fetching user by email from database", skip(self))]
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<UserModel>> {
        let user = sqlx::query_as::<_, UserModel>(
            r#"SELECT id, name, email, password_hash FROM users WHERE email = $1"#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch user: {:?}", e);
            e
        })?;
        Ok(user)
    }

    #[instrument(name = "Fetching user by id from database", skip(self))]
    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<UserModel>> {
        let user = sqlx::query_as::<_, UserModel>(
            r#"SELECT id, name, email, password_hash FROM users WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch user: {:?}", e);
            e
        })?;
        Ok(user)
    }

    #[instrument(name = "Counting users", skip(self))]
    async fn count(&self) -> anyhow::Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    #[instrument(name = "Saving user batch to database", skip(self, users), fields(rows = users.len()))]
    async fn insert_batch(&self, users: &[NewUser]) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;
        for user in users {
            sqlx::query("INSERT INTO users (name, email, password_hash) VALUES ($1, $2, $3)")
                .bind(&user.name)
                .bind(&user.email)
                .bind(&user.password_hash)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to execute query: {:?}", e);
                    e
                })?;
        }
        tx.commit().await?;
        Ok(())
    }

    #[instrument(name = "Saving user unless present", skip(self, user), fields(email = %user.email))]
    async fn insert_if_absent(&self, user: &NewUser) -> anyhow::Result<bool> {
        let result = sqlx::query(
            "INSERT INTO users (name, email, password_hash) VALUES ($1, $2, $3) \
             ON CONFLICT (email) DO NOTHING",
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}
