pub mod user;

use async_trait::async_trait;

use crate::models::user::{NewUser, UserModel};

pub use user::UserRepository;

/// Read access to the `users` table plus the writes the demo seed needs.
#[async_trait]
pub trait UserStore: std::fmt::Debug + Send + Sync {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<UserModel>>;

    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<UserModel>>;

    async fn count(&self) -> anyhow::Result<i64>;

    /// Inserts every row or none of them.
    async fn insert_batch(&self, users: &[NewUser]) -> anyhow::Result<()>;

    /// Inserts the row unless its email is already taken. Returns whether a row was written.
    async fn insert_if_absent(&self, user: &NewUser) -> anyhow::Result<bool>;
}
