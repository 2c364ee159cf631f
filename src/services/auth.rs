use std::sync::Arc;

use tracing::instrument;

use crate::models::user::UserModel;
use crate::services::password::verify_password;
use crate::store::UserStore;

#[derive(Clone, Debug)]
pub struct AuthService {
    repo: Arc<dyn UserStore>,
}

impl AuthService {
    pub fn new(repo: Arc<dyn UserStore>) -> Self {
        Self { repo }
    }

    /// Every failure, including an unreachable store, comes back as `None`
    /// so callers cannot tell which part was wrong.
    #[instrument(
        name = "AuthService: Login attempt",
        skip(self, password),
        fields(user_email = %email)
    )]
    pub async fn login(&self, email: &str, password: &str) -> Option<UserModel> {
        // 1. Fetch User
        let user = match self.repo.find_by_email(email).await {
            Ok(Some(u)) => u,
            Ok(None) => {
                tracing::warn!("Login failed: User not found");
                return None;
            }
            Err(e) => {
                tracing::error!("Database error during login: {:?}", e);
                return None;
            }
        };

        // 2. Verify Password
        match verify_password(&user.password_hash, password) {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!("Login failed: Invalid password provided");
                return None;
            }
            Err(e) => {
                tracing::error!("Critical: Failed to parse password hash from DB: {:?}", e);
                return None;
            }
        }

        tracing::info!(user_id = user.id, "User authenticated successfully");
        Some(user)
    }

    /// Loads the user a session points at. A missing row or a store error both
    /// mean "not logged in".
    #[instrument(name = "AuthService: Resolve session user", skip(self))]
    pub async fn current_user(&self, user_id: i64) -> Option<UserModel> {
        match self.repo.find_by_id(user_id).await {
            Ok(Some(user)) => Some(user),
            Ok(None) => {
                tracing::warn!("Session refers to a user that no longer exists");
                None
            }
            Err(e) => {
                tracing::error!("Database error while loading session user: {:?}", e);
                None
            }
        }
    }
}
