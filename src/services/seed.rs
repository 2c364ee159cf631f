use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::instrument;

use crate::configuration::SeedSettings;
use crate::models::user::NewUser;
use crate::services::password::hash_password;
use crate::store::UserStore;

pub struct DemoUser {
    pub name: &'static str,
    pub email: &'static str,
    pub password: &'static str,
}

pub const DEMO_USERS: [DemoUser; 2] = [
    DemoUser {
        name: "山田太郎",
        email: "yamada@example.com",
        password: "password123",
    },
    DemoUser {
        name: "佐藤花子",
        email: "sato@example.com",
        password: "password123",
    },
];

impl DemoUser {
    pub fn to_new_user(&self) -> anyhow::Result<NewUser> {
        Ok(NewUser {
            name: self.name.to_string(),
            email: self.email.to_string(),
            password_hash: hash_password(self.password)?,
        })
    }
}

/// Puts the demo accounts into an empty `users` table, at most once per process.
#[derive(Clone, Debug)]
pub struct Seeder {
    repo: Arc<dyn UserStore>,
    settings: SeedSettings,
    completed: Arc<Mutex<bool>>,
}

impl Seeder {
    pub fn new(repo: Arc<dyn UserStore>, settings: SeedSettings) -> Self {
        Self {
            repo,
            settings,
            completed: Arc::new(Mutex::new(false)),
        }
    }

    pub async fn is_completed(&self) -> bool {
        *self.completed.lock().await
    }

    /// Returns whether seeding has succeeded, now or on an earlier call.
    ///
    /// The lock is held across all attempts, so concurrent callers wait for the
    /// first one instead of seeding twice.
    #[instrument(name = "Seeder: Ensure demo users", skip(self))]
    pub async fn ensure_seeded(&self) -> bool {
        let mut completed = self.completed.lock().await;
        if *completed {
            return true;
        }

        let attempts = self.settings.max_attempts.max(1);
        for attempt in 1..=attempts {
            match self.seed_if_empty().await {
                Ok(inserted) => {
                    tracing::info!(inserted, attempt, "Demo user seeding complete");
                    *completed = true;
                    return true;
                }
                Err(e) => {
                    tracing::warn!(attempt, attempts, "Demo user seeding failed: {:?}", e);
                    if attempt < attempts {
                        tokio::time::sleep(self.settings.retry_delay()).await;
                    }
                }
            }
        }

        tracing::error!("Giving up on demo user seeding until the next request");
        false
    }

    /// One attempt. Returns the number of rows inserted.
    async fn seed_if_empty(&self) -> anyhow::Result<usize> {
        if self.repo.count().await? > 0 {
            return Ok(0);
        }

        let users = DEMO_USERS
            .iter()
            .map(DemoUser::to_new_user)
            .collect::<anyhow::Result<Vec<_>>>()?;
        self.repo.insert_batch(&users).await?;

        for user in &users {
            tracing::info!("Created demo user: {} ({})", user.name, user.email);
        }
        Ok(users.len())
    }
}
