#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use doorman::configuration::{ApplicationSettings, SeedSettings};
use doorman::models::user::{NewUser, UserModel};
use doorman::routes::csrf::CSRF_COOKIE;
use doorman::services::password::hash_password;
use doorman::startup::{AppState, router};
use doorman::store::UserStore;
use http_body_util::BodyExt;
use secrecy::SecretString;
use tower::ServiceExt;

/// `users` table stand-in with switches for simulating an unreachable database.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: Mutex<Vec<UserModel>>,
    offline: AtomicBool,
    failures_left: AtomicU32,
    pub email_lookups: AtomicU32,
    pub count_calls: AtomicU32,
    pub batch_inserts: AtomicU32,
}

impl MemoryUserStore {
    pub fn with_user(name: &str, email: &str, password: &str) -> Self {
        let store = Self::default();
        store.add(name, email, password);
        store
    }

    pub fn add(&self, name: &str, email: &str, password: &str) -> i64 {
        self.add_with_hash(name, email, &hash_password(password).unwrap())
    }

    /// Stores `password_hash` verbatim, even if it is not a valid PHC string.
    pub fn add_with_hash(&self, name: &str, email: &str, password_hash: &str) -> i64 {
        let mut users = self.users.lock().unwrap();
        let id = users.iter().map(|u| u.id).max().unwrap_or(0) + 1;
        users.push(UserModel {
            id,
            name: name.into(),
            email: email.into(),
            password_hash: password_hash.into(),
        });
        id
    }

    pub fn remove(&self, email: &str) {
        self.users.lock().unwrap().retain(|u| u.email != email);
    }

    pub fn users(&self) -> Vec<UserModel> {
        self.users.lock().unwrap().clone()
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// The next `n` seed-related calls fail.
    pub fn fail_next(&self, n: u32) {
        self.failures_left.store(n, Ordering::SeqCst);
    }

    fn check_online(&self) -> anyhow::Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            anyhow::bail!("connection refused");
        }
        Ok(())
    }

    fn check_transient(&self) -> anyhow::Result<()> {
        self.check_online()?;
        let consumed = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        if consumed.is_ok() {
            anyhow::bail!("transient failure");
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<UserModel>> {
        self.email_lookups.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<UserModel>> {
        self.check_online()?;
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn count(&self) -> anyhow::Result<i64> {
        self.count_calls.fetch_add(1, Ordering::SeqCst);
        self.check_transient()?;
        Ok(self.users.lock().unwrap().len() as i64)
    }

    async fn insert_batch(&self, batch: &[NewUser]) -> anyhow::Result<()> {
        self.batch_inserts.fetch_add(1, Ordering::SeqCst);
        self.check_transient()?;
        let mut users = self.users.lock().unwrap();
        if batch
            .iter()
            .any(|new| users.iter().any(|u| u.email == new.email))
        {
            anyhow::bail!("duplicate key value violates unique constraint \"users_email_key\"");
        }
        for new in batch {
            let id = users.iter().map(|u| u.id).max().unwrap_or(0) + 1;
            users.push(UserModel {
                id,
                name: new.name.clone(),
                email: new.email.clone(),
                password_hash: new.password_hash.clone(),
            });
        }
        Ok(())
    }

    async fn insert_if_absent(&self, new: &NewUser) -> anyhow::Result<bool> {
        self.check_online()?;
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == new.email) {
            return Ok(false);
        }
        let id = users.iter().map(|u| u.id).max().unwrap_or(0) + 1;
        users.push(UserModel {
            id,
            name: new.name.clone(),
            email: new.email.clone(),
            password_hash: new.password_hash.clone(),
        });
        Ok(true)
    }
}

pub fn test_seed_settings(max_attempts: u32) -> SeedSettings {
    SeedSettings {
        max_attempts,
        retry_delay_millis: 0,
    }
}

pub fn test_application_settings() -> ApplicationSettings {
    ApplicationSettings {
        host: "127.0.0.1".into(),
        port: 0,
        session_secret: SecretString::from("test-session-secret".to_string()),
        session_ttl_hours: 1,
        secure_cookies: false,
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub set_cookies: Vec<String>,
    pub body: String,
}

impl TestResponse {
    pub fn set_cookie(&self, name: &str) -> Option<&String> {
        let prefix = format!("{name}=");
        self.set_cookies.iter().find(|c| c.starts_with(&prefix))
    }
}

/// Drives the router in-process and keeps cookies between requests like a browser.
pub struct TestApp {
    pub store: Arc<MemoryUserStore>,
    pub state: AppState,
    router: Router,
    cookies: HashMap<String, String>,
}

impl TestApp {
    pub fn new(store: MemoryUserStore) -> Self {
        Self::with_settings(store, test_application_settings())
    }

    pub fn with_settings(store: MemoryUserStore, application: ApplicationSettings) -> Self {
        let store = Arc::new(store);
        let state = AppState::new(store.clone(), &application, test_seed_settings(5));
        Self {
            store,
            router: router(state.clone()),
            state,
            cookies: HashMap::new(),
        }
    }

    pub fn cookie(&self, name: &str) -> Option<&String> {
        self.cookies.get(name)
    }

    pub fn set_cookie(&mut self, name: &str, value: &str) {
        self.cookies.insert(name.into(), value.into());
    }

    pub async fn get(&mut self, path: &str) -> TestResponse {
        let request = Request::builder()
            .uri(path)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    /// Submits the login form the way a browser would: loads `/login` first
    /// when no CSRF cookie is held yet, then posts its token back.
    pub async fn post_login(&mut self, email: &str, password: &str) -> TestResponse {
        if self.cookie(CSRF_COOKIE).is_none() {
            self.get("/login").await;
        }
        let token = self.cookie(CSRF_COOKIE).cloned();
        self.post_login_with_token(email, password, token.as_deref())
            .await
    }

    pub async fn post_login_with_token(
        &mut self,
        email: &str,
        password: &str,
        csrf_token: Option<&str>,
    ) -> TestResponse {
        let mut body = format!(
            "email={}&password={}",
            email.replace('@', "%40"),
            password
        );
        if let Some(token) = csrf_token {
            body.push_str(&format!("&csrf_token={token}"));
        }
        let request = Request::builder()
            .method("POST")
            .uri("/login")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    async fn send(&mut self, mut request: Request<Body>) -> TestResponse {
        if !self.cookies.is_empty() {
            let cookie_header = self
                .cookies
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join("; ");
            request
                .headers_mut()
                .insert(header::COOKIE, cookie_header.parse().unwrap());
        }

        let response = self.router.clone().oneshot(request).await.unwrap();

        let mut set_cookies = Vec::new();
        for set_cookie in response.headers().get_all(header::SET_COOKIE) {
            let raw = set_cookie.to_str().unwrap();
            set_cookies.push(raw.to_string());
            let pair = raw.split(';').next().unwrap();
            let (name, value) = pair.split_once('=').unwrap();
            if value.is_empty() || raw.contains("Max-Age=0") {
                self.cookies.remove(name.trim());
            } else {
                self.cookies.insert(name.trim().into(), value.into());
            }
        }

        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = response.into_body().collect().await.unwrap().to_bytes();

        TestResponse {
            status,
            location,
            set_cookies,
            body: String::from_utf8(bytes.to_vec()).unwrap(),
        }
    }
}
