use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use rand::{Rng, distr::Alphanumeric};

pub const CSRF_COOKIE: &str = "csrf_token";
const TOKEN_LEN: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsrfError {
    Missing,
    Mismatch,
}

impl CsrfError {
    pub fn message(&self) -> &'static str {
        match self {
            CsrfError::Missing => "The CSRF token is missing.",
            CsrfError::Mismatch => "The CSRF token is invalid.",
        }
    }
}

fn generate_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect()
}

/// Returns the token the form should embed, creating and storing one in the
/// jar when the browser has none yet.
pub fn issue_csrf(jar: CookieJar, secure: bool) -> (CookieJar, String) {
    if let Some(existing) = jar.get(CSRF_COOKIE).map(|c| c.value().to_string()) {
        if !existing.is_empty() {
            return (jar, existing);
        }
    }

    let token = generate_token();
    let cookie = Cookie::build((CSRF_COOKIE, token.clone()))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict);
    (jar.add(cookie), token)
}

/// Validate that the cookie token exists and matches the submitted one.
pub fn validate_csrf(jar: &CookieJar, submitted: &str) -> Result<(), CsrfError> {
    let Some(stored) = jar.get(CSRF_COOKIE).map(|c| c.value()) else {
        return Err(CsrfError::Missing);
    };
    if submitted.is_empty() || stored.is_empty() {
        return Err(CsrfError::Missing);
    }
    if stored != submitted {
        return Err(CsrfError::Mismatch);
    }
    Ok(())
}
