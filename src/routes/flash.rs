use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};

pub const FLASH_COOKIE: &str = "flash";

/// A notice shown once on the page after a redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flash {
    LoggedIn,
    LoggedOut,
    LoginRequired,
}

impl Flash {
    fn as_str(&self) -> &'static str {
        match self {
            Flash::LoggedIn => "logged_in",
            Flash::LoggedOut => "logged_out",
            Flash::LoginRequired => "login_required",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "logged_in" => Some(Flash::LoggedIn),
            "logged_out" => Some(Flash::LoggedOut),
            "login_required" => Some(Flash::LoginRequired),
            _ => None,
        }
    }

    pub fn category(&self) -> &'static str {
        match self {
            Flash::LoggedIn => "success",
            Flash::LoggedOut => "info",
            Flash::LoginRequired => "warning",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Flash::LoggedIn => "You have logged in successfully.",
            Flash::LoggedOut => "You have been logged out.",
            Flash::LoginRequired => "Please log in to access this page.",
        }
    }

    pub fn set(self, jar: CookieJar) -> CookieJar {
        let cookie = Cookie::build((FLASH_COOKIE, self.as_str()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax);
        jar.add(cookie)
    }

    /// Reads the pending flash, if any, and clears it from the jar.
    pub fn take(jar: CookieJar) -> (CookieJar, Option<Flash>) {
        let Some(value) = jar.get(FLASH_COOKIE).map(|c| c.value().to_string()) else {
            return (jar, None);
        };
        let jar = jar.remove(Cookie::build(FLASH_COOKIE).path("/"));
        (jar, Flash::parse(&value))
    }
}
