use askama::Template;
use axum::Form;
use axum::extract::{FromRequestParts, State};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::Html;
use axum::response::IntoResponse;
use axum::response::Redirect;
use axum::response::Response;
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::Cookie;
use tracing::instrument;

use crate::errors::AuthError;
use crate::models::login::{FieldErrors, LoginForm};
use crate::models::user::UserModel;
use crate::routes::csrf::{issue_csrf, validate_csrf};
use crate::routes::flash::Flash;
use crate::services::session::SESSION_COOKIE;
use crate::startup::AppState;

const GENERIC_LOGIN_ERROR: &str = "Invalid email or password.";

#[derive(Template)]
#[template(path = "login.html")]
struct LoginTemplate {
    email: String,
    csrf_token: String,
    errors: FieldErrors,
    error: Option<&'static str>,
    flash: Option<Flash>,
}

impl LoginTemplate {
    fn new(csrf_token: String) -> Self {
        Self {
            email: String::new(),
            csrf_token,
            errors: FieldErrors::default(),
            error: None,
            flash: None,
        }
    }
}

/// The user behind a valid session cookie. Handlers taking this argument are
/// only reachable when logged in; everyone else is sent to `/login`.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserModel);

/// Rejection for [`CurrentUser`].
pub struct LoginRedirect;

impl IntoResponse for LoginRedirect {
    fn into_response(self) -> Response {
        let jar = Flash::LoginRequired.set(CookieJar::new());
        (jar, Redirect::to("/login")).into_response()
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = LoginRedirect;

    #[instrument(name = "Extracting current user", skip(parts, state))]
    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        match session_user(state, &jar).await {
            Some(user) => Ok(CurrentUser(user)),
            None => Err(LoginRedirect),
        }
    }
}

/// Resolves the session cookie in `jar` to a user row.
pub async fn session_user(state: &AppState, jar: &CookieJar) -> Option<UserModel> {
    let token = jar.get(SESSION_COOKIE)?.value().to_string();
    let claims = state.sessions.verify(&token)?;
    let Some(user_id) = claims.user_id() else {
        tracing::warn!("Session subject is not a user id: {}", claims);
        return None;
    };
    state.auth_service.current_user(user_id).await
}

#[instrument(name = "Web: Login GET", skip(state, jar))]
pub async fn login_page(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Response, AuthError> {
    state.seeder.ensure_seeded().await;
    if session_user(&state, &jar).await.is_some() {
        return Ok(Redirect::to("/dashboard").into_response());
    }

    let (jar, flash) = Flash::take(jar);
    let (jar, csrf_token) = issue_csrf(jar, state.sessions.is_secure());
    let page = LoginTemplate {
        flash,
        ..LoginTemplate::new(csrf_token)
    }
    .render()?;
    Ok((jar, Html(page)).into_response())
}

#[instrument(name = "Web: Login POST", skip(state, jar, payload), fields(user_email = %payload.email()))]
pub async fn login_post(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(payload): Form<LoginForm>,
) -> Result<Response, AuthError> {
    tracing::info!("Request to login user received!");
    state.seeder.ensure_seeded().await;
    if session_user(&state, &jar).await.is_some() {
        return Ok(Redirect::to("/dashboard").into_response());
    }

    // 1. Reject posts that did not come from our own form
    if let Err(e) = validate_csrf(&jar, &payload.csrf_token) {
        tracing::warn!("Login rejected: {:?} CSRF token", e);
        let (jar, csrf_token) = issue_csrf(jar, state.sessions.is_secure());
        let page = LoginTemplate {
            email: payload.email().to_string(),
            error: Some(e.message()),
            ..LoginTemplate::new(csrf_token)
        }
        .render()?;
        return Ok((StatusCode::BAD_REQUEST, jar, Html(page)).into_response());
    }

    // 2. Validate the form before touching the store
    let errors = payload.validate();
    if !errors.is_empty() {
        let page = LoginTemplate {
            email: payload.email().to_string(),
            errors,
            ..LoginTemplate::new(payload.csrf_token.clone())
        }
        .render()?;
        return Ok(Html(page).into_response());
    }

    // 3. Verify credentials via service
    let Some(user) = state
        .auth_service
        .login(payload.email(), &payload.password)
        .await
    else {
        let page = LoginTemplate {
            email: payload.email().to_string(),
            error: Some(GENERIC_LOGIN_ERROR),
            ..LoginTemplate::new(payload.csrf_token.clone())
        }
        .render()?;
        return Ok(Html(page).into_response());
    };

    // 4. Set HttpOnly session cookie and redirect to the dashboard
    let token = state.sessions.issue(user.id)?;
    let jar = Flash::LoggedIn.set(jar.add(state.sessions.cookie(token)));

    Ok((jar, Redirect::to("/dashboard")).into_response())
}

#[instrument(name = "Web: Logout GET", skip(jar, user), fields(user_id = user.0.id))]
pub async fn logout_handler(user: CurrentUser, jar: CookieJar) -> impl IntoResponse {
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    tracing::info!("User logged out");
    (Flash::LoggedOut.set(jar), Redirect::to("/"))
}
