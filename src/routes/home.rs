use askama::Template;
use axum::extract::State;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;
use tracing::instrument;

use crate::errors::AuthError;
use crate::routes::auth::session_user;
use crate::routes::flash::Flash;
use crate::startup::AppState;

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    message: &'static str,
    version: &'static str,
    flash: Option<Flash>,
}

#[instrument(name = "Web: Index GET", skip(state, jar))]
pub async fn index(State(state): State<AppState>, jar: CookieJar) -> Result<Response, AuthError> {
    state.seeder.ensure_seeded().await;
    if session_user(&state, &jar).await.is_some() {
        return Ok(Redirect::to("/dashboard").into_response());
    }

    let (jar, flash) = Flash::take(jar);
    let template = IndexTemplate {
        message: "Welcome to Doorman",
        version: env!("CARGO_PKG_VERSION"),
        flash,
    };
    Ok((jar, Html(template.render()?)).into_response())
}
