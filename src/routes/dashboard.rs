use askama::Template;
use axum::response::{Html, IntoResponse};
use axum_extra::extract::CookieJar;
use tracing::instrument;

use crate::errors::AuthError;
use crate::routes::auth::CurrentUser;
use crate::routes::flash::Flash;

#[derive(Template)]
#[template(path = "dashboard.html")]
struct DashboardTemplate {
    name: String,
    email: String,
    flash: Option<Flash>,
}

#[instrument(name = "Web: Dashboard GET", skip(user, jar), fields(user_id = user.id))]
pub async fn dashboard_handler(
    CurrentUser(user): CurrentUser, // Authenticated user
    jar: CookieJar,
) -> Result<impl IntoResponse, AuthError> {
    let (jar, flash) = Flash::take(jar);
    let template = DashboardTemplate {
        name: user.name,
        email: user.email,
        flash,
    };
    Ok((jar, Html(template.render()?)))
}
