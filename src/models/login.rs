use serde::Deserialize;

pub const REQUIRED: &str = "This field is required.";
pub const INVALID_EMAIL: &str = "Invalid email address.";

/// Fields posted by the login form. Missing fields decode as empty strings so
/// they are reported as validation errors instead of a form rejection.
#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub csrf_token: String,
}

#[derive(Debug, Default, PartialEq)]
pub struct FieldErrors {
    pub email: Option<&'static str>,
    pub password: Option<&'static str>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.password.is_none()
    }
}

impl LoginForm {
    pub fn email(&self) -> &str {
        self.email.trim()
    }

    pub fn validate(&self) -> FieldErrors {
        let email = if self.email().is_empty() {
            Some(REQUIRED)
        } else if !looks_like_email(self.email()) {
            Some(INVALID_EMAIL)
        } else {
            None
        };
        let password = self.password.is_empty().then_some(REQUIRED);

        FieldErrors { email, password }
    }
}

/// `local@domain.tld`, no whitespace, exactly one `@`.
fn looks_like_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}
