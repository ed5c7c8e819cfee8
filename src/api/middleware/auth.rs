//! HTTP Basic authentication middleware.

use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::Response,
};
use axum_auth::AuthBasic;

use crate::{error::AppError, state::AppState};

/// The single user allowed to create and delete mappings.
#[derive(Clone)]
pub struct BasicCredentials {
    user: String,
    password: String,
}

impl BasicCredentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }

    /// Returns `true` if the presented pair matches.
    pub fn verify(&self, user: &str, password: Option<&str>) -> bool {
        self.user == user && password == Some(self.password.as_str())
    }
}

impl std::fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}

/// Authenticates requests using the `Authorization: Basic` header.
///
/// # Header Format
///
/// ```text
/// Authorization: Basic base64(user:password)
/// ```
///
/// # Errors
///
/// Returns `401 Unauthorized` with a `WWW-Authenticate: Basic` challenge if the
/// header is missing, malformed, or carries the wrong credentials.
///
/// # Example
///
/// ```rust,ignore
/// let protected = Router::new()
///     .route("/url", post(save_handler))
///     .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer));
/// ```
pub async fn layer(
    State(st): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let AuthBasic((user, password)) = AuthBasic::from_request_parts(&mut parts, &())
        .await
        .map_err(|_| {
            AppError::unauthorized(
                "Unauthorized",
                serde_json::json!({"reason": "Authorization header is missing or invalid"}),
            )
        })?;

    if !st.credentials.verify(&user, password.as_deref()) {
        tracing::info!(user = %user, "rejected credentials");
        return Err(AppError::unauthorized(
            "Unauthorized",
            serde_json::json!({"reason": "Invalid credentials"}),
        ));
    }

    let req = Request::from_parts(parts, body);

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify() {
        let credentials = BasicCredentials::new("admin", "secret");

        assert!(credentials.verify("admin", Some("secret")));
        assert!(!credentials.verify("admin", Some("wrong")));
        assert!(!credentials.verify("admin", None));
        assert!(!credentials.verify("other", Some("secret")));
    }

    #[test]
    fn test_debug_masks_password() {
        let credentials = BasicCredentials::new("admin", "secret");
        let printed = format!("{credentials:?}");

        assert!(printed.contains("admin"));
        assert!(!printed.contains("secret"));
    }
}
