use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::api::extract::JsonBody;
use crate::api::AppState;
use crate::config::AdminCredentials;
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: UserProfile,
}

/// Profile the dashboard keeps client-side after a successful login.
#[derive(Debug, Serialize)]
pub struct UserProfile {
    pub email: String,
    pub name: String,
}

fn digest(value: &str) -> [u8; 32] {
    Sha256::digest(value.as_bytes()).into()
}

/// Compare submitted credentials against the configured admin.
///
/// Email is matched case-insensitively; both sides are hashed so the
/// comparison length does not depend on the submitted input.
fn credentials_match(admin: &AdminCredentials, email: &str, password: &str) -> bool {
    let email_ok = digest(&admin.email.to_lowercase()) == digest(&email.trim().to_lowercase());
    let password_ok = digest(&admin.password) == digest(password);
    email_ok & password_ok
}

pub async fn login(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let Some(admin) = state.config.admin.as_ref() else {
        tracing::warn!("Login attempted but no admin credentials are configured");
        return Err(AppError::Unauthorized("login is disabled".into()));
    };

    if !credentials_match(admin, &request.email, &request.password) {
        tracing::info!(email = %request.email, "Login rejected");
        return Err(AppError::Unauthorized("invalid email or password".into()));
    }

    tracing::info!(email = %admin.email, "Login succeeded");
    Ok(Json(LoginResponse {
        user: UserProfile {
            email: admin.email.clone(),
            name: admin.name.clone(),
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> AdminCredentials {
        AdminCredentials {
            email: "Ops@Studio.example".to_string(),
            password: "correct horse".to_string(),
            name: "Ops".to_string(),
        }
    }

    #[test]
    fn test_credentials_match() {
        assert!(credentials_match(&admin(), "ops@studio.example", "correct horse"));
        assert!(credentials_match(&admin(), " OPS@studio.example ", "correct horse"));
        assert!(!credentials_match(&admin(), "ops@studio.example", "Correct horse"));
        assert!(!credentials_match(&admin(), "someone@else.example", "correct horse"));
    }
}
