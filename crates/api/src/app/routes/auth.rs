use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;

use supplyline_auth::{NewUser, User};
use supplyline_core::DomainError;
use supplyline_store::Store;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::AuthContext;

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::RegisterRequest>,
) -> axum::response::Response {
    let user = match User::register(
        NewUser {
            email: body.email,
            password: body.password,
            first_name: body.first_name,
            last_name: body.last_name,
            role: body.role,
        },
        Utc::now(),
    ) {
        Ok(u) => u,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let user = match services.store.insert_user(user).await {
        Ok(u) => u,
        Err(e) => return errors::domain_error_to_response(e),
    };

    issue_session(&services, &user)
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::LoginRequest>,
) -> axum::response::Response {
    // Same normalization register applies, so case never locks anyone out.
    let email = body.email.trim().to_lowercase();
    let user = match services.store.user_by_email(&email).await {
        Ok(Some(u)) => u,
        Ok(None) => return invalid_credentials(),
        Err(e) => return errors::domain_error_to_response(e),
    };

    if !user.verify_password(&body.password) {
        return invalid_credentials();
    }

    issue_session(&services, &user)
}

pub async fn profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
) -> axum::response::Response {
    match services.store.user(ctx.user_id()).await {
        Ok(user) => (StatusCode::OK, Json(user.profile())).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

fn issue_session(services: &AppServices, user: &User) -> axum::response::Response {
    let token = match services.tokens.issue(user, Utc::now()) {
        Ok(t) => t,
        Err(e) => return errors::domain_error_to_response(e),
    };

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "accessToken": token,
            "user": user.profile(),
        })),
    )
        .into_response()
}

fn invalid_credentials() -> axum::response::Response {
    errors::domain_error_to_response(DomainError::unauthorized("invalid credentials"))
}
