//! Authentication handlers.

use actix_web::{HttpResponse, web};

use justdo_core::services::{AuthOutcome, Credentials};
use justdo_shared::dto::{AuthResponse, CredentialsRequest, UserResponse};

use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /api/auth/register
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<CredentialsRequest>,
) -> AppResult<HttpResponse> {
    let outcome = state.auth.register(credentials(body.into_inner())).await?;
    Ok(HttpResponse::Created().json(auth_response(outcome)))
}

/// POST /api/auth/login
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<CredentialsRequest>,
) -> AppResult<HttpResponse> {
    let outcome = state.auth.login(credentials(body.into_inner())).await?;
    Ok(HttpResponse::Ok().json(auth_response(outcome)))
}

fn credentials(req: CredentialsRequest) -> Credentials {
    Credentials {
        email: req.email,
        password: req.password,
    }
}

fn auth_response(outcome: AuthOutcome) -> AuthResponse {
    AuthResponse {
        token: outcome.token,
        user: UserResponse {
            id: outcome.user.id,
            email: outcome.user.email,
            created_at: outcome.user.created_at,
        },
    }
}
