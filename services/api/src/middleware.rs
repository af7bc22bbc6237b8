//! Bearer-token authentication and role checks

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use domain::Role;
use jsonwebtoken::get_current_timestamp;
use tracing::{error, warn};

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

/// The caller behind a validated access token
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
    pub login: String,
    pub role: Role,
    pub token_id: String,
    pub expires_at: u64,
}

impl AuthUser {
    /// Fail with 403 unless the caller has one of `roles`
    pub fn require_any(&self, roles: &[Role]) -> ApiResult<()> {
        if roles.contains(&self.role) {
            Ok(())
        } else {
            warn!(
                "User {} ({}) denied an operation reserved for {:?}",
                self.login, self.role, roles
            );
            Err(ApiError::Forbidden(format!(
                "Role {} is not allowed to perform this operation",
                self.role
            )))
        }
    }

    pub fn remaining_lifetime(&self) -> u64 {
        self.expires_at.saturating_sub(get_current_timestamp())
    }
}

/// Authentication middleware
///
/// Rejects missing, malformed, expired and revoked tokens, and tokens of
/// users that no longer exist.
pub async fn auth_middleware(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let TypedHeader(Authorization(bearer)) = bearer.ok_or(ApiError::Unauthorized)?;

    let claims = state.jwt.validate(bearer.token()).map_err(|e| {
        warn!("Rejected access token: {}", e);
        ApiError::Unauthorized
    })?;

    let revoked = state
        .revocations
        .is_revoked(&claims.jti)
        .await
        .map_err(|e| {
            error!("Failed to check token revocation: {}", e);
            ApiError::InternalServerError
        })?;
    if revoked {
        warn!("Rejected revoked token of {}", claims.login);
        return Err(ApiError::Unauthorized);
    }

    let user_id = claims.user_id().ok_or(ApiError::Unauthorized)?;
    let user = state
        .directory
        .find_user(user_id)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    req.extensions_mut().insert(AuthUser {
        id: user.id,
        login: user.login,
        role: user.role,
        token_id: claims.jti,
        expires_at: claims.exp,
    });

    Ok(next.run(req).await)
}
