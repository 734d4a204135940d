use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use chrono::Utc;
use tracing::warn;

use crate::errors::AppError;
use crate::models::user::{UserRecord, UserRole};
use crate::state::AppState;

/// The account behind the request's `Authorization: Bearer <token>` header.
/// Missing, unknown or expired tokens are rejected with 401.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: UserRecord,
    pub token: String,
}

impl CurrentUser {
    /// 403 unless the account has `role`.
    pub fn require(&self, role: UserRole) -> Result<(), AppError> {
        if self.user.role == role {
            Ok(())
        } else {
            warn!(
                "user {} ({}) denied access to a {} route",
                self.user.id,
                self.user.role.as_str(),
                role.as_str()
            );
            Err(AppError::Forbidden)
        }
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AppError::Unauthorized)?.to_string();

        let session = state
            .store
            .find_session(&token)
            .await?
            .ok_or(AppError::Unauthorized)?;
        if session.is_expired(Utc::now()) {
            state.store.delete_session(&token).await?;
            return Err(AppError::Unauthorized);
        }

        let user = state
            .store
            .find_user(session.user_id)
            .await?
            .ok_or(AppError::Unauthorized)?;

        Ok(CurrentUser { user, token })
    }
}

/// Role-bound extractors so handlers can state their audience in the
/// signature.
macro_rules! role_extractor {
    ($name:ident, $role:expr) => {
        #[derive(Debug, Clone)]
        pub struct $name(pub UserRecord);

        #[async_trait]
        impl FromRequestParts<AppState> for $name {
            type Rejection = AppError;

            async fn from_request_parts(
                parts: &mut Parts,
                state: &AppState,
            ) -> Result<Self, Self::Rejection> {
                let current = CurrentUser::from_request_parts(parts, state).await?;
                current.require($role)?;
                Ok($name(current.user))
            }
        }
    };
}

role_extractor!(ClientUser, UserRole::Client);
role_extractor!(WriterUser, UserRole::Writer);
role_extractor!(SupervisorUser, UserRole::Supervisor);
