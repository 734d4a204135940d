use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::auth::password::{generate_token, hash_password, verify_password};
use crate::errors::{AppError, FieldError};
use crate::intake::validation::is_valid_email;
use crate::models::user::{PasswordReset, ProfileChanges, Session, User, UserRecord, UserRole};
use crate::store::Store;

pub const MIN_PASSWORD_LEN: usize = 6;
const RESET_TTL_MINUTES: i64 = 60;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
    pub role: UserRole,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub role: UserRole,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

#[derive(Debug, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub phone: Option<String>,
    pub specialization: Option<String>,
    pub experience: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
    #[serde(default)]
    pub confirm_password: String,
}

/// Returned by register and login. `redirect_to` is the dashboard of the
/// account's role.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
    pub redirect_to: String,
}

fn check_email(field: &str, email: &str, errors: &mut Vec<FieldError>) {
    if email.trim().is_empty() {
        errors.push(FieldError::new(field, "Email is required"));
    } else if !is_valid_email(email) {
        errors.push(FieldError::new(field, "Invalid email address"));
    }
}

fn check_new_password(
    field: &str,
    password: &str,
    confirm: &str,
    required_msg: &str,
    errors: &mut Vec<FieldError>,
) {
    if password.is_empty() {
        errors.push(FieldError::new(field, required_msg));
    } else if password.chars().count() < MIN_PASSWORD_LEN {
        errors.push(FieldError::new(
            field,
            format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
        ));
    }
    if confirm.is_empty() {
        errors.push(FieldError::new("confirm_password", "Confirm Password is required"));
    } else if confirm != password {
        errors.push(FieldError::new("confirm_password", "Passwords must match"));
    }
}

fn fail_on(errors: Vec<FieldError>) -> Result<(), AppError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::invalid_fields(errors))
    }
}

async fn open_session(
    store: &dyn Store,
    user: &UserRecord,
    ttl_hours: i64,
) -> Result<AuthResponse, AppError> {
    let now = Utc::now();
    let session = Session {
        token: generate_token(),
        user_id: user.id,
        created_at: now,
        expires_at: now + Duration::hours(ttl_hours),
    };
    store.insert_session(&session).await?;
    Ok(AuthResponse {
        user: User::from(user),
        token: session.token,
        redirect_to: user.role.dashboard_path().to_string(),
    })
}

pub async fn register(
    store: &dyn Store,
    req: RegisterRequest,
    ttl_hours: i64,
) -> Result<AuthResponse, AppError> {
    let mut errors = Vec::new();
    if req.name.trim().is_empty() {
        errors.push(FieldError::new("name", "Name is required"));
    }
    check_email("email", &req.email, &mut errors);
    check_new_password(
        "password",
        &req.password,
        &req.confirm_password,
        "Password is required",
        &mut errors,
    );
    fail_on(errors)?;

    let now = Utc::now();
    let user = UserRecord {
        id: Uuid::new_v4(),
        email: req.email.trim().to_string(),
        name: req.name.trim().to_string(),
        role: req.role,
        phone: None,
        specialization: None,
        experience: None,
        password_hash: hash_password(&req.password)?,
        created_at: now,
        updated_at: now,
    };
    store.insert_user(&user).await?;
    info!("Registered {} account {}", user.role.as_str(), user.id);

    open_session(store, &user, ttl_hours).await
}

pub async fn login(
    store: &dyn Store,
    req: LoginRequest,
    ttl_hours: i64,
) -> Result<AuthResponse, AppError> {
    let mut errors = Vec::new();
    check_email("email", &req.email, &mut errors);
    if req.password.is_empty() {
        errors.push(FieldError::new("password", "Password is required"));
    }
    fail_on(errors)?;

    let user = store
        .find_user_by_email(req.email.trim())
        .await?
        .filter(|u| verify_password(&req.password, &u.password_hash))
        .ok_or(AppError::Unauthorized)?;

    if user.role != req.role {
        return Err(AppError::Forbidden);
    }

    info!("User {} signed in as {}", user.id, user.role.as_str());
    open_session(store, &user, ttl_hours).await
}

pub async fn logout(store: &dyn Store, token: &str) -> Result<(), AppError> {
    store.delete_session(token).await?;
    Ok(())
}

/// Issues a reset token when the account exists. Always succeeds so callers
/// cannot discover which emails are registered.
pub async fn forgot_password(store: &dyn Store, email: &str) -> Result<(), AppError> {
    let mut errors = Vec::new();
    check_email("email", email, &mut errors);
    fail_on(errors)?;

    if let Some(user) = store.find_user_by_email(email.trim()).await? {
        let reset = PasswordReset {
            token: generate_token(),
            user_id: user.id,
            expires_at: Utc::now() + Duration::minutes(RESET_TTL_MINUTES),
        };
        store.insert_password_reset(&reset).await?;
        debug!("issued password reset token {} for user {}", reset.token, user.id);
    }
    Ok(())
}

pub async fn reset_password(store: &dyn Store, req: ResetPasswordRequest) -> Result<(), AppError> {
    let mut errors = Vec::new();
    check_new_password(
        "password",
        &req.password,
        &req.confirm_password,
        "Password is required",
        &mut errors,
    );
    fail_on(errors)?;

    let reset = store
        .take_password_reset(&req.token)
        .await?
        .filter(|r| !r.is_expired(Utc::now()))
        .ok_or_else(|| AppError::Validation("Reset link is invalid or has expired".to_string()))?;

    let hash = hash_password(&req.password)?;
    if !store.set_password_hash(reset.user_id, &hash, Utc::now()).await? {
        return Err(AppError::NotFound("Account no longer exists".to_string()));
    }
    store.delete_user_sessions(reset.user_id).await?;

    info!("Password reset for user {}", reset.user_id);
    Ok(())
}

fn blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

/// Saves the profile columns only; the password hash is never rewritten here.
pub async fn update_profile(
    store: &dyn Store,
    user: UserRecord,
    req: ProfileUpdate,
) -> Result<User, AppError> {
    let mut errors = Vec::new();
    if req.name.trim().is_empty() {
        errors.push(FieldError::new("name", "Name is required"));
    }
    check_email("email", &req.email, &mut errors);
    if user.role == UserRole::Writer {
        if blank(&req.phone) {
            errors.push(FieldError::new("phone", "Phone number is required"));
        }
        if blank(&req.specialization) {
            errors.push(FieldError::new("specialization", "Specialization is required"));
        }
        if blank(&req.experience) {
            errors.push(FieldError::new("experience", "Experience is required"));
        }
    }
    fail_on(errors)?;

    let trimmed = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
    let changes = ProfileChanges {
        name: req.name.trim().to_string(),
        email: req.email.trim().to_string(),
        phone: trimmed(req.phone),
        specialization: trimmed(req.specialization),
        experience: trimmed(req.experience),
        updated_at: Utc::now(),
    };
    let updated = store
        .update_profile(user.id, &changes)
        .await?
        .ok_or_else(|| AppError::NotFound("Account no longer exists".to_string()))?;

    Ok(User::from(&updated))
}

pub async fn change_password(
    store: &dyn Store,
    user: UserRecord,
    req: ChangePasswordRequest,
) -> Result<(), AppError> {
    let mut errors = Vec::new();
    if req.current_password.is_empty() {
        errors.push(FieldError::new(
            "current_password",
            "Current password is required",
        ));
    }
    check_new_password(
        "new_password",
        &req.new_password,
        &req.confirm_password,
        "New password is required",
        &mut errors,
    );
    fail_on(errors)?;

    if !verify_password(&req.current_password, &user.password_hash) {
        return Err(AppError::invalid_fields(vec![FieldError::new(
            "current_password",
            "Current password is incorrect",
        )]));
    }

    let hash = hash_password(&req.new_password)?;
    if !store.set_password_hash(user.id, &hash, Utc::now()).await? {
        return Err(AppError::NotFound("Account no longer exists".to_string()));
    }
    info!("Password changed for user {}", user.id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn register_req(email: &str, role: UserRole) -> RegisterRequest {
        RegisterRequest {
            name: "Asha".into(),
            email: email.into(),
            password: "secret1".into(),
            confirm_password: "secret1".into(),
            role,
        }
    }

    #[tokio::test]
    async fn test_register_redirects_to_role_dashboard() {
        let store = MemoryStore::new();
        for (email, role, path) in [
            ("c@x.com", UserRole::Client, "/client/dashboard"),
            ("w@x.com", UserRole::Writer, "/writer/dashboard"),
            ("s@x.com", UserRole::Supervisor, "/supervisor/dashboard"),
        ] {
            let resp = register(&store, register_req(email, role), 24).await.unwrap();
            assert_eq!(resp.redirect_to, path);
            assert_eq!(resp.user.role, role);
        }
    }

    #[tokio::test]
    async fn test_register_validation_messages() {
        let store = MemoryStore::new();
        let err = register(
            &store,
            RegisterRequest {
                name: "".into(),
                email: "nope".into(),
                password: "abc".into(),
                confirm_password: "abd".into(),
                role: UserRole::Client,
            },
            24,
        )
        .await
        .unwrap_err();
        let AppError::UnprocessableEntity { fields, .. } = err else {
            panic!("expected field errors");
        };
        let messages: Vec<_> = fields.iter().map(|f| f.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "Name is required",
                "Invalid email address",
                "Password must be at least 6 characters",
                "Passwords must match",
            ]
        );
    }

    #[tokio::test]
    async fn test_duplicate_registration_conflicts() {
        let store = MemoryStore::new();
        register(&store, register_req("a@x.com", UserRole::Client), 24)
            .await
            .unwrap();
        let err = register(&store, register_req("A@X.com", UserRole::Writer), 24)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_login_checks_password_and_role() {
        let store = MemoryStore::new();
        register(&store, register_req("w@x.com", UserRole::Writer), 24)
            .await
            .unwrap();

        let wrong_pass = login(
            &store,
            LoginRequest {
                email: "w@x.com".into(),
                password: "secret2".into(),
                role: UserRole::Writer,
            },
            24,
        )
        .await;
        assert!(matches!(wrong_pass, Err(AppError::Unauthorized)));

        let wrong_role = login(
            &store,
            LoginRequest {
                email: "w@x.com".into(),
                password: "secret1".into(),
                role: UserRole::Client,
            },
            24,
        )
        .await;
        assert!(matches!(wrong_role, Err(AppError::Forbidden)));

        let ok = login(
            &store,
            LoginRequest {
                email: "W@X.com".into(),
                password: "secret1".into(),
                role: UserRole::Writer,
            },
            24,
        )
        .await
        .unwrap();
        assert_eq!(ok.redirect_to, "/writer/dashboard");
    }

    #[tokio::test]
    async fn test_reset_password_flow() {
        let store = MemoryStore::new();
        let reg = register(&store, register_req("c@x.com", UserRole::Client), 24)
            .await
            .unwrap();

        // Unknown emails are accepted silently.
        forgot_password(&store, "ghost@x.com").await.unwrap();
        forgot_password(&store, "c@x.com").await.unwrap();

        // Plant a known token to redeem.
        let reset = PasswordReset {
            token: "known".into(),
            user_id: reg.user.id,
            expires_at: Utc::now() + Duration::minutes(5),
        };
        store.insert_password_reset(&reset).await.unwrap();

        reset_password(
            &store,
            ResetPasswordRequest {
                token: "known".into(),
                password: "brandnew".into(),
                confirm_password: "brandnew".into(),
            },
        )
        .await
        .unwrap();

        // Old session is revoked, token cannot be reused.
        assert!(store.find_session(&reg.token).await.unwrap().is_none());
        let again = reset_password(
            &store,
            ResetPasswordRequest {
                token: "known".into(),
                password: "another1".into(),
                confirm_password: "another1".into(),
            },
        )
        .await;
        assert!(matches!(again, Err(AppError::Validation(_))));

        let relogin = login(
            &store,
            LoginRequest {
                email: "c@x.com".into(),
                password: "brandnew".into(),
                role: UserRole::Client,
            },
            24,
        )
        .await;
        assert!(relogin.is_ok());
    }

    #[tokio::test]
    async fn test_expired_reset_token_rejected() {
        let store = MemoryStore::new();
        let reg = register(&store, register_req("c@x.com", UserRole::Client), 24)
            .await
            .unwrap();
        store
            .insert_password_reset(&PasswordReset {
                token: "old".into(),
                user_id: reg.user.id,
                expires_at: Utc::now() - Duration::minutes(1),
            })
            .await
            .unwrap();
        let res = reset_password(
            &store,
            ResetPasswordRequest {
                token: "old".into(),
                password: "brandnew".into(),
                confirm_password: "brandnew".into(),
            },
        )
        .await;
        assert!(matches!(res, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_writer_profile_requires_professional_fields() {
        let store = MemoryStore::new();
        register(&store, register_req("w@x.com", UserRole::Writer), 24)
            .await
            .unwrap();
        let user = store.find_user_by_email("w@x.com").await.unwrap().unwrap();

        let err = update_profile(
            &store,
            user.clone(),
            ProfileUpdate {
                name: "Asha".into(),
                email: "w@x.com".into(),
                phone: None,
                specialization: Some(" ".into()),
                experience: None,
            },
        )
        .await
        .unwrap_err();
        let AppError::UnprocessableEntity { fields, .. } = err else {
            panic!("expected field errors");
        };
        assert_eq!(fields.len(), 3);

        let updated = update_profile(
            &store,
            user,
            ProfileUpdate {
                name: "Asha R".into(),
                email: "asha@x.com".into(),
                phone: Some("98765".into()),
                specialization: Some("IT".into()),
                experience: Some("5 years".into()),
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.name, "Asha R");
        assert_eq!(updated.specialization.as_deref(), Some("IT"));
    }

    #[tokio::test]
    async fn test_change_password_requires_current() {
        let store = MemoryStore::new();
        register(&store, register_req("c@x.com", UserRole::Client), 24)
            .await
            .unwrap();
        let user = store.find_user_by_email("c@x.com").await.unwrap().unwrap();

        let err = change_password(
            &store,
            user.clone(),
            ChangePasswordRequest {
                current_password: "wrong1".into(),
                new_password: "fresh12".into(),
                confirm_password: "fresh12".into(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::UnprocessableEntity { .. }));

        change_password(
            &store,
            user,
            ChangePasswordRequest {
                current_password: "secret1".into(),
                new_password: "fresh12".into(),
                confirm_password: "fresh12".into(),
            },
        )
        .await
        .unwrap();
        let stored = store.find_user_by_email("c@x.com").await.unwrap().unwrap();
        assert!(verify_password("fresh12", &stored.password_hash));
    }

    #[tokio::test]
    async fn test_profile_save_keeps_concurrent_password_change() {
        let store = MemoryStore::new();
        register(&store, register_req("c@x.com", UserRole::Client), 24)
            .await
            .unwrap();
        // Two requests authenticated before either write lands.
        let for_password = store.find_user_by_email("c@x.com").await.unwrap().unwrap();
        let for_profile = for_password.clone();

        change_password(
            &store,
            for_password,
            ChangePasswordRequest {
                current_password: "secret1".into(),
                new_password: "fresh12".into(),
                confirm_password: "fresh12".into(),
            },
        )
        .await
        .unwrap();
        let updated = update_profile(
            &store,
            for_profile,
            ProfileUpdate {
                name: "Asha Rao".into(),
                email: "c@x.com".into(),
                phone: None,
                specialization: None,
                experience: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.name, "Asha Rao");

        let login_with = |password: &str| LoginRequest {
            email: "c@x.com".into(),
            password: password.into(),
            role: UserRole::Client,
        };
        assert!(login(&store, login_with("fresh12"), 24).await.is_ok());
        assert!(matches!(
            login(&store, login_with("secret1"), 24).await,
            Err(AppError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_password_change_keeps_concurrent_profile_save() {
        let store = MemoryStore::new();
        register(&store, register_req("w@x.com", UserRole::Writer), 24)
            .await
            .unwrap();
        let for_profile = store.find_user_by_email("w@x.com").await.unwrap().unwrap();
        let for_password = for_profile.clone();

        update_profile(
            &store,
            for_profile,
            ProfileUpdate {
                name: "Asha R".into(),
                email: "asha@x.com".into(),
                phone: Some("98765".into()),
                specialization: Some("IT".into()),
                experience: Some("5 years".into()),
            },
        )
        .await
        .unwrap();
        change_password(
            &store,
            for_password,
            ChangePasswordRequest {
                current_password: "secret1".into(),
                new_password: "fresh12".into(),
                confirm_password: "fresh12".into(),
            },
        )
        .await
        .unwrap();

        let stored = store.find_user_by_email("asha@x.com").await.unwrap().unwrap();
        assert_eq!(stored.name, "Asha R");
        assert_eq!(stored.specialization.as_deref(), Some("IT"));
        assert!(verify_password("fresh12", &stored.password_hash));
    }
}
