// src/services/credentials.rs

use validator::Validate;

use crate::{
    config::MIN_PASSWORD_LENGTH,
    error::AppError,
    models::user::{
        NewUser, RegisterRequest, Role, UpdateProfileRequest, User, UserPatch, check_email,
        normalize_email,
    },
    store::Store,
    utils::hash::{hash_password, verify_against_dummy, verify_password},
};

const AUTH_FAILURE: &str = "Invalid email or password";

fn check_password_strength(password: &str) -> Result<(), AppError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AppError::WeakCredential(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

/// Creates an account. Only a salted hash of the password is stored.
pub async fn register(store: &dyn Store, payload: RegisterRequest) -> Result<User, AppError> {
    let name = payload.name.trim();
    let email = normalize_email(&payload.email);

    if name.is_empty() || email.is_empty() || payload.password.is_empty() {
        return Err(AppError::BadRequest(
            "Name, email, and password are required".to_string(),
        ));
    }
    check_password_strength(&payload.password)?;
    payload.validate()?;
    check_email(&email)?;

    let role = Role::requested_or_default(payload.role.as_deref());
    let password_hash = hash_password(&payload.password)?;

    let user = store
        .insert_user(NewUser {
            name: name.to_string(),
            email,
            password_hash,
            role,
        })
        .await?;

    tracing::info!(user_id = user.id, role = %user.role, "User registered");
    Ok(user)
}

/// Checks credentials. Unknown email and wrong password fail identically.
pub async fn verify(store: &dyn Store, email: &str, password: &str) -> Result<User, AppError> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(AppError::BadRequest(
            "Email and password are required".to_string(),
        ));
    }

    let email = normalize_email(email);
    let Some(user) = store.find_user_by_email(&email).await? else {
        verify_against_dummy(password);
        tracing::debug!("Login rejected: unknown email");
        return Err(AppError::AuthError(AUTH_FAILURE.to_string()));
    };

    if !verify_password(password, &user.password_hash)? {
        tracing::debug!(user_id = user.id, "Login rejected: password mismatch");
        return Err(AppError::AuthError(AUTH_FAILURE.to_string()));
    }

    Ok(user)
}

/// Self-service profile edit. The role can not be changed here.
pub async fn update_profile(
    store: &dyn Store,
    user_id: i64,
    payload: UpdateProfileRequest,
) -> Result<User, AppError> {
    payload.validate()?;

    let mut patch = UserPatch::default();

    if let Some(name) = payload.name {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::BadRequest("Name cannot be empty".to_string()));
        }
        patch.name = Some(name.to_string());
    }

    if let Some(email) = payload.email {
        let email = normalize_email(&email);
        check_email(&email)?;
        patch.email = Some(email);
    }

    if let Some(password) = payload.password {
        check_password_strength(&password)?;
        patch.password_hash = Some(hash_password(&password)?);
    }

    store
        .update_user(user_id, patch)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn request(name: &str, email: &str, password: &str, role: Option<&str>) -> RegisterRequest {
        RegisterRequest {
            name: name.into(),
            email: email.into(),
            password: password.into(),
            role: role.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn register_normalizes_and_hashes() {
        let store = MemoryStore::new();
        let user = register(&store, request(" Ada ", "  Ada@Example.com ", "secret1", None))
            .await
            .unwrap();

        assert_eq!(user.name, "Ada");
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.role, Role::Student);
        assert_ne!(user.password_hash, "secret1");
    }

    #[tokio::test]
    async fn register_rejects_missing_and_weak_input() {
        let store = MemoryStore::new();

        let missing = register(&store, request("", "a@example.com", "secret1", None)).await;
        assert!(matches!(missing, Err(AppError::BadRequest(_))));

        let weak = register(&store, request("Ada", "a@example.com", "12345", None)).await;
        assert!(matches!(weak, Err(AppError::WeakCredential(_))));

        let bad_email = register(&store, request("Ada", "not-an-email", "secret1", None)).await;
        assert!(matches!(bad_email, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn register_conflicts_on_case_variant_email() {
        let store = MemoryStore::new();
        register(&store, request("Ada", "ada@example.com", "secret1", None))
            .await
            .unwrap();

        let dup = register(&store, request("Ada 2", " ADA@example.COM", "secret2", None)).await;
        assert!(matches!(dup, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn verify_fails_uniformly() {
        let store = MemoryStore::new();
        register(&store, request("Ada", "ada@example.com", "secret1", Some("teacher")))
            .await
            .unwrap();

        let ok = verify(&store, "ADA@example.com ", "secret1").await.unwrap();
        assert_eq!(ok.role, Role::Teacher);

        let wrong_password = verify(&store, "ada@example.com", "nope-nope").await.unwrap_err();
        let unknown_user = verify(&store, "bob@example.com", "secret1").await.unwrap_err();
        assert_eq!(wrong_password, unknown_user);
    }

    #[tokio::test]
    async fn profile_update_rehashes_password() {
        let store = MemoryStore::new();
        let user = register(&store, request("Ada", "ada@example.com", "secret1", None))
            .await
            .unwrap();

        let update = UpdateProfileRequest {
            name: Some("Ada L.".into()),
            email: None,
            password: Some("another-secret".into()),
        };
        let updated = update_profile(&store, user.id, update).await.unwrap();
        assert_eq!(updated.name, "Ada L.");

        assert!(verify(&store, "ada@example.com", "secret1").await.is_err());
        assert!(verify(&store, "ada@example.com", "another-secret").await.is_ok());
    }
}
