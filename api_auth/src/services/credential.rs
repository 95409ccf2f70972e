//! Credential lifecycle for developers.
//!
//! Owns signup, the authorization decision used by the middleware, login with
//! token reissue, password changes and token rotation. The storage handle is
//! passed in at construction; nothing here reaches for global state.

use std::sync::Arc;

use chrono::Utc;
use common::{
    credentials,
    error::{AppError, Res},
    retry::{RetryPolicy, retry_transient},
};
use db::{
    dtos::developer::{DeveloperFilter, DeveloperProfile, DeveloperUpdate, NewDeveloper},
    models::developer::Developer,
    store::DeveloperStore,
};
use uuid::Uuid;

use crate::dtos::developer::UpdateDeveloperRequest;

/// Outcome of checking presented credentials.
///
/// A denial carries no reason: a missing developer, a wrong password and a
/// storage failure all look the same to the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum Authorization {
    Granted(Developer),
    Denied,
}

impl Authorization {
    pub fn is_granted(&self) -> bool {
        matches!(self, Authorization::Granted(_))
    }

    pub fn developer(&self) -> Option<&Developer> {
        match self {
            Authorization::Granted(developer) => Some(developer),
            Authorization::Denied => None,
        }
    }

    pub fn into_developer(self) -> Option<Developer> {
        match self {
            Authorization::Granted(developer) => Some(developer),
            Authorization::Denied => None,
        }
    }
}

fn invalid_credentials() -> AppError {
    AppError::Unauthorized("Invalid credentials".to_string())
}

fn wrong_old_password() -> AppError {
    AppError::BadRequest("Old password is incorrect.".to_string())
}

pub struct CredentialService {
    store: Arc<dyn DeveloperStore>,
    insert_retry: RetryPolicy,
}

impl CredentialService {
    pub fn new(store: Arc<dyn DeveloperStore>, insert_retry: RetryPolicy) -> Self {
        CredentialService {
            store,
            insert_retry,
        }
    }

    pub fn store(&self) -> &dyn DeveloperStore {
        self.store.as_ref()
    }

    /// Creates a developer with a fresh salt, hashed password and token.
    ///
    /// The insert is retried with backoff on transient storage failures.
    /// Expects non-empty email and password.
    pub async fn register(&self, profile: DeveloperProfile, password: &str) -> Res<Developer> {
        match self
            .store
            .find_one(&DeveloperFilter::by_email(profile.email.clone()))
            .await
        {
            Ok(_) => return Err(AppError::BadRequest("Email already exists".to_string())),
            Err(AppError::NotFound(_)) => {}
            Err(error) => return Err(error),
        }

        let new_developer = NewDeveloper::with_password(profile, password);
        let developer = retry_transient(&self.insert_retry, "Inserting developer", || {
            self.store.insert(&new_developer)
        })
        .await?;

        log::info!("Developer {} signed up", developer.id);
        Ok(developer)
    }

    /// Decides whether `identifier`/`secret` authorize a developer.
    ///
    /// Without a secret the identifier is a bearer token. With one, the
    /// identifier is an email and the secret must match the stored hash.
    pub async fn authorize(&self, identifier: &str, secret: Option<&str>) -> Authorization {
        if identifier.is_empty() {
            return Authorization::Denied;
        }

        let secret = secret.filter(|secret| !secret.is_empty());
        let filter = match secret {
            Some(_) => DeveloperFilter::by_email(identifier),
            None => DeveloperFilter::by_token(identifier),
        };

        let developer = match self.store.find_one(&filter).await {
            Ok(developer) => developer,
            Err(AppError::NotFound(_)) => {
                log::warn!("Authorization failed: developer not found");
                return Authorization::Denied;
            }
            Err(error) => {
                log::warn!("Authorization failed: lookup error: {}", error);
                return Authorization::Denied;
            }
        };

        match secret {
            Some(secret)
                if !credentials::verify_password(secret, &developer.salt, &developer.password) =>
            {
                log::warn!("Authorization failed: password mismatch for {}", developer.id);
                Authorization::Denied
            }
            _ => Authorization::Granted(developer),
        }
    }

    /// Checks email and password, then replaces the developer's token.
    ///
    /// The previous token stops authorizing as soon as this returns.
    pub async fn login(&self, email: &str, password: &str) -> Res<Developer> {
        if password.is_empty() {
            return Err(invalid_credentials());
        }
        let developer = self
            .authorize(email, Some(password))
            .await
            .into_developer()
            .ok_or_else(invalid_credentials)?;

        let update = DeveloperUpdate {
            token: Some(credentials::issue_token()),
            last_active_at: Some(Utc::now().naive_utc()),
            ..Default::default()
        };
        self.store
            .update_fields(&DeveloperFilter::by_id(developer.id), &update)
            .await
    }

    /// Replaces the password after checking the current one. The salt stays.
    pub async fn change_password(&self, id: Uuid, old: &str, new: &str) -> Res<Developer> {
        let developer = self.store.find_one(&DeveloperFilter::by_id(id)).await?;
        if !credentials::verify_password(old, &developer.salt, &developer.password) {
            return Err(wrong_old_password());
        }
        self.set_password(&developer, new).await
    }

    /// Replaces the password for the holder of a reset link.
    ///
    /// The link carries the developer id and current token; possession of both
    /// stands in for the old password. The token is reissued alongside the new
    /// hash, so the link works once and every existing session ends.
    pub async fn reset_password(&self, id: Uuid, reset_token: &str, new: &str) -> Res<Developer> {
        let invalid_link = || AppError::Unauthorized("Invalid reset token".to_string());
        let developer = match self.store.find_one(&DeveloperFilter::by_id(id)).await {
            Ok(developer) => developer,
            Err(AppError::NotFound(_)) => return Err(invalid_link()),
            Err(error) => return Err(error),
        };
        if !credentials::tokens_match(reset_token, &developer.token) {
            return Err(invalid_link());
        }

        let update = DeveloperUpdate {
            password: Some(credentials::hash_password(new, &developer.salt)),
            token: Some(credentials::issue_token()),
            ..Default::default()
        };
        let developer = self
            .store
            .update_fields(&DeveloperFilter::by_id(developer.id), &update)
            .await?;
        log::info!("Developer {} reset their password", developer.id);
        Ok(developer)
    }

    /// Issues a new token for the developer, invalidating the old one.
    pub async fn rotate_token(&self, id: Uuid) -> Res<String> {
        let developer = self
            .store
            .update_fields(
                &DeveloperFilter::by_id(id),
                &DeveloperUpdate::token(credentials::issue_token()),
            )
            .await?;
        log::info!("Rotated token for developer {}", developer.id);
        Ok(developer.token)
    }

    /// Applies a profile edit made by `caller` to the developer holding
    /// `target_token`.
    ///
    /// Developers may edit themselves; admins may edit anyone. Admin and billing
    /// flags are admin-only. A password change needs the old password.
    pub async fn update_profile(
        &self,
        target_token: &str,
        caller: &Developer,
        changes: UpdateDeveloperRequest,
    ) -> Res<Developer> {
        let target = self
            .store
            .find_one(&DeveloperFilter::by_token(target_token))
            .await?;

        if caller.id != target.id && !caller.is_admin {
            return Err(AppError::Forbidden(
                "Cannot edit another developer".to_string(),
            ));
        }

        let touches_flags = changes.is_admin.is_some()
            || changes.is_paid.is_some()
            || changes.next_payment_time.is_some();
        if touches_flags && !caller.is_admin {
            return Err(AppError::Forbidden(
                "Only admins can change admin or billing fields".to_string(),
            ));
        }

        let non_empty = |value: Option<String>| value.filter(|v| !v.is_empty());
        let mut update = DeveloperUpdate {
            name: non_empty(changes.name),
            email: non_empty(changes.email),
            integration_engineer: non_empty(changes.integration_engineer),
            is_admin: changes.is_admin,
            is_paid: changes.is_paid,
            next_payment_time: changes.next_payment_time.map(|time| time.naive_utc()),
            ..Default::default()
        };

        if let Some(password) = non_empty(changes.password) {
            let old = changes.old_password.unwrap_or_default();
            if old.is_empty()
                || !credentials::verify_password(&old, &target.salt, &target.password)
            {
                return Err(wrong_old_password());
            }
            update.password = Some(credentials::hash_password(&password, &target.salt));
        }

        self.store
            .update_fields(&DeveloperFilter::by_id(target.id), &update)
            .await
    }

    async fn set_password(&self, developer: &Developer, new: &str) -> Res<Developer> {
        let hash = credentials::hash_password(new, &developer.salt);
        self.store
            .update_fields(
                &DeveloperFilter::by_id(developer.id),
                &DeveloperUpdate::password_hash(hash),
            )
            .await
    }
}
