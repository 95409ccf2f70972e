use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use common::error::Res;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    developer::{email_taken, token_taken},
    dtos::developer::{DeveloperFilter, DeveloperUpdate, NewDeveloper},
    models::developer::Developer,
    store::{DeveloperStore, not_found},
};

/// Process-local store, used by tests and when no database is configured.
#[derive(Default)]
pub struct MemoryDeveloperStore {
    developers: RwLock<HashMap<Uuid, Developer>>,
}

impl MemoryDeveloperStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DeveloperStore for MemoryDeveloperStore {
    async fn find_one(&self, filter: &DeveloperFilter) -> Res<Developer> {
        let developers = self.developers.read().await;
        developers
            .values()
            .find(|developer| filter.matches(developer))
            .cloned()
            .ok_or_else(not_found)
    }

    async fn find_all(&self) -> Res<Vec<Developer>> {
        let developers = self.developers.read().await;
        let mut all: Vec<Developer> = developers.values().cloned().collect();
        all.sort_by_key(|developer| developer.created_at);
        Ok(all)
    }

    async fn insert(&self, data: &NewDeveloper) -> Res<Developer> {
        let mut developers = self.developers.write().await;
        if developers.values().any(|d| d.email == data.profile.email) {
            return Err(email_taken());
        }
        if developers.values().any(|d| d.token == data.token) {
            return Err(token_taken());
        }

        let developer = Developer {
            id: Uuid::new_v4(),
            name: data.profile.name.clone(),
            email: data.profile.email.clone(),
            password: data.password.clone(),
            salt: data.salt.clone(),
            token: data.token.clone(),
            integration_engineer: data.profile.integration_engineer.clone(),
            is_admin: false,
            is_paid: false,
            stripe_token: None,
            next_payment_time: None,
            created_at: Utc::now().naive_utc(),
            last_active_at: None,
        };
        developers.insert(developer.id, developer.clone());
        Ok(developer)
    }

    async fn update_fields(
        &self,
        filter: &DeveloperFilter,
        update: &DeveloperUpdate,
    ) -> Res<Developer> {
        let mut developers = self.developers.write().await;
        let id = developers
            .values()
            .find(|developer| filter.matches(developer))
            .map(|developer| developer.id)
            .ok_or_else(not_found)?;

        let others = || developers.values().filter(|other| other.id != id);
        if others().any(|other| update.email.as_ref() == Some(&other.email)) {
            return Err(email_taken());
        }
        if others().any(|other| update.token.as_ref() == Some(&other.token)) {
            return Err(token_taken());
        }

        let developer = developers.get_mut(&id).ok_or_else(not_found)?;
        if let Some(name) = &update.name {
            developer.name = name.clone();
        }
        if let Some(email) = &update.email {
            developer.email = email.clone();
        }
        if let Some(engineer) = &update.integration_engineer {
            developer.integration_engineer = engineer.clone();
        }
        if let Some(is_admin) = update.is_admin {
            developer.is_admin = is_admin;
        }
        if let Some(is_paid) = update.is_paid {
            developer.is_paid = is_paid;
        }
        if let Some(stripe_token) = &update.stripe_token {
            developer.stripe_token = Some(stripe_token.clone());
        }
        if let Some(next_payment_time) = update.next_payment_time {
            developer.next_payment_time = Some(next_payment_time);
        }
        if let Some(password) = &update.password {
            developer.password = password.clone();
        }
        if let Some(token) = &update.token {
            developer.token = token.clone();
        }
        if let Some(last_active_at) = update.last_active_at {
            developer.last_active_at = Some(last_active_at);
        }
        Ok(developer.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtos::developer::DeveloperProfile;
    use common::error::AppError;

    fn signup(email: &str) -> NewDeveloper {
        NewDeveloper::with_password(
            DeveloperProfile {
                name: "Test Developer".to_string(),
                email: email.to_string(),
                integration_engineer: String::new(),
            },
            "java$cript",
        )
    }

    #[tokio::test]
    async fn insert_then_find_by_each_filter() {
        let store = MemoryDeveloperStore::new();
        let inserted = store.insert(&signup("a@example.com")).await.unwrap();

        for filter in [
            DeveloperFilter::by_id(inserted.id),
            DeveloperFilter::by_email("a@example.com"),
            DeveloperFilter::by_token(inserted.token.clone()),
        ] {
            assert_eq!(store.find_one(&filter).await.unwrap(), inserted);
        }
    }

    #[tokio::test]
    async fn missing_developer_is_not_found() {
        let store = MemoryDeveloperStore::new();
        let result = store
            .find_one(&DeveloperFilter::by_email("nobody@example.com"))
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));

        let result = store
            .update_fields(
                &DeveloperFilter::by_token("nope"),
                &DeveloperUpdate::token("new"),
            )
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn duplicate_email_rejected() {
        let store = MemoryDeveloperStore::new();
        store.insert(&signup("a@example.com")).await.unwrap();
        let result = store.insert(&signup("a@example.com")).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn token_clash_is_a_server_error() {
        let store = MemoryDeveloperStore::new();
        let first = store.insert(&signup("a@example.com")).await.unwrap();

        let mut second = signup("b@example.com");
        second.token = first.token.clone();
        let result = store.insert(&second).await;
        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[tokio::test]
    async fn update_overwrites_only_given_fields() {
        let store = MemoryDeveloperStore::new();
        let inserted = store.insert(&signup("a@example.com")).await.unwrap();

        let updated = store
            .update_fields(
                &DeveloperFilter::by_id(inserted.id),
                &DeveloperUpdate {
                    name: Some("Renamed".to_string()),
                    is_paid: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Renamed");
        assert!(updated.is_paid);
        assert_eq!(updated.email, inserted.email);
        assert_eq!(updated.salt, inserted.salt);
        assert_eq!(updated.password, inserted.password);
        assert_eq!(updated.token, inserted.token);
    }

    #[tokio::test]
    async fn email_change_cannot_steal_another_address() {
        let store = MemoryDeveloperStore::new();
        store.insert(&signup("a@example.com")).await.unwrap();
        let b = store.insert(&signup("b@example.com")).await.unwrap();

        let result = store
            .update_fields(
                &DeveloperFilter::by_id(b.id),
                &DeveloperUpdate {
                    email: Some("a@example.com".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn find_all_is_ordered_by_creation() {
        let store = MemoryDeveloperStore::new();
        let first = store.insert(&signup("a@example.com")).await.unwrap();
        let second = store.insert(&signup("b@example.com")).await.unwrap();

        let all = store.find_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all[0].created_at <= all[1].created_at);
        assert!(all.iter().any(|d| d.id == first.id));
        assert!(all.iter().any(|d| d.id == second.id));
    }

    #[test]
    fn serialized_developer_hides_credentials() {
        let developer = Developer {
            id: Uuid::nil(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "hash".to_string(),
            salt: "salt".to_string(),
            token: "token".to_string(),
            integration_engineer: "Steve".to_string(),
            is_admin: false,
            is_paid: true,
            stripe_token: None,
            next_payment_time: None,
            created_at: Utc::now().naive_utc(),
            last_active_at: None,
        };
        let json = serde_json::to_value(&developer).unwrap();
        assert!(json.get("password").is_none());
        assert!(json.get("salt").is_none());
        assert_eq!(json["integrationEngineer"], "Steve");
        assert_eq!(json["isPaid"], true);
    }
}
