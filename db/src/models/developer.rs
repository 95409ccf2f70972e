use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Developer {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    /// Hex-encoded HMAC of the password keyed by `salt`.
    #[serde(skip_serializing, default)]
    pub password: String,
    #[serde(skip_serializing, default)]
    pub salt: String,
    pub token: String,
    pub integration_engineer: String,
    pub is_admin: bool,
    pub is_paid: bool,
    pub stripe_token: Option<String>,
    pub next_payment_time: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub last_active_at: Option<NaiveDateTime>,
}

/// What other developers get to see.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicDeveloper {
    pub email: String,
    pub name: String,
    pub integration_engineer: String,
}

impl From<&Developer> for PublicDeveloper {
    fn from(developer: &Developer) -> Self {
        PublicDeveloper {
            email: developer.email.clone(),
            name: developer.name.clone(),
            integration_engineer: developer.integration_engineer.clone(),
        }
    }
}
