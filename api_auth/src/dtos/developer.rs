use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDeveloperRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub integration_engineer: Option<String>,
    pub is_admin: Option<bool>,
    pub is_paid: Option<bool>,
    pub next_payment_time: Option<DateTime<Utc>>,
    pub password: Option<String>,
    #[serde(rename = "oldpassword")]
    pub old_password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeveloperQuery {
    pub token: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeveloperResponse<T> {
    pub status: String,
    pub developer: T,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeveloperListResponse<T> {
    pub status: String,
    pub developers: Vec<T>,
}
