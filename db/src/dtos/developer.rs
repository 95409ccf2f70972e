use chrono::NaiveDateTime;
use common::credentials;
use uuid::Uuid;

/// Supported lookups against the developers collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeveloperFilter {
    ById(Uuid),
    ByEmail(String),
    ByToken(String),
}

impl DeveloperFilter {
    pub fn by_id(id: Uuid) -> Self {
        DeveloperFilter::ById(id)
    }
    pub fn by_email(email: impl Into<String>) -> Self {
        DeveloperFilter::ByEmail(email.into())
    }
    pub fn by_token(token: impl Into<String>) -> Self {
        DeveloperFilter::ByToken(token.into())
    }

    pub(crate) fn column(&self) -> &'static str {
        match self {
            DeveloperFilter::ById(_) => "id",
            DeveloperFilter::ByEmail(_) => "email",
            DeveloperFilter::ByToken(_) => "token",
        }
    }

    pub(crate) fn matches(&self, developer: &crate::models::developer::Developer) -> bool {
        match self {
            DeveloperFilter::ById(id) => developer.id == *id,
            DeveloperFilter::ByEmail(email) => developer.email == *email,
            DeveloperFilter::ByToken(token) => developer.token == *token,
        }
    }
}

/// Descriptive fields supplied at signup.
#[derive(Debug, Clone, Default)]
pub struct DeveloperProfile {
    pub name: String,
    pub email: String,
    pub integration_engineer: String,
}

/// A developer ready to be inserted.
///
/// The salt and password hash can only be produced by [`NewDeveloper::with_password`],
/// so nothing reaches storage with a plaintext or unsalted password.
#[derive(Debug, Clone)]
pub struct NewDeveloper {
    pub profile: DeveloperProfile,
    pub token: String,
    pub(crate) salt: String,
    pub(crate) password: String,
}

impl NewDeveloper {
    pub fn with_password(profile: DeveloperProfile, password: &str) -> Self {
        let salt = credentials::generate_salt();
        let password = credentials::hash_password(password, &salt);
        NewDeveloper {
            profile,
            token: credentials::issue_token(),
            salt,
            password,
        }
    }

    pub fn salt(&self) -> &str {
        &self.salt
    }

    pub fn password_hash(&self) -> &str {
        &self.password
    }
}

/// Fields to overwrite on an existing developer. `None` leaves a field as is.
///
/// Has no salt field: the salt is fixed at insert time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeveloperUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub integration_engineer: Option<String>,
    pub is_admin: Option<bool>,
    pub is_paid: Option<bool>,
    /// Billing reference carried for stored records. Nothing in the service
    /// writes it; billing lives outside broome.
    pub stripe_token: Option<String>,
    pub next_payment_time: Option<NaiveDateTime>,
    /// Already hashed with the developer's existing salt.
    pub password: Option<String>,
    pub token: Option<String>,
    pub last_active_at: Option<NaiveDateTime>,
}

impl DeveloperUpdate {
    pub fn token(token: impl Into<String>) -> Self {
        DeveloperUpdate {
            token: Some(token.into()),
            ..Default::default()
        }
    }

    pub fn password_hash(hash: impl Into<String>) -> Self {
        DeveloperUpdate {
            password: Some(hash.into()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == DeveloperUpdate::default()
    }
}
