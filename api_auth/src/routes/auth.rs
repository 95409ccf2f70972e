use std::sync::Arc;

use actix_web::{Responder, post, put, web};
use common::env_config::Config;
use common::error::{AppError, Res};
use common::http::{Success, status};
use db::dtos::developer::DeveloperProfile;
use rand::Rng;

use crate::dtos::auth::{LoginRequest, ResetPasswordRequest, SignupRequest, TokenResponse};
use crate::dtos::developer::DeveloperResponse;
use crate::services::credential::CredentialService;

fn pick_integration_engineer(engineers: &[String]) -> String {
    if engineers.is_empty() {
        return String::new();
    }
    let index = rand::rng().random_range(0..engineers.len());
    engineers[index].clone()
}

/// Registers a new developer with email and password.
///
/// # Input
/// - `req`: JSON payload with `name`, `email` and `password`
/// - `service`: Credential service
/// - `config`: Application configuration (integration engineer pool)
///
/// # Output
/// - Success: 201 Created with the developer, including its first token
/// - Error: 400 Bad Request when email or password is missing or the email is taken
///
/// # Frontend Example
/// ```javascript
/// const response = await fetch('/developers', {
///   method: 'POST',
///   headers: { 'Content-Type': 'application/json' },
///   body: JSON.stringify({
///     name: 'Ada Lovelace',
///     email: 'ada@example.com',
///     password: 'securepassword'
///   })
/// });
/// const { developer } = await response.json();
/// localStorage.setItem('token', developer.token);
/// ```
#[post("")]
pub async fn post_developer(
    req: web::Json<SignupRequest>,
    service: web::Data<CredentialService>,
    config: web::Data<Arc<Config>>,
) -> Res<impl Responder> {
    let req = req.into_inner();
    if req.email.is_empty() || req.password.is_empty() {
        return Err(AppError::BadRequest(
            "Email and Password Required.".to_string(),
        ));
    }

    let profile = DeveloperProfile {
        name: req.name,
        email: req.email,
        integration_engineer: pick_integration_engineer(&config.integration_engineers),
    };
    let developer = service.register(profile, &req.password).await?;
    Success::created(DeveloperResponse {
        status: status::CREATED.to_string(),
        developer,
    })
}

/// Logs a developer in by issuing a new token. The previous token stops working.
///
/// # Input
/// - `login_data`: JSON payload containing email and password
///
/// # Output
/// - Success: `{ "status": "created", "token": "..." }`
/// - Error: 400 when a field is missing, 401 for any credential mismatch
#[post("/token")]
pub async fn post_token(
    login_data: web::Json<LoginRequest>,
    service: web::Data<CredentialService>,
) -> Res<impl Responder> {
    if login_data.email.is_empty() || login_data.password.is_empty() {
        return Err(AppError::BadRequest(
            "Email and Password Required.".to_string(),
        ));
    }
    let developer = service
        .login(&login_data.email, &login_data.password)
        .await?;
    Success::ok(TokenResponse {
        status: status::CREATED.to_string(),
        token: developer.token,
    })
}

/// Sets a new password from a reset link. The link carries the developer's
/// current token in the path and id in the body.
#[put("/reset/{token}")]
pub async fn put_reset(
    path: web::Path<String>,
    req: web::Json<ResetPasswordRequest>,
    service: web::Data<CredentialService>,
) -> Res<impl Responder> {
    if req.new.is_empty() {
        return Err(AppError::BadRequest("New password required.".to_string()));
    }
    let developer = service
        .reset_password(req.id, path.as_str(), &req.new)
        .await?;
    Success::ok(DeveloperResponse {
        status: status::SUCCESS.to_string(),
        developer,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_from_configured_engineers() {
        let engineers = vec!["Steve Kaliski".to_string(), "David Byrd".to_string()];
        for _ in 0..20 {
            assert!(engineers.contains(&pick_integration_engineer(&engineers)));
        }
        assert_eq!(pick_integration_engineer(&[]), "");
    }
}
