use actix_web::{Responder, get, put, web};
use common::credentials;
use common::error::{AppError, Res};
use common::http::{Success, status};
use db::{
    dtos::developer::DeveloperFilter,
    models::developer::{Developer, PublicDeveloper},
};
use uuid::Uuid;

use crate::dtos::developer::{DeveloperQuery, DeveloperResponse, UpdateDeveloperRequest};
use crate::middleware::auth::AuthMiddleware;
use crate::services::credential::CredentialService;

/// Returns the developer the request was authorized as.
///
/// # Frontend Example
/// ```javascript
/// const response = await fetch('/developers/me', {
///   headers: { 'Authorization': `Bearer ${localStorage.getItem('token')}` }
/// });
/// const { developer } = await response.json();
/// ```
#[get("/me", wrap = "AuthMiddleware::developer()")]
pub async fn get_me(developer: web::ReqData<Developer>) -> Res<impl Responder> {
    Success::ok(DeveloperResponse {
        status: status::FOUND.to_string(),
        developer: developer.into_inner(),
    })
}

/// Looks up a developer by id. Callers holding that developer's token get the
/// full record; everyone else gets the public projection.
#[get("/{id}")]
pub async fn get_developer_by_id(
    path: web::Path<Uuid>,
    query: web::Query<DeveloperQuery>,
    service: web::Data<CredentialService>,
) -> Res<impl Responder> {
    let token = query
        .token
        .as_deref()
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::BadRequest("Valid token required.".to_string()))?;

    let developer = service
        .store()
        .find_one(&DeveloperFilter::by_id(path.into_inner()))
        .await?;

    let body = if credentials::tokens_match(token, &developer.token) {
        serde_json::to_value(&developer)
    } else {
        serde_json::to_value(PublicDeveloper::from(&developer))
    }
    .map_err(|e| AppError::Internal(format!("Failed to serialize developer: {}", e)))?;

    Success::ok(DeveloperResponse {
        status: status::FOUND.to_string(),
        developer: body,
    })
}

/// Edits the developer holding `{token}`.
///
/// # Input
/// - `path`: token of the developer to edit
/// - `req`: JSON with any of `name`, `email`, `integrationEngineer`, and for
///   admins `isAdmin`, `isPaid`, `nextPaymentTime` (RFC 3339). A new `password`
///   requires `oldpassword`.
///
/// # Output
/// - Success: `{ "status": "updated", "developer": {...} }`
/// - Error: 400 for a wrong old password, 403 when editing someone else without
///   admin rights, 404 for an unknown token
#[put("/{token}", wrap = "AuthMiddleware::developer()")]
pub async fn put_developer(
    path: web::Path<String>,
    req: web::Json<UpdateDeveloperRequest>,
    caller: web::ReqData<Developer>,
    service: web::Data<CredentialService>,
) -> Res<impl Responder> {
    let developer = service
        .update_profile(path.as_str(), &caller, req.into_inner())
        .await?;
    Success::ok(DeveloperResponse {
        status: status::UPDATED.to_string(),
        developer,
    })
}
