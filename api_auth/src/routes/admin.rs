use actix_web::{Responder, get, post, web};
use common::error::Res;
use common::http::{Success, status};
use db::dtos::developer::DeveloperFilter;
use uuid::Uuid;

use crate::dtos::auth::TokenResponse;
use crate::dtos::developer::{DeveloperListResponse, DeveloperResponse};
use crate::services::credential::CredentialService;

/// Lists every developer, oldest first.
#[get("/developers")]
pub async fn get_developers(service: web::Data<CredentialService>) -> Res<impl Responder> {
    let developers = service.store().find_all().await?;
    Success::ok(DeveloperListResponse {
        status: status::FOUND.to_string(),
        developers,
    })
}

#[get("/developers/{token}")]
pub async fn get_developer_by_token(
    path: web::Path<String>,
    service: web::Data<CredentialService>,
) -> Res<impl Responder> {
    let developer = service
        .store()
        .find_one(&DeveloperFilter::by_token(path.into_inner()))
        .await?;
    Success::ok(DeveloperResponse {
        status: status::FOUND.to_string(),
        developer,
    })
}

/// Issues a fresh token for a developer; the old one stops working.
#[post("/developers/{id}/token")]
pub async fn post_rotate_token(
    path: web::Path<Uuid>,
    service: web::Data<CredentialService>,
) -> Res<impl Responder> {
    let token = service.rotate_token(path.into_inner()).await?;
    Success::ok(TokenResponse {
        status: status::CREATED.to_string(),
        token,
    })
}
