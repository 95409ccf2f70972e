use std::{future::Future, pin::Pin, sync::Arc};

use actix_web::{
    Error, HttpMessage, HttpResponse,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::header::{AUTHORIZATION, WWW_AUTHENTICATE},
    web,
};
use base64::{Engine, engine::general_purpose};
use common::error::AppError;
use futures::future::{Ready, ok};

use crate::services::credential::CredentialService;

const REALM: &str = "Basic realm=\"broome\"";

/// Identifier and optional secret taken from an `Authorization` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresentedCredentials {
    pub identifier: String,
    pub secret: Option<String>,
}

/// Parses `Basic base64(identifier:secret)` or `Bearer token`.
///
/// Basic credentials split on the first `:` so secrets may contain colons.
/// An empty secret is treated as absent.
pub fn parse_authorization(header: &str) -> Option<PresentedCredentials> {
    let (scheme, value) = header.trim().split_once(' ')?;
    let value = value.trim();

    if scheme.eq_ignore_ascii_case("bearer") {
        if value.is_empty() {
            return None;
        }
        return Some(PresentedCredentials {
            identifier: value.to_string(),
            secret: None,
        });
    }

    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = general_purpose::STANDARD.decode(value).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (identifier, secret) = decoded.split_once(':')?;
    Some(PresentedCredentials {
        identifier: identifier.to_string(),
        secret: Some(secret.to_string()).filter(|s| !s.is_empty()),
    })
}

fn unauthorized() -> HttpResponse {
    HttpResponse::Unauthorized()
        .insert_header((WWW_AUTHENTICATE, REALM))
        .json(serde_json::json!({ "error": "Unauthorized" }))
}

pub struct AuthMiddleware {
    admin_only: bool,
}

impl AuthMiddleware {
    /// Any authorized developer may pass.
    pub fn developer() -> Self {
        AuthMiddleware { admin_only: false }
    }

    /// Only authorized developers flagged as admins may pass.
    pub fn admin() -> Self {
        AuthMiddleware { admin_only: true }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: actix_web::body::MessageBody + 'static,
{
    type Response = ServiceResponse<actix_web::body::BoxBody>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AuthMiddlewareService {
            service: Arc::new(service),
            admin_only: self.admin_only,
        })
    }
}

pub struct AuthMiddlewareService<S> {
    service: Arc<S>,
    admin_only: bool,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: actix_web::body::MessageBody + 'static,
{
    type Response = ServiceResponse<actix_web::body::BoxBody>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = Arc::clone(&self.service);
        let admin_only = self.admin_only;

        let credentials = req
            .headers()
            .get(AUTHORIZATION)
            .and_then(|header| header.to_str().ok())
            .and_then(parse_authorization);
        let service = req.app_data::<web::Data<CredentialService>>().cloned();

        Box::pin(async move {
            let Some(service) = service else {
                let error = AppError::Internal("Credential service not configured".to_string());
                return Ok(req.error_response(error));
            };

            let Some(credentials) = credentials else {
                log::debug!("Auth failed: missing or malformed Authorization header");
                return Ok(req.into_response(unauthorized()));
            };

            let authorization = service
                .authorize(&credentials.identifier, credentials.secret.as_deref())
                .await;
            let Some(developer) = authorization.into_developer() else {
                return Ok(req.into_response(unauthorized()));
            };

            if admin_only && !developer.is_admin {
                let error = AppError::Forbidden("Admin access required".to_string());
                return Ok(req.error_response(error));
            }

            // expose the developer to handlers and the request logger
            req.extensions_mut().insert(developer);
            srv.call(req).await.map(|res| res.map_into_boxed_body())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basic(raw: &str) -> String {
        format!("Basic {}", general_purpose::STANDARD.encode(raw))
    }

    #[test]
    fn parses_basic_email_and_password() {
        let parsed = parse_authorization(&basic("ada@example.com:java$cript")).unwrap();
        assert_eq!(parsed.identifier, "ada@example.com");
        assert_eq!(parsed.secret.as_deref(), Some("java$cript"));
    }

    #[test]
    fn basic_secret_may_contain_colons() {
        let parsed = parse_authorization(&basic("ada@example.com:a:b:c")).unwrap();
        assert_eq!(parsed.secret.as_deref(), Some("a:b:c"));
    }

    #[test]
    fn basic_with_empty_secret_is_token_mode() {
        let parsed = parse_authorization(&basic("0f0a9ec0-f0e8-11e3:")).unwrap();
        assert_eq!(parsed.identifier, "0f0a9ec0-f0e8-11e3");
        assert_eq!(parsed.secret, None);
    }

    #[test]
    fn parses_bearer_token() {
        let parsed = parse_authorization("Bearer abc-123").unwrap();
        assert_eq!(
            parsed,
            PresentedCredentials {
                identifier: "abc-123".to_string(),
                secret: None,
            }
        );
    }

    #[test]
    fn rejects_malformed_headers() {
        assert_eq!(parse_authorization(""), None);
        assert_eq!(parse_authorization("Basic"), None);
        assert_eq!(parse_authorization("Basic !!!not-base64"), None);
        assert_eq!(parse_authorization(&basic("no-colon")), None);
        assert_eq!(parse_authorization("Bearer "), None);
        assert_eq!(parse_authorization("Digest abc"), None);
    }
}
