use actix_web::{dev::HttpServiceFactory, web};
use middleware::auth::AuthMiddleware;

pub mod middleware {
    pub mod auth;
}
pub mod services {
    pub mod credential;
}
pub mod dtos {
    pub mod auth;
    pub mod developer;
}
mod routes {
    pub(crate) mod admin;
    pub(crate) mod auth;
    pub(crate) mod developer;
    pub(crate) mod health;
}

pub use services::credential::{Authorization, CredentialService};

// Developer routes. `/me` and `PUT /{token}` carry their own auth wrapper.
pub fn mount_developers() -> actix_web::Scope {
    web::scope("/developers")
        .service(routes::auth::post_developer)
        .service(routes::auth::post_token)
        .service(routes::auth::put_reset)
        .service(routes::developer::get_me)
        .service(routes::developer::get_developer_by_id)
        .service(routes::developer::put_developer)
}

// Admin routes, restricted to developers flagged as admins
pub fn mount_admin() -> impl HttpServiceFactory {
    web::scope("/admin")
        .wrap(AuthMiddleware::admin())
        .service(routes::admin::get_developers)
        .service(routes::admin::get_developer_by_token)
        .service(routes::admin::post_rotate_token)
}

pub fn mount_health() -> impl HttpServiceFactory {
    routes::health::get_healthz
}
