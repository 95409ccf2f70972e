use actix_cors::Cors;
use actix_web::http::header;

/// `"*"` opens the API to every origin; anything else is taken as the one
/// allowed origin.
pub fn middleware(origin: &str) -> Cors {
    let cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PUT", "OPTIONS"])
        .allowed_headers(vec![
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
        ])
        .expose_headers(&[header::WWW_AUTHENTICATE])
        .max_age(3600);

    if origin == "*" {
        cors.allow_any_origin()
    } else {
        cors.allowed_origin(origin)
    }
}
