use actix_web::{HttpResponse, Responder, get};

#[get("/healthz")]
pub async fn get_healthz() -> impl Responder {
    HttpResponse::Ok().content_type("text/plain").body("ok")
}
