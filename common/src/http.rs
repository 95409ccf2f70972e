use actix_web::{HttpResponse, Responder};
use serde::Serialize;

use super::error::Res;

pub struct Success;
impl Success {
    pub fn created<T: Serialize>(body: T) -> Res<impl Responder> {
        Result::Ok(HttpResponse::Created().json(body))
    }
    pub fn ok<T: Serialize>(body: T) -> Res<impl Responder> {
        Result::Ok(HttpResponse::Ok().json(body))
    }
}

/// Status strings carried in the `status` field of JSON responses.
pub mod status {
    pub const CREATED: &str = "created";
    pub const UPDATED: &str = "updated";
    pub const FOUND: &str = "found";
    pub const SUCCESS: &str = "success";
}
