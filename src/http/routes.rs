//! Mount every HTTP sub-module under `/api`, plus the API root.

use actix_web::{get, web, HttpResponse, Responder};
use serde_json::json;

use crate::hateoas;
use crate::http;

/// GET /api: entry point advertising every top-level affordance, so a
/// client can drive the whole API from here (RMM Level 3).
#[get("")]
pub async fn api_root() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "name": "Retro Video Game Exchange API",
        "_links": hateoas::root_links(),
    }))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(api_root)
            .configure(http::auth::init_routes)
            .configure(http::users::init_routes)
            .configure(http::games::init_routes)
            .configure(http::offers::init_routes)
            .configure(http::health::init_routes),
    );
}
