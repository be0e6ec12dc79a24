//! HTTP surface: one module per resource, each exposing
//! `init_routes(cfg)` mounted under `/api` by [`routes`].

use serde::Serialize;

use crate::hateoas::Links;

pub mod auth;
pub mod games;
pub mod health;
pub mod offers;
pub mod routes;
pub mod users;

/// Standard paginated collection envelope.
#[derive(Debug, Serialize)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub page: i64,
    #[serde(rename = "pageSize")]
    pub page_size: i64,
    pub total: i64,
    #[serde(rename = "_links")]
    pub links: Links,
}
