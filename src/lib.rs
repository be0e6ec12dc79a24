//! Retro Video Game Exchange API server.
//!
//! A hypermedia-driven (RMM Level 3) REST service for trading retro
//! video games: user registration and JWT auth, owner-scoped CRUD on
//! game listings, and a trade-offer workflow that swaps game ownership
//! when the recipient accepts. All durable state lives in Postgres;
//! any number of stateless instances may share one database.

pub mod config;
pub mod db;
pub mod error;
pub mod hateoas;
pub mod http;
pub mod trade;
