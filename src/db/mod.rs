//! Postgres persistence: row types plus one repo module per aggregate.
//! The database is the single source of truth and the only
//! synchronization point between instances.

pub mod game_repo;
pub mod models;
pub mod offer_repo;
pub mod user_repo;
