use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub street_address: String,
    pub created_at: DateTime<Utc>,
}

/// Physical condition of a cartridge/disc, worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "game_condition", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum GameCondition {
    Poor,
    Fair,
    Good,
    Mint,
}

impl GameCondition {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Poor => "poor",
            Self::Fair => "fair",
            Self::Good => "good",
            Self::Mint => "mint",
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct Game {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub publisher: String,
    pub year_published: i32,
    pub system: String,
    pub condition: GameCondition,
    pub previous_owners: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// Trade-offer lifecycle. `Pending` is the only non-terminal state;
/// once decided an offer never transitions again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "offer_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OfferStatus {
    Pending,
    Accepted,
    Rejected,
}

/// A proposal to swap `offered_game_id` (owned by the proposer) for
/// `requested_game_id` (owned by someone else). The recipient is not
/// stored: whoever currently owns the requested game decides.
#[derive(Debug, Clone, FromRow)]
pub struct TradeOffer {
    pub id: Uuid,
    pub proposer_id: Uuid,
    pub requested_game_id: Uuid,
    pub offered_game_id: Uuid,
    pub status: OfferStatus,
    pub created_at: DateTime<Utc>,
}
