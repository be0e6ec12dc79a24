//! Trade-offer persistence and the transactional decision path.
//!
//! `decide` is the one read-modify-write sequence in the system that
//! touches ownership. It runs as a single transaction with the offer
//! row and both game rows locked, so two concurrent decisions over a
//! shared game cannot both see it as available. Returning an error
//! drops the transaction, which rolls everything back.

use sqlx::PgPool;
use uuid::Uuid;

use crate::db::models::{Game, OfferStatus, TradeOffer};
use crate::error::ApiError;
use crate::trade::{self, Decision};

const OFFER_COLUMNS: &str =
    "id, proposer_id, requested_game_id, offered_game_id, status, created_at";

pub async fn insert(
    db: &PgPool,
    proposer_id: Uuid,
    requested_game_id: Uuid,
    offered_game_id: Uuid,
) -> Result<TradeOffer, ApiError> {
    sqlx::query_as::<_, TradeOffer>(&format!(
        "INSERT INTO trade_offers (proposer_id, requested_game_id, offered_game_id, status)
         VALUES ($1, $2, $3, 'pending')
         RETURNING {OFFER_COLUMNS}"
    ))
    .bind(proposer_id)
    .bind(requested_game_id)
    .bind(offered_game_id)
    .fetch_one(db)
    .await
    .map_err(Into::into)
}

pub async fn by_id(db: &PgPool, id: Uuid) -> Result<Option<TradeOffer>, ApiError> {
    Ok(sqlx::query_as::<_, TradeOffer>(&format!(
        "SELECT {OFFER_COLUMNS} FROM trade_offers WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(db)
    .await?)
}

/// Offers whose requested game is *currently* owned by `user_id`. The
/// recipient is derived from live ownership via the join, never stored,
/// so an accepted trade immediately redirects remaining offers on that
/// game to its new owner.
pub async fn incoming(db: &PgPool, user_id: Uuid) -> Result<Vec<TradeOffer>, ApiError> {
    Ok(sqlx::query_as::<_, TradeOffer>(
        "SELECT o.id, o.proposer_id, o.requested_game_id, o.offered_game_id,
                o.status, o.created_at
           FROM trade_offers o
           JOIN games g ON g.id = o.requested_game_id
          WHERE g.owner_id = $1
          ORDER BY o.created_at DESC, o.id DESC",
    )
    .bind(user_id)
    .fetch_all(db)
    .await?)
}

pub async fn outgoing(db: &PgPool, user_id: Uuid) -> Result<Vec<TradeOffer>, ApiError> {
    Ok(sqlx::query_as::<_, TradeOffer>(&format!(
        "SELECT {OFFER_COLUMNS} FROM trade_offers
          WHERE proposer_id = $1
          ORDER BY created_at DESC, id DESC"
    ))
    .bind(user_id)
    .fetch_all(db)
    .await?)
}

/// Accept or reject a pending offer on behalf of `decider_id`.
///
/// On accept the two games swap `owner_id` and the offer is marked
/// `accepted`, all in one atomic unit. If ownership drifted since the
/// offer was created the caller gets `Conflict` and the offer stays
/// `pending` for a later retry.
pub async fn decide(
    db: &PgPool,
    offer_id: Uuid,
    decider_id: Uuid,
    decision: Decision,
) -> Result<TradeOffer, ApiError> {
    let mut tx = db.begin().await?;

    let offer = sqlx::query_as::<_, TradeOffer>(&format!(
        "SELECT {OFFER_COLUMNS} FROM trade_offers WHERE id = $1 FOR UPDATE"
    ))
    .bind(offer_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| ApiError::not_found("Offer not found"))?;

    // Terminal offers never re-open; report before touching the games.
    if offer.status != OfferStatus::Pending {
        return Err(ApiError::invalid_operation(
            "ALREADY_DECIDED",
            "This offer has already been decided",
        ));
    }

    // Lock both game rows in one statement, ordered by id so two
    // decisions over overlapping games cannot deadlock.
    let games = sqlx::query_as::<_, Game>(
        "SELECT id, owner_id, name, publisher, year_published, system,
                condition, previous_owners, created_at
           FROM games
          WHERE id = $1 OR id = $2
          ORDER BY id
            FOR UPDATE",
    )
    .bind(offer.requested_game_id)
    .bind(offer.offered_game_id)
    .fetch_all(&mut *tx)
    .await?;

    let requested = games
        .iter()
        .find(|g| g.id == offer.requested_game_id)
        .cloned()
        .ok_or_else(|| {
            ApiError::conflict("OWNERSHIP_CHANGED", "The requested game no longer exists")
        })?;
    let offered = games
        .iter()
        .find(|g| g.id == offer.offered_game_id)
        .cloned()
        .ok_or_else(|| {
            ApiError::conflict("OWNERSHIP_CHANGED", "The offered game no longer exists")
        })?;

    trade::validate_decision(&offer, &requested, decider_id)?;

    if decision == Decision::Accepted {
        trade::validate_swap(&offer, &requested, &offered)?;

        let (requested_owner, offered_owner) = trade::swap_owners(&offer, &requested);
        sqlx::query("UPDATE games SET owner_id = $1 WHERE id = $2")
            .bind(requested_owner)
            .bind(requested.id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("UPDATE games SET owner_id = $1 WHERE id = $2")
            .bind(offered_owner)
            .bind(offered.id)
            .execute(&mut *tx)
            .await?;
    }

    let updated = sqlx::query_as::<_, TradeOffer>(&format!(
        "UPDATE trade_offers SET status = $2 WHERE id = $1 RETURNING {OFFER_COLUMNS}"
    ))
    .bind(offer.id)
    .bind(decision.into_status())
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(updated)
}
