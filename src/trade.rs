//! Offer Engine core: the trade-offer state machine and its guards.
//!
//! Everything here is pure: guards take already-fetched rows and say
//! whether an operation may proceed. The transactional wiring (row
//! locks, the actual ownership swap) lives in [`crate::db::offer_repo`].

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::models::{Game, OfferStatus, TradeOffer};
use crate::error::ApiError;

/// Recipient's verdict on a pending offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Accepted,
    Rejected,
}

impl Decision {
    pub fn into_status(self) -> OfferStatus {
        match self {
            Self::Accepted => OfferStatus::Accepted,
            Self::Rejected => OfferStatus::Rejected,
        }
    }
}

/// Creation-time guards, in order: duplicate ids, offering a game the
/// proposer does not own, requesting a game the proposer already owns.
pub fn validate_proposal(
    proposer_id: Uuid,
    requested: &Game,
    offered: &Game,
) -> Result<(), ApiError> {
    if requested.id == offered.id {
        return Err(ApiError::invalid_operation(
            "INVALID_OFFER",
            "Requested and offered game must be distinct",
        ));
    }
    if offered.owner_id != proposer_id {
        return Err(ApiError::forbidden("You may only offer a game you own"));
    }
    if requested.owner_id == proposer_id {
        return Err(ApiError::invalid_operation(
            "INVALID_OFFER",
            "You cannot request your own game",
        ));
    }
    Ok(())
}

/// Guards shared by accept and reject: the offer must still be pending
/// and the caller must be the *current* owner of the requested game.
/// Ownership is re-read at decision time, so the recipient can change
/// if the game traded hands since the offer was created.
pub fn validate_decision(
    offer: &TradeOffer,
    requested: &Game,
    decider_id: Uuid,
) -> Result<(), ApiError> {
    if offer.status != OfferStatus::Pending {
        return Err(ApiError::invalid_operation(
            "ALREADY_DECIDED",
            "This offer has already been decided",
        ));
    }
    if requested.owner_id != decider_id {
        return Err(ApiError::forbidden(
            "Only the owner of the requested game may decide this offer",
        ));
    }
    Ok(())
}

/// Accept-time re-validation, run inside the decision transaction with
/// both game rows locked. A concurrently accepted offer may have moved
/// either game; the swap is then unsatisfiable and the caller gets
/// `Conflict` with the offer left pending.
pub fn validate_swap(
    offer: &TradeOffer,
    requested: &Game,
    offered: &Game,
) -> Result<(), ApiError> {
    if offered.owner_id != offer.proposer_id {
        return Err(ApiError::conflict(
            "OWNERSHIP_CHANGED",
            "The offered game no longer belongs to the proposer",
        ));
    }
    if requested.owner_id == offer.proposer_id {
        return Err(ApiError::conflict(
            "OWNERSHIP_CHANGED",
            "Both games now belong to the proposer; the trade is void",
        ));
    }
    Ok(())
}

/// New `owner_id` for `(requested, offered)` once an accept commits:
/// the requested game goes to the proposer, the offered game to the
/// recipient who accepted. Call only after [`validate_swap`] passed.
pub fn swap_owners(offer: &TradeOffer, requested: &Game) -> (Uuid, Uuid) {
    (offer.proposer_id, requested.owner_id)
}

/// Whether `viewer` currently holds the decision on `offer`. Drives
/// the conditional `decision` hypermedia link.
pub fn can_decide(offer: &TradeOffer, requested: &Game, viewer_id: Uuid) -> bool {
    offer.status == OfferStatus::Pending && requested.owner_id == viewer_id
}
