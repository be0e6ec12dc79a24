//! Trade-offer endpoints: propose, list, inspect, decide.

use actix_web::{get, post, web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::models::{OfferStatus, TradeOffer};
use crate::db::{game_repo, offer_repo};
use crate::error::ApiError;
use crate::hateoas::{self, link, Links};
use crate::http::auth::JwtAuth;
use crate::http::Paged;
use crate::trade::{self, Decision};

//////////////////////////////////////////////////
// Payloads
//////////////////////////////////////////////////

#[derive(Deserialize)]
pub struct OfferCreate {
    pub requested_game_id: Uuid,
    pub offered_game_id: Uuid,
}

#[derive(Deserialize)]
pub struct OfferDecision {
    pub decision: Decision,
}

#[derive(Serialize)]
pub struct OfferOut {
    pub id: Uuid,
    pub proposer_id: Uuid,
    pub requested_game_id: Uuid,
    pub offered_game_id: Uuid,
    pub status: OfferStatus,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "_links")]
    pub links: Links,
}

fn to_offer_out(offer: TradeOffer, can_decide: bool) -> OfferOut {
    OfferOut {
        links: hateoas::offer_links(offer.id, can_decide),
        id: offer.id,
        proposer_id: offer.proposer_id,
        requested_game_id: offer.requested_game_id,
        offered_game_id: offer.offered_game_id,
        status: offer.status,
        created_at: offer.created_at,
    }
}

//////////////////////////////////////////////////
// Handlers
//////////////////////////////////////////////////

/// POST /api/offers: propose a trade.
#[post("/offers")]
pub async fn create_offer(
    payload: web::Json<OfferCreate>,
    auth: JwtAuth,
    db: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let requested = game_repo::by_id(&db, payload.requested_game_id).await?;
    let offered = game_repo::by_id(&db, payload.offered_game_id).await?;
    let (Some(requested), Some(offered)) = (requested, offered) else {
        return Err(ApiError::not_found("Requested or offered game not found"));
    };

    trade::validate_proposal(auth.user_id, &requested, &offered)?;

    let offer = offer_repo::insert(&db, auth.user_id, requested.id, offered.id).await?;
    let location = format!("/api/offers/{}", offer.id);

    // The proposer never holds the decision on their own offer.
    Ok(HttpResponse::Created()
        .insert_header(("Location", location))
        .json(to_offer_out(offer, false)))
}

/// GET /api/offers/incoming: offers whose requested game the caller
/// currently owns. Recipiency is derived from live ownership, so this
/// set changes immediately when a game trades hands.
#[get("/offers/incoming")]
pub async fn incoming_offers(
    auth: JwtAuth,
    db: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let offers = offer_repo::incoming(&db, auth.user_id).await?;
    let total = offers.len() as i64;

    let mut links = Links::new();
    links.insert("self", link("/api/offers/incoming"));
    links.insert("outgoing", link("/api/offers/outgoing"));

    Ok(HttpResponse::Ok().json(Paged {
        items: offers
            .into_iter()
            .map(|o| {
                let can_decide = o.status == OfferStatus::Pending;
                to_offer_out(o, can_decide)
            })
            .collect::<Vec<_>>(),
        page: 1,
        page_size: total,
        total,
        links,
    }))
}

/// GET /api/offers/outgoing: offers the caller proposed.
#[get("/offers/outgoing")]
pub async fn outgoing_offers(
    auth: JwtAuth,
    db: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let offers = offer_repo::outgoing(&db, auth.user_id).await?;
    let total = offers.len() as i64;

    let mut links = Links::new();
    links.insert("self", link("/api/offers/outgoing"));
    links.insert("incoming", link("/api/offers/incoming"));

    Ok(HttpResponse::Ok().json(Paged {
        items: offers
            .into_iter()
            .map(|o| to_offer_out(o, false))
            .collect::<Vec<_>>(),
        page: 1,
        page_size: total,
        total,
        links,
    }))
}

/// GET /api/offers/{id}: visible to the proposer and the current
/// recipient only.
#[get("/offers/{offer_id}")]
pub async fn get_offer(
    path: web::Path<Uuid>,
    auth: JwtAuth,
    db: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let offer = offer_repo::by_id(&db, path.into_inner())
        .await?
        .ok_or_else(|| ApiError::not_found("Offer not found"))?;
    let requested = game_repo::by_id(&db, offer.requested_game_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Offer not found"))?;

    if auth.user_id != offer.proposer_id && auth.user_id != requested.owner_id {
        return Err(ApiError::forbidden("You are not a party to this offer"));
    }

    let can_decide = trade::can_decide(&offer, &requested, auth.user_id);
    Ok(HttpResponse::Ok().json(to_offer_out(offer, can_decide)))
}

/// POST /api/offers/{id}/decision: recipient-only accept/reject. On
/// accept the two games swap owners atomically with the status change.
#[post("/offers/{offer_id}/decision")]
pub async fn decide_offer(
    path: web::Path<Uuid>,
    payload: web::Json<OfferDecision>,
    auth: JwtAuth,
    db: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let offer = offer_repo::decide(&db, path.into_inner(), auth.user_id, payload.decision).await?;

    // The offer is terminal now; no decision link either way.
    Ok(HttpResponse::Ok().json(to_offer_out(offer, false)))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    // Literal segments must register before the `{offer_id}` matcher.
    cfg.service(create_offer)
        .service(incoming_offers)
        .service(outgoing_offers)
        .service(get_offer)
        .service(decide_offer);
}
