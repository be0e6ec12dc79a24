//! Game catalog endpoints: owner-scoped CRUD plus filtered search.

use actix_web::{delete, get, post, put, web, HttpResponse};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::settings;
use crate::db::game_repo::{self, GameChanges, GameFilter, NewGame};
use crate::db::models::{Game, GameCondition};
use crate::error::ApiError;
use crate::hateoas::{self, Links};
use crate::http::auth::JwtAuth;
use crate::http::Paged;

//////////////////////////////////////////////////
// Payloads
//////////////////////////////////////////////////

#[derive(Deserialize)]
pub struct GameCreate {
    pub name: String,
    pub publisher: String,
    pub year_published: i32,
    pub system: String,
    pub condition: GameCondition,
    pub previous_owners: Option<i32>,
}

#[derive(Deserialize, Default)]
pub struct GameUpdate {
    pub name: Option<String>,
    pub publisher: Option<String>,
    pub year_published: Option<i32>,
    pub system: Option<String>,
    pub condition: Option<GameCondition>,
    pub previous_owners: Option<i32>,
}

fn default_page() -> i64 {
    1
}
fn default_page_size() -> i64 {
    20
}

/// Search + paging query string, camelCase per the public API.
#[derive(Deserialize)]
pub struct GameQuery {
    pub name: Option<String>,
    pub publisher: Option<String>,
    pub system: Option<String>,
    pub condition: Option<GameCondition>,
    pub year: Option<i32>,
    #[serde(rename = "yearMin")]
    pub year_min: Option<i32>,
    #[serde(rename = "yearMax")]
    pub year_max: Option<i32>,
    #[serde(rename = "ownerId")]
    pub owner_id: Option<Uuid>,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size", rename = "pageSize")]
    pub page_size: i64,
}

impl GameQuery {
    fn filter(&self) -> GameFilter {
        GameFilter {
            name: self.name.clone(),
            publisher: self.publisher.clone(),
            system: self.system.clone(),
            condition: self.condition,
            year: self.year,
            year_min: self.year_min,
            year_max: self.year_max,
            owner_id: self.owner_id,
        }
    }

    /// Filter parameters echoed into pagination links, in a fixed order.
    fn echo_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(v) = &self.name {
            pairs.push(("name", v.clone()));
        }
        if let Some(v) = &self.publisher {
            pairs.push(("publisher", v.clone()));
        }
        if let Some(v) = &self.system {
            pairs.push(("system", v.clone()));
        }
        if let Some(v) = self.condition {
            pairs.push(("condition", v.as_str().to_owned()));
        }
        if let Some(v) = self.year {
            pairs.push(("year", v.to_string()));
        }
        if let Some(v) = self.year_min {
            pairs.push(("yearMin", v.to_string()));
        }
        if let Some(v) = self.year_max {
            pairs.push(("yearMax", v.to_string()));
        }
        if let Some(v) = self.owner_id {
            pairs.push(("ownerId", v.to_string()));
        }
        pairs
    }
}

#[derive(Serialize)]
pub struct GameOut {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub publisher: String,
    pub year_published: i32,
    pub system: String,
    pub condition: GameCondition,
    pub previous_owners: Option<i32>,
    #[serde(rename = "_links")]
    pub links: Links,
}

fn to_game_out(game: Game, viewer_id: Uuid) -> GameOut {
    let can_modify = game.owner_id == viewer_id;
    GameOut {
        links: hateoas::game_links(game.id, game.owner_id, can_modify),
        id: game.id,
        owner_id: game.owner_id,
        name: game.name,
        publisher: game.publisher,
        year_published: game.year_published,
        system: game.system,
        condition: game.condition,
        previous_owners: game.previous_owners,
    }
}

//////////////////////////////////////////////////
// Validation
//////////////////////////////////////////////////

fn bad(message: &str) -> ApiError {
    ApiError::validation("VALIDATION_ERROR", message)
}

fn check_len(value: &str, max: usize, field: &str) -> Result<(), ApiError> {
    let n = value.chars().count();
    if n < 1 || n > max {
        return Err(bad(&format!("{field} must be 1..{max} characters")));
    }
    Ok(())
}

fn check_year(year: i32) -> Result<(), ApiError> {
    if !(1970..=2100).contains(&year) {
        return Err(bad("year_published must be within 1970..2100"));
    }
    Ok(())
}

fn check_previous_owners(count: Option<i32>) -> Result<(), ApiError> {
    if count.is_some_and(|c| c < 0) {
        return Err(bad("previous_owners must be non-negative"));
    }
    Ok(())
}

pub(crate) fn validate_create(payload: &GameCreate) -> Result<(), ApiError> {
    check_len(&payload.name, 200, "name")?;
    check_len(&payload.publisher, 200, "publisher")?;
    check_len(&payload.system, 100, "system")?;
    check_year(payload.year_published)?;
    check_previous_owners(payload.previous_owners)
}

pub(crate) fn validate_update(payload: &GameUpdate) -> Result<(), ApiError> {
    if let Some(name) = &payload.name {
        check_len(name, 200, "name")?;
    }
    if let Some(publisher) = &payload.publisher {
        check_len(publisher, 200, "publisher")?;
    }
    if let Some(system) = &payload.system {
        check_len(system, 100, "system")?;
    }
    if let Some(year) = payload.year_published {
        check_year(year)?;
    }
    check_previous_owners(payload.previous_owners)
}

fn validate_paging(page: i64, page_size: i64) -> Result<(), ApiError> {
    if page < 1 || page_size < 1 || page_size > settings().max_page_size {
        return Err(ApiError::validation(
            "BAD_PAGING",
            format!(
                "page must be >= 1 and pageSize must be 1..{}",
                settings().max_page_size
            ),
        ));
    }
    Ok(())
}

//////////////////////////////////////////////////
// Handlers
//////////////////////////////////////////////////

/// POST /api/games: create a listing owned by the caller.
#[post("/games")]
pub async fn create_game(
    payload: web::Json<GameCreate>,
    auth: JwtAuth,
    db: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    validate_create(&payload)?;

    let payload = payload.into_inner();
    let game = game_repo::insert(
        &db,
        auth.user_id,
        &NewGame {
            name: payload.name,
            publisher: payload.publisher,
            year_published: payload.year_published,
            system: payload.system,
            condition: payload.condition,
            previous_owners: payload.previous_owners,
        },
    )
    .await?;

    let location = format!("/api/games/{}", game.id);
    Ok(HttpResponse::Created()
        .insert_header(("Location", location))
        .json(to_game_out(game, auth.user_id)))
}

/// GET /api/games: search with filters and pagination.
#[get("/games")]
pub async fn list_games(
    query: web::Query<GameQuery>,
    auth: JwtAuth,
    db: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    validate_paging(query.page, query.page_size)?;

    let (items, total) = game_repo::search(&db, &query.filter(), query.page, query.page_size).await?;

    let links = hateoas::games_collection_links(
        query.page,
        query.page_size,
        total,
        &query.echo_pairs(),
        true,
    );
    Ok(HttpResponse::Ok().json(Paged {
        items: items
            .into_iter()
            .map(|g| to_game_out(g, auth.user_id))
            .collect::<Vec<_>>(),
        page: query.page,
        page_size: query.page_size,
        total,
        links,
    }))
}

/// GET /api/games/{id}
#[get("/games/{game_id}")]
pub async fn get_game(
    path: web::Path<Uuid>,
    auth: JwtAuth,
    db: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let game = game_repo::by_id(&db, path.into_inner())
        .await?
        .ok_or_else(|| ApiError::not_found("Game not found"))?;
    Ok(HttpResponse::Ok().json(to_game_out(game, auth.user_id)))
}

/// PUT /api/games/{id}: owner-only partial update.
#[put("/games/{game_id}")]
pub async fn update_game(
    path: web::Path<Uuid>,
    payload: web::Json<GameUpdate>,
    auth: JwtAuth,
    db: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let game_id = path.into_inner();
    validate_update(&payload)?;

    let game = game_repo::by_id(&db, game_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Game not found"))?;
    if game.owner_id != auth.user_id {
        return Err(ApiError::forbidden("Only the owner may update this game"));
    }

    let payload = payload.into_inner();
    let updated = game_repo::update(
        &db,
        game_id,
        &GameChanges {
            name: payload.name,
            publisher: payload.publisher,
            year_published: payload.year_published,
            system: payload.system,
            condition: payload.condition,
            previous_owners: payload.previous_owners,
        },
    )
    .await?;

    Ok(HttpResponse::Ok().json(to_game_out(updated, auth.user_id)))
}

/// DELETE /api/games/{id}: owner-only, 204 on success.
#[delete("/games/{game_id}")]
pub async fn delete_game(
    path: web::Path<Uuid>,
    auth: JwtAuth,
    db: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let game_id = path.into_inner();
    let game = game_repo::by_id(&db, game_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Game not found"))?;
    if game.owner_id != auth.user_id {
        return Err(ApiError::forbidden("Only the owner may delete this game"));
    }

    game_repo::delete(&db, game_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create_game)
        .service(list_games)
        .service(get_game)
        .service(update_game)
        .service(delete_game);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_payload() -> GameCreate {
        GameCreate {
            name: "Chrono Trigger".into(),
            publisher: "Square".into(),
            year_published: 1995,
            system: "SNES".into(),
            condition: GameCondition::Good,
            previous_owners: Some(1),
        }
    }

    #[test]
    fn accepts_well_formed_listing() {
        assert!(validate_create(&create_payload()).is_ok());
    }

    #[test]
    fn rejects_year_outside_range() {
        for year in [1969, 2101] {
            let mut p = create_payload();
            p.year_published = year;
            assert!(validate_create(&p).is_err(), "accepted year {year}");
        }
    }

    #[test]
    fn rejects_negative_previous_owners() {
        let mut p = create_payload();
        p.previous_owners = Some(-1);
        assert!(validate_create(&p).is_err());
    }

    #[test]
    fn update_is_valid_when_empty() {
        assert!(validate_update(&GameUpdate::default()).is_ok());
    }

    #[test]
    fn echo_pairs_keep_query_order() {
        let query = GameQuery {
            name: Some("zelda".into()),
            publisher: None,
            system: Some("NES".into()),
            condition: Some(GameCondition::Mint),
            year: None,
            year_min: Some(1986),
            year_max: None,
            owner_id: None,
            page: 1,
            page_size: 20,
        };
        let pairs = query.echo_pairs();
        let keys: Vec<_> = pairs.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec!["name", "system", "condition", "yearMin"]);
        assert_eq!(pairs[2].1, "mint");
    }
}
