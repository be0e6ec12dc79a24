//! Game catalog: CRUD plus filtered, paginated search.

use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::db::models::{Game, GameCondition};
use crate::error::ApiError;

const GAME_COLUMNS: &str =
    "id, owner_id, name, publisher, year_published, system, condition, previous_owners, created_at";

/// Validated fields for a new listing.
pub struct NewGame {
    pub name: String,
    pub publisher: String,
    pub year_published: i32,
    pub system: String,
    pub condition: GameCondition,
    pub previous_owners: Option<i32>,
}

/// Partial update; `None` fields keep their current value.
#[derive(Default)]
pub struct GameChanges {
    pub name: Option<String>,
    pub publisher: Option<String>,
    pub year_published: Option<i32>,
    pub system: Option<String>,
    pub condition: Option<GameCondition>,
    pub previous_owners: Option<i32>,
}

/// Search predicates; all optional, combined with AND.
#[derive(Debug, Default, Clone)]
pub struct GameFilter {
    pub name: Option<String>,
    pub publisher: Option<String>,
    pub system: Option<String>,
    pub condition: Option<GameCondition>,
    pub year: Option<i32>,
    pub year_min: Option<i32>,
    pub year_max: Option<i32>,
    pub owner_id: Option<Uuid>,
}

fn apply_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &GameFilter) {
    if let Some(name) = &filter.name {
        qb.push(" AND name ILIKE ").push_bind(format!("%{name}%"));
    }
    if let Some(publisher) = &filter.publisher {
        qb.push(" AND publisher ILIKE ")
            .push_bind(format!("%{publisher}%"));
    }
    if let Some(system) = &filter.system {
        qb.push(" AND system ILIKE ").push_bind(format!("%{system}%"));
    }
    if let Some(condition) = filter.condition {
        qb.push(" AND condition = ").push_bind(condition);
    }
    if let Some(year) = filter.year {
        qb.push(" AND year_published = ").push_bind(year);
    }
    if let Some(year_min) = filter.year_min {
        qb.push(" AND year_published >= ").push_bind(year_min);
    }
    if let Some(year_max) = filter.year_max {
        qb.push(" AND year_published <= ").push_bind(year_max);
    }
    if let Some(owner_id) = filter.owner_id {
        qb.push(" AND owner_id = ").push_bind(owner_id);
    }
}

/// One page of matches plus the total match count. A page past the end
/// simply comes back empty.
pub async fn search(
    db: &PgPool,
    filter: &GameFilter,
    page: i64,
    page_size: i64,
) -> Result<(Vec<Game>, i64), ApiError> {
    let mut count_qb = QueryBuilder::new("SELECT COUNT(*) FROM games WHERE TRUE");
    apply_filters(&mut count_qb, filter);
    let total: i64 = count_qb.build_query_scalar().fetch_one(db).await?;

    let mut qb = QueryBuilder::new(format!("SELECT {GAME_COLUMNS} FROM games WHERE TRUE"));
    apply_filters(&mut qb, filter);
    qb.push(" ORDER BY created_at DESC, id DESC LIMIT ")
        .push_bind(page_size)
        .push(" OFFSET ")
        .push_bind((page - 1) * page_size);

    let items = qb.build_query_as::<Game>().fetch_all(db).await?;
    Ok((items, total))
}

pub async fn by_id(db: &PgPool, id: Uuid) -> Result<Option<Game>, ApiError> {
    Ok(
        sqlx::query_as::<_, Game>(&format!("SELECT {GAME_COLUMNS} FROM games WHERE id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await?,
    )
}

pub async fn insert(db: &PgPool, owner_id: Uuid, game: &NewGame) -> Result<Game, ApiError> {
    sqlx::query_as::<_, Game>(&format!(
        "INSERT INTO games
             (owner_id, name, publisher, year_published, system, condition, previous_owners)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         RETURNING {GAME_COLUMNS}"
    ))
    .bind(owner_id)
    .bind(&game.name)
    .bind(&game.publisher)
    .bind(game.year_published)
    .bind(&game.system)
    .bind(game.condition)
    .bind(game.previous_owners)
    .fetch_one(db)
    .await
    .map_err(Into::into)
}

pub async fn update(db: &PgPool, id: Uuid, changes: &GameChanges) -> Result<Game, ApiError> {
    sqlx::query_as::<_, Game>(&format!(
        "UPDATE games
            SET name            = COALESCE($2, name),
                publisher       = COALESCE($3, publisher),
                year_published  = COALESCE($4, year_published),
                system          = COALESCE($5, system),
                condition       = COALESCE($6, condition),
                previous_owners = COALESCE($7, previous_owners)
          WHERE id = $1
          RETURNING {GAME_COLUMNS}"
    ))
    .bind(id)
    .bind(changes.name.as_deref())
    .bind(changes.publisher.as_deref())
    .bind(changes.year_published)
    .bind(changes.system.as_deref())
    .bind(changes.condition)
    .bind(changes.previous_owners)
    .fetch_one(db)
    .await
    .map_err(Into::into)
}

pub async fn delete(db: &PgPool, id: Uuid) -> Result<(), ApiError> {
    sqlx::query("DELETE FROM games WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(())
}
