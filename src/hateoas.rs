//! Hypermedia (`_links`) builders.
//!
//! Pure functions of (resource, viewer, state): nothing here is
//! persisted, every response recomputes its links. Mutating relations
//! appear only when the viewer is actually allowed to follow them.

use std::collections::BTreeMap;

use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub href: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<&'static str>,
}

/// Relation name → link. BTreeMap keeps serialization order stable.
pub type Links = BTreeMap<&'static str, Link>;

pub fn link(href: impl Into<String>) -> Link {
    Link {
        href: href.into(),
        method: None,
    }
}

pub fn action(href: impl Into<String>, method: &'static str) -> Link {
    Link {
        href: href.into(),
        method: Some(method),
    }
}

/// Top-level links served by `GET /api`.
pub fn root_links() -> Links {
    let mut links = Links::new();
    links.insert("register", action("/api/users", "POST"));
    links.insert("login", action("/api/auth/token", "POST"));
    links.insert("me", action("/api/users/me", "GET"));
    links.insert("games", action("/api/games", "GET"));
    links.insert("offers", action("/api/offers", "POST"));
    links.insert("incoming_offers", action("/api/offers/incoming", "GET"));
    links.insert("outgoing_offers", action("/api/offers/outgoing", "GET"));
    links.insert("health", action("/api/healthz", "GET"));
    links
}

pub fn user_links(user_id: Uuid, is_self: bool) -> Links {
    let mut links = Links::new();
    links.insert("self", link(format!("/api/users/{user_id}")));
    links.insert("games", link(format!("/api/games?ownerId={user_id}")));
    links.insert("search_games", link("/api/games"));
    if is_self {
        links.insert("update", action(format!("/api/users/{user_id}"), "PUT"));
        links.insert("create_game", action("/api/games", "POST"));
    }
    links
}

pub fn game_links(game_id: Uuid, owner_id: Uuid, can_modify: bool) -> Links {
    let mut links = Links::new();
    links.insert("self", link(format!("/api/games/{game_id}")));
    links.insert("owner", link(format!("/api/users/{owner_id}")));
    links.insert("collection", link("/api/games"));
    links.insert("search", link("/api/games"));
    if can_modify {
        links.insert("update", action(format!("/api/games/{game_id}"), "PUT"));
        links.insert("delete", action(format!("/api/games/{game_id}"), "DELETE"));
    }
    links
}

/// Pagination links for the games collection. `query` carries the
/// caller's filter parameters so `next`/`prev` reproduce the search.
pub fn games_collection_links(
    page: i64,
    page_size: i64,
    total: i64,
    query: &[(&'static str, String)],
    can_create: bool,
) -> Links {
    let url_for = |p: i64| {
        let mut qs = url::form_urlencoded::Serializer::new(String::new());
        for (key, value) in query {
            qs.append_pair(key, value);
        }
        qs.append_pair("page", &p.to_string());
        qs.append_pair("pageSize", &page_size.to_string());
        format!("/api/games?{}", qs.finish())
    };

    let mut links = Links::new();
    links.insert("self", link(url_for(page)));

    let max_page = std::cmp::max(1, (total + page_size - 1) / page_size);
    if page < max_page {
        links.insert("next", link(url_for(page + 1)));
    }
    if page > 1 {
        links.insert("prev", link(url_for(page - 1)));
    }
    if can_create {
        links.insert("create", action("/api/games", "POST"));
    }
    links
}

pub fn offer_links(offer_id: Uuid, can_decide: bool) -> Links {
    let mut links = Links::new();
    links.insert("self", link(format!("/api/offers/{offer_id}")));
    links.insert("incoming", link("/api/offers/incoming"));
    links.insert("outgoing", link("/api/offers/outgoing"));
    links.insert("create", action("/api/offers", "POST"));
    if can_decide {
        links.insert(
            "decision",
            action(format!("/api/offers/{offer_id}/decision"), "POST"),
        );
    }
    links
}
