use chrono::Utc;
use uuid::Uuid;

use retro_exchange_server::db::models::{Game, GameCondition, OfferStatus, TradeOffer};
use retro_exchange_server::error::ApiError;
use retro_exchange_server::trade::{self, Decision};

fn game(owner_id: Uuid, name: &str) -> Game {
    Game {
        id: Uuid::new_v4(),
        owner_id,
        name: name.into(),
        publisher: "Square".into(),
        year_published: 1995,
        system: "SNES".into(),
        condition: GameCondition::Good,
        previous_owners: Some(1),
        created_at: Utc::now(),
    }
}

fn offer(proposer_id: Uuid, requested: &Game, offered: &Game, status: OfferStatus) -> TradeOffer {
    TradeOffer {
        id: Uuid::new_v4(),
        proposer_id,
        requested_game_id: requested.id,
        offered_game_id: offered.id,
        status,
        created_at: Utc::now(),
    }
}

//////////////////////////////////////////////////
// Proposal guards
//////////////////////////////////////////////////

#[test]
fn proposal_allows_valid_two_party_trade() {
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
    let requested = game(b, "Final Fantasy VI");
    let offered = game(a, "Chrono Trigger");

    assert!(trade::validate_proposal(a, &requested, &offered).is_ok());
}

#[test]
fn proposal_rejects_duplicate_game_ids() {
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
    let requested = game(b, "Final Fantasy VI");

    let err = trade::validate_proposal(a, &requested, &requested).unwrap_err();
    assert!(matches!(err, ApiError::InvalidOperation { .. }));
    assert_eq!(err.code(), "INVALID_OFFER");
}

#[test]
fn proposal_forbids_offering_a_game_you_do_not_own() {
    let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
    let requested = game(b, "Final Fantasy VI");
    let offered = game(c, "Chrono Trigger"); // not a's game

    let err = trade::validate_proposal(a, &requested, &offered).unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));
}

#[test]
fn proposal_rejects_requesting_your_own_game() {
    let a = Uuid::new_v4();
    let requested = game(a, "Final Fantasy VI");
    let offered = game(a, "Chrono Trigger");

    let err = trade::validate_proposal(a, &requested, &offered).unwrap_err();
    assert!(matches!(err, ApiError::InvalidOperation { .. }));
}

//////////////////////////////////////////////////
// Decision guards
//////////////////////////////////////////////////

#[test]
fn decision_rejects_terminal_offers() {
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
    let requested = game(b, "Final Fantasy VI");
    let offered = game(a, "Chrono Trigger");

    for status in [OfferStatus::Accepted, OfferStatus::Rejected] {
        let o = offer(a, &requested, &offered, status);
        let err = trade::validate_decision(&o, &requested, b).unwrap_err();
        assert!(matches!(err, ApiError::InvalidOperation { .. }));
        assert_eq!(err.code(), "ALREADY_DECIDED");
    }
}

#[test]
fn decision_forbids_anyone_but_the_current_owner() {
    let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
    let requested = game(b, "Final Fantasy VI");
    let offered = game(a, "Chrono Trigger");
    let o = offer(a, &requested, &offered, OfferStatus::Pending);

    let err = trade::validate_decision(&o, &requested, c).unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));
}

#[test]
fn decision_follows_live_ownership_not_creation_time_ownership() {
    let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
    let mut requested = game(b, "Final Fantasy VI");
    let offered = game(a, "Chrono Trigger");
    let o = offer(a, &requested, &offered, OfferStatus::Pending);

    // The requested game changes hands; the decision moves with it.
    requested.owner_id = c;
    assert!(trade::validate_decision(&o, &requested, c).is_ok());
    assert!(trade::validate_decision(&o, &requested, b).is_err());
}

//////////////////////////////////////////////////
// Accept-time re-validation
//////////////////////////////////////////////////

#[test]
fn swap_passes_while_invariants_hold() {
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
    let requested = game(b, "Final Fantasy VI");
    let offered = game(a, "Chrono Trigger");
    let o = offer(a, &requested, &offered, OfferStatus::Pending);

    assert!(trade::validate_swap(&o, &requested, &offered).is_ok());
}

#[test]
fn swap_conflicts_when_the_offered_game_moved() {
    let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
    let requested = game(b, "Final Fantasy VI");
    let mut offered = game(a, "Chrono Trigger");
    let o = offer(a, &requested, &offered, OfferStatus::Pending);

    // A concurrently accepted offer gave the offered game away.
    offered.owner_id = c;
    let err = trade::validate_swap(&o, &requested, &offered).unwrap_err();
    assert!(matches!(err, ApiError::Conflict { .. }));
    assert_eq!(err.code(), "OWNERSHIP_CHANGED");
}

#[test]
fn swap_conflicts_when_the_proposer_ended_up_with_both_games() {
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
    let mut requested = game(b, "Final Fantasy VI");
    let offered = game(a, "Chrono Trigger");
    let o = offer(a, &requested, &offered, OfferStatus::Pending);

    requested.owner_id = a;
    let err = trade::validate_swap(&o, &requested, &offered).unwrap_err();
    assert!(matches!(err, ApiError::Conflict { .. }));
}

#[test]
fn accepting_swaps_ownership_of_exactly_the_two_games() {
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
    let mut requested = game(b, "Final Fantasy VI");
    let mut offered = game(a, "Chrono Trigger");
    let bystander = game(b, "Secret of Mana");
    let mut o = offer(a, &requested, &offered, OfferStatus::Pending);

    // B accepts: every guard passes and the swap resolves each game's
    // new owner.
    assert!(trade::validate_decision(&o, &requested, b).is_ok());
    assert!(trade::validate_swap(&o, &requested, &offered).is_ok());
    let (requested_owner, offered_owner) = trade::swap_owners(&o, &requested);

    requested.owner_id = requested_owner;
    offered.owner_id = offered_owner;
    o.status = Decision::Accepted.into_status();

    // A now holds Final Fantasy VI, B holds Chrono Trigger, and the
    // game outside the offer is untouched.
    assert_eq!(requested.owner_id, a);
    assert_eq!(offered.owner_id, b);
    assert_eq!(bystander.owner_id, b);

    // A second decision on the same offer is refused.
    let err = trade::validate_decision(&o, &requested, a).unwrap_err();
    assert_eq!(err.code(), "ALREADY_DECIDED");
}

#[test]
fn swap_never_hands_a_game_back_to_its_current_owner() {
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
    let requested = game(b, "Final Fantasy VI");
    let offered = game(a, "Chrono Trigger");
    let o = offer(a, &requested, &offered, OfferStatus::Pending);

    let (requested_owner, offered_owner) = trade::swap_owners(&o, &requested);
    assert_ne!(requested_owner, requested.owner_id);
    assert_ne!(offered_owner, offered.owner_id);
}

//////////////////////////////////////////////////
// Status machine & link gating
//////////////////////////////////////////////////

#[test]
fn decisions_map_onto_terminal_statuses() {
    assert_eq!(Decision::Accepted.into_status(), OfferStatus::Accepted);
    assert_eq!(Decision::Rejected.into_status(), OfferStatus::Rejected);
}

#[test]
fn decision_payload_parses_lowercase_wire_values() {
    let accepted: Decision = serde_json::from_str("\"accepted\"").unwrap();
    assert_eq!(accepted, Decision::Accepted);
    assert!(serde_json::from_str::<Decision>("\"Accepted\"").is_err());
}

#[test]
fn can_decide_only_while_pending_and_only_for_the_recipient() {
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
    let requested = game(b, "Final Fantasy VI");
    let offered = game(a, "Chrono Trigger");

    let pending = offer(a, &requested, &offered, OfferStatus::Pending);
    assert!(trade::can_decide(&pending, &requested, b));
    assert!(!trade::can_decide(&pending, &requested, a));

    let accepted = offer(a, &requested, &offered, OfferStatus::Accepted);
    assert!(!trade::can_decide(&accepted, &requested, b));
}
