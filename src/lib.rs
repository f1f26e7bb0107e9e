//! bullshit-poker: rules engine and bot opponents for Bullshit Poker
//!
//! Every player holds a few private cards. Players take turns claiming that a
//! poker hand exists among *all* cards in play, each claim beating the last,
//! until someone calls bullshit. The loser of the call takes an extra card next
//! round; too many cards and you are out. Last player standing wins.
//!
//! Goals:
//! - Deterministic, seedable game state with one authoritative writer per room
//! - Claims evaluated by rank and suit counts, never by enumerating hands
//! - No panics for invalid input; use `Result` for recoverable errors
//!
//! ## Quick start: judge a claim
//! ```
//! use bullshit_poker::cards::{parse_cards, Rank};
//! use bullshit_poker::claim::Claim;
//! use bullshit_poker::evaluator::{evaluate_claim, is_escalation};
//!
//! let in_play = parse_cards("9c 9h 5d 5s 5h").unwrap();
//! let claim = Claim::full_house(Rank::Five, Rank::Nine).unwrap();
//! assert!(evaluate_claim(&claim, &in_play));
//! assert!(is_escalation(&claim, Some(&Claim::three_of_a_kind(Rank::Ace))));
//! ```
//!
//! ## TUI
//! Play against bots in the terminal with:
//! ```sh
//! cargo run --bin bullshit-poker
//! ```

pub mod agents;
pub mod cards;
pub mod catalog;
pub mod claim;
pub mod config;
pub mod deck;
pub mod engine;
pub mod estimator;
pub mod evaluator;
pub mod game;
pub mod lobby;
pub mod logging;
pub mod room;
pub mod snapshot;
pub mod tui;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
