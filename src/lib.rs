pub mod action;
pub mod card;
pub mod decision;
pub mod game;
pub mod player;

pub use action::{counter_for, legal_actions, Action, Claim, CounterAction};
pub use card::{Card, Character, Deck, DECK_SIZE};
pub use decision::{
    ActionChoice, DecisionError, DecisionMaker, DecisionResult, GameView, OpponentView, OwnView,
    RandomDecider,
};
pub use game::{Coup, TurnOutcome};
pub use player::Player;

use thiserror::Error;

/// Fatal conditions that end a game instance. A turn is atomic: none of
/// these leave a partially applied turn behind worth resuming.
#[derive(Debug, Error)]
pub enum CoupError {
    #[error("a game needs 2 to 6 players, got {0}")]
    InvalidPlayerCount(usize),

    #[error("player name {0:?} is not unique")]
    DuplicateName(String),

    #[error("{player} declared {action}, which is not legal with {coins} coins")]
    IllegalAction {
        player: String,
        action: Action,
        coins: u8,
    },

    #[error("{player} chose an invalid target: {reason}")]
    InvalidTarget { player: String, reason: String },

    #[error("{player} kept choosing cards outside their hand")]
    InvalidDiscard { player: String },

    #[error("{player} kept returning an invalid exchange selection")]
    InvalidExchangeReturn { player: String },

    #[error("the deck is exhausted")]
    DeckExhausted,

    #[error("decision source for {player} failed: {source}")]
    Decision {
        player: String,
        #[source]
        source: DecisionError,
    },

    #[error("internal error: {0}")]
    Internal(&'static str),
}
