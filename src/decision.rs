use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use serde::Serialize;

use crate::action::{legal_actions, Action, Claim};
use crate::card::{Card, Character};

/// Failure of a decision source itself (not an illegal answer). Surfaced
/// through the engine as `CoupError::Decision`.
pub type DecisionError = Box<dyn std::error::Error + Send + Sync>;

pub type DecisionResult<T> = Result<T, DecisionError>;

/// What a participant knows when asked to decide something: their own hand
/// plus everyone's public state. Serializable so reasoning-backed sources can
/// be handed a JSON rendering of it.
#[derive(Clone, Debug, Serialize)]
pub struct GameView {
    pub turn: usize,
    pub treasury: u8,
    pub deck_size: usize,
    pub discard: Vec<Character>,
    pub current_player: String,
    pub you: OwnView,
    pub opponents: Vec<OpponentView>,
}

#[derive(Clone, Debug, Serialize)]
pub struct OwnView {
    pub name: String,
    pub coins: u8,
    pub hand: Vec<Character>,
}

#[derive(Clone, Debug, Serialize)]
pub struct OpponentView {
    pub name: String,
    pub coins: u8,
    pub cards_remaining: usize,
    pub is_active: bool,
}

/// The action a player declares on their turn, with an optional target and
/// optional table talk.
#[derive(Clone, Debug)]
pub struct ActionChoice {
    pub action: Action,
    pub target: Option<String>,
    pub speech: Option<String>,
}

/// How the engine obtains choices from a participant: a human frontend, a
/// scripted bot, or something backed by a remote reasoning service. Calls are
/// blocking and may be slow; the engine validates legality of whatever comes
/// back but imposes no timeout policy.
pub trait DecisionMaker {
    /// Declare this turn's action. Must be legal for the viewer's coins and
    /// carry a valid target where the action needs one; the engine treats an
    /// illegal answer as fatal.
    fn choose_action(&mut self, view: &GameView, round_log: &[String]) -> DecisionResult<ActionChoice>;

    /// Whether to challenge `actor`'s claim. Only the first accepting player
    /// in the pool acts on it.
    fn decide_challenge(
        &mut self,
        actor: &str,
        target: Option<&str>,
        claim: &Claim,
        view: &GameView,
        dialogue: &[String],
    ) -> DecisionResult<(bool, Option<String>)>;

    /// Whether to block `actor`'s action.
    fn decide_counter(
        &mut self,
        actor: &str,
        target: Option<&str>,
        action: Action,
        view: &GameView,
        dialogue: &[String],
    ) -> DecisionResult<(bool, Option<String>)>;

    /// Index into `hand` of the card to give up. Invalid indexes are
    /// re-queried a bounded number of times before the engine gives up.
    fn choose_card_to_discard(&mut self, hand: &[Card], past_events: &[String]) -> DecisionResult<usize>;

    /// `count` distinct indexes into `candidates` naming the cards to return
    /// to the deck after an exchange. Re-queried on invalid answers like
    /// discard.
    fn choose_exchange_return(
        &mut self,
        candidates: &[Card],
        count: usize,
        past_events: &[String],
    ) -> DecisionResult<Vec<usize>>;

    /// Fire-and-forget event delivery.
    fn notify(&mut self, _event: &str) {}
}

/// A uniformly random participant. Drives the demo binary, the benchmark and
/// the randomized conservation tests; its choices are always legal.
pub struct RandomDecider {
    rng: Pcg64,
    challenge_rate: f64,
    counter_rate: f64,
}

impl RandomDecider {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg64::seed_from_u64(seed),
            challenge_rate: 0.15,
            counter_rate: 0.25,
        }
    }
}

impl DecisionMaker for RandomDecider {
    fn choose_action(&mut self, view: &GameView, _round_log: &[String]) -> DecisionResult<ActionChoice> {
        let targets: Vec<&OpponentView> = view.opponents.iter()
            .filter(|opponent| opponent.is_active)
            .collect();

        let actions: Vec<Action> = legal_actions(view.you.coins)
            .into_iter()
            .filter(|action| !action.requires_target() || !targets.is_empty())
            .collect();

        let action = *actions.choose(&mut self.rng)
            .ok_or("no legal action available")?;

        let target = if action.requires_target() {
            targets.choose(&mut self.rng).map(|opponent| opponent.name.clone())
        } else {
            None
        };

        Ok(ActionChoice { action, target, speech: None })
    }

    fn decide_challenge(
        &mut self,
        _actor: &str,
        _target: Option<&str>,
        _claim: &Claim,
        _view: &GameView,
        _dialogue: &[String],
    ) -> DecisionResult<(bool, Option<String>)> {
        Ok((self.rng.gen_bool(self.challenge_rate), None))
    }

    fn decide_counter(
        &mut self,
        _actor: &str,
        _target: Option<&str>,
        _action: Action,
        _view: &GameView,
        _dialogue: &[String],
    ) -> DecisionResult<(bool, Option<String>)> {
        Ok((self.rng.gen_bool(self.counter_rate), None))
    }

    fn choose_card_to_discard(&mut self, hand: &[Card], _past_events: &[String]) -> DecisionResult<usize> {
        Ok(self.rng.gen_range(0..hand.len()))
    }

    fn choose_exchange_return(
        &mut self,
        candidates: &[Card],
        count: usize,
        _past_events: &[String],
    ) -> DecisionResult<Vec<usize>> {
        let mut indexes: Vec<usize> = (0..candidates.len()).collect();
        indexes.shuffle(&mut self.rng);
        indexes.truncate(count);
        Ok(indexes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(coins: u8) -> GameView {
        GameView {
            turn: 0,
            treasury: 42,
            deck_size: 7,
            discard: vec![],
            current_player: "A".to_string(),
            you: OwnView { name: "A".to_string(), coins, hand: vec![Character::Duke, Character::Captain] },
            opponents: vec![
                OpponentView { name: "B".to_string(), coins: 2, cards_remaining: 2, is_active: true },
                OpponentView { name: "C".to_string(), coins: 2, cards_remaining: 0, is_active: false },
            ],
        }
    }

    #[test]
    fn random_decider_stays_legal() {
        let mut decider = RandomDecider::new(11);

        for _ in 0..200 {
            let choice = decider.choose_action(&view(8), &[]).unwrap();
            assert!(legal_actions(8).contains(&choice.action));

            if choice.action.requires_target() {
                // only the active opponent is ever targeted
                assert_eq!(choice.target.as_deref(), Some("B"));
            }
        }
    }

    #[test]
    fn random_decider_forced_coup() {
        let mut decider = RandomDecider::new(12);
        let choice = decider.choose_action(&view(11), &[]).unwrap();
        assert_eq!(choice.action, Action::Coup);
    }

    #[test]
    fn view_serializes() {
        let rendered = serde_json::to_string(&view(2)).unwrap();
        assert!(rendered.contains("\"treasury\":42"));
        assert!(rendered.contains("\"Duke\""));
    }
}
