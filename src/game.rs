use log::debug;
use rand::Rng;

use crate::action::{counter_for, legal_actions, Action, Claim, CounterAction};
use crate::card::{Card, Deck, DECK_SIZE};
use crate::decision::{DecisionMaker, GameView, OpponentView, OwnView};
use crate::player::Player;
use crate::CoupError;

const TREASURY_COINS: u8 = 50;
const STARTING_COINS: u8 = 2;

// how many times a bad discard/exchange answer is re-queried before giving up
const RETRY_LIMIT: usize = 8;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TurnOutcome {
    Continue,
    GameOver { winner: usize },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum ChallengeResult {
    NoChallenge,
    /// The claimant held a proof card; the challenger lost a card and the
    /// claimant swapped the revealed card through the deck.
    Failed,
    /// The claimant was bluffing and lost a card.
    Succeeded,
}

/// One game of Coup: owns every player, their decision sources, the deck,
/// the discard pile and the treasury. All mutation happens inside the
/// single-threaded turn loop; exactly one decision call is outstanding at a
/// time.
pub struct Coup {
    players: Vec<Player>,
    deciders: Vec<Box<dyn DecisionMaker>>,
    deck: Deck,
    discard: Vec<Card>,
    treasury: u8,
    turn: usize,
    current_player_idx: usize,
    round_log: Vec<String>,
}

impl Coup {
    pub fn new<R: Rng + Sized>(
        participants: Vec<(String, Box<dyn DecisionMaker>)>,
        rng: &mut R,
    ) -> Result<Self, CoupError> {
        let num_players = participants.len();
        if !(2..=6).contains(&num_players) {
            return Err(CoupError::InvalidPlayerCount(num_players));
        }

        let mut players: Vec<Player> = Vec::with_capacity(num_players);
        let mut deciders: Vec<Box<dyn DecisionMaker>> = Vec::with_capacity(num_players);
        for (name, decider) in participants {
            if players.iter().any(|player| player.name == name) {
                return Err(CoupError::DuplicateName(name));
            }
            players.push(Player::new(name));
            deciders.push(decider);
        }

        let mut deck = Deck::build(rng);
        for player in &mut players {
            player.coins = STARTING_COINS;
            player.is_active = true;
            for _ in 0..2 {
                player.hand.push(deck.draw().ok_or(CoupError::DeckExhausted)?);
            }
        }

        let treasury = TREASURY_COINS - STARTING_COINS * num_players as u8;
        let current_player_idx = rng.gen_range(0..num_players);

        Ok(Self {
            players,
            deciders,
            deck,
            discard: Vec::new(),
            treasury,
            turn: 0,
            current_player_idx,
            round_log: Vec::new(),
        })
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn current_player(&self) -> &Player {
        &self.players[self.current_player_idx]
    }

    pub fn treasury(&self) -> u8 {
        self.treasury
    }

    pub fn deck_len(&self) -> usize {
        self.deck.len()
    }

    pub fn discard(&self) -> &[Card] {
        &self.discard
    }

    pub fn turn(&self) -> usize {
        self.turn
    }

    pub fn total_coins(&self) -> u8 {
        self.treasury + self.players.iter().map(|player| player.coins).sum::<u8>()
    }

    pub fn total_cards(&self) -> usize {
        self.deck.len()
            + self.discard.len()
            + self.players.iter().map(|player| player.hand.len()).sum::<usize>()
    }

    /// `Some(seat)` once exactly one active player remains.
    pub fn winner(&self) -> Option<usize> {
        let mut actives = self.players.iter().enumerate().filter(|(_, player)| player.is_active);
        match (actives.next(), actives.next()) {
            (Some((idx, _)), None) => Some(idx),
            _ => None,
        }
    }

    /// The game as seen from one seat: own hand plus public state only.
    pub fn view_for(&self, viewer: usize) -> GameView {
        let player = &self.players[viewer];
        GameView {
            turn: self.turn,
            treasury: self.treasury,
            deck_size: self.deck.len(),
            discard: self.discard.iter().map(|card| card.character).collect(),
            current_player: self.players[self.current_player_idx].name.clone(),
            you: OwnView {
                name: player.name.clone(),
                coins: player.coins,
                hand: player.hand.iter().map(|card| card.character).collect(),
            },
            opponents: self.players.iter()
                .enumerate()
                .filter(|(idx, _)| *idx != viewer)
                .map(|(idx, opponent)| OpponentView {
                    name: opponent.name.clone(),
                    coins: opponent.coins,
                    cards_remaining: opponent.hand.len(),
                    is_active: self.is_in_play(idx),
                })
                .collect(),
        }
    }

    /// Runs one full turn: declare, challenge, counter, counter-challenge,
    /// execute, eliminate, advance.
    pub fn handle_turn<R: Rng + Sized>(&mut self, rng: &mut R) -> Result<TurnOutcome, CoupError> {
        let actor = self.current_player_idx;
        let actor_name = self.players[actor].name.clone();

        // declare
        let view = self.view_for(actor);
        let choice = self.deciders[actor]
            .choose_action(&view, &self.round_log)
            .map_err(|source| CoupError::Decision { player: actor_name.clone(), source })?;
        let action = choice.action;

        let coins = self.players[actor].coins;
        if !legal_actions(coins).contains(&action) {
            return Err(CoupError::IllegalAction { player: actor_name, action, coins });
        }

        let target_idx = self.resolve_target(actor, action, choice.target.as_deref())?;

        match target_idx {
            Some(target) => {
                let target_name = self.players[target].name.clone();
                self.log_event(format!("{actor_name} declares {action} against {target_name}"));
            }
            None => self.log_event(format!("{actor_name} declares {action}")),
        }
        if let Some(speech) = choice.speech {
            self.log_event(format!("{actor_name} says: {speech}"));
        }

        // challenge the action, target gets the first word
        let mut suppressed = false;
        if action.can_be_challenged() {
            let pool = self.challenge_pool(actor, target_idx);
            let result = self.challenge_phase(actor, Claim::Action(action), &pool, target_idx, rng)?;
            suppressed = result == ChallengeResult::Succeeded;
        }

        if suppressed {
            self.log_event(format!("{actor_name}'s {action} does not take place"));
        } else {
            // counter, then challenge the counter
            let mut countered = false;
            if action.can_be_countered() {
                if let Some((blocker, counter)) = self.counter_phase(actor, target_idx, action)? {
                    let pool = self.challenge_pool(blocker, None);
                    let result = self.challenge_phase(blocker, Claim::Counter(counter), &pool, None, rng)?;
                    // a caught counter-bluff lets the action through untouched
                    countered = result != ChallengeResult::Succeeded;
                }
            }
            self.execute_action(actor, action, target_idx, countered, rng)?;
        }

        // cleanup
        while let Some(defeated) = self.remove_defeated_player() {
            let name = self.players[defeated].name.clone();
            self.log_event(format!("{name} has lost all influence and is out of the game"));
        }

        debug_assert_eq!(self.total_coins(), TREASURY_COINS);
        debug_assert_eq!(self.total_cards(), DECK_SIZE);

        if let Some(winner) = self.winner() {
            let name = self.players[winner].name.clone();
            self.log_event(format!("{name} is the final survivor"));
            return Ok(TurnOutcome::GameOver { winner });
        }

        self.turn += 1;
        self.current_player_idx = self.next_active_player();
        self.round_log.clear();

        Ok(TurnOutcome::Continue)
    }

    fn resolve_target(
        &self,
        actor: usize,
        action: Action,
        target: Option<&str>,
    ) -> Result<Option<usize>, CoupError> {
        let actor_name = &self.players[actor].name;

        if !action.requires_target() {
            return Ok(None);
        }

        let target_name = target.ok_or_else(|| CoupError::InvalidTarget {
            player: actor_name.clone(),
            reason: format!("{action} requires a target"),
        })?;

        let idx = self.players.iter()
            .position(|player| player.name == target_name)
            .ok_or_else(|| CoupError::InvalidTarget {
                player: actor_name.clone(),
                reason: format!("no player named {target_name}"),
            })?;

        if idx == actor {
            return Err(CoupError::InvalidTarget {
                player: actor_name.clone(),
                reason: format!("{action} cannot target yourself"),
            });
        }
        if !self.is_in_play(idx) {
            return Err(CoupError::InvalidTarget {
                player: actor_name.clone(),
                reason: format!("{target_name} is already out of the game"),
            });
        }

        Ok(Some(idx))
    }

    /// Seat-order pool of everyone who may challenge `claimant`, with the
    /// action's target (if any) moved to the front.
    fn challenge_pool(&self, claimant: usize, preferred_first: Option<usize>) -> Vec<usize> {
        let mut pool: Vec<usize> = (0..self.players.len())
            .filter(|&idx| idx != claimant && self.is_in_play(idx))
            .collect();

        if let Some(preferred) = preferred_first {
            if let Some(pos) = pool.iter().position(|&idx| idx == preferred) {
                pool.remove(pos);
                pool.insert(0, preferred);
            }
        }

        pool
    }

    /// Offers the challenge to each player in `pool`; the first to accept
    /// settles it. At most one challenge per claim, never re-solicited.
    fn challenge_phase<R: Rng + Sized>(
        &mut self,
        claimant: usize,
        claim: Claim,
        pool: &[usize],
        target_idx: Option<usize>,
        rng: &mut R,
    ) -> Result<ChallengeResult, CoupError> {
        let claimant_name = self.players[claimant].name.clone();
        let target_name: Option<String> = target_idx.map(|idx| self.players[idx].name.clone());

        for &challenger in pool {
            let challenger_name = self.players[challenger].name.clone();
            let view = self.view_for(challenger);
            let (challenges, speech) = self.deciders[challenger]
                .decide_challenge(&claimant_name, target_name.as_deref(), &claim, &view, &self.round_log)
                .map_err(|source| CoupError::Decision { player: challenger_name.clone(), source })?;
            if let Some(speech) = speech {
                self.log_event(format!("{challenger_name} says: {speech}"));
            }
            if !challenges {
                continue;
            }

            self.log_event(format!("{challenger_name} challenges {claimant_name}'s {claim} claim"));

            return if let Some(pos) = self.players[claimant].find_card(claim.proof_characters()) {
                let revealed = self.players[claimant].hand.remove(pos);
                let line = format!("{claimant_name} reveals their {revealed}; the challenge fails");
                self.log_event(line);

                self.lose_influence(challenger)?;

                // card-swap protocol: the revealed card goes back into the
                // deck and a replacement is drawn after a reshuffle, so deck
                // order leaks nothing and the claimant can bluff it again
                self.deck.put_back(revealed);
                self.deck.shuffle(rng);
                let replacement = self.deck.draw().ok_or(CoupError::DeckExhausted)?;
                self.players[claimant].hand.push(replacement);
                self.log_event(format!("{claimant_name} returns the revealed card and draws a new one"));

                Ok(ChallengeResult::Failed)
            } else {
                self.log_event(format!("{claimant_name} was bluffing and has no {claim}"));
                self.lose_influence(claimant)?;
                Ok(ChallengeResult::Succeeded)
            };
        }

        Ok(ChallengeResult::NoChallenge)
    }

    /// Offers the block to every other in-play player in seat order; the
    /// first acceptance wins and later players are not solicited.
    fn counter_phase(
        &mut self,
        actor: usize,
        target_idx: Option<usize>,
        action: Action,
    ) -> Result<Option<(usize, CounterAction)>, CoupError> {
        let Some(counter) = counter_for(action) else {
            return Ok(None);
        };

        let actor_name = self.players[actor].name.clone();
        let target_name: Option<String> = target_idx.map(|idx| self.players[idx].name.clone());

        let pool: Vec<usize> = (0..self.players.len())
            .filter(|&idx| idx != actor && self.is_in_play(idx))
            .collect();

        for blocker in pool {
            let blocker_name = self.players[blocker].name.clone();
            let view = self.view_for(blocker);
            let (blocks, speech) = self.deciders[blocker]
                .decide_counter(&actor_name, target_name.as_deref(), action, &view, &self.round_log)
                .map_err(|source| CoupError::Decision { player: blocker_name.clone(), source })?;
            if let Some(speech) = speech {
                self.log_event(format!("{blocker_name} says: {speech}"));
            }
            if blocks {
                self.log_event(format!("{blocker_name} blocks {actor_name}'s {action} with {counter}"));
                return Ok(Some((blocker, counter)));
            }
        }

        Ok(None)
    }

    /// Applies the coin/card effects of the action. The only decision it
    /// solicits itself is the exchange return.
    fn execute_action<R: Rng + Sized>(
        &mut self,
        actor: usize,
        action: Action,
        target_idx: Option<usize>,
        countered: bool,
        rng: &mut R,
    ) -> Result<(), CoupError> {
        let actor_name = self.players[actor].name.clone();

        match action {
            Action::Income => {
                self.take_coin_from_treasury(actor, 1);
                self.log_event(format!("{actor_name} takes 1 coin of income"));
            }
            Action::ForeignAid => {
                if !countered {
                    self.take_coin_from_treasury(actor, 2);
                    self.log_event(format!("{actor_name} takes 2 coins of foreign aid"));
                }
            }
            Action::Coup => {
                let target = require_target(target_idx)?;
                let target_name = self.players[target].name.clone();
                self.give_coin_to_treasury(actor, 7);
                self.log_event(format!("{actor_name} pays 7 coins and launches a coup against {target_name}"));
                self.lose_influence(target)?;
            }
            Action::Tax => {
                self.take_coin_from_treasury(actor, 3);
                self.log_event(format!("{actor_name} collects 3 coins of tax"));
            }
            Action::Assassinate => {
                let target = require_target(target_idx)?;
                let target_name = self.players[target].name.clone();
                // the fee is paid even when the assassination is blocked
                self.give_coin_to_treasury(actor, 3);
                self.log_event(format!("{actor_name} pays 3 coins to assassinate {target_name}"));
                if !countered {
                    self.lose_influence(target)?;
                }
            }
            Action::Steal => {
                let target = require_target(target_idx)?;
                if !countered {
                    let target_name = self.players[target].name.clone();
                    let amount = self.players[target].coins.min(2);
                    self.players[target].coins -= amount;
                    self.players[actor].coins += amount;
                    self.log_event(format!("{actor_name} steals {amount} coins from {target_name}"));
                }
            }
            Action::Exchange => {
                self.exchange_cards(actor, rng)?;
            }
        }

        Ok(())
    }

    fn exchange_cards<R: Rng + Sized>(&mut self, actor: usize, rng: &mut R) -> Result<(), CoupError> {
        let actor_name = self.players[actor].name.clone();

        let mut drawn = 0;
        for _ in 0..2 {
            if let Some(card) = self.deck.draw() {
                self.players[actor].hand.push(card);
                drawn += 1;
            }
        }
        if drawn == 0 {
            return Ok(());
        }

        for _ in 0..RETRY_LIMIT {
            let candidates = self.players[actor].hand.clone();
            let mut indexes = self.deciders[actor]
                .choose_exchange_return(&candidates, drawn, &self.round_log)
                .map_err(|source| CoupError::Decision { player: actor_name.clone(), source })?;

            indexes.sort_unstable();
            indexes.dedup();
            if indexes.len() != drawn || indexes.iter().any(|&idx| idx >= candidates.len()) {
                debug!("{actor_name} returned an invalid exchange selection, asking again");
                continue;
            }

            // remove from the back so earlier indexes stay valid
            for &idx in indexes.iter().rev() {
                let card = self.players[actor].hand.remove(idx);
                self.deck.put_back(card);
            }
            self.deck.shuffle(rng);
            self.log_event(format!("{actor_name} exchanges cards with the court deck"));
            return Ok(());
        }

        Err(CoupError::InvalidExchangeReturn { player: actor_name })
    }

    /// Has `player_idx` choose and discard one card. Skips silently when the
    /// hand is already empty (a target eliminated earlier in the same turn).
    fn lose_influence(&mut self, player_idx: usize) -> Result<(), CoupError> {
        if self.players[player_idx].hand.is_empty() {
            return Ok(());
        }

        let name = self.players[player_idx].name.clone();
        for _ in 0..RETRY_LIMIT {
            let hand = self.players[player_idx].hand.clone();
            let choice = self.deciders[player_idx]
                .choose_card_to_discard(&hand, &self.round_log)
                .map_err(|source| CoupError::Decision { player: name.clone(), source })?;

            if choice < self.players[player_idx].hand.len() {
                let card = self.players[player_idx].hand.remove(choice);
                let line = format!("{name} loses their {card}");
                self.discard.push(card);
                self.log_event(line);
                return Ok(());
            }

            debug!("{name} chose a card outside their hand, asking again");
        }

        Err(CoupError::InvalidDiscard { player: name })
    }

    /// Deactivates the first active player with an empty hand, returning
    /// their coins to the treasury. The turn loop calls this until it yields
    /// `None`.
    fn remove_defeated_player(&mut self) -> Option<usize> {
        for idx in 0..self.players.len() {
            if self.players[idx].is_active && self.players[idx].hand.is_empty() {
                self.players[idx].is_active = false;
                let coins = self.players[idx].coins;
                self.give_coin_to_treasury(idx, coins);
                return Some(idx);
            }
        }
        None
    }

    fn is_in_play(&self, idx: usize) -> bool {
        self.players[idx].is_active && !self.players[idx].hand.is_empty()
    }

    fn next_active_player(&self) -> usize {
        let mut idx = self.current_player_idx;

        idx = (idx + 1) % self.players.len();
        while !self.players[idx].is_active {
            idx = (idx + 1) % self.players.len();
        }

        idx
    }

    fn take_coin_from_treasury(&mut self, player_idx: usize, number_of_coins: u8) {
        let amount = number_of_coins.min(self.treasury);
        self.treasury -= amount;
        self.players[player_idx].coins += amount;
    }

    fn give_coin_to_treasury(&mut self, player_idx: usize, number_of_coins: u8) {
        let amount = number_of_coins.min(self.players[player_idx].coins);
        self.players[player_idx].coins -= amount;
        self.treasury += amount;
    }

    fn log_event(&mut self, event: String) {
        debug!("T{}: {event}", self.turn);
        for decider in &mut self.deciders {
            decider.notify(&event);
        }
        self.round_log.push(event);
    }
}

fn require_target(target_idx: Option<usize>) -> Result<usize, CoupError> {
    target_idx.ok_or(CoupError::Internal("targeted action resolved without a target"))
}
