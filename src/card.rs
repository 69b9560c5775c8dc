use std::fmt::{Display, Formatter};

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::Character::{Ambassador, Assassin, Captain, Contessa, Duke};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Character {
    Duke,
    Assassin,
    Captain,
    Ambassador,
    Contessa,
}

pub static CHARACTER_VARIANTS: [Character; 5] = [
    Duke,
    Assassin,
    Captain,
    Ambassador,
    Contessa,
];

/// 3 copies of each character.
pub const DECK_SIZE: usize = CHARACTER_VARIANTS.len() * 3;

impl Display for Character {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Duke => "Duke",
            Assassin => "Assassin",
            Captain => "Captain",
            Ambassador => "Ambassador",
            Contessa => "Contessa",
        };
        f.write_str(name)
    }
}

/// A physical card. `id` is unique within one game, so two cards of the same
/// character are still distinguishable as they move between deck, hands and
/// the discard pile. Cards are only ever moved, never minted mid-game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    id: u8,
    pub character: Character,
}

impl Card {
    pub fn id(&self) -> u8 {
        self.id
    }
}

impl Display for Card {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.character, f)
    }
}

/// The shuffled draw pile. Draws come off the end; returned cards are pushed
/// back and the pile reshuffled before the next draw that depends on them.
#[derive(Debug)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    pub fn build<R: Rng + Sized>(rng: &mut R) -> Self {
        let mut cards: Vec<Card> = CHARACTER_VARIANTS.iter()
            .flat_map(|&character| std::iter::repeat(character).take(3))
            .enumerate()
            .map(|(id, character)| Card { id: id as u8, character })
            .collect();

        cards.shuffle(rng);

        Self { cards }
    }

    pub fn draw(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    pub fn put_back(&mut self, card: Card) {
        self.cards.push(card);
    }

    pub fn shuffle<R: Rng + Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Pulls a specific character out of the pile, for fixture setup.
    #[cfg(test)]
    pub(crate) fn take_character(&mut self, character: Character) -> Option<Card> {
        let pos = self.cards.iter().position(|card| card.character == character)?;
        Some(self.cards.remove(pos))
    }
}

#[cfg(test)]
mod tests {
    use rand_pcg::Pcg64;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn full_deck() {
        let mut rng = Pcg64::seed_from_u64(1);
        let deck = Deck::build(&mut rng);

        assert_eq!(deck.len(), DECK_SIZE);

        for character in CHARACTER_VARIANTS {
            let count = deck.cards.iter().filter(|c| c.character == character).count();
            assert_eq!(count, 3, "expected 3 copies of {character}");
        }
    }

    #[test]
    fn card_identity_is_unique() {
        let mut rng = Pcg64::seed_from_u64(2);
        let mut deck = Deck::build(&mut rng);

        let mut ids = Vec::new();
        while let Some(card) = deck.draw() {
            ids.push(card.id());
        }
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), DECK_SIZE);
    }

    #[test]
    fn draw_and_put_back_round_trip() {
        let mut rng = Pcg64::seed_from_u64(3);
        let mut deck = Deck::build(&mut rng);

        let card = deck.draw().unwrap();
        assert_eq!(deck.len(), DECK_SIZE - 1);

        deck.put_back(card.clone());
        assert_eq!(deck.len(), DECK_SIZE);

        // put_back pushes onto the draw end
        assert_eq!(deck.draw().unwrap(), card);
    }
}
