use std::fmt::{Display, Formatter};

use crate::card::{Card, Character};

/// One seat at the table. Players persist for the whole game; elimination
/// flips `is_active` and empties the hand, it never removes the entry.
#[derive(Debug)]
pub struct Player {
    pub name: String,
    pub coins: u8,
    pub hand: Vec<Card>,
    pub is_active: bool,
}

impl Player {
    pub fn new(name: String) -> Self {
        Self {
            name,
            coins: 0,
            hand: Vec::with_capacity(4),
            is_active: false,
        }
    }

    /// Position in hand of an unrevealed card matching any of the given
    /// characters, used to settle challenges.
    pub fn find_card(&self, characters: &[Character]) -> Option<usize> {
        self.hand.iter().position(|card| characters.contains(&card.character))
    }

    pub fn has_character(&self, character: Character) -> bool {
        self.hand.iter().any(|card| card.character == character)
    }
}

impl Display for Player {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    use crate::card::{Character, Deck};

    use super::*;

    #[test]
    fn find_card_matches_any_listed_character() {
        let mut rng = Pcg64::seed_from_u64(7);
        let mut deck = Deck::build(&mut rng);

        let mut player = Player::new("Ada".to_string());
        while player.hand.len() < 2 {
            player.hand.push(deck.draw().unwrap());
        }

        let first = player.hand[0].character;
        assert_eq!(player.find_card(&[first]), Some(0));
        assert!(player.has_character(first));

        let missing: Vec<Character> = crate::card::CHARACTER_VARIANTS
            .iter()
            .copied()
            .filter(|c| !player.hand.iter().any(|card| card.character == *c))
            .collect();
        if let Some(&absent) = missing.first() {
            assert_eq!(player.find_card(&[absent]), None);
        }
    }
}
