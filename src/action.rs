use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::card::Character;
use crate::Character::{Ambassador, Assassin, Captain, Contessa, Duke};

/// The seven declarable actions. Attributes are fixed by the rules; the
/// catalog is a pure lookup with no state of its own.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Income,
    ForeignAid,
    Coup,
    Tax,
    Assassinate,
    Steal,
    Exchange,
}

static ACTION_VARIANTS: [Action; 7] = [
    Action::Income,
    Action::ForeignAid,
    Action::Coup,
    Action::Tax,
    Action::Assassinate,
    Action::Steal,
    Action::Exchange,
];

impl Action {
    pub fn cost(self) -> u8 {
        match self {
            Action::Coup => 7,
            Action::Assassinate => 3,
            _ => 0,
        }
    }

    pub fn requires_target(self) -> bool {
        matches!(self, Action::Coup | Action::Assassinate | Action::Steal)
    }

    /// The character this action claims to hold, if any. Actions with a
    /// claim are exactly the challengeable ones.
    pub fn claimed_character(self) -> Option<Character> {
        match self {
            Action::Tax => Some(Duke),
            Action::Assassinate => Some(Assassin),
            Action::Steal => Some(Captain),
            Action::Exchange => Some(Ambassador),
            Action::Income | Action::ForeignAid | Action::Coup => None,
        }
    }

    pub fn can_be_challenged(self) -> bool {
        self.claimed_character().is_some()
    }

    pub fn can_be_countered(self) -> bool {
        counter_for(self).is_some()
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Action::Income => "Income",
            Action::ForeignAid => "Foreign Aid",
            Action::Coup => "Coup",
            Action::Tax => "Tax",
            Action::Assassinate => "Assassinate",
            Action::Steal => "Steal",
            Action::Exchange => "Exchange",
        };
        f.write_str(name)
    }
}

/// Actions legal for a player holding `coins`. At 10+ coins the coup is
/// forced and nothing else is offered.
pub fn legal_actions(coins: u8) -> Vec<Action> {
    if coins >= 10 {
        return vec![Action::Coup];
    }

    ACTION_VARIANTS.iter()
        .copied()
        .filter(|action| action.cost() <= coins)
        .collect()
}

/// A block declared against another player's action. Itself challengeable,
/// never counterable.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CounterAction {
    BlockForeignAid,
    BlockSteal,
    BlockAssassination,
}

impl CounterAction {
    /// Characters whose possession vindicates the blocker under challenge.
    /// A steal can be blocked with either the Captain or the Ambassador.
    pub fn proof_characters(self) -> &'static [Character] {
        match self {
            CounterAction::BlockForeignAid => &[Duke],
            CounterAction::BlockSteal => &[Captain, Ambassador],
            CounterAction::BlockAssassination => &[Contessa],
        }
    }
}

impl Display for CounterAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CounterAction::BlockForeignAid => "Block Foreign Aid",
            CounterAction::BlockSteal => "Block Steal",
            CounterAction::BlockAssassination => "Block Assassination",
        };
        f.write_str(name)
    }
}

/// The catalog-fixed counter for an action, for exactly the counterable ones.
pub fn counter_for(action: Action) -> Option<CounterAction> {
    match action {
        Action::ForeignAid => Some(CounterAction::BlockForeignAid),
        Action::Steal => Some(CounterAction::BlockSteal),
        Action::Assassinate => Some(CounterAction::BlockAssassination),
        Action::Income | Action::Coup | Action::Tax | Action::Exchange => None,
    }
}

/// What a challenge is levelled against: either the declared action or a
/// block of it. Challenges never nest deeper than that.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Claim {
    Action(Action),
    Counter(CounterAction),
}

impl Claim {
    pub fn proof_characters(&self) -> &'static [Character] {
        match self {
            Claim::Action(action) => {
                match action.claimed_character() {
                    Some(Duke) => &[Duke],
                    Some(Assassin) => &[Assassin],
                    Some(Captain) => &[Captain],
                    Some(Ambassador) => &[Ambassador],
                    Some(Contessa) => &[Contessa],
                    None => &[],
                }
            }
            Claim::Counter(counter) => counter.proof_characters(),
        }
    }
}

impl Display for Claim {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Claim::Action(action) => Display::fmt(action, f),
            Claim::Counter(counter) => Display::fmt(counter, f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forced_coup_at_ten_coins() {
        assert_eq!(legal_actions(10), vec![Action::Coup]);
        assert_eq!(legal_actions(12), vec![Action::Coup]);
    }

    #[test]
    fn legal_actions_by_cost() {
        let base = legal_actions(2);
        assert!(base.contains(&Action::Income));
        assert!(base.contains(&Action::ForeignAid));
        assert!(base.contains(&Action::Tax));
        assert!(base.contains(&Action::Steal));
        assert!(base.contains(&Action::Exchange));
        assert!(!base.contains(&Action::Assassinate));
        assert!(!base.contains(&Action::Coup));

        assert!(legal_actions(3).contains(&Action::Assassinate));
        assert!(legal_actions(7).contains(&Action::Coup));
        assert_eq!(legal_actions(7).len(), 7);
    }

    #[test]
    fn counter_mapping() {
        assert_eq!(counter_for(Action::ForeignAid), Some(CounterAction::BlockForeignAid));
        assert_eq!(counter_for(Action::Steal), Some(CounterAction::BlockSteal));
        assert_eq!(counter_for(Action::Assassinate), Some(CounterAction::BlockAssassination));
        assert_eq!(counter_for(Action::Income), None);
        assert_eq!(counter_for(Action::Tax), None);
        assert_eq!(counter_for(Action::Coup), None);
        assert_eq!(counter_for(Action::Exchange), None);
    }

    #[test]
    fn challengeable_actions_have_claims() {
        for action in [Action::Tax, Action::Assassinate, Action::Steal, Action::Exchange] {
            assert!(action.can_be_challenged());
            assert!(!Claim::Action(action).proof_characters().is_empty());
        }
        for action in [Action::Income, Action::ForeignAid, Action::Coup] {
            assert!(!action.can_be_challenged());
            assert!(Claim::Action(action).proof_characters().is_empty());
        }
    }

    #[test]
    fn steal_block_accepts_two_proofs() {
        let proofs = Claim::Counter(CounterAction::BlockSteal).proof_characters();
        assert_eq!(proofs, &[Captain, Ambassador]);
    }
}
