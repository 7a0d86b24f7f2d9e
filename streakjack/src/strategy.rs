use crate::{simulation::hand::Hand, Decision, Outcome, Rule};

/// A hit/stand policy for one party at the table.
pub trait Strategy {
    fn make_decision(&self, current_hand: &Hand) -> Decision;
}

/// The player hits on 16 or less and stands on 17 and above (with the
/// default threshold).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerStrategy {
    stand_on: u32,
}

impl PlayerStrategy {
    pub fn new(rule: &Rule) -> PlayerStrategy {
        PlayerStrategy {
            stand_on: rule.player_stand_on,
        }
    }
}

impl Strategy for PlayerStrategy {
    fn make_decision(&self, current_hand: &Hand) -> Decision {
        if current_hand.value() < self.stand_on {
            Decision::Hit
        } else {
            Decision::Stand
        }
    }
}

/// The dealer hits until reaching at least 17. Soft 17 stands: the total is
/// compared without looking at whether an Ace is still counted as 11.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DealerStrategy {
    stand_on: u32,
}

impl DealerStrategy {
    pub fn new(rule: &Rule) -> DealerStrategy {
        DealerStrategy {
            stand_on: rule.dealer_stand_on,
        }
    }
}

impl Strategy for DealerStrategy {
    fn make_decision(&self, current_hand: &Hand) -> Decision {
        if current_hand.value() < self.stand_on {
            Decision::Hit
        } else {
            Decision::Stand
        }
    }
}

/// Maps the bet of the round just played and its outcome to the next bet.
pub trait BettingStrategy {
    fn next_bet(&self, current_bet: i64, outcome: Outcome) -> i64;
}

/// Doubles after a loss, repeats after a push, returns to the base bet after a win.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Martingale {
    base_bet: i64,
}

impl Martingale {
    pub fn new(base_bet: i64) -> Martingale {
        Martingale { base_bet }
    }
}

impl BettingStrategy for Martingale {
    fn next_bet(&self, current_bet: i64, outcome: Outcome) -> i64 {
        match outcome {
            Outcome::Win => self.base_bet,
            Outcome::Push => current_bet,
            Outcome::Lose => current_bet.saturating_mul(2),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Flat {
    base_bet: i64,
}

impl Flat {
    pub fn new(base_bet: i64) -> Flat {
        Flat { base_bet }
    }
}

impl BettingStrategy for Flat {
    fn next_bet(&self, _current_bet: i64, _outcome: Outcome) -> i64 {
        self.base_bet
    }
}
