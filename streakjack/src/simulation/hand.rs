use std::fmt;

use crate::Outcome;

use super::Card;

const BLACKJACK: u32 = 21;
const SOFT_ACE_BONUS: u32 = 10;

/// Computes the best value of the given cards. Aces count 11 and are reduced
/// to 1 one at a time, only while the total is over 21. A result over 21
/// means every Ace is already counted as 1, i.e. the hand busted.
pub fn hand_value(cards: &[Card]) -> u32 {
    let mut total: u32 = cards.iter().map(|card| card.blackjack_value()).sum();
    let mut aces = cards.iter().filter(|card| card.is_ace()).count();

    while total > BLACKJACK && aces > 0 {
        total -= SOFT_ACE_BONUS;
        aces -= 1;
    }

    total
}

/// Compares two finished hand values. A busted player loses even if the
/// dealer busted too.
pub fn determine_outcome(player_value: u32, dealer_value: u32) -> Outcome {
    if player_value > BLACKJACK {
        Outcome::Lose
    } else if dealer_value > BLACKJACK || player_value > dealer_value {
        Outcome::Win
    } else if player_value == dealer_value {
        Outcome::Push
    } else {
        Outcome::Lose
    }
}

/// Cards held by the player or the dealer during a single round.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Hand {
    cards: Vec<Card>,
}

impl Hand {
    pub fn new() -> Hand {
        Hand {
            cards: Vec::with_capacity(3),
        }
    }

    pub fn receive_card(&mut self, card: Card) {
        self.cards.push(card);
    }

    pub fn get_cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn value(&self) -> u32 {
        hand_value(&self.cards)
    }

    pub fn is_busted(&self) -> bool {
        self.value() > BLACKJACK
    }

    /// True if at least one Ace is still counted as 11.
    pub fn is_soft(&self) -> bool {
        let hard_total: u32 = self
            .cards
            .iter()
            .map(|card| if card.is_ace() { 1 } else { card.blackjack_value() })
            .sum();
        self.cards.iter().any(|card| card.is_ace()) && hard_total + SOFT_ACE_BONUS == self.value()
    }

    pub fn outcome_against(&self, dealer: &Hand) -> Outcome {
        determine_outcome(self.value(), dealer.value())
    }
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cards: Vec<String> = self.cards.iter().map(|card| card.to_string()).collect();
        write!(f, "{}", cards.join(" "))
    }
}
