use std::collections::VecDeque;

use super::Card;

use strum::IntoEnumIterator;

use rand::seq::SliceRandom;
use rand::Rng;

const COPIES_PER_RANK: usize = 4;
pub const CARDS_PER_DECK: usize = 52;

/// Represents a single-deck shoe. Cards are dealt from the front and the
/// shuffle source is owned by the shoe, so a seeded generator reproduces a
/// whole run.
#[derive(Debug, Clone)]
pub struct Shoe<R: Rng> {
    cards: VecDeque<Card>,
    rng: R,
}

impl<R: Rng> Shoe<R> {
    /// Creates a new shoe holding a uniformly shuffled deck.
    pub fn new(rng: R) -> Shoe<R> {
        let mut shoe = Shoe {
            cards: VecDeque::with_capacity(CARDS_PER_DECK),
            rng,
        };
        shoe.reshuffle();
        shoe
    }

    /// Creates a shoe whose cards are exactly `firsts`, in order. Once they run
    /// below the reserve the simulator reshuffles a full deck using `rng`.
    pub fn stacked(firsts: Vec<Card>, rng: R) -> Shoe<R> {
        Shoe {
            cards: firsts.into(),
            rng,
        }
    }

    /// Discards whatever is left and refills the shoe with a fresh shuffled deck.
    pub fn reshuffle(&mut self) {
        let mut cards = ordered_deck();
        cards.shuffle(&mut self.rng);
        self.cards = cards.into();
    }

    /// Deals a card if the shoe is not empty. Returns None if empty.
    pub fn deal_card(&mut self) -> Option<Card> {
        self.cards.pop_front()
    }

    pub fn remaining(&self) -> usize {
        self.cards.len()
    }

    /// Checks if fewer than `reserve` cards are left.
    pub fn needs_reshuffle(&self, reserve: usize) -> bool {
        self.cards.len() < reserve
    }

    pub fn preview_next_few_cards(&self, number: usize) -> Vec<Card> {
        self.cards.iter().take(number).copied().collect()
    }
}

fn ordered_deck() -> Vec<Card> {
    let mut cards = Vec::with_capacity(CARDS_PER_DECK);
    for card in Card::iter() {
        for _ in 0..COPIES_PER_RANK {
            cards.push(card);
        }
    }
    cards
}
