use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use enum_iterator::{all, Sequence};
use once_cell::sync::Lazy;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Rank carried by a Joker. Strictly above every normal rank (3..=15)
/// so a Joker single beats the 2.
pub const JOKER_RANK: i32 = 100;

/// Lowest and highest normal ranks. 11=J, 12=Q, 13=K, 14=A, 15=2 (the 2
/// outranks the Ace in this game).
pub const MIN_RANK: i32 = 3;
pub const MAX_RANK: i32 = 15;

pub const DECK_SIZE: usize = 52;
pub const MAX_JOKERS: u8 = 2;

#[derive(
    Debug, PartialOrd, Ord, Clone, Copy, Sequence, Default, Serialize, Deserialize, Hash, PartialEq, Eq,
)]
#[serde(rename_all = "camelCase")]
pub enum Suit {
    #[default]
    Spade,
    Heart,
    Diamond,
    Club,
    // Marker suit, never part of a stair
    Joker,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, Hash, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: i32,
    pub suit: Suit,
    pub rank: i32,
}

impl Card {
    pub fn is_joker(&self) -> bool {
        self.suit == Suit::Joker
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}-{}", self.suit, self.rank)
    }
}

/// Every card that can ever be in play, keyed by id. Presentation layers
/// resolve change-event object ids through this table.
pub static ID_TO_CARD: Lazy<HashMap<i32, Card>> = Lazy::new(|| {
    base_deck(MAX_JOKERS).into_iter().map(|c| (c.id, c)).collect()
});

fn base_deck(jokers: u8) -> Vec<Card> {
    let mut cards: Vec<Card> = vec![];
    let mut id = 0;
    for suit in all::<Suit>().filter(|s| *s != Suit::Joker) {
        for rank in MIN_RANK..=MAX_RANK {
            cards.push(Card { id, suit, rank });
            id += 1;
        }
    }
    for _ in 0..jokers.min(MAX_JOKERS) {
        cards.push(Card {
            id,
            suit: Suit::Joker,
            rank: JOKER_RANK,
        });
        id += 1;
    }
    cards
}

/// Build and shuffle a deck: 52 cards, ranks 3..=15 in four suits, plus
/// the requested number of jokers (ids 52+).
pub fn deck(jokers: u8, rng: &mut impl Rng) -> Vec<Card> {
    let mut cards = base_deck(jokers);
    cards.shuffle(rng);
    cards
}

/// Hand display order: low ranks first, suits tie-broken for stability.
pub fn card_sorter(a: &Card, b: &Card) -> Ordering {
    match a.rank.cmp(&b.rank) {
        Ordering::Equal => a.suit.cmp(&b.suit),
        ordering => ordering,
    }
}
