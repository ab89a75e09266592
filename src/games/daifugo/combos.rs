use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::cards::{card_sorter, Card, Suit};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, Hash, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum CombinationKind {
    #[default]
    Invalid,
    Single,
    Pair,
    Triple,
    FourCard,
    // 3-4 consecutive ranks in one suit
    Stair,
}

/// Shape of a set of cards played together. Pure in the (suit, rank)
/// multiset; input order never matters.
pub fn classify(cards: &[Card]) -> CombinationKind {
    if cards.is_empty() {
        return CombinationKind::Invalid;
    }
    if cards.len() == 1 {
        return CombinationKind::Single;
    }
    if cards.iter().all(|c| c.rank == cards[0].rank) {
        return match cards.len() {
            2 => CombinationKind::Pair,
            3 => CombinationKind::Triple,
            4 => CombinationKind::FourCard,
            // The game caps at four of a kind
            _ => CombinationKind::Invalid,
        };
    }
    if is_stair(cards) {
        return CombinationKind::Stair;
    }
    CombinationKind::Invalid
}

fn is_stair(cards: &[Card]) -> bool {
    if cards.len() < 3 || cards.len() > 4 {
        return false;
    }
    let suit = cards[0].suit;
    if suit == Suit::Joker || cards.iter().any(|c| c.suit != suit) {
        return false;
    }
    let mut ranks: Vec<i32> = cards.iter().map(|c| c.rank).collect();
    ranks.sort_unstable();
    if ranks.windows(2).any(|pair| pair[1] != pair[0] + 1) {
        return false;
    }
    // Unreachable through the equal-rank branch above, kept as a guard
    // for callers that build card sets some other way
    ranks[0] != ranks[ranks.len() - 1]
}

/// Comparison key within a kind: the shared rank for equal-rank groups,
/// the top rank of the run for stairs.
pub fn rank_key(cards: &[Card]) -> i32 {
    cards.iter().map(|c| c.rank).max().unwrap_or(0)
}

/// Whether `candidate` may be played on `table_cards`. An empty table
/// accepts any valid shape; otherwise kind and card count must match and
/// the candidate's key must be strictly greater. No side effects, safe
/// to probe speculatively.
pub fn can_play(table_cards: &[Card], candidate: &[Card]) -> bool {
    let kind = classify(candidate);
    if kind == CombinationKind::Invalid {
        return false;
    }
    if table_cards.is_empty() {
        return true;
    }
    if kind != classify(table_cards) || candidate.len() != table_cards.len() {
        return false;
    }
    rank_key(candidate) > rank_key(table_cards)
}

/// All valid combinations contained in a hand: every single, every
/// contiguous window of 2..=4 cards inside each rank group, and every
/// 3- and 4-card window of each maximal same-suit run. Does not mutate
/// the hand; never yields an Invalid shape.
pub fn enumerate_combinations(hand: &[Card]) -> Vec<Vec<Card>> {
    let mut combos: Vec<Vec<Card>> = hand.iter().map(|card| vec![*card]).collect();

    let mut rank_groups: BTreeMap<i32, Vec<Card>> = BTreeMap::new();
    for card in hand {
        rank_groups.entry(card.rank).or_default().push(*card);
    }
    for group in rank_groups.values() {
        for size in 2..=group.len().min(4) {
            for window in group.windows(size) {
                combos.push(window.to_vec());
            }
        }
    }

    let mut suit_groups: BTreeMap<Suit, Vec<Card>> = BTreeMap::new();
    for card in hand.iter().filter(|c| !c.is_joker()) {
        suit_groups.entry(card.suit).or_default().push(*card);
    }
    for cards in suit_groups.values_mut() {
        cards.sort_by(card_sorter);
        let mut run: Vec<Card> = vec![];
        for card in cards.iter() {
            let extends_run = run.last().map_or(false, |last| card.rank == last.rank + 1);
            if extends_run {
                run.push(*card);
            } else {
                push_stair_windows(&run, &mut combos);
                run = vec![*card];
            }
        }
        push_stair_windows(&run, &mut combos);
    }

    combos
}

fn push_stair_windows(run: &[Card], combos: &mut Vec<Vec<Card>>) {
    for size in 3..=4 {
        for window in run.windows(size) {
            combos.push(window.to_vec());
        }
    }
}
