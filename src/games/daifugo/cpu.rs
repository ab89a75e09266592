use std::collections::BTreeMap;
use std::fmt;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::cards::{card_sorter, Card};
use super::combos::{classify, enumerate_combinations, rank_key, CombinationKind};

/// Pick a combination for an automated player, or None to pass.
/// Selection is read-only; committing the move (and removing the cards
/// from the hand) happens through the normal play submission.
///
/// Opening an empty table: the shortest stair in hand, uniform-random
/// among equal-length ties, else the single lowest card. Following a
/// same-rank group: the lowest rank group that is big enough and beats
/// the table, trimmed to the table's size. Following a stair: the
/// matching-length stair with the lowest winning top rank.
pub fn select_move(hand: &[Card], table_cards: &[Card], rng: &mut impl Rng) -> Option<Vec<Card>> {
    if hand.is_empty() {
        return None;
    }
    if table_cards.is_empty() {
        return Some(open_table(hand, rng));
    }
    match classify(table_cards) {
        CombinationKind::Stair => follow_stair(hand, table_cards),
        CombinationKind::Invalid => None,
        _ => follow_rank_group(hand, table_cards),
    }
}

fn open_table(hand: &[Card], rng: &mut impl Rng) -> Vec<Card> {
    let stairs: Vec<Vec<Card>> = enumerate_combinations(hand)
        .into_iter()
        .filter(|combo| classify(combo) == CombinationKind::Stair)
        .collect();
    if let Some(shortest) = stairs.iter().map(|stair| stair.len()).min() {
        let candidates: Vec<&Vec<Card>> = stairs
            .iter()
            .filter(|stair| stair.len() == shortest)
            .collect();
        return (*candidates
            .choose(rng)
            .expect("at least one stair of the shortest length"))
        .clone();
    }
    let lowest = hand
        .iter()
        .min_by(|a, b| card_sorter(a, b))
        .expect("hand is not empty");
    vec![*lowest]
}

fn follow_rank_group(hand: &[Card], table_cards: &[Card]) -> Option<Vec<Card>> {
    let needed = table_cards.len();
    let table_rank = rank_key(table_cards);
    let mut groups: BTreeMap<i32, Vec<Card>> = BTreeMap::new();
    for card in hand {
        groups.entry(card.rank).or_default().push(*card);
    }
    groups
        .iter()
        .find(|(rank, cards)| **rank > table_rank && cards.len() >= needed)
        .map(|(_, cards)| cards[..needed].to_vec())
}

fn follow_stair(hand: &[Card], table_cards: &[Card]) -> Option<Vec<Card>> {
    let needed = table_cards.len();
    let table_top = rank_key(table_cards);
    enumerate_combinations(hand)
        .into_iter()
        .filter(|combo| {
            classify(combo) == CombinationKind::Stair
                && combo.len() == needed
                && rank_key(combo) > table_top
        })
        .min_by_key(|combo| rank_key(combo))
}

/// The capability "given a hand and the table, produce a combination or
/// pass". Human selections arrive from the presentation layer already
/// staged; automated players run the heuristic.
pub trait MoveChooser: fmt::Debug {
    fn choose(&mut self, hand: &[Card], table_cards: &[Card]) -> Option<Vec<Card>>;
}

/// Returns whatever selection the presentation layer staged. The engine
/// still validates the selection on submission.
#[derive(Debug, Default)]
pub struct HumanChooser {
    pub selected: Vec<Card>,
}

impl MoveChooser for HumanChooser {
    fn choose(&mut self, _hand: &[Card], _table_cards: &[Card]) -> Option<Vec<Card>> {
        if self.selected.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.selected))
        }
    }
}

#[derive(Debug)]
pub struct CpuChooser {
    rng: StdRng,
}

impl CpuChooser {
    pub fn new() -> Self {
        CpuChooser {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        CpuChooser {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for CpuChooser {
    fn default() -> Self {
        CpuChooser::new()
    }
}

impl MoveChooser for CpuChooser {
    fn choose(&mut self, hand: &[Card], table_cards: &[Card]) -> Option<Vec<Card>> {
        select_move(hand, table_cards, &mut self.rng)
    }
}
