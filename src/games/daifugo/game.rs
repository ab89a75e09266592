use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::utils::{remove_first_match, rng_from_seed};

use super::cards::{card_sorter, deck, Card};
use super::combos::{can_play, classify, enumerate_combinations, rank_key, CombinationKind};
use super::cpu::select_move;
use super::rules::{Rule, RuleContext, RuleRegistry};

pub const PLAYER_COUNT: usize = 4;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum State {
    #[default]
    Play,
    GameOver,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, Hash, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ChangeType {
    #[default]
    Deal,
    Play,
    Pass,
    TableClear,
    Reorder,
    ShowPlayable,
    HidePlayable,
    GameOver,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, Hash, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Location {
    #[default]
    Deck,
    Hand,
    Table,
    Discard,
    ReorderHand,
}

/// One presentation-layer instruction. The engine records batches of
/// these; animation replays them after the fact and can never affect
/// rule evaluation.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Change {
    #[serde(rename(serialize = "type", deserialize = "type"))]
    pub change_type: ChangeType,
    pub object_id: i32,
    pub dest: Location,
    pub player: usize,
    pub hand_offset: usize,
    pub length: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GameOptions {
    pub seed: Option<u64>,
    pub jokers: u8,
    pub eight_cut: bool,
}

impl Default for GameOptions {
    fn default() -> Self {
        GameOptions {
            seed: None,
            jokers: 0,
            eight_cut: true,
        }
    }
}

/// Caller-visible rejection of a submission. None of these mutate any
/// state; the same player may retry.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PlayRejection {
    #[error("the selected cards do not form a playable combination")]
    InvalidCombinationShape,
    #[error("combination kind or size does not match the table")]
    KindMismatch,
    #[error("combination does not beat the rank on the table")]
    RankTooLow,
    #[error("it is not player {0}'s turn")]
    NotPlayersTurn(usize),
    #[error("player {0} does not hold all of the submitted cards")]
    CardNotInHand(usize),
    #[error("the round is over")]
    RoundOver,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Turn {
    pub current_player: usize,
    pub consecutive_passes: usize,
    pub last_player: Option<usize>,
}

/// What a committed play did, for the caller that submitted it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PlayOutcome {
    pub kind: CombinationKind,
    pub cards: Vec<Card>,
    pub rules_applied: Vec<String>,
    pub table_cleared: bool,
    pub kept_turn: bool,
    pub player_finished: bool,
    pub next_player: usize,
    pub winner: Option<usize>,
}

fn default_rng() -> StdRng {
    StdRng::from_entropy()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaifugoGame {
    pub state: State,
    pub options: GameOptions,
    hands: [Vec<Card>; PLAYER_COUNT],
    table_cards: Vec<Card>,
    current_player: usize,
    consecutive_passes: usize,
    last_player: Option<usize>,
    finish_order: Vec<usize>,
    winner: Option<usize>,
    pub changes: Vec<Vec<Change>>,
    // Skip animation metadata when running headless simulations
    pub no_changes: bool,
    #[serde(skip, default = "default_rng")]
    rng: StdRng,
    #[serde(skip, default = "RuleRegistry::standard")]
    rules: RuleRegistry,
}

impl DaifugoGame {
    pub fn new(options: GameOptions) -> Self {
        let rng = rng_from_seed(options.seed);
        let rules = if options.eight_cut {
            RuleRegistry::standard()
        } else {
            RuleRegistry::empty()
        };
        let mut game = DaifugoGame {
            state: State::Play,
            options,
            hands: Default::default(),
            table_cards: vec![],
            current_player: 0,
            consecutive_passes: 0,
            last_player: None,
            finish_order: vec![],
            winner: None,
            changes: vec![],
            no_changes: false,
            rng,
            rules,
        };
        game.deal();
        game.show_playable();
        game
    }

    fn deal(&mut self) {
        let cards = deck(self.options.jokers, &mut self.rng);
        for (index, card) in cards.into_iter().enumerate() {
            self.hands[index % PLAYER_COUNT].push(card);
        }
        // Only the human seat's hand is kept in display order
        self.hands[0].sort_by(card_sorter);
        let mut batch: Vec<Change> = vec![];
        for player in 0..PLAYER_COUNT {
            let length = self.hands[player].len();
            for (hand_offset, card) in self.hands[player].iter().enumerate() {
                batch.push(Change {
                    change_type: ChangeType::Deal,
                    object_id: card.id,
                    dest: Location::Hand,
                    player,
                    hand_offset,
                    length,
                });
            }
        }
        self.push_batch(batch);
    }

    /// Submit a combination for the player whose turn it is. Rejections
    /// are side-effect free.
    pub fn submit_play(
        &mut self,
        player: usize,
        cards: &[Card],
    ) -> Result<PlayOutcome, PlayRejection> {
        if self.state == State::GameOver {
            return Err(PlayRejection::RoundOver);
        }
        if player != self.current_player {
            return Err(PlayRejection::NotPlayersTurn(player));
        }
        if !self.holds_all(player, cards) {
            return Err(PlayRejection::CardNotInHand(player));
        }
        let kind = classify(cards);
        if kind == CombinationKind::Invalid {
            return Err(PlayRejection::InvalidCombinationShape);
        }
        if !self.table_cards.is_empty() {
            if kind != classify(&self.table_cards) || cards.len() != self.table_cards.len() {
                return Err(PlayRejection::KindMismatch);
            }
            if rank_key(cards) <= rank_key(&self.table_cards) {
                return Err(PlayRejection::RankTooLow);
            }
        }

        // Commit: membership was checked above, so a miss here is a
        // bookkeeping defect
        for card in cards {
            remove_first_match(&mut self.hands[player], |held| held.id == card.id)
                .expect("played card must be in hand");
        }
        debug!(player, kind = ?kind, count = cards.len(), "play committed");
        self.table_cards = cards.to_vec();
        self.last_player = Some(player);
        self.consecutive_passes = 0;

        let mut batch: Vec<Change> = cards
            .iter()
            .map(|card| Change {
                change_type: ChangeType::Play,
                object_id: card.id,
                dest: Location::Table,
                player,
                ..Default::default()
            })
            .collect();
        batch.extend(reorder_hand(player, &self.hands[player]));
        self.push_batch(batch);

        let mut ctx = RuleContext {
            table_cards: std::mem::take(&mut self.table_cards),
            current_player: player,
            keep_turn: false,
        };
        let applied = self.rules.evaluate(cards, &mut ctx);
        let table_cleared = ctx.table_cards.is_empty();
        let kept_turn = ctx.keep_turn;
        self.table_cards = ctx.table_cards;
        if table_cleared {
            self.push_batch(discard_table(cards));
        }

        let player_finished = self.hands[player].is_empty();
        if player_finished {
            debug!(player, "hand emptied");
            self.finish_order.push(player);
        }

        if self.players_holding_cards() <= 1 {
            self.state = State::GameOver;
            self.winner = self.finish_order.first().copied();
            debug!(winner = ?self.winner, "round over");
            self.push_batch(vec![Change {
                change_type: ChangeType::GameOver,
                dest: Location::Deck,
                ..Default::default()
            }]);
        } else if !kept_turn || player_finished {
            self.current_player = self.next_active_after(player);
        }
        self.show_playable();

        Ok(PlayOutcome {
            kind,
            cards: cards.to_vec(),
            rules_applied: applied.into_iter().map(String::from).collect(),
            table_cleared,
            kept_turn,
            player_finished,
            next_player: self.current_player,
            winner: self.winner,
        })
    }

    /// Pass for the player whose turn it is. Enough consecutive passes
    /// sweep the table and return the turn to the last successful
    /// player.
    pub fn submit_pass(&mut self, player: usize) -> Result<Turn, PlayRejection> {
        if self.state == State::GameOver {
            return Err(PlayRejection::RoundOver);
        }
        if player != self.current_player {
            return Err(PlayRejection::NotPlayersTurn(player));
        }
        self.consecutive_passes += 1;
        debug!(player, passes = self.consecutive_passes, "pass");
        self.push_batch(vec![Change {
            change_type: ChangeType::Pass,
            object_id: -1,
            dest: Location::Table,
            player,
            ..Default::default()
        }]);
        let threshold = self.players_holding_cards().saturating_sub(1).max(1);
        if self.consecutive_passes >= threshold {
            self.sweep();
        } else {
            self.current_player = self.next_active_after(player);
        }
        self.show_playable();
        Ok(self.turn())
    }

    fn sweep(&mut self) {
        debug!(returning_to = ?self.last_player, "table swept");
        let batch = discard_table(&self.table_cards);
        self.push_batch(batch);
        self.table_cards.clear();
        self.consecutive_passes = 0;
        self.current_player = match self.last_player {
            Some(last) if !self.hands[last].is_empty() => last,
            Some(last) => self.next_active_after(last),
            None => 0,
        };
    }

    /// Run the automated opponent for a seat: select a move and submit
    /// it through the normal play path, or pass. Returns the play
    /// outcome, or None for a pass.
    pub fn take_cpu_turn(&mut self, player: usize) -> Result<Option<PlayOutcome>, PlayRejection> {
        if self.state == State::GameOver {
            return Err(PlayRejection::RoundOver);
        }
        if player != self.current_player {
            return Err(PlayRejection::NotPlayersTurn(player));
        }
        match select_move(&self.hands[player], &self.table_cards, &mut self.rng) {
            Some(cards) => self.submit_play(player, &cards).map(Some),
            None => {
                self.submit_pass(player)?;
                Ok(None)
            }
        }
    }

    /// Cards that appear in at least one combination currently legal
    /// for the player, for presentation highlighting.
    pub fn playable_cards(&self, player: usize) -> Vec<Card> {
        let hand = &self.hands[player];
        let mut playable_ids: Vec<i32> = vec![];
        for combo in enumerate_combinations(hand) {
            if can_play(&self.table_cards, &combo) {
                for card in combo {
                    if !playable_ids.contains(&card.id) {
                        playable_ids.push(card.id);
                    }
                }
            }
        }
        hand.iter()
            .filter(|card| playable_ids.contains(&card.id))
            .copied()
            .collect()
    }

    pub fn register_rule(&mut self, rule: Box<dyn Rule>) {
        self.rules.register(rule);
    }

    pub fn turn(&self) -> Turn {
        Turn {
            current_player: self.current_player,
            consecutive_passes: self.consecutive_passes,
            last_player: self.last_player,
        }
    }

    pub fn current_player(&self) -> usize {
        self.current_player
    }

    pub fn consecutive_passes(&self) -> usize {
        self.consecutive_passes
    }

    pub fn last_player(&self) -> Option<usize> {
        self.last_player
    }

    pub fn table_cards(&self) -> &[Card] {
        &self.table_cards
    }

    pub fn hand(&self, player: usize) -> &[Card] {
        &self.hands[player]
    }

    pub fn hand_sizes(&self) -> [usize; PLAYER_COUNT] {
        let mut sizes = [0; PLAYER_COUNT];
        for (player, hand) in self.hands.iter().enumerate() {
            sizes[player] = hand.len();
        }
        sizes
    }

    pub fn winner(&self) -> Option<usize> {
        self.winner
    }

    pub fn finish_order(&self) -> &[usize] {
        &self.finish_order
    }

    /// Hand the accumulated animation batches to the presentation layer.
    pub fn drain_changes(&mut self) -> Vec<Vec<Change>> {
        std::mem::take(&mut self.changes)
    }

    fn holds_all(&self, player: usize, cards: &[Card]) -> bool {
        let mut remaining: Vec<i32> = self.hands[player].iter().map(|c| c.id).collect();
        cards
            .iter()
            .all(|card| remove_first_match(&mut remaining, |id| *id == card.id).is_some())
    }

    fn players_holding_cards(&self) -> usize {
        self.hands.iter().filter(|hand| !hand.is_empty()).count()
    }

    fn next_active_after(&self, player: usize) -> usize {
        let mut next = (player + 1) % PLAYER_COUNT;
        while self.hands[next].is_empty() {
            next = (next + 1) % PLAYER_COUNT;
        }
        next
    }

    fn push_batch(&mut self, batch: Vec<Change>) {
        if !self.no_changes && !batch.is_empty() {
            self.changes.push(batch);
        }
    }

    fn show_playable(&mut self) {
        if self.no_changes {
            return;
        }
        let batch: Vec<Change> = if self.state == State::Play && self.current_player == 0 {
            self.playable_cards(0)
                .iter()
                .map(|card| Change {
                    change_type: ChangeType::ShowPlayable,
                    object_id: card.id,
                    dest: Location::Hand,
                    ..Default::default()
                })
                .collect()
        } else {
            self.hands[0]
                .iter()
                .map(|card| Change {
                    change_type: ChangeType::HidePlayable,
                    object_id: card.id,
                    dest: Location::Hand,
                    ..Default::default()
                })
                .collect()
        };
        self.push_batch(batch);
    }
}

fn reorder_hand(player: usize, hand: &[Card]) -> Vec<Change> {
    let length = hand.len();
    hand.iter()
        .enumerate()
        .map(|(hand_offset, card)| Change {
            change_type: ChangeType::Reorder,
            object_id: card.id,
            dest: Location::ReorderHand,
            player,
            hand_offset,
            length,
        })
        .collect()
}

fn discard_table(table_cards: &[Card]) -> Vec<Change> {
    table_cards
        .iter()
        .map(|card| Change {
            change_type: ChangeType::TableClear,
            object_id: card.id,
            dest: Location::Discard,
            ..Default::default()
        })
        .collect()
}
