/*
Game: Daifugo (four-player climbing game)
Traditional Japanese shedding game: beat the table combination or pass,
three consecutive passes sweep the table, any 8 cuts the round short.
*/

pub mod cards;
pub mod combos;
pub mod cpu;
pub mod game;
pub mod rules;

// Re-export the main types
pub use cards::{card_sorter, deck, Card, Suit, ID_TO_CARD, JOKER_RANK};
pub use combos::{can_play, classify, enumerate_combinations, rank_key, CombinationKind};
pub use cpu::{select_move, CpuChooser, HumanChooser, MoveChooser};
pub use game::{
    Change, ChangeType, DaifugoGame, GameOptions, Location, PlayOutcome, PlayRejection, State,
    Turn, PLAYER_COUNT,
};
pub use rules::{EightCut, Rule, RuleContext, RuleRegistry};
