use std::collections::HashMap;
use std::time::Instant;

use colored::Colorize;
use tracing_subscriber::EnvFilter;

use climberstable_rs::games::daifugo::{
    Card, ChangeType, CpuChooser, DaifugoGame, GameOptions, MoveChooser, State, Suit, ID_TO_CARD,
};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let seed: Option<u64> = std::env::args().nth(1).and_then(|arg| arg.parse().ok());
    watch_game(seed);
    simulate_many(1000);
}

fn rank_label(rank: i32) -> String {
    match rank {
        11 => "J".to_string(),
        12 => "Q".to_string(),
        13 => "K".to_string(),
        14 => "A".to_string(),
        15 => "2".to_string(),
        rank => rank.to_string(),
    }
}

fn card_label(card: &Card) -> String {
    match card.suit {
        Suit::Spade => format!("♠{}", rank_label(card.rank)).normal(),
        Suit::Heart => format!("♥{}", rank_label(card.rank)).red(),
        Suit::Diamond => format!("♦{}", rank_label(card.rank)).red(),
        Suit::Club => format!("♣{}", rank_label(card.rank)).normal(),
        Suit::Joker => "★Joker".yellow(),
    }
    .to_string()
}

/// Play one game move by move with per-seat choosers, narrating plays,
/// passes and sweeps.
fn watch_game(seed: Option<u64>) {
    let mut game = DaifugoGame::new(GameOptions {
        seed,
        jokers: 1,
        ..Default::default()
    });
    let mut choosers: Vec<Box<dyn MoveChooser>> = (0..4)
        .map(|seat| {
            Box::new(CpuChooser::seeded(seed.unwrap_or(0).wrapping_add(seat))) as Box<dyn MoveChooser>
        })
        .collect();
    game.drain_changes();

    while game.state != State::GameOver {
        let player = game.current_player();
        let selection = choosers[player].choose(game.hand(player), game.table_cards());
        match selection {
            Some(cards) => {
                let outcome = game
                    .submit_play(player, &cards)
                    .expect("cpu selection is legal");
                let labels: Vec<String> = outcome.cards.iter().map(card_label).collect();
                let mut line = format!("player {} plays {}", player, labels.join(" "));
                if !outcome.rules_applied.is_empty() {
                    line.push_str(&format!(" ({})", outcome.rules_applied.join(", ")));
                }
                if outcome.player_finished {
                    line.push_str(" and goes out");
                }
                println!("{}", line);
            }
            None => {
                game.submit_pass(player).expect("pass is accepted");
                println!("player {} passes", player);
            }
        }
        let cleared: Vec<String> = game
            .drain_changes()
            .iter()
            .flatten()
            .filter(|change| change.change_type == ChangeType::TableClear)
            .map(|change| card_label(&ID_TO_CARD[&change.object_id]))
            .collect();
        if !cleared.is_empty() {
            println!("  table cleared: {}", cleared.join(" "));
        }
    }

    println!(
        "finish order: {:?}, winner: {:?}",
        game.finish_order(),
        game.winner()
    );
    println!(
        "final turn state: {}",
        serde_json::to_string(&game.turn()).expect("turn state serializes")
    );
}

/// Headless seeded simulations with the per-seat win tally.
fn simulate_many(count: usize) {
    let start = Instant::now();
    let mut wins: HashMap<usize, usize> = HashMap::new();
    for seed in 0..count {
        let mut game = DaifugoGame::new(GameOptions {
            seed: Some(seed as u64),
            ..Default::default()
        });
        game.no_changes = true;
        while game.state != State::GameOver {
            let player = game.current_player();
            game.take_cpu_turn(player).expect("cpu move is accepted");
        }
        *wins
            .entry(game.winner().expect("finished game has a winner"))
            .or_insert(0) += 1;
    }
    println!("{} games simulated in {:?}", count, start.elapsed());
    for seat in 0..4 {
        println!("seat {} wins: {}", seat, wins.get(&seat).copied().unwrap_or(0));
    }
}
