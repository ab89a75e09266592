use std::fmt;

use tracing::debug;

use super::cards::Card;

/// Post-play state handed to rule hooks. Holds the cards that just
/// became the table, the index of the player who played them, and the
/// turn-hold flag. Hooks mutate this record; the game writes it back.
#[derive(Debug)]
pub struct RuleContext {
    pub table_cards: Vec<Card>,
    pub current_player: usize,
    pub keep_turn: bool,
}

/// A special rule evaluated after every successful play. `can_apply`
/// must be side-effect free; `apply` runs only when it returned true.
pub trait Rule: fmt::Debug {
    fn name(&self) -> &'static str;
    fn can_apply(&self, played: &[Card], ctx: &RuleContext) -> bool;
    fn apply(&self, played: &[Card], ctx: &mut RuleContext);
    fn clone_box(&self) -> Box<dyn Rule>;
}

/// Playing any rank-8 card clears the table and the player opens the
/// next one instead of passing the turn onward.
#[derive(Debug, Clone, Copy, Default)]
pub struct EightCut;

impl Rule for EightCut {
    fn name(&self) -> &'static str {
        "eight-cut"
    }

    fn can_apply(&self, played: &[Card], _ctx: &RuleContext) -> bool {
        played.iter().any(|c| c.rank == 8)
    }

    fn apply(&self, _played: &[Card], ctx: &mut RuleContext) {
        ctx.table_cards.clear();
        ctx.keep_turn = true;
    }

    fn clone_box(&self) -> Box<dyn Rule> {
        Box::new(*self)
    }
}

/// Ordered chain of rules. Every rule whose predicate holds is applied,
/// in registration order; rules are not mutually exclusive.
#[derive(Debug, Default)]
pub struct RuleRegistry {
    rules: Vec<Box<dyn Rule>>,
}

impl RuleRegistry {
    pub fn empty() -> Self {
        RuleRegistry { rules: vec![] }
    }

    pub fn standard() -> Self {
        let mut registry = RuleRegistry::empty();
        registry.register(Box::new(EightCut));
        registry
    }

    pub fn register(&mut self, rule: Box<dyn Rule>) {
        self.rules.push(rule);
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Runs the chain over a play; returns the names of the rules that
    /// fired, in order.
    pub fn evaluate(&self, played: &[Card], ctx: &mut RuleContext) -> Vec<&'static str> {
        let mut applied = vec![];
        for rule in &self.rules {
            if rule.can_apply(played, ctx) {
                debug!(rule = rule.name(), player = ctx.current_player, "rule fired");
                rule.apply(played, ctx);
                applied.push(rule.name());
            }
        }
        applied
    }
}

impl Clone for RuleRegistry {
    fn clone(&self) -> Self {
        RuleRegistry {
            rules: self.rules.iter().map(|rule| rule.clone_box()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::daifugo::cards::Suit;

    fn c(suit: Suit, rank: i32) -> Card {
        Card { id: 0, suit, rank }
    }

    fn ctx_with_table(table_cards: Vec<Card>) -> RuleContext {
        RuleContext {
            table_cards,
            current_player: 2,
            keep_turn: false,
        }
    }

    #[test]
    fn test_eight_cut_predicate() {
        let rule = EightCut;
        let ctx = ctx_with_table(vec![]);
        assert!(rule.can_apply(&[c(Suit::Club, 8), c(Suit::Diamond, 8)], &ctx));
        // One eight inside a stair is enough
        assert!(rule.can_apply(
            &[c(Suit::Spade, 7), c(Suit::Spade, 8), c(Suit::Spade, 9)],
            &ctx
        ));
        assert!(!rule.can_apply(&[c(Suit::Club, 7), c(Suit::Diamond, 7)], &ctx));
    }

    #[test]
    fn test_eight_cut_clears_table_and_holds_turn() {
        let played = vec![c(Suit::Club, 8), c(Suit::Diamond, 8)];
        let mut ctx = ctx_with_table(played.clone());
        let applied = RuleRegistry::standard().evaluate(&played, &mut ctx);
        assert_eq!(applied, vec!["eight-cut"]);
        assert!(ctx.table_cards.is_empty());
        assert!(ctx.keep_turn);
    }

    #[test]
    fn test_empty_registry_leaves_state_alone() {
        let played = vec![c(Suit::Club, 8)];
        let mut ctx = ctx_with_table(played.clone());
        let applied = RuleRegistry::empty().evaluate(&played, &mut ctx);
        assert!(applied.is_empty());
        assert_eq!(ctx.table_cards, played);
        assert!(!ctx.keep_turn);
    }

    #[derive(Debug, Clone, Copy)]
    struct MarkLowOpen;

    impl Rule for MarkLowOpen {
        fn name(&self) -> &'static str {
            "mark-low-open"
        }

        fn can_apply(&self, played: &[Card], _ctx: &RuleContext) -> bool {
            played.iter().all(|c| c.rank == 3)
        }

        fn apply(&self, _played: &[Card], ctx: &mut RuleContext) {
            ctx.keep_turn = true;
        }

        fn clone_box(&self) -> Box<dyn Rule> {
            Box::new(*self)
        }
    }

    #[test]
    fn test_rules_run_in_registration_order() {
        let mut registry = RuleRegistry::standard();
        registry.register(Box::new(MarkLowOpen));

        let played = vec![c(Suit::Spade, 8)];
        let mut ctx = ctx_with_table(played.clone());
        assert_eq!(registry.evaluate(&played, &mut ctx), vec!["eight-cut"]);

        let played = vec![c(Suit::Spade, 3)];
        let mut ctx = ctx_with_table(played.clone());
        assert_eq!(registry.evaluate(&played, &mut ctx), vec!["mark-low-open"]);
        assert!(ctx.keep_turn);
        // Only eight-cut clears the table
        assert_eq!(ctx.table_cards, played);
    }
}
