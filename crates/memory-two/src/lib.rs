//! Memory-2 strategies for the repeated Prisoner's Dilemma
//!
//! A memory-2 strategy picks its next move from the last two rounds of both
//! players. This crate encodes the 16 game states, represents strategies as
//! total functions over them, builds their transition graphs, and decides
//! whether a strategy is defensible: whether its payoff-weighted transition
//! graph is free of negative cycles.
//! This crate is compiled to:
//! - Native (for the `m2-inspect` CLI and library users)
//! - WASM (for a browser front end, feature `wasm`)

mod action;
mod analysis;
mod error;
mod graph;
mod oracle;
mod state;
mod strategy;

#[cfg(feature = "wasm")]
mod wasm;

pub use action::Action;
pub use analysis::{
    analyze, is_distinguishable, is_distinguishable_topo, is_efficient, is_efficient_topo,
    self_play_destinations, stationary_state, StrategyReport, DEFAULT_ERROR_RATE,
    DEFAULT_THRESHOLD,
};
pub use error::{Error, Result};
pub use graph::{DirectedGraph, WeightedDirectedGraph};
pub use oracle::{BellmanFord, FloydWarshall, NegativeCycleOracle, OracleKind};
pub use state::{node_labels, GameState, STATE_COUNT};
pub use strategy::{IntoGameState, Strategy};

/// Player A's payoff relative to player B for one round.
/// -1 when A cooperated into B's defection, +1 the other way round, 0 when they matched.
pub fn relative_payoff(a: Action, b: Action) -> i8 {
    match (a, b) {
        (Action::Cooperate, Action::Cooperate) => 0,
        (Action::Cooperate, Action::Defect) => -1,
        (Action::Defect, Action::Cooperate) => 1,
        (Action::Defect, Action::Defect) => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_payoff_matrix() {
        assert_eq!(relative_payoff(Action::Cooperate, Action::Cooperate), 0);
        assert_eq!(relative_payoff(Action::Cooperate, Action::Defect), -1);
        assert_eq!(relative_payoff(Action::Defect, Action::Cooperate), 1);
        assert_eq!(relative_payoff(Action::Defect, Action::Defect), 0);
    }
}
