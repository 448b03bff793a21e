//! Self-play analysis: where play settles, and how it reacts to rare errors
//!
//! The efficiency and distinguishability checks work on a deterministic
//! transition graph (self-play, or play against an unconditional cooperator)
//! and model rare implementation errors by adding "noise" edges out of the
//! sink components: from each sink node to the state with A's last action
//! flipped and to the state with B's last action flipped. Noise edges are
//! added one layer at a time until every state has been classified.
//!
//! The stationary checks model the same errors directly: each player's
//! intended action is flipped with probability `e`, and the long-run
//! distribution over the 16 states decides the verdict.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::action::Action;
use crate::error::{Error, Result};
use crate::graph::DirectedGraph;
use crate::oracle::NegativeCycleOracle;
use crate::state::{GameState, STATE_COUNT};
use crate::strategy::Strategy;

/// Id of the mutual-cooperation state `cccc`.
const ALL_COOPERATE: usize = 0;

/// Error rate used by [`analyze`] for the stationary checks.
pub const DEFAULT_ERROR_RATE: f64 = 1e-5;

/// Share of time in `cccc` that separates the stationary verdicts.
pub const DEFAULT_THRESHOLD: f64 = 0.95;

/// For each starting state, the cycle self-play falls into, named by its smallest state id.
pub fn self_play_destinations(strategy: &Strategy) -> [usize; STATE_COUNT] {
    let mut dests = [0; STATE_COUNT];
    for start in GameState::all() {
        let mut visited = [false; STATE_COUNT];
        let mut current = start;
        while !visited[current.to_id()] {
            visited[current.to_id()] = true;
            current = strategy.next_state_with_self(&current);
        }
        // `current` is on the cycle; walk it once to find its smallest id
        let entry = current.to_id();
        let mut smallest = entry;
        let mut walker = strategy.next_state_with_self(&current);
        while walker.to_id() != entry {
            smallest = smallest.min(walker.to_id());
            walker = strategy.next_state_with_self(&walker);
        }
        dests[start.to_id()] = smallest;
    }
    dests
}

/// How [`classify_under_noise`] resolves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum NoiseOutcome {
    /// Some state reaches `cccc` and is reached back from it.
    ReturnsFromCooperation,
    /// Every state reaches `cccc`, none is reachable back.
    AllFlowToCooperation,
    /// A noise layer added nothing new and some state still cannot reach `cccc`.
    Stalled,
}

fn add_noise_layer(g: &mut DirectedGraph) -> bool {
    let mut added = false;
    for sink in g.sink_components() {
        for from in sink {
            for noised in GameState::from_index(from).noised_states() {
                let to = noised.to_id();
                if !g.has_edge(from, to) {
                    g.add_edge(from, to);
                    added = true;
                }
            }
        }
    }
    added
}

fn classify_under_noise(mut g: DirectedGraph) -> NoiseOutcome {
    let mut checked = [false; STATE_COUNT];
    checked[ALL_COOPERATE] = true;

    let mut layer = 0;
    while checked.iter().any(|c| !c) {
        if layer > 0 && !add_noise_layer(&mut g) {
            return NoiseOutcome::Stalled;
        }
        for id in 0..STATE_COUNT {
            if checked[id] || !g.is_reachable(id, ALL_COOPERATE) {
                continue;
            }
            if g.is_reachable(ALL_COOPERATE, id) {
                return NoiseOutcome::ReturnsFromCooperation;
            }
            checked[id] = true;
        }
        layer += 1;
    }
    NoiseOutcome::AllFlowToCooperation
}

/// Self-play settles back into mutual cooperation after rare errors.
pub fn is_efficient_topo(strategy: &Strategy) -> bool {
    if strategy.action_at(&GameState::from_index(ALL_COOPERATE)) != Action::Cooperate {
        return false;
    }
    let outcome = classify_under_noise(strategy.transition_graph_with_self());
    if outcome == NoiseOutcome::Stalled {
        warn!(strategy = %strategy, "noise layers stalled during efficiency check");
    }
    outcome == NoiseOutcome::AllFlowToCooperation
}

/// The strategy does not simply cooperate forever with an unconditional cooperator:
/// after rare errors it can leave mutual cooperation and exploit it.
pub fn is_distinguishable_topo(strategy: &Strategy) -> bool {
    if strategy.action_at(&GameState::from_index(ALL_COOPERATE)) != Action::Cooperate {
        return true;
    }
    let mut g = DirectedGraph::new(STATE_COUNT);
    for s in GameState::all() {
        g.add_edge(s.to_id(), strategy.next_state_against(&s, Action::Cooperate).to_id());
    }
    let outcome = classify_under_noise(g);
    if outcome == NoiseOutcome::Stalled {
        warn!(strategy = %strategy, "noise layers stalled during distinguishability check");
    }
    outcome == NoiseOutcome::ReturnsFromCooperation
}

/// Long-run share of time spent in each state when every intended action is
/// flipped with probability `e`.
///
/// Player B uses `coplayer`, or the strategy itself when `None`. `e` must lie
/// strictly between 0 and 1; the chain is then irreducible and the
/// distribution unique.
pub fn stationary_state(
    strategy: &Strategy,
    e: f64,
    coplayer: Option<&Strategy>,
) -> Result<[f64; STATE_COUNT]> {
    if !(e > 0.0 && e < 1.0) {
        return Err(Error::InvalidErrorRate { e });
    }
    let coplayer = coplayer.unwrap_or(strategy);

    // Rows 0..15: (P - I) x = 0 for the column-stochastic transition matrix P.
    // The last balance row is redundant and is replaced by sum(x) = 1.
    let mut m = [[0.0f64; STATE_COUNT + 1]; STATE_COUNT];
    for from in GameState::all() {
        let act_a = strategy.action_at(&from);
        let act_b = coplayer.action_at(&from.swap());
        let intended = from.next_state(act_a, act_b);
        for to in GameState::all() {
            m[to.to_id()][from.to_id()] = match intended.last_round_differences(to) {
                None => 0.0,
                Some(0) => (1.0 - e) * (1.0 - e),
                Some(1) => (1.0 - e) * e,
                Some(_) => e * e,
            };
        }
    }
    for (i, row) in m.iter_mut().enumerate() {
        row[i] -= 1.0;
    }
    m[STATE_COUNT - 1] = [1.0; STATE_COUNT + 1];

    Ok(solve(m))
}

/// Gauss-Jordan elimination with partial pivoting on an augmented 16x17 system.
fn solve(mut m: [[f64; STATE_COUNT + 1]; STATE_COUNT]) -> [f64; STATE_COUNT] {
    for col in 0..STATE_COUNT {
        let pivot = (col..STATE_COUNT)
            .max_by(|&a, &b| m[a][col].abs().total_cmp(&m[b][col].abs()))
            .unwrap_or(col);
        m.swap(col, pivot);
        let pivot_row = m[col];
        for (r, row) in m.iter_mut().enumerate() {
            if r == col || row[col] == 0.0 {
                continue;
            }
            let factor = row[col] / pivot_row[col];
            for k in col..=STATE_COUNT {
                row[k] -= factor * pivot_row[k];
            }
        }
    }
    let mut x = [0.0; STATE_COUNT];
    for (i, xi) in x.iter_mut().enumerate() {
        *xi = m[i][STATE_COUNT] / m[i][i];
    }
    x
}

/// Under self-play with error rate `e`, more than `threshold` of the time is spent in `cccc`.
pub fn is_efficient(strategy: &Strategy, e: f64, threshold: f64) -> Result<bool> {
    Ok(stationary_state(strategy, e, None)?[ALL_COOPERATE] > threshold)
}

/// Against an unconditional cooperator with error rate `e`, at most
/// `threshold` of the time is spent in `cccc`.
pub fn is_distinguishable(strategy: &Strategy, e: f64, threshold: f64) -> Result<bool> {
    let all_c = Strategy::all_cooperate();
    Ok(stationary_state(strategy, e, Some(&all_c))?[ALL_COOPERATE] < threshold)
}

/// Everything the analysis knows about one strategy
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyReport {
    pub strategy: Strategy,
    pub id: u16,
    pub defensible: bool,
    pub efficient: bool,
    pub distinguishable: bool,
    /// [`is_efficient`] at the default error rate and threshold.
    pub efficient_stationary: bool,
    /// [`is_distinguishable`] at the default error rate and threshold.
    pub distinguishable_stationary: bool,
    pub destinations: Vec<usize>,
}

/// Run every check on `strategy`.
pub fn analyze(strategy: &Strategy, oracle: &impl NegativeCycleOracle) -> Result<StrategyReport> {
    let report = StrategyReport {
        strategy: *strategy,
        id: strategy.to_int(),
        defensible: strategy.is_defensible_with(oracle),
        efficient: is_efficient_topo(strategy),
        distinguishable: is_distinguishable_topo(strategy),
        efficient_stationary: is_efficient(strategy, DEFAULT_ERROR_RATE, DEFAULT_THRESHOLD)?,
        distinguishable_stationary: is_distinguishable(
            strategy,
            DEFAULT_ERROR_RATE,
            DEFAULT_THRESHOLD,
        )?,
        destinations: self_play_destinations(strategy).to_vec(),
    };
    debug!(
        strategy = %strategy,
        defensible = report.defensible,
        efficient = report.efficient,
        distinguishable = report.distinguishable,
        "analyzed strategy"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::BellmanFord;

    #[test]
    fn test_all_defect() {
        let s = Strategy::all_defect();
        assert!(!is_efficient_topo(&s));
        assert!(is_distinguishable_topo(&s));
        assert_eq!(self_play_destinations(&s), [15; 16]);
    }

    #[test]
    fn test_all_cooperate() {
        let s = Strategy::all_cooperate();
        assert!(is_efficient_topo(&s));
        assert!(!is_distinguishable_topo(&s));
        assert_eq!(self_play_destinations(&s), [0; 16]);
    }

    #[test]
    fn test_tit_for_tat() {
        let s = Strategy::tit_for_tat();
        assert!(!is_efficient_topo(&s));
        assert!(!is_distinguishable_topo(&s));
        // cccc, the cddc <-> dccd alternation, and dddd
        assert_eq!(
            self_play_destinations(&s),
            [0, 6, 0, 6, 6, 15, 6, 15, 0, 6, 0, 6, 6, 15, 6, 15]
        );
    }

    #[test]
    fn test_win_stay_lose_shift() {
        let s = Strategy::win_stay_lose_shift();
        assert!(is_efficient_topo(&s));
        assert!(is_distinguishable_topo(&s));
        assert_eq!(self_play_destinations(&s), [0; 16]);
    }

    #[test]
    fn test_tit_for_two_tats() {
        let s = Strategy::tit_for_two_tats();
        assert!(is_efficient_topo(&s));
        assert!(!is_distinguishable_topo(&s));
        let mut expected = [0; 16];
        expected[15] = 15;
        assert_eq!(self_play_destinations(&s), expected);
    }

    #[test]
    fn test_tft_atft() {
        let s = Strategy::tft_atft();
        assert!(is_efficient_topo(&s));
        assert!(is_distinguishable_topo(&s));
        let dests = self_play_destinations(&s);
        assert_eq!(dests[0], 0);
        assert_eq!(dests[6], 6);
        assert_eq!(dests[9], 6);
        assert_eq!(dests[15], 15);
    }

    #[test]
    fn test_destinations_are_self_play_fixed_points_or_cycles() {
        for n in [0u16, 1, 0x00ff, 0x1234, 0xbeef, u16::MAX] {
            let s = Strategy::from_int(n);
            let dests = self_play_destinations(&s);
            for d in dests {
                // a destination maps to itself after some number of steps
                let start = GameState::from_index(d);
                let mut walker = s.next_state_with_self(&start);
                let mut steps = 1;
                while walker != start {
                    walker = s.next_state_with_self(&walker);
                    steps += 1;
                    assert!(steps <= STATE_COUNT);
                }
                assert_eq!(dests[d], d);
            }
        }
    }

    #[test]
    fn test_noise_layer_links_sink_to_flipped_states() {
        let mut g = Strategy::all_cooperate().transition_graph_with_self();
        assert!(add_noise_layer(&mut g));
        // cccc is the only sink under all-cooperate self-play
        assert!(g.has_edge(0, 4));
        assert!(g.has_edge(0, 1));
        assert_eq!(g.edge_count(), 18);
    }

    #[test]
    fn test_noise_layer_targets_are_noised_states() {
        let mut g = Strategy::tit_for_tat().transition_graph_with_self();
        let sinks = g.sink_components();
        assert!(add_noise_layer(&mut g));
        for from in sinks.into_iter().flatten() {
            for noised in GameState::from_index(from).noised_states() {
                assert!(g.has_edge(from, noised.to_id()), "{} misses {}", from, noised);
            }
        }
    }

    #[test]
    fn test_analyze_report() {
        let report = analyze(&Strategy::tft_atft(), &BellmanFord).unwrap();
        assert_eq!(report.id, 37530);
        assert!(report.defensible);
        assert!(report.efficient);
        assert!(report.distinguishable);
        assert!(report.efficient_stationary);
        assert!(report.distinguishable_stationary);
        assert_eq!(report.destinations.len(), 16);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["strategy"], "cdcddccdcdccdccd");
        assert_eq!(json["defensible"], true);
        assert_eq!(json["efficient_stationary"], true);
    }

    fn named_strategies() -> [Strategy; 6] {
        [
            Strategy::all_defect(),
            Strategy::all_cooperate(),
            Strategy::tit_for_tat(),
            Strategy::win_stay_lose_shift(),
            Strategy::tit_for_two_tats(),
            Strategy::tft_atft(),
        ]
    }

    #[test]
    fn test_stationary_state_is_a_distribution() {
        for s in named_strategies() {
            let stat = stationary_state(&s, 0.001, None).unwrap();
            let total: f64 = stat.iter().sum();
            assert!((total - 1.0).abs() < 1e-9, "{} sums to {}", s, total);
            assert!(stat.iter().all(|&p| p > -1e-12), "{} has a negative entry", s);
        }
    }

    #[test]
    fn test_stationary_tit_for_tat_splits_four_ways() {
        let stat = stationary_state(&Strategy::tit_for_tat(), 0.001, None).unwrap();
        for id in [0, 6, 9, 15] {
            assert!((stat[id] - 0.25).abs() < 0.01, "state {} has {}", id, stat[id]);
        }
    }

    #[test]
    fn test_stationary_concentrates_on_the_attractor() {
        let e = 0.001;
        assert!(stationary_state(&Strategy::all_defect(), e, None).unwrap()[15] > 0.99);
        assert!(stationary_state(&Strategy::all_cooperate(), e, None).unwrap()[0] > 0.99);
        assert!(stationary_state(&Strategy::win_stay_lose_shift(), e, None).unwrap()[0] > 0.99);
        assert!(stationary_state(&Strategy::tit_for_two_tats(), e, None).unwrap()[0] > 0.99);
    }

    #[test]
    fn test_stationary_against_coplayer() {
        // all-defect against an unconditional cooperator sits in ddcc
        let all_c = Strategy::all_cooperate();
        let stat = stationary_state(&Strategy::all_defect(), 0.001, Some(&all_c)).unwrap();
        assert!(stat[GameState::from_string("ddcc").unwrap().to_id()] > 0.99);
    }

    #[test]
    fn test_stationary_rejects_bad_error_rate() {
        let s = Strategy::tit_for_tat();
        for e in [0.0, 1.0, -0.1, 1.5, f64::NAN] {
            assert!(matches!(
                stationary_state(&s, e, None),
                Err(Error::InvalidErrorRate { .. })
            ));
        }
        assert!(is_efficient(&s, 0.0, DEFAULT_THRESHOLD).is_err());
        assert!(is_distinguishable(&s, 2.0, DEFAULT_THRESHOLD).is_err());
    }

    #[test]
    fn test_stationary_verdicts_agree_with_topological_ones() {
        for s in named_strategies() {
            assert_eq!(
                is_efficient(&s, DEFAULT_ERROR_RATE, DEFAULT_THRESHOLD).unwrap(),
                is_efficient_topo(&s),
                "efficiency of {}",
                s
            );
            assert_eq!(
                is_distinguishable(&s, DEFAULT_ERROR_RATE, DEFAULT_THRESHOLD).unwrap(),
                is_distinguishable_topo(&s),
                "distinguishability of {}",
                s
            );
        }
    }
}
