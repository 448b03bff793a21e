//! Memory-2 strategies and their transition graphs
//!
//! A strategy is the action player A takes in each of the 16 game states,
//! stored by state id. Its text form lists the actions in id order; its
//! integer form sets bit `i` when the action at state id `i` is defect. That
//! integer packing is LSB-first by state id and is unrelated to the MSB-first
//! field packing behind [`GameState::to_id`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::{debug, trace};

use crate::action::{parse_actions, Action};
use crate::error::{Error, Result};
use crate::graph::{DirectedGraph, WeightedDirectedGraph};
use crate::oracle::{BellmanFord, NegativeCycleOracle};
use crate::state::{GameState, STATE_COUNT};

/// Anything that names a game state: a state, its four actions, or its text form.
pub trait IntoGameState {
    fn into_game_state(self) -> Result<GameState>;
}

impl IntoGameState for GameState {
    fn into_game_state(self) -> Result<GameState> {
        Ok(self)
    }
}

impl IntoGameState for &GameState {
    fn into_game_state(self) -> Result<GameState> {
        Ok(*self)
    }
}

impl IntoGameState for [Action; 4] {
    fn into_game_state(self) -> Result<GameState> {
        Ok(self.into())
    }
}

impl IntoGameState for &[Action] {
    fn into_game_state(self) -> Result<GameState> {
        let fields: [Action; 4] = self
            .try_into()
            .map_err(|_| Error::InvalidInput { len: self.len() })?;
        Ok(fields.into())
    }
}

impl IntoGameState for &Vec<Action> {
    fn into_game_state(self) -> Result<GameState> {
        self.as_slice().into_game_state()
    }
}

impl IntoGameState for &str {
    fn into_game_state(self) -> Result<GameState> {
        GameState::from_string(self)
    }
}

impl IntoGameState for String {
    fn into_game_state(self) -> Result<GameState> {
        GameState::from_string(&self)
    }
}

impl IntoGameState for &String {
    fn into_game_state(self) -> Result<GameState> {
        GameState::from_string(self)
    }
}

/// Player A's action for every game state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Strategy {
    actions: [Action; STATE_COUNT],
}

impl Strategy {
    pub fn from_actions(actions: [Action; STATE_COUNT]) -> Self {
        Self { actions }
    }

    /// Build from a slice that must hold exactly one action per state.
    pub fn new(actions: &[Action]) -> Result<Self> {
        let actions: [Action; STATE_COUNT] = actions
            .try_into()
            .map_err(|_| Error::InvalidStrategy { len: actions.len() })?;
        Ok(Self::from_actions(actions))
    }

    /// Parse exactly 16 characters over {c, d}, state id 0 first.
    pub fn from_string(s: &str) -> Result<Self> {
        parse_actions::<STATE_COUNT>(s).map(Self::from_actions)
    }

    /// Bit `i` of `n` is the action at state id `i` (1 = defect).
    pub fn from_int(n: u16) -> Self {
        let mut actions = [Action::Cooperate; STATE_COUNT];
        for (idx, slot) in actions.iter_mut().enumerate() {
            *slot = Action::from_bit((n >> idx) & 1 == 1);
        }
        Self::from_actions(actions)
    }

    /// Inverse of [`Strategy::from_int`].
    pub fn to_int(&self) -> u16 {
        self.actions
            .iter()
            .enumerate()
            .fold(0, |n, (idx, action)| n | (action.bit() as u16) << idx)
    }

    pub fn actions(&self) -> &[Action; STATE_COUNT] {
        &self.actions
    }

    /// Action for a state already in canonical form.
    pub fn action_at(&self, state: &GameState) -> Action {
        self.actions[state.to_id()]
    }

    /// Action for any state representation.
    pub fn action(&self, state: impl IntoGameState) -> Result<Action> {
        let state = state.into_game_state()?;
        Ok(self.action_at(&state))
    }

    /// Overwrite the action for one state.
    pub fn set(&mut self, state: impl IntoGameState, action: Action) -> Result<()> {
        let state = state.into_game_state()?;
        self.actions[state.to_id()] = action;
        Ok(())
    }

    /// Every entry survives the `c`/`d` codec unchanged.
    pub fn is_valid(&self) -> bool {
        self.actions
            .iter()
            .all(|&a| Action::from_char(a.to_char()) == Some(a))
    }

    /// The two states reachable from `current` when the opponent may play anything:
    /// opponent cooperates, then opponent defects.
    pub fn possible_next_states(&self, current: &GameState) -> [GameState; 2] {
        let act_a = self.action_at(current);
        [
            current.next_state(act_a, Action::Cooperate),
            current.next_state(act_a, Action::Defect),
        ]
    }

    /// The next state when player B uses this same strategy.
    pub fn next_state_with_self(&self, current: &GameState) -> GameState {
        let act_a = self.action_at(current);
        let act_b = self.action_at(&current.swap());
        current.next_state(act_a, act_b)
    }

    /// The next state against an opponent that always plays `act_b`.
    pub fn next_state_against(&self, current: &GameState, act_b: Action) -> GameState {
        current.next_state(self.action_at(current), act_b)
    }

    /// Unconstrained-opponent transitions: two edges per state, parallel edges kept.
    pub fn transition_graph(&self) -> DirectedGraph {
        let mut g = DirectedGraph::new(STATE_COUNT);
        for s in GameState::all() {
            for n in self.possible_next_states(&s) {
                g.add_edge(s.to_id(), n.to_id());
            }
        }
        trace!(strategy = %self, edges = g.edge_count(), "built transition graph");
        g
    }

    /// Self-play transitions: one edge per state.
    pub fn transition_graph_with_self(&self) -> DirectedGraph {
        let mut g = DirectedGraph::new(STATE_COUNT);
        for s in GameState::all() {
            g.add_edge(s.to_id(), self.next_state_with_self(&s).to_id());
        }
        trace!(strategy = %self, "built self-play transition graph");
        g
    }

    /// Unconstrained-opponent transitions weighted by the relative payoff of
    /// the state each edge lands in.
    pub fn weighted_transition_graph(&self) -> WeightedDirectedGraph {
        let mut g = WeightedDirectedGraph::new(STATE_COUNT);
        for s in GameState::all() {
            for n in self.possible_next_states(&s) {
                g.add_edge(s.to_id(), n.to_id(), n.relative_payoff() as i64);
            }
        }
        trace!(strategy = %self, edges = g.edge_count(), "built weighted transition graph");
        g
    }

    /// No opponent can push A's cumulative relative payoff to minus infinity.
    pub fn is_defensible(&self) -> bool {
        self.is_defensible_with(&BellmanFord)
    }

    /// [`Strategy::is_defensible`] with a caller-chosen cycle oracle.
    pub fn is_defensible_with(&self, oracle: &impl NegativeCycleOracle) -> bool {
        let defensible = !oracle.has_negative_cycle(&self.weighted_transition_graph());
        debug!(strategy = %self, defensible, "checked defensibility");
        defensible
    }

    /// Cooperate in every state.
    pub fn all_cooperate() -> Self {
        Self::from_actions([Action::Cooperate; STATE_COUNT])
    }

    /// Defect in every state.
    pub fn all_defect() -> Self {
        Self::from_actions([Action::Defect; STATE_COUNT])
    }

    /// Repeat the opponent's last action.
    pub fn tit_for_tat() -> Self {
        Self::from_fn(|s| s.b_prev1)
    }

    /// Cooperate when both players' last actions matched, defect otherwise.
    pub fn win_stay_lose_shift() -> Self {
        Self::from_fn(|s| Action::from_bit(s.a_prev1 != s.b_prev1))
    }

    /// Defect only after two opponent defections in a row.
    pub fn tit_for_two_tats() -> Self {
        Self::from_fn(|s| {
            Action::from_bit(s.b_prev2 == Action::Defect && s.b_prev1 == Action::Defect)
        })
    }

    /// TFT-ATFT: tit-for-tat that switches to anti-tit-for-tat to recover
    /// mutual cooperation after an error.
    pub fn tft_atft() -> Self {
        Self::from_actions(TFT_ATFT)
    }

    fn from_fn(f: impl Fn(&GameState) -> Action) -> Self {
        let mut actions = [Action::Cooperate; STATE_COUNT];
        for (slot, s) in actions.iter_mut().zip(GameState::all()) {
            *slot = f(&s);
        }
        Self::from_actions(actions)
    }
}

const TFT_ATFT: [Action; STATE_COUNT] = {
    use crate::action::Action::{Cooperate as C, Defect as D};
    [C, D, C, D, D, C, C, D, C, D, C, C, D, C, C, D]
};

impl Default for Strategy {
    fn default() -> Self {
        Self::tit_for_tat()
    }
}

impl TryFrom<&[Action]> for Strategy {
    type Error = Error;

    fn try_from(actions: &[Action]) -> Result<Self> {
        Self::new(actions)
    }
}

impl FromStr for Strategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_string(s)
    }
}

impl From<u16> for Strategy {
    fn from(n: u16) -> Self {
        Self::from_int(n)
    }
}

/// `{}` prints the 16-character form. `{:#}` prints the form, the integer,
/// and an `action|state` table eight cells per line.
impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for action in &self.actions {
            write!(f, "{}", action)?;
        }
        if f.alternate() {
            write!(f, " {}", self.to_int())?;
            for (idx, (action, state)) in self.actions.iter().zip(GameState::all()).enumerate() {
                if idx % 8 == 0 {
                    writeln!(f)?;
                }
                write!(f, "{}|{}\t", action, state)?;
            }
        }
        Ok(())
    }
}

impl Serialize for Strategy {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Strategy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_string(&s).map_err(serde::de::Error::custom)
    }
}
