//! Game states: the last two rounds of both players
//!
//! A state is the window `(a_prev2, a_prev1, b_prev2, b_prev1)`. The older
//! round comes first and player A's pair comes before player B's. There are
//! exactly 16 states, numbered 0..16 by reading the four fields as bits with
//! `a_prev2` most significant and defect = 1.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::action::{parse_actions, Action};
use crate::error::{Error, Result};

/// Number of distinct game states.
pub const STATE_COUNT: usize = 16;

/// Two rounds of history for both players
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GameState {
    pub a_prev2: Action,
    pub a_prev1: Action,
    pub b_prev2: Action,
    pub b_prev1: Action,
}

impl GameState {
    pub fn new(a_prev2: Action, a_prev1: Action, b_prev2: Action, b_prev1: Action) -> Self {
        Self { a_prev2, a_prev1, b_prev2, b_prev1 }
    }

    /// All 16 states in id order.
    pub fn all() -> impl Iterator<Item = GameState> {
        (0..STATE_COUNT).map(Self::from_index)
    }

    /// Inverse of [`GameState::to_id`] for a known-good index.
    pub(crate) fn from_index(id: usize) -> Self {
        debug_assert!(id < STATE_COUNT);
        let bit = |shift: usize| Action::from_bit((id >> shift) & 1 == 1);
        Self::new(bit(3), bit(2), bit(1), bit(0))
    }

    /// Build a state from its id in [0, 15].
    pub fn from_id(id: i64) -> Result<Self> {
        if !(0..STATE_COUNT as i64).contains(&id) {
            return Err(Error::InvalidArgument { id });
        }
        Ok(Self::from_index(id as usize))
    }

    /// Parse exactly four characters over {c, d}.
    pub fn from_string(s: &str) -> Result<Self> {
        let [a_prev2, a_prev1, b_prev2, b_prev1] = parse_actions::<4>(s)?;
        Ok(Self::new(a_prev2, a_prev1, b_prev2, b_prev1))
    }

    pub fn to_array(self) -> [Action; 4] {
        [self.a_prev2, self.a_prev1, self.b_prev2, self.b_prev1]
    }

    /// MSB-first packing of the four fields.
    pub fn to_id(self) -> usize {
        self.to_array()
            .iter()
            .fold(0, |id, action| (id << 1) | action.bit() as usize)
    }

    /// Slide the window forward one round.
    pub fn next_state(self, act_a: Action, act_b: Action) -> Self {
        Self::new(self.a_prev1, act_a, self.b_prev1, act_b)
    }

    /// Slide the window back one round, filling the oldest round with the given actions.
    pub fn prev_state(self, act_a: Action, act_b: Action) -> Self {
        Self::new(act_a, self.a_prev2, act_b, self.b_prev2)
    }

    /// The four states that lead here in one round.
    pub fn possible_predecessors(self) -> [GameState; 4] {
        let mut prev = [self; 4];
        let pairs = Action::ALL.iter().flat_map(|&a| Action::ALL.iter().map(move |&b| (a, b)));
        for (slot, (act_a, act_b)) in prev.iter_mut().zip(pairs) {
            *slot = self.prev_state(act_a, act_b);
        }
        prev
    }

    /// The same history seen from player B's side.
    pub fn swap(self) -> Self {
        Self::new(self.b_prev2, self.b_prev1, self.a_prev2, self.a_prev1)
    }

    /// A's payoff relative to B in the last round: -1 exploited, +1 exploiting, 0 matched.
    pub fn relative_payoff(self) -> i8 {
        crate::relative_payoff(self.a_prev1, self.b_prev1)
    }

    /// The states produced by one implementation error in the last round:
    /// A's action flipped, then B's action flipped.
    pub fn noised_states(self) -> [GameState; 2] {
        [
            Self::new(self.a_prev2, self.a_prev1.flip(), self.b_prev2, self.b_prev1),
            Self::new(self.a_prev2, self.a_prev1, self.b_prev2, self.b_prev1.flip()),
        ]
    }

    /// Number of last-round actions that differ from `other`, or `None` when
    /// the older rounds disagree.
    pub fn last_round_differences(self, other: GameState) -> Option<u8> {
        if self.a_prev2 != other.a_prev2 || self.b_prev2 != other.b_prev2 {
            return None;
        }
        Some((self.a_prev1 != other.a_prev1) as u8 + (self.b_prev1 != other.b_prev1) as u8)
    }
}

/// `"{id}_{state}"` for each of the 16 states, indexed by id.
pub fn node_labels() -> Vec<String> {
    GameState::all()
        .map(|s| format!("{}_{}", s.to_id(), s))
        .collect()
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for action in self.to_array() {
            write!(f, "{}", action)?;
        }
        Ok(())
    }
}

impl FromStr for GameState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_string(s)
    }
}

impl From<[Action; 4]> for GameState {
    fn from([a_prev2, a_prev1, b_prev2, b_prev1]: [Action; 4]) -> Self {
        Self::new(a_prev2, a_prev1, b_prev2, b_prev1)
    }
}

impl TryFrom<[char; 4]> for GameState {
    type Error = Error;

    fn try_from(fields: [char; 4]) -> Result<Self> {
        const NAMES: [&str; 4] = ["a_prev2", "a_prev1", "b_prev2", "b_prev1"];
        let mut actions = [Action::Cooperate; 4];
        for ((slot, value), field) in actions.iter_mut().zip(fields).zip(NAMES) {
            *slot = Action::from_char(value).ok_or(Error::InvalidState { field, value })?;
        }
        Ok(actions.into())
    }
}

impl Serialize for GameState {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for GameState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_string(&s).map_err(serde::de::Error::custom)
    }
}
