//! The two moves of the Prisoner's Dilemma

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A move in the Prisoner's Dilemma
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Action {
    Cooperate,
    Defect,
}

impl Action {
    /// Both actions, cooperate first.
    pub const ALL: [Action; 2] = [Action::Cooperate, Action::Defect];

    /// The other action.
    pub fn flip(self) -> Self {
        match self {
            Action::Cooperate => Action::Defect,
            Action::Defect => Action::Cooperate,
        }
    }

    /// Bit value used by both packed encodings: cooperate = 0, defect = 1.
    pub fn bit(self) -> u8 {
        match self {
            Action::Cooperate => 0,
            Action::Defect => 1,
        }
    }

    pub fn from_bit(bit: bool) -> Self {
        if bit {
            Action::Defect
        } else {
            Action::Cooperate
        }
    }

    pub fn to_char(self) -> char {
        match self {
            Action::Cooperate => 'c',
            Action::Defect => 'd',
        }
    }

    /// Parse `c`/`d`; anything else yields `None`.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'c' => Some(Action::Cooperate),
            'd' => Some(Action::Defect),
            _ => None,
        }
    }
}

impl TryFrom<char> for Action {
    type Error = Error;

    fn try_from(c: char) -> Result<Self> {
        Action::from_char(c).ok_or_else(|| Error::InvalidFormat {
            input: c.to_string(),
            expected_len: 1,
        })
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// Parse a fixed-length string over {c, d}.
pub(crate) fn parse_actions<const N: usize>(s: &str) -> Result<[Action; N]> {
    let invalid = || Error::InvalidFormat {
        input: s.to_string(),
        expected_len: N,
    };
    let mut actions = [Action::Cooperate; N];
    let mut chars = s.chars();
    for slot in actions.iter_mut() {
        *slot = chars.next().and_then(Action::from_char).ok_or_else(invalid)?;
    }
    if chars.next().is_some() {
        return Err(invalid());
    }
    Ok(actions)
}
