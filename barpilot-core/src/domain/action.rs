//! Discrete policy actions.

use serde::{Deserialize, Serialize};

/// What the policy wants to do on this tick.
///
/// The numeric codes are the ones the long/flat policy was trained with:
/// 0 hold, 1 enter long, 2 flatten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Hold,
    EnterLong,
    Flatten,
}

impl Action {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Action::Hold),
            1 => Some(Action::EnterLong),
            2 => Some(Action::Flatten),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Action::Hold => 0,
            Action::EnterLong => 1,
            Action::Flatten => 2,
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Action::Hold => "hold",
            Action::EnterLong => "enter_long",
            Action::Flatten => "flatten",
        };
        f.write_str(s)
    }
}
