//! Per-tick player input and the text form used by scripts.
//!
//! A script is a whitespace- or comma-separated list of tokens, one tick per
//! token. `#` starts a comment that runs to the end of the line, and
//! `token*N` repeats a token `N` times.

use std::fmt;
use std::str::FromStr;

use aw_core::Direction;

use crate::error::{SimError, SimResult};

/// A discrete action, at most one per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Strike the current enemy.
    Attack,
    /// Halve the enemy's next blow.
    Defend,
    /// Absorb most of the enemy's next blow.
    Block,
    /// Try to escape the current encounter.
    Flee,
    /// Talk to an adjacent NPC or continue the current dialogue.
    Interact,
    /// Use the item in the given inventory slot.
    UseItem(usize),
    /// Put the item in the given inventory slot on the ground.
    Drop(usize),
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attack => write!(f, "attack"),
            Self::Defend => write!(f, "defend"),
            Self::Block => write!(f, "block"),
            Self::Flee => write!(f, "flee"),
            Self::Interact => write!(f, "interact"),
            Self::UseItem(slot) => write!(f, "use:{slot}"),
            Self::Drop(slot) => write!(f, "drop:{slot}"),
        }
    }
}

/// Input for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickInput {
    /// Requested step, if any.
    pub direction: Option<Direction>,
    /// Requested action, if any.
    pub action: Option<Action>,
}

impl TickInput {
    /// No input.
    pub fn idle() -> Self {
        Self::default()
    }

    /// A single step.
    pub fn step(direction: Direction) -> Self {
        Self {
            direction: Some(direction),
            action: None,
        }
    }

    /// A single action.
    pub fn act(action: Action) -> Self {
        Self {
            direction: None,
            action: Some(action),
        }
    }

    /// Builds input from a raw axis pair in `{-1, 0, 1}`. Diagonals keep
    /// only their horizontal component.
    pub fn from_axes(dx: i32, dy: i32) -> Self {
        let direction = if dx != 0 {
            Direction::from_delta(dx.signum(), 0)
        } else {
            Direction::from_delta(0, dy.signum())
        };
        Self {
            direction,
            action: None,
        }
    }
}

impl fmt::Display for TickInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.direction, self.action) {
            (Some(d), Some(a)) => write!(f, "{d}+{a}"),
            (Some(d), None) => write!(f, "{d}"),
            (None, Some(a)) => write!(f, "{a}"),
            (None, None) => write!(f, "wait"),
        }
    }
}

impl FromStr for TickInput {
    type Err = SimError;

    /// Parses one token. A direction and an action may be combined with
    /// `+`, as in `up+attack`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut input = TickInput::idle();
        for part in s.trim().to_lowercase().split('+') {
            let invalid = || SimError::InvalidInput(s.to_string());
            let direction = match part {
                "up" | "n" => Some(Direction::Up),
                "down" | "s" => Some(Direction::Down),
                "left" | "w" => Some(Direction::Left),
                "right" | "e" => Some(Direction::Right),
                _ => None,
            };
            if let Some(d) = direction {
                if input.direction.replace(d).is_some() {
                    return Err(invalid());
                }
                continue;
            }
            let action = match part {
                "wait" => continue,
                "attack" => Action::Attack,
                "defend" => Action::Defend,
                "block" => Action::Block,
                "flee" => Action::Flee,
                "interact" | "talk" => Action::Interact,
                other => {
                    let (verb, slot) = other.split_once(':').ok_or_else(invalid)?;
                    let slot = slot.parse().map_err(|_| invalid())?;
                    match verb {
                        "use" => Action::UseItem(slot),
                        "drop" => Action::Drop(slot),
                        _ => return Err(invalid()),
                    }
                }
            };
            if input.action.replace(action).is_some() {
                return Err(invalid());
            }
        }
        Ok(input)
    }
}

/// Parses a whole script into per-tick inputs.
pub fn parse_script(script: &str) -> SimResult<Vec<TickInput>> {
    let mut inputs = Vec::new();
    for line in script.lines() {
        let line = line.split('#').next().unwrap_or_default();
        for token in line
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|t| !t.is_empty())
        {
            let (body, count) = match token.split_once('*') {
                Some((body, n)) => (
                    body,
                    n.parse::<usize>()
                        .map_err(|_| SimError::InvalidInput(token.to_string()))?,
                ),
                None => (token, 1),
            };
            let input: TickInput = body.parse()?;
            inputs.extend(std::iter::repeat_n(input, count));
        }
    }
    Ok(inputs)
}
