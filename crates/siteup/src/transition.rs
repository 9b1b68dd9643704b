use std::fmt;

use serde::{Deserialize, Serialize};

use crate::site::Site;

/// Direction of a liveness change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transition {
    Down,
    Up,
}

impl Transition {
    /// The state the site is in after this transition.
    pub fn up(self) -> bool {
        matches!(self, Transition::Up)
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transition::Down => write!(f, "down"),
            Transition::Up => write!(f, "up"),
        }
    }
}

/// Decide whether moving from `previous_up` to `current_up` is a transition.
pub fn detect(previous_up: bool, current_up: bool) -> Option<Transition> {
    match (previous_up, current_up) {
        (true, false) => Some(Transition::Down),
        (false, true) => Some(Transition::Up),
        _ => None,
    }
}

/// A site changed state. `up` is the new state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionEvent {
    pub site: Site,
    pub up: bool,
}

impl TransitionEvent {
    pub fn new(site: Site, transition: Transition) -> Self {
        Self { site, up: transition.up() }
    }
}
