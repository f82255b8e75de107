//! Run state definitions for a single search execution
//!
//! A run moves `Idle → Searching → (Enriching)? → Done` and never goes back.
use std::fmt;
use thiserror::Error;

/// Represents where a search run currently is
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RunState {
    /// Constructed, nothing sent yet
    #[default]
    Idle,

    /// Primary search request in flight
    Searching,

    /// Per-result enrichment tasks in flight
    Enriching,

    /// Results handed back to the caller
    Done,
}

/// Rejected state change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{from} -> {to}")]
pub struct StateError {
    pub from: RunState,
    pub to: RunState,
}

impl RunState {
    /// Whether a run may move from `self` to `next`
    ///
    /// `Searching → Done` covers both a failed primary search and a search
    /// that needs no enrichment.
    pub fn can_transition_to(&self, next: RunState) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Searching)
                | (Self::Searching, Self::Enriching)
                | (Self::Searching, Self::Done)
                | (Self::Enriching, Self::Done)
        )
    }

    /// Moves to `next`, or reports the illegal transition
    pub fn transition(&mut self, next: RunState) -> Result<(), StateError> {
        if !self.can_transition_to(next) {
            return Err(StateError {
                from: *self,
                to: next,
            });
        }
        *self = next;
        Ok(())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Searching => "searching",
            Self::Enriching => "enriching",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
