//! Per-link analysis state machine.
//!
//! ```text
//! Pending -> Fetching -> Extracted -> Analyzing -> Done | Failed
//!                     -> FallbackRequested      -> Done | Failed
//!                     -> Failed
//! Pending -> Done            (fresh cached analysis)
//! ```

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkState {
    Pending,
    Fetching,
    Extracted,
    Analyzing,
    FallbackRequested,
    Done,
    Failed,
}

impl LinkState {
    pub fn can_move_to(self, next: LinkState) -> bool {
        use LinkState::*;
        matches!(
            (self, next),
            (Pending, Fetching)
                | (Pending, Done)
                | (Fetching, Extracted)
                | (Fetching, FallbackRequested)
                | (Fetching, Failed)
                | (Extracted, Analyzing)
                | (Analyzing, Done)
                | (Analyzing, Failed)
                | (FallbackRequested, Done)
                | (FallbackRequested, Failed)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("illegal link state transition {from:?} -> {to:?}")]
pub struct IllegalTransition {
    pub from: LinkState,
    pub to: LinkState,
}

/// Current state plus every state visited, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkProgress {
    trail: Vec<LinkState>,
}

impl Default for LinkProgress {
    fn default() -> Self {
        Self {
            trail: vec![LinkState::Pending],
        }
    }
}

impl LinkProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> LinkState {
        self.trail.last().copied().unwrap_or(LinkState::Pending)
    }

    pub fn advance(&mut self, next: LinkState) -> Result<(), IllegalTransition> {
        let from = self.state();
        if !from.can_move_to(next) {
            return Err(IllegalTransition { from, to: next });
        }
        self.trail.push(next);
        Ok(())
    }

    /// Force the terminal `Failed` state (after an illegal transition).
    pub fn fail(&mut self) {
        if self.state() != LinkState::Failed {
            self.trail.push(LinkState::Failed);
        }
    }

    pub fn into_trail(self) -> Vec<LinkState> {
        self.trail
    }
}
