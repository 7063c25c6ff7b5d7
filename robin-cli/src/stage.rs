//! Operation state machine
//!
//! A `create` run moves strictly forward:
//!
//! ```text
//! Idle -> Validating -> Materializing -> Installing -> Done
//!            \               |                |
//!             +--------------+----------------+--> Failed
//! ```
//!
//! There is no retry or resume. A failed run has to be started again from
//! `Idle` after the user removes any partial output.

use std::fmt;

/// Stage of a `create` operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stage {
    /// Nothing has happened yet
    #[default]
    Idle,
    /// Checking the target path
    Validating,
    /// Writing the template tree
    Materializing,
    /// Running the package manager
    Installing,
    /// Finished successfully
    Done,
    /// Aborted
    Failed,
}

impl Stage {
    /// Whether no further transition is possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Whether `self -> next` is a legal transition.
    #[must_use]
    pub const fn can_advance_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Validating)
                | (Self::Validating, Self::Materializing)
                | (Self::Materializing, Self::Installing)
                | (Self::Installing, Self::Done)
                | (
                    Self::Validating | Self::Materializing | Self::Installing,
                    Self::Failed
                )
        )
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Validating => "validating",
            Self::Materializing => "materializing",
            Self::Installing => "installing",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Tracks the current stage and rejects illegal transitions
#[derive(Debug, Default)]
pub struct StageTracker {
    current: Stage,
}

impl StageTracker {
    /// Create a tracker in the `Idle` stage
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current stage
    #[must_use]
    pub const fn current(&self) -> Stage {
        self.current
    }

    /// Move to `next`.
    ///
    /// Illegal transitions are ignored and logged; the pipeline only ever
    /// requests legal ones.
    pub fn advance(&mut self, next: Stage) {
        if self.current.can_advance_to(next) {
            tracing::debug!(from = %self.current, to = %next, "stage transition");
            self.current = next;
        } else {
            tracing::warn!(from = %self.current, to = %next, "ignored illegal stage transition");
        }
    }

    /// Move to `Failed` from whatever working stage is current.
    pub fn fail(&mut self) {
        self.advance(Stage::Failed);
    }
}
