//! Process lifecycle state machine.
//!
//! # State Transitions
//! ```text
//! Idle → Running: start invoked
//! Running → ShuttingDown: stop requested
//! Running → Stopped: listener exited on its own
//! ShuttingDown → Stopped: shutdown returned (or missed its deadline)
//! ```
//!
//! There is no way back to `Running`; an orchestrator runs once.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecycleState {
    #[default]
    Idle,
    Running,
    ShuttingDown,
    Stopped,
}

impl LifecycleState {
    pub fn can_transition_to(self, next: LifecycleState) -> bool {
        use LifecycleState::*;
        matches!(
            (self, next),
            (Idle, Running) | (Running, ShuttingDown) | (Running, Stopped) | (ShuttingDown, Stopped)
        )
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleState::Idle => "idle",
            LifecycleState::Running => "running",
            LifecycleState::ShuttingDown => "shutting_down",
            LifecycleState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}
