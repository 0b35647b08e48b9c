//! Turn status exposed to presentation.

use serde::{Deserialize, Serialize};

/// Where the coordinator is in a turn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnPhase {
    #[default]
    Idle,
    AwaitingResolution,
    Clarifying,
    Delegating,
}

/// "Is the system thinking, and who is working" snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnStatus {
    pub in_progress: bool,

    /// Set only while a delegated execution is pending
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_handler: Option<String>,

    /// Short progress description
    #[serde(default)]
    pub note: String,

    #[serde(default)]
    pub phase: TurnPhase,
}

impl TurnStatus {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn is_idle(&self) -> bool {
        !self.in_progress && self.active_handler.is_none()
    }
}
