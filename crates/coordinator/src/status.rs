//! Turn status signal.
//!
//! A `tokio::sync::watch` channel holding the current [`TurnStatus`], so
//! front ends can either poll [`StatusSignal::current`] or await changes on
//! a receiver. The same channel doubles as the single-turn lock: claiming a
//! turn is a compare-and-set on `in_progress`.

use carelink_common::{TurnPhase, TurnStatus};
use tokio::sync::watch;

pub const NOTE_ANALYZING: &str = "Coordinator is analyzing the request";
pub const NOTE_CLARIFYING: &str = "Coordinator is preparing a question";

#[derive(Debug)]
pub struct StatusSignal {
    tx: watch::Sender<TurnStatus>,
}

impl Default for StatusSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusSignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(TurnStatus::idle());
        Self { tx }
    }

    /// Atomically move from idle to awaiting resolution. Returns false if a
    /// turn is already in flight.
    pub(crate) fn try_claim(&self) -> bool {
        self.tx.send_if_modified(|status| {
            if status.in_progress {
                return false;
            }
            *status = TurnStatus {
                in_progress: true,
                active_handler: None,
                note: NOTE_ANALYZING.to_string(),
                phase: TurnPhase::AwaitingResolution,
            };
            true
        })
    }

    /// Publish a new status. `in_progress` follows from the phase.
    pub(crate) fn set(
        &self,
        phase: TurnPhase,
        active_handler: Option<String>,
        note: impl Into<String>,
    ) {
        self.tx.send_replace(TurnStatus {
            in_progress: phase != TurnPhase::Idle,
            active_handler,
            note: note.into(),
            phase,
        });
    }

    pub(crate) fn clarifying(&self) {
        self.set(TurnPhase::Clarifying, None, NOTE_CLARIFYING);
    }

    pub(crate) fn delegating(&self, sub_agent: &str) {
        self.set(
            TurnPhase::Delegating,
            Some(sub_agent.to_string()),
            format!("Delegating to {sub_agent}"),
        );
    }

    pub(crate) fn reset(&self) {
        self.tx.send_replace(TurnStatus::idle());
    }

    pub fn current(&self) -> TurnStatus {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<TurnStatus> {
        self.tx.subscribe()
    }

    pub fn phase(&self) -> TurnPhase {
        self.tx.borrow().phase
    }
}
