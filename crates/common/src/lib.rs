//! Common types shared across the Carelink crates.
//!
//! Everything the coordinator writes into a conversation, and everything a
//! sub-agent hands back, is defined here so that the agent crate and the
//! coordinator crate agree on one vocabulary.

pub mod entry;
pub mod error;
pub mod report;
pub mod status;

pub use entry::{Arguments, ConversationEntry, EntryBody, Speaker};
pub use error::{CarelinkError, Result};
pub use report::{ExecutionReport, Outcome};
pub use status::{TurnPhase, TurnStatus};
