//! Delegation coordinator for the Carelink hospital desk.
//!
//! The coordinator is the single entry point for a conversation:
//! 1. Receives free-form user input
//! 2. Asks an intent resolver for a clarification or exactly one delegation
//! 3. Runs the chosen sub-agent and records its report
//! 4. Keeps the conversation log and the turn status for presentation
//!
//! # Architecture
//!
//! ```text
//! submit_user_input(text)
//!      │
//!      ▼
//! ┌─────────────────┐   ResolutionRequest   ┌────────────────┐
//! │   Coordinator   │ ────────────────────► │ IntentResolver │  llm | keyword
//! │   (this crate)  │ ◄──────────────────── └────────────────┘
//! └────────┬────────┘  Clarification | Delegation
//!          │
//!          ├── Clarification ──► Coordinator entry
//!          │
//!          └── Delegation ──► SubAgentRegistry ──► Handler entry
//!
//!   ConversationLog (append-only)      StatusSignal (watch channel)
//! ```
//!
//! At most one turn is in flight per coordinator. Input submitted while a
//! turn is running is refused with `TurnInProgress` and leaves the log alone.

pub mod config;
pub mod controller;
pub mod keyword;
pub mod llm_resolver;
pub mod log;
pub mod resolver;
pub mod status;

pub use config::{CoordinatorConfig, ResolverConfig, ResolverKind};
pub use controller::{Coordinator, TurnKind, TurnOutcome, FAILURE_MESSAGE};
pub use keyword::KeywordResolver;
pub use llm_resolver::{parse_resolution, LlmIntentResolver};
pub use log::ConversationLog;
pub use resolver::{ContextLine, IntentResolver, Resolution, ResolutionRequest, SYSTEM_POLICY};
pub use carelink_common::TurnPhase;
pub use status::StatusSignal;
