//! Delegation controller.
//!
//! One turn: append the user's entry, ask the resolver, then either append
//! its clarification or run exactly one sub-agent and append its report.
//! Whatever happens, the turn ends with one terminal entry and an idle
//! status. The [`TurnGuard`] makes the second half hold on every exit path,
//! including resolver errors, panics, and a dropped future.

use crate::config::{CoordinatorConfig, ResolverKind};
use crate::keyword::KeywordResolver;
use crate::llm_resolver::LlmIntentResolver;
use crate::log::ConversationLog;
use crate::resolver::{ContextLine, IntentResolver, Resolution, ResolutionRequest};
use crate::status::StatusSignal;
use carelink_agents::{SubAgent, SubAgentRegistry};
use carelink_common::{
    Arguments, CarelinkError, ConversationEntry, ExecutionReport, Outcome, Result, TurnPhase,
    TurnStatus,
};
use carelink_llm::build_llm_client;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Shown when a turn could not be completed for reasons the user cannot fix.
pub const FAILURE_MESSAGE: &str =
    "Sorry, I could not process your request right now. Please try again in a moment.";

/// How a turn ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnKind {
    /// The resolver asked the user for more information.
    Clarified,
    /// One sub-agent ran; `outcome` is its report's outcome.
    Delegated { sub_agent: SubAgent, outcome: Outcome },
    /// The resolver named a sub-agent that is not registered.
    UnrecognizedSubAgent { requested: String },
    /// The resolver failed or answered with an unusable shape.
    Failed,
}

/// Result of one accepted turn.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub turn_id: String,
    pub kind: TurnKind,
    /// Entries appended during this turn, in order
    pub entries: Vec<ConversationEntry>,
}

/// The coordinator that owns one conversation.
pub struct Coordinator {
    config: CoordinatorConfig,
    registry: SubAgentRegistry,
    resolver: Arc<dyn IntentResolver>,
    log: RwLock<ConversationLog>,
    status: StatusSignal,
    turn_counter: AtomicU64,
}

impl Coordinator {
    /// Create a coordinator with an explicit resolver.
    pub fn new(config: CoordinatorConfig, resolver: Arc<dyn IntentResolver>) -> Self {
        info!(
            resolver = %resolver.name(),
            sub_agents = ?SubAgent::ALL.map(SubAgent::name),
            "Initializing Carelink coordinator"
        );

        let mut log = ConversationLog::new();
        if let Some(greeting) = config.greeting.as_deref().filter(|g| !g.trim().is_empty()) {
            log.append(ConversationEntry::coordinator(greeting));
        }

        Self {
            config,
            registry: SubAgentRegistry::new(),
            resolver,
            log: RwLock::new(log),
            status: StatusSignal::new(),
            turn_counter: AtomicU64::new(0),
        }
    }

    /// Create a coordinator, choosing the resolver from config.
    ///
    /// An LLM resolver is used when `resolver.kind = "llm"` and a client can
    /// be built. Otherwise keyword-based fallback routing is used.
    pub fn from_config(config: CoordinatorConfig) -> Self {
        let resolver = build_resolver(&config);
        Self::new(config, resolver)
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    pub fn registry(&self) -> &SubAgentRegistry {
        &self.registry
    }

    pub fn resolver_name(&self) -> &str {
        self.resolver.name()
    }

    /// Snapshot of the conversation so far.
    pub fn conversation(&self) -> Vec<ConversationEntry> {
        self.log.read().all()
    }

    pub fn conversation_len(&self) -> usize {
        self.log.read().len()
    }

    pub fn status(&self) -> TurnStatus {
        self.status.current()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<TurnStatus> {
        self.status.subscribe()
    }

    pub fn phase(&self) -> TurnPhase {
        self.status.phase()
    }

    pub fn is_idle(&self) -> bool {
        self.status.current().is_idle()
    }

    /// Run one turn for `text`.
    ///
    /// Returns `Err` only when the input is refused outright: it is blank,
    /// or another turn is still in flight. Neither case touches the log.
    /// Every other failure ends up as an entry in the log.
    pub async fn submit_user_input(&self, text: &str) -> Result<TurnOutcome> {
        if text.trim().is_empty() {
            return Err(CarelinkError::EmptyInput);
        }

        if !self.status.try_claim() {
            warn!("Rejecting input: a turn is already in progress");
            return Err(CarelinkError::TurnInProgress);
        }

        let turn_id = self.next_turn_id();
        let guard = TurnGuard::new(self, turn_id.clone());

        info!(
            turn_id = %turn_id,
            resolver = %self.resolver.name(),
            content_preview = %text.chars().take(50).collect::<String>(),
            "Turn started"
        );

        let context: Vec<ContextLine> = {
            let mut log = self.log.write();
            let context = log
                .recent(self.config.context_turns)
                .iter()
                .map(ContextLine::from)
                .collect();
            log.append(ConversationEntry::user(text));
            context
        };

        let request = ResolutionRequest::new(text, context, &self.registry);
        let resolution = match self.resolver.resolve(&request).await {
            Ok(resolution) => resolution,
            Err(e) => {
                error!(turn_id = %turn_id, error = %e, transport = e.is_transport(), "Resolver failed");
                return Ok(guard.finish(TurnKind::Failed, ConversationEntry::coordinator(FAILURE_MESSAGE)));
            }
        };

        match resolution {
            Resolution::Clarification(question) => {
                self.status.clarifying();
                let question = question.trim();
                if question.is_empty() {
                    warn!(turn_id = %turn_id, "Resolver returned an empty clarification");
                    return Ok(guard.finish(TurnKind::Failed, ConversationEntry::coordinator(FAILURE_MESSAGE)));
                }
                debug!(turn_id = %turn_id, "Asking the user for clarification");
                Ok(guard.finish(TurnKind::Clarified, ConversationEntry::coordinator(question)))
            }
            Resolution::Delegation { sub_agent, arguments } => {
                Ok(self.delegate(guard, &sub_agent, arguments).await)
            }
        }
    }

    async fn delegate(&self, guard: TurnGuard<'_>, name: &str, arguments: Arguments) -> TurnOutcome {
        self.status.delegating(name);

        let descriptor = match self.registry.resolve(name) {
            Ok(descriptor) => *descriptor,
            Err(e) => {
                warn!(turn_id = %guard.turn_id, error = %e, "Resolver named an unregistered sub-agent");
                let report = ExecutionReport::validation_failure(format!(
                    "[ERROR] Unrecognized sub-agent \"{name}\". No registered sub-agent can handle this request."
                ))
                .with_field("requested_sub_agent", name);
                return guard.finish(
                    TurnKind::UnrecognizedSubAgent { requested: name.to_string() },
                    ConversationEntry::unattributed_report(arguments, report),
                );
            }
        };

        info!(
            turn_id = %guard.turn_id,
            sub_agent = %descriptor.name(),
            argument_count = arguments.len(),
            "Delegating"
        );

        let delay = self.config.handler_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let report = descriptor.execute(&arguments);
        let kind = TurnKind::Delegated {
            sub_agent: descriptor.sub_agent(),
            outcome: report.outcome,
        };
        guard.finish(kind, ConversationEntry::handler(descriptor.name(), arguments, report))
    }

    fn next_turn_id(&self) -> String {
        let n = self.turn_counter.fetch_add(1, Ordering::SeqCst) + 1;
        format!("turn-{n}")
    }
}

fn build_resolver(config: &CoordinatorConfig) -> Arc<dyn IntentResolver> {
    match (config.resolver.kind, &config.resolver.llm) {
        (ResolverKind::Llm, Some(llm)) => match build_llm_client(llm) {
            Ok(client) => {
                info!(provider = %llm.provider, model = %llm.model, "LLM intent resolver initialized");
                return Arc::new(
                    LlmIntentResolver::from_config(client, llm)
                        .with_max_input_chars(config.max_input_chars),
                );
            }
            Err(e) => warn!(error = %e, "Failed to build LLM client, using keyword resolver"),
        },
        (ResolverKind::Llm, None) => {
            warn!("Resolver kind is llm but no [resolver.llm] section is set, using keyword resolver")
        }
        (ResolverKind::Keyword, _) => info!("Using keyword resolver"),
    }
    Arc::new(KeywordResolver::new())
}

/// Owns the "in progress" claim for one turn.
///
/// `finish` appends the terminal entry. If the guard is dropped without
/// finishing, a generic failure entry is appended instead. Either way the
/// status goes back to idle on drop.
struct TurnGuard<'a> {
    coordinator: &'a Coordinator,
    turn_id: String,
    first_index: usize,
    finished: bool,
}

impl<'a> TurnGuard<'a> {
    fn new(coordinator: &'a Coordinator, turn_id: String) -> Self {
        let first_index = coordinator.log.read().len();
        Self {
            coordinator,
            turn_id,
            first_index,
            finished: false,
        }
    }

    fn finish(mut self, kind: TurnKind, entry: ConversationEntry) -> TurnOutcome {
        let entries = {
            let mut log = self.coordinator.log.write();
            log.append(entry);
            log.since(self.first_index)
        };
        self.finished = true;

        info!(turn_id = %self.turn_id, kind = ?kind, "Turn finished");
        TurnOutcome {
            turn_id: std::mem::take(&mut self.turn_id),
            kind,
            entries,
        }
    }
}

impl Drop for TurnGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            error!(turn_id = %self.turn_id, "Turn aborted before completion");
            self.coordinator
                .log
                .write()
                .append(ConversationEntry::coordinator(FAILURE_MESSAGE));
        }
        self.coordinator.status.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct Fixed(Resolution);

    #[async_trait]
    impl IntentResolver for Fixed {
        async fn resolve(&self, _request: &ResolutionRequest) -> Result<Resolution> {
            Ok(self.0.clone())
        }
        fn name(&self) -> &str {
            "fixed"
        }
    }

    struct Panicking;

    #[async_trait]
    impl IntentResolver for Panicking {
        async fn resolve(&self, _request: &ResolutionRequest) -> Result<Resolution> {
            panic!("resolver bug");
        }
        fn name(&self) -> &str {
            "panicking"
        }
    }

    fn coordinator(resolver: impl IntentResolver + 'static) -> Coordinator {
        Coordinator::new(CoordinatorConfig::immediate(), Arc::new(resolver))
    }

    #[tokio::test]
    async fn greeting_is_seeded_outside_any_turn() {
        let config = CoordinatorConfig {
            handler_delay_ms: 0,
            ..CoordinatorConfig::default()
        };
        let coordinator = Coordinator::new(config, Arc::new(KeywordResolver::new()));
        let log = coordinator.conversation();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].text(), crate::config::DEFAULT_GREETING);
        assert!(coordinator.is_idle());
    }

    #[tokio::test]
    async fn turn_ids_are_sequential() {
        let c = coordinator(Fixed(Resolution::Clarification("Which patient?".into())));
        let first = c.submit_user_input("hi").await.unwrap();
        let second = c.submit_user_input("hi again").await.unwrap();
        assert_eq!(first.turn_id, "turn-1");
        assert_eq!(second.turn_id, "turn-2");
    }

    #[tokio::test]
    async fn empty_clarification_is_a_failure() {
        let c = coordinator(Fixed(Resolution::Clarification("   ".into())));
        let outcome = c.submit_user_input("hello").await.unwrap();
        assert_eq!(outcome.kind, TurnKind::Failed);
        assert_eq!(outcome.entries[1].text(), FAILURE_MESSAGE);
    }

    #[tokio::test]
    async fn panicking_resolver_still_leaves_a_terminal_entry_and_idle_status() {
        let c = Arc::new(coordinator(Panicking));
        let task = {
            let c = Arc::clone(&c);
            tokio::spawn(async move { c.submit_user_input("hello").await })
        };
        assert!(task.await.is_err());

        let log = c.conversation();
        assert_eq!(log.len(), 2);
        assert_eq!(log[1].text(), FAILURE_MESSAGE);
        assert!(c.is_idle());
        assert_eq!(c.phase(), TurnPhase::Idle);
    }

    #[tokio::test]
    async fn dropped_turn_future_resets_status() {
        let c = Coordinator::new(
            CoordinatorConfig {
                handler_delay_ms: 60_000,
                greeting: None,
                ..CoordinatorConfig::default()
            },
            Arc::new(KeywordResolver::new()),
        );

        let turn = c.submit_user_input("book an appointment for P12345 tomorrow");
        let timed_out = tokio::time::timeout(std::time::Duration::from_millis(20), turn).await;
        assert!(timed_out.is_err());

        assert!(c.is_idle());
        let log = c.conversation();
        assert_eq!(log.len(), 2);
        assert_eq!(log[1].text(), FAILURE_MESSAGE);
    }
}
