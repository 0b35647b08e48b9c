//! Sub-agent registry.

use crate::schema::HandlerSchema;
use crate::sub_agent::SubAgent;
use carelink_common::{Arguments, CarelinkError, ExecutionReport, Result};
use tracing::{debug, info};

/// Static description of one registered sub-agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandlerDescriptor {
    sub_agent: SubAgent,
}

impl HandlerDescriptor {
    pub fn sub_agent(&self) -> SubAgent {
        self.sub_agent
    }

    pub fn name(&self) -> &'static str {
        self.sub_agent.name()
    }

    pub fn schema(&self) -> &'static HandlerSchema {
        self.sub_agent.schema()
    }

    /// Execute the handler. Pure apart from logging; never fails outside the report.
    pub fn execute(&self, args: &Arguments) -> ExecutionReport {
        debug!(sub_agent = %self.sub_agent, args = ?args, "Executing sub-agent");
        let report = self.sub_agent.execute(args);
        info!(
            sub_agent = %self.sub_agent,
            outcome = ?report.outcome,
            "Sub-agent finished"
        );
        report
    }
}

/// Fixed set of handlers, built once at startup.
#[derive(Debug, Clone)]
pub struct SubAgentRegistry {
    handlers: Vec<HandlerDescriptor>,
}

impl Default for SubAgentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SubAgentRegistry {
    /// Registry holding every sub-agent, in declaration order.
    pub fn new() -> Self {
        Self {
            handlers: SubAgent::ALL
                .into_iter()
                .map(|sub_agent| HandlerDescriptor { sub_agent })
                .collect(),
        }
    }

    /// Look up a handler by its exact registry name.
    pub fn resolve(&self, name: &str) -> Result<&HandlerDescriptor> {
        self.handlers
            .iter()
            .find(|h| h.name() == name)
            .ok_or_else(|| CarelinkError::UnknownSubAgent(name.to_string()))
    }

    pub fn schemas(&self) -> Vec<&'static HandlerSchema> {
        self.handlers.iter().map(HandlerDescriptor::schema).collect()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.handlers.iter().map(HandlerDescriptor::name).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HandlerDescriptor> {
        self.handlers.iter()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
