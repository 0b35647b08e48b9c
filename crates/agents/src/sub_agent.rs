//! The closed set of sub-agents.

use crate::schema::HandlerSchema;
use crate::{billing, records, registration, scheduling};
use carelink_common::{Arguments, CarelinkError, ExecutionReport};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Every sub-agent the coordinator can delegate to.
///
/// Adding a variant forces every `match` below to be extended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubAgent {
    PatientManagement,
    AppointmentScheduler,
    MedicalRecords,
    BillingAndInsurance,
}

impl SubAgent {
    pub const ALL: [SubAgent; 4] = [
        SubAgent::PatientManagement,
        SubAgent::AppointmentScheduler,
        SubAgent::MedicalRecords,
        SubAgent::BillingAndInsurance,
    ];

    pub fn schema(self) -> &'static HandlerSchema {
        match self {
            SubAgent::PatientManagement => &registration::SCHEMA,
            SubAgent::AppointmentScheduler => &scheduling::SCHEMA,
            SubAgent::MedicalRecords => &records::SCHEMA,
            SubAgent::BillingAndInsurance => &billing::SCHEMA,
        }
    }

    /// Registry key; identical to the name the resolver is told about.
    pub fn name(self) -> &'static str {
        self.schema().name
    }

    /// Run the sub-agent's validation and mock business logic.
    pub fn execute(self, args: &Arguments) -> ExecutionReport {
        match self {
            SubAgent::PatientManagement => registration::execute(args),
            SubAgent::AppointmentScheduler => scheduling::execute(args),
            SubAgent::MedicalRecords => records::execute(args),
            SubAgent::BillingAndInsurance => billing::execute(args),
        }
    }
}

impl fmt::Display for SubAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SubAgent {
    type Err = CarelinkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SubAgent::ALL
            .into_iter()
            .find(|agent| agent.name() == s)
            .ok_or_else(|| CarelinkError::UnknownSubAgent(s.to_string()))
    }
}
