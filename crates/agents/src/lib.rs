//! Hospital desk sub-agents.
//!
//! Each sub-agent owns one narrow business domain and is a pure, synchronous
//! function over its declared arguments:
//!
//! - **PatientManagement**: registration, contact updates, demographics
//! - **AppointmentScheduler**: booking, rescheduling, cancellation
//! - **MedicalRecords**: history, lab results, diagnoses
//! - **BillingAndInsurance**: invoices, payments, insurance claims
//!
//! ```text
//!                 ┌──────────────────────┐
//!  name, args ──► │   SubAgentRegistry   │
//!                 └──────────┬───────────┘
//!          ┌─────────────┬───┴─────────┬──────────────┐
//!          ▼             ▼             ▼              ▼
//!   [Registration] [Scheduling]   [Records]      [Billing]
//!          │             │             │              │
//!          └─────────────┴──────┬──────┴──────────────┘
//!                               ▼
//!                        ExecutionReport
//! ```
//!
//! Handlers re-check the patient identifier format themselves; whatever the
//! resolver claims to have validated is not trusted.

pub mod billing;
pub mod identifier;
pub mod records;
pub mod registration;
pub mod registry;
pub mod scheduling;
pub mod schema;
pub mod sub_agent;

pub use identifier::{validate_patient_id, PATIENT_ID_FORMAT, PATIENT_ID_PREFIX};
pub use registration::AUTO_ASSIGNED;
pub use registry::{HandlerDescriptor, SubAgentRegistry};
pub use schema::{HandlerSchema, ParameterSpec};
pub use sub_agent::SubAgent;
