//! Domain records for the agency back office.
//!
//! This module provides:
//! - Lossless money handling via the Decimal wrapper
//! - Primitives: Month, record ids, timestamps, string-backed status enums
//! - One record type plus a validated create payload per entity
//! - The workflow graph shape (nodes, edges, versions)

pub mod primitives;

pub mod automation;
pub mod client;
pub mod decimal;
pub mod invoice;
pub mod ledger;
pub mod proposal;
pub mod retainer;
pub mod validate;
pub mod workflow;

pub use automation::{Automation, Credential, NewAutomation, NewCredential, RedactedCredential};
pub use client::{Client, ClientStatus, NewClient};
pub use decimal::Decimal;
pub use invoice::{Invoice, InvoiceStatus, InvoiceTotals, LineItem, NewInvoice};
pub use ledger::{Expense, ImportError, Income, LedgerEntry, NewExpense, NewIncome};
pub use primitives::{Month, MonthParseError, ParseEnumError};
pub use proposal::{NewProposal, Proposal, ProposalStatus};
pub use retainer::{BillingCycle, NewRetainer, Retainer, RetainerStatus};
pub use validate::ValidationError;
pub use workflow::{
    Edge, Graph, NewWorkflow, Node, Position, Workflow, WorkflowStatus, WorkflowVersion,
};
