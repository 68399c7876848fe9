//! Read-time computation: ledger roll-ups and the workflow graph builder.

pub mod aggregate;
pub mod graph_builder;

pub use aggregate::{CategoryTotal, FinanceSummary, MonthlyBucket};
pub use graph_builder::{BatchError, GraphBuilder, GraphError, GraphOp};
