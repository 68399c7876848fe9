pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod engine;
pub mod error;

pub use config::Config;
pub use db::{init_db, seed_fixtures, Repository};
pub use domain::{Decimal, Graph, Month};
pub use engine::{FinanceSummary, GraphBuilder, GraphOp};
pub use error::AppError;
