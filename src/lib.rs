//! objquery - filter, sort and look up objects in relation-keyed stores
//!
//! Client queries arrive as filter and sort requests. They are compiled
//! against store metadata into an immutable [`Filters`] tree and a
//! [`SetOrder`], reconciled with default predicates, and executed by
//! [`QueryExecutor`] with store pushdown and in-memory evaluation.

pub mod cli;
pub mod config;
pub mod error;
pub mod executor;
pub mod filter;
pub mod model;
pub mod observability;
pub mod options;
pub mod order;
pub mod query;
pub mod store;
pub mod text;

pub use config::EngineConfig;
pub use error::{QueryError, QueryResult};
pub use executor::{CancellationToken, ExecutionResult, QueryExecutor};
pub use filter::{compile, Condition, DefaultFilters, FilterOperator, FilterRequest, Filters};
pub use model::{Record, RelationFormat, Value};
pub use order::{SetOrder, SortDirection, SortRequest};
pub use query::Query;
pub use store::{MemoryStore, ObjectStore, StoreError};
