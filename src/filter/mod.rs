//! Filter compiler
//!
//! Turns client [`FilterRequest`] trees into compiled [`Filters`]:
//! - Default predicates are injected first and reconciled with user leaves
//! - Top-level ANDs are flattened, ORs stay nested
//! - Leaves are type-checked and normalized against their relation format
//! - Status/tag leaves resolve option ids through the option resolver

mod compiler;
mod defaults;
mod errors;
mod filters;
mod node;
mod request;

pub use compiler::{compile, Compiler};
pub use defaults::DefaultFilters;
pub use errors::{CompileError, CompileErrorCode, CompileResult};
pub use filters::Filters;
pub use node::{FilterLeaf, FilterNode};
pub use request::{Condition, FilterOperator, FilterRequest};
