//! Relation option resolver
//!
//! Status and tag relations store option ids. The resolver maps those ids
//! to their option records for filter evaluation, sorting and display.

mod resolver;
mod table;

pub use resolver::{OptionResolver, ResolutionError};
pub use table::{OptionTable, RelationOption};
