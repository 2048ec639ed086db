//! Sort/order extraction and record comparison
//!
//! Sort requests become a [`SetOrder`] of comparison keys. Records are
//! sorted once, after every candidate has been collected.

mod collation;
mod compare;
mod extractor;
mod scratch;
mod sort;

pub use collation::{CaseFoldCollator, CollationBuffer, Collator};
pub use compare::sort_records;
pub use extractor::{extract_order, CustomOrder, KeyOrder, Order, SetOrder};
pub use scratch::{PooledScratch, ScratchPool};
pub use sort::{EmptyPlacement, SortDirection, SortRequest};
