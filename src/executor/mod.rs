//! Query execution
//!
//! The executor turns a [`Query`](crate::query::Query) into records:
//!
//! 1. Compile filters and sorts (defaults reconciled with user predicates)
//! 2. Push supported predicates down to the store, evaluate the rest in memory
//! 3. Apply full text, sort once, splice synthetic date records
//! 4. Count, then paginate
//!
//! Identifier lookups page their ids in batches bounded by the store's
//! parameter limit and merge the batches before sorting.
//!
//! # Guarantees
//!
//! - Same query, same store contents: same records in the same order
//! - Cancellation is observed before compilation and at every batch boundary
//! - Scratch buffers return to the pool on every exit path

mod batch;
mod cancel;
mod executor;
mod result;
mod suggest;

pub use batch::{dedup_ids, IdBatches, ID_BATCH_SIZE};
pub use cancel::CancellationToken;
pub use executor::QueryExecutor;
pub use result::ExecutionResult;
pub use suggest::{date_record, suggest_date_ids, DateParser, SimpleDateParser};
