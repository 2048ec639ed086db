//! Storage collaborator
//!
//! The engine reads objects through [`ObjectStore`]. [`MemoryStore`] is the
//! bundled implementation, loadable from a JSON snapshot.

mod errors;
mod memory;
mod traits;

pub use errors::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use traits::ObjectStore;
