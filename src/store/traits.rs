//! The storage collaborator seen by the query engine

use crate::filter::FilterNode;
use crate::model::{Record, RelationFormat};
use crate::options::RelationOption;

use super::errors::StoreResult;

/// Read access to one space's objects
pub trait ObjectStore {
    /// The space every query against this store is scoped to
    fn space_id(&self) -> &str;

    /// Returns records matching `filter`, in store order.
    ///
    /// `limit == 0` means no limit.
    fn query_raw(&self, filter: &FilterNode, limit: usize, offset: usize)
        -> StoreResult<Vec<Record>>;

    /// Format of a relation, `StoreError::UnknownRelation` when unknown
    fn relation_format_by_key(&self, key: &str) -> StoreResult<RelationFormat>;

    /// All options of a status or tag relation
    fn list_relation_options(&self, key: &str) -> StoreResult<Vec<RelationOption>>;

    /// Largest number of values a single query may carry
    fn max_query_params(&self) -> usize {
        usize::MAX
    }

    /// Whether `query_raw` can evaluate `node` natively
    fn supports(&self, _node: &FilterNode) -> bool {
        true
    }
}

impl<S: ObjectStore + ?Sized> ObjectStore for &S {
    fn space_id(&self) -> &str {
        (**self).space_id()
    }

    fn query_raw(
        &self,
        filter: &FilterNode,
        limit: usize,
        offset: usize,
    ) -> StoreResult<Vec<Record>> {
        (**self).query_raw(filter, limit, offset)
    }

    fn relation_format_by_key(&self, key: &str) -> StoreResult<RelationFormat> {
        (**self).relation_format_by_key(key)
    }

    fn list_relation_options(&self, key: &str) -> StoreResult<Vec<RelationOption>> {
        (**self).list_relation_options(key)
    }

    fn max_query_params(&self) -> usize {
        (**self).max_query_params()
    }

    fn supports(&self, node: &FilterNode) -> bool {
        (**self).supports(node)
    }
}
