//! Query executor
//!
//! Execution flow:
//! 1. Check the space and cancellation
//! 2. Compile filters and sorts with the configured defaults
//! 3. Push supported top-level predicates down to the store
//! 4. Evaluate residual predicates and full text in memory
//! 5. Sort once, splice synthetic date records ahead of stored results
//! 6. Count, then paginate

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::error::{QueryError, QueryResult};
use crate::filter::{Compiler, Condition, DefaultFilters, FilterNode, FilterRequest, Filters};
use crate::model::{DateObject, Record, Value};
use crate::observability::{log_event_with_fields, Event, ObservationScope, QueryMetrics};
use crate::order::{sort_records, CaseFoldCollator, Collator, ScratchPool};
use crate::query::Query;
use crate::store::{ObjectStore, StoreError};

use super::batch::{dedup_ids, IdBatches, ID_BATCH_SIZE};
use super::cancel::CancellationToken;
use super::result::ExecutionResult;
use super::suggest::{date_record, suggest_date_ids, DateParser, SimpleDateParser};

/// Executes queries against one store
pub struct QueryExecutor<'a, S: ObjectStore + ?Sized> {
    store: &'a S,
    config: EngineConfig,
    defaults: DefaultFilters,
    scratch: ScratchPool,
    metrics: Arc<QueryMetrics>,
    collator: Box<dyn Collator>,
    date_parser: Box<dyn DateParser>,
    today: Option<NaiveDate>,
}

impl<'a, S: ObjectStore + ?Sized> QueryExecutor<'a, S> {
    /// Creates an executor with the default configuration
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            config: EngineConfig::default(),
            defaults: DefaultFilters::standard(),
            scratch: ScratchPool::new(),
            metrics: Arc::new(QueryMetrics::new()),
            collator: Box::new(CaseFoldCollator),
            date_parser: Box::new(SimpleDateParser),
            today: None,
        }
    }

    /// Applies a configuration, including its default predicates
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.defaults = config.defaults();
        self.config = config;
        self
    }

    pub fn with_defaults(mut self, defaults: DefaultFilters) -> Self {
        self.defaults = defaults;
        self
    }

    /// Shares a metrics registry with other executors
    pub fn with_metrics(mut self, metrics: Arc<QueryMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn with_collator(mut self, collator: Box<dyn Collator>) -> Self {
        self.collator = collator;
        self
    }

    pub fn with_date_parser(mut self, parser: Box<dyn DateParser>) -> Self {
        self.date_parser = parser;
        self
    }

    /// Pins the day relative date words resolve against
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn metrics(&self) -> &QueryMetrics {
        &self.metrics
    }

    pub fn scratch_pool(&self) -> &ScratchPool {
        &self.scratch
    }

    /// Compiles a query without running it
    pub fn explain(&self, query: &Query) -> QueryResult<Filters> {
        self.check_space(query)?;
        Compiler::new(self.store).compile(query, &self.defaults)
    }

    /// Executes a query.
    ///
    /// Deterministic: the same query over the same store yields the same
    /// records in the same order.
    pub fn execute(
        &self,
        query: &Query,
        cancel: &CancellationToken,
    ) -> QueryResult<ExecutionResult> {
        let request_id = Uuid::new_v4().to_string();
        let space_id = self.space_of(query);
        let scope = ObservationScope::with_fields(
            "QUERY",
            &[("request_id", request_id.as_str()), ("space_id", space_id)],
        );

        match self.run_query(query, cancel) {
            Ok(result) => {
                self.record_success(&result);
                let total = result.total.to_string();
                let returned = result.len().to_string();
                scope.complete_with_fields(&[
                    ("total", total.as_str()),
                    ("returned", returned.as_str()),
                ]);
                Ok(result)
            }
            Err(err) => {
                self.record_failure(&err);
                scope.fail(err.code(), &err.to_string());
                Err(err)
            }
        }
    }

    /// Executes a query restricted to records whose `relation_key` holds one
    /// of `ids`.
    ///
    /// Identifiers are deduplicated and fetched in batches no larger than the
    /// store's parameter limit. Cancellation is checked at every batch
    /// boundary.
    pub fn execute_by_relation(
        &self,
        query: &Query,
        relation_key: &str,
        ids: &[String],
        cancel: &CancellationToken,
    ) -> QueryResult<ExecutionResult> {
        let request_id = Uuid::new_v4().to_string();
        let id_count = ids.len().to_string();
        let scope = ObservationScope::with_fields(
            "RELATION_LOOKUP",
            &[
                ("request_id", request_id.as_str()),
                ("relation_key", relation_key),
                ("ids", id_count.as_str()),
            ],
        );

        match self.run_lookup(query, relation_key, ids, cancel) {
            Ok(result) => {
                self.record_success(&result);
                let total = result.total.to_string();
                scope.complete_with_fields(&[("total", total.as_str())]);
                Ok(result)
            }
            Err(err) => {
                self.record_failure(&err);
                scope.fail(err.code(), &err.to_string());
                Err(err)
            }
        }
    }

    fn run_query(&self, query: &Query, cancel: &CancellationToken) -> QueryResult<ExecutionResult> {
        self.check_space(query)?;
        cancel.check("compile")?;

        let filters = Compiler::new(self.store).compile(query, &self.defaults)?;
        self.metrics
            .add_unresolved_leaves(filters.unresolved_count() as u64);

        cancel.check("fetch")?;
        let (stored, scanned) = self.fetch(filters.root().children())?;

        let mut records: Vec<Record> = stored
            .into_iter()
            .filter(|r| self.matches_full_text(r, &query.full_text))
            .collect();
        self.sort(&mut records, &filters);

        let synthetic = self.splice_date_suggestions(query, &filters, &mut records);
        Ok(self.paginate(records, query, scanned, synthetic))
    }

    fn run_lookup(
        &self,
        query: &Query,
        relation_key: &str,
        ids: &[String],
        cancel: &CancellationToken,
    ) -> QueryResult<ExecutionResult> {
        self.check_space(query)?;
        cancel.check("compile")?;

        let mut compiler = Compiler::new(self.store);
        let filters = compiler.compile(query, &self.defaults)?;
        self.metrics
            .add_unresolved_leaves(filters.unresolved_count() as u64);

        let ids = dedup_ids(ids);
        let batch_size = ID_BATCH_SIZE.min(self.store.max_query_params()).max(1);
        let batches = IdBatches::new(&ids, batch_size);
        let batch_count = batches.batch_count();

        let mut seen: HashSet<String> = HashSet::with_capacity(ids.len());
        let mut records = Vec::with_capacity(ids.len());
        let mut scanned = 0;

        for (i, batch) in batches.enumerate() {
            cancel.check(&format!("batch {} of {}", i + 1, batch_count))?;

            let lookup = compiler.compile_request(&FilterRequest::leaf(
                relation_key,
                Condition::In,
                Value::strings(batch),
            ))?;
            let nodes = filters.root().children().iter().chain(Some(&lookup));
            let (fetched, batch_scanned) = self.fetch(nodes)?;
            scanned += batch_scanned;

            let fetched_count = fetched.len();
            for record in fetched {
                if seen.insert(record.id().to_string()) {
                    records.push(record);
                }
            }

            self.metrics.increment_batches_fetched();
            let index = (i + 1).to_string();
            let size = batch.len().to_string();
            let returned = fetched_count.to_string();
            log_event_with_fields(
                Event::BatchFetched,
                &[
                    ("relation_key", relation_key),
                    ("batch", index.as_str()),
                    ("size", size.as_str()),
                    ("returned", returned.as_str()),
                ],
            );
        }
        cancel.check("merge")?;

        records.retain(|r| self.matches_full_text(r, &query.full_text));
        self.sort(&mut records, &filters);
        Ok(self.paginate(records, query, scanned, 0))
    }

    fn space_of<'q>(&'q self, query: &'q Query) -> &'q str {
        if query.space_id.is_empty() {
            self.store.space_id()
        } else {
            &query.space_id
        }
    }

    fn check_space(&self, query: &Query) -> QueryResult<()> {
        let store_space = self.store.space_id();
        if !query.space_id.is_empty() && query.space_id != store_space {
            return Err(StoreError::SpaceMismatch {
                store: store_space.to_string(),
                requested: query.space_id.clone(),
            }
            .into());
        }
        Ok(())
    }

    /// Runs the supported predicates in the store and the rest in memory.
    ///
    /// Returns the matches and the number of records the store produced.
    fn fetch<'n>(
        &self,
        nodes: impl IntoIterator<Item = &'n FilterNode>,
    ) -> QueryResult<(Vec<Record>, usize)> {
        let (pushdown, residual): (Vec<&FilterNode>, Vec<&FilterNode>) = nodes
            .into_iter()
            .partition(|node| self.store.supports(node));

        let pushdown = FilterNode::And(pushdown.into_iter().cloned().collect());
        let stored = self.store.query_raw(&pushdown, 0, 0)?;
        let scanned = stored.len();

        let matched = stored
            .into_iter()
            .filter(|record| residual.iter().all(|node| node.matches(record)))
            .collect();
        Ok((matched, scanned))
    }

    /// Case-insensitive substring match over the configured text relations
    fn matches_full_text(&self, record: &Record, full_text: &str) -> bool {
        let needle = full_text.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.config.full_text_keys.iter().any(|key| {
            record.get(key).map_or(false, |value| {
                value
                    .elements()
                    .filter_map(|e| e.as_str())
                    .any(|text| text.to_lowercase().contains(&needle))
            })
        })
    }

    fn sort(&self, records: &mut [Record], filters: &Filters) {
        let mut scratch = self.scratch.acquire();
        sort_records(
            records,
            filters.order(),
            filters.options(),
            self.collator.as_ref(),
            &mut scratch,
        );
    }

    /// Prepends suggested date records that pass the filters and are not
    /// already stored. Returns how many were added.
    fn splice_date_suggestions(
        &self,
        query: &Query,
        filters: &Filters,
        records: &mut Vec<Record>,
    ) -> usize {
        if !self.config.date_suggestions {
            return 0;
        }
        let today = self.today.unwrap_or_else(|| Utc::now().date_naive());
        let space_id = self.store.space_id();

        let mut added = 0;
        for id in suggest_date_ids(query, self.date_parser.as_ref(), today) {
            if records.iter().any(|r| r.id() == id) {
                continue;
            }
            let Some(object) = DateObject::from_id(&id) else {
                continue;
            };
            let record = date_record(&object, space_id);
            if filters.matches(&record) {
                log_event_with_fields(Event::SyntheticRecordAdded, &[("id", id.as_str())]);
                records.insert(0, record);
                added += 1;
            }
        }
        added
    }

    fn paginate(
        &self,
        records: Vec<Record>,
        query: &Query,
        scanned: usize,
        synthetic: usize,
    ) -> ExecutionResult {
        let total = records.len();
        let limit = self.config.effective_limit(query.limit);
        let remaining = total.saturating_sub(query.offset);
        let take = if limit == 0 { remaining } else { limit.min(remaining) };

        ExecutionResult {
            records: records.into_iter().skip(query.offset).take(take).collect(),
            total,
            scanned_count: scanned,
            synthetic_count: synthetic,
            limit_applied: take < remaining,
        }
    }

    fn record_success(&self, result: &ExecutionResult) {
        self.metrics.increment_queries_executed();
        self.metrics.add_records_scanned(result.scanned_count as u64);
        self.metrics.add_records_returned(result.len() as u64);
        self.metrics
            .add_synthetic_records(result.synthetic_count as u64);
    }

    fn record_failure(&self, err: &QueryError) {
        if err.is_cancelled() {
            self.metrics.increment_queries_cancelled();
            let reason = err.to_string();
            log_event_with_fields(Event::QueryCancelled, &[("reason", reason.as_str())]);
        } else {
            self.metrics.increment_queries_rejected();
        }
    }
}
