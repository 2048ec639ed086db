//! Caller-driven cancellation

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{QueryError, QueryResult};

/// Shared cancellation flag with an optional deadline.
///
/// Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Requests cancellation for every holder of this token
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst) || self.deadline_passed()
    }

    fn deadline_passed(&self) -> bool {
        self.deadline.map_or(false, |d| Instant::now() >= d)
    }

    /// Fails with `QueryError::Cancelled` once cancelled or past the deadline
    pub fn check(&self, stage: &str) -> QueryResult<()> {
        if self.cancelled.load(Ordering::SeqCst) {
            return Err(QueryError::Cancelled(format!("cancelled by caller at {}", stage)));
        }
        if self.deadline_passed() {
            return Err(QueryError::Cancelled(format!("deadline exceeded at {}", stage)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_token_passes() {
        assert!(CancellationToken::new().check("compile").is_ok());
    }

    #[test]
    fn test_clones_share_flag() {
        let token = CancellationToken::new();
        let caller = token.clone();
        caller.cancel();

        assert!(token.is_cancelled());
        let err = token.check("batch 3").unwrap_err();
        assert!(err.is_cancelled());
        assert!(err.to_string().contains("batch 3"));
    }

    #[test]
    fn test_deadline_in_the_past() {
        let token = CancellationToken::new().with_deadline(Instant::now());
        let err = token.check("compile").unwrap_err();
        assert!(err.to_string().contains("deadline exceeded"));
    }

    #[test]
    fn test_distant_deadline_passes() {
        let token = CancellationToken::new().with_timeout(Duration::from_secs(3600));
        assert!(!token.is_cancelled());
    }
}
