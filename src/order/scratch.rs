//! Pooled collation scratch buffers
//!
//! A query takes a buffer for the whole of its evaluation through a
//! [`PooledScratch`] guard. The guard resets the buffer and returns it to
//! the pool when dropped, whichever way the query exits.

use std::mem;
use std::ops::{Deref, DerefMut};
use std::sync::Mutex;

use super::collation::CollationBuffer;

#[derive(Debug, Default)]
pub struct ScratchPool {
    free: Mutex<Vec<CollationBuffer>>,
}

impl ScratchPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes a free buffer, allocating one if the pool is empty
    pub fn acquire(&self) -> PooledScratch<'_> {
        let buffer = self
            .free
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop()
            .unwrap_or_default();
        PooledScratch { pool: self, buffer }
    }

    /// Number of buffers waiting in the pool
    pub fn available(&self) -> usize {
        self.free
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    fn release(&self, mut buffer: CollationBuffer) {
        buffer.clear();
        self.free
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(buffer);
    }
}

/// Exclusive handle on one pooled buffer
#[derive(Debug)]
pub struct PooledScratch<'a> {
    pool: &'a ScratchPool,
    buffer: CollationBuffer,
}

impl Deref for PooledScratch<'_> {
    type Target = CollationBuffer;

    fn deref(&self) -> &CollationBuffer {
        &self.buffer
    }
}

impl DerefMut for PooledScratch<'_> {
    fn deref_mut(&mut self) -> &mut CollationBuffer {
        &mut self.buffer
    }
}

impl Drop for PooledScratch<'_> {
    fn drop(&mut self) {
        self.pool.release(mem::take(&mut self.buffer));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_returns_to_pool_cleared() {
        let pool = ScratchPool::new();
        {
            let mut scratch = pool.acquire();
            scratch.left.push_str("dirty");
            assert_eq!(pool.available(), 0);
        }
        assert_eq!(pool.available(), 1);

        let scratch = pool.acquire();
        assert!(scratch.is_clear());
    }

    #[test]
    fn test_buffer_released_on_error_path() {
        fn failing(pool: &ScratchPool) -> Result<(), String> {
            let mut scratch = pool.acquire();
            scratch.right.push_str("partial");
            Err("store failed".into())
        }

        let pool = ScratchPool::new();
        assert!(failing(&pool).is_err());
        assert_eq!(pool.available(), 1);
    }

    #[test]
    fn test_concurrent_holders_get_distinct_buffers() {
        let pool = ScratchPool::new();
        let a = pool.acquire();
        let b = pool.acquire();
        drop(a);
        drop(b);
        assert_eq!(pool.available(), 2);
    }
}
