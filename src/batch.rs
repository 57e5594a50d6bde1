//! C10 — Batch processor.
//!
//! A memory-bounded staging FIFO in front of some downstream handler —
//! e.g. batching ballots before a bulletin-board publish, or before
//! persisting receipts. Neither the queue nor the
//! handler are specific to any one poll; callers parameterize
//! [`BatchProcessor`] over whatever `{voter, vote}`-shaped item they're
//! staging.

/// One pending item: a voter id paired with whatever payload the caller
/// is batching (e.g. an encrypted ballot).
#[derive(Debug, Clone)]
pub struct PendingVote<V> {
    /// The voter's id.
    pub voter_id: Vec<u8>,
    /// The batched payload.
    pub vote: V,
}

/// FIFO staging queue with a fixed flush threshold.
#[derive(Debug)]
pub struct BatchProcessor<V> {
    batch_size: usize,
    backlog: Vec<PendingVote<V>>,
}

impl<V> BatchProcessor<V> {
    /// Construct an empty processor that reports "ready to flush" once
    /// `batch_size` items have accumulated.
    #[must_use]
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
            backlog: Vec::new(),
        }
    }

    /// Number of items currently staged.
    #[must_use]
    pub fn len(&self) -> usize {
        self.backlog.len()
    }

    /// `true` iff no items are staged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.backlog.is_empty()
    }

    /// Stage one item. Returns `true` iff the backlog has reached
    /// `batch_size`, signaling the caller should call
    /// [`process_batch`](Self::process_batch).
    pub fn add_vote(&mut self, voter_id: Vec<u8>, vote: V) -> bool {
        self.backlog.push(PendingVote { voter_id, vote });
        tracing::debug!(backlog = self.backlog.len(), batch_size = self.batch_size, "vote staged");
        self.backlog.len() >= self.batch_size
    }

    /// Invoke `handler` exactly once on the current backlog if it is
    /// non-empty, clearing it only if `handler` succeeds. A no-op (and
    /// `Ok(())`) on an empty backlog.
    ///
    /// # Errors
    /// Propagates whatever error `handler` returns; the backlog is left
    /// untouched so a retry sees the same items.
    pub fn process_batch<E>(&mut self, handler: impl FnOnce(&[PendingVote<V>]) -> Result<(), E>) -> Result<(), E> {
        if self.backlog.is_empty() {
            return Ok(());
        }
        handler(&self.backlog)?;
        tracing::debug!(flushed = self.backlog.len(), "batch flushed");
        self.backlog.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_vote_signals_when_batch_size_is_reached() {
        let mut batch: BatchProcessor<u32> = BatchProcessor::new(2);
        assert!(!batch.add_vote(vec![1], 10));
        assert!(batch.add_vote(vec![2], 20));
        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn process_batch_clears_backlog_on_success() {
        let mut batch: BatchProcessor<u32> = BatchProcessor::new(3);
        batch.add_vote(vec![1], 10);
        batch.add_vote(vec![2], 20);

        let mut seen = Vec::new();
        batch
            .process_batch(|items| {
                seen.extend(items.iter().map(|p| p.vote));
                Ok::<_, std::convert::Infallible>(())
            })
            .unwrap();

        assert_eq!(seen, vec![10, 20]);
        assert!(batch.is_empty());
    }

    #[test]
    fn process_batch_keeps_backlog_on_handler_failure() {
        let mut batch: BatchProcessor<u32> = BatchProcessor::new(3);
        batch.add_vote(vec![1], 10);

        let err = batch.process_batch(|_| Err("handler failed")).unwrap_err();
        assert_eq!(err, "handler failed");
        assert_eq!(batch.len(), 1);
    }

    #[test]
    fn empty_backlog_is_a_no_op() {
        let mut batch: BatchProcessor<u32> = BatchProcessor::new(3);
        batch.process_batch(|_| Ok::<_, std::convert::Infallible>(())).unwrap();
        assert!(batch.is_empty());
    }
}
