//! Batch accumulation for the record stream.

use std::num::NonZeroUsize;

use drift_common::Record;

/// Collects decoded records into an ordered buffer up to a fixed capacity.
///
/// Records are never dropped: every accepted record appears in exactly one
/// drained batch, in arrival order.
#[derive(Debug)]
pub struct BatchAccumulator {
    records: Vec<Record>,
    capacity: NonZeroUsize,
}

impl BatchAccumulator {
    /// Create an accumulator with the given batch capacity.
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            records: Vec::with_capacity(capacity.get()),
            capacity,
        }
    }

    /// Append a record. Returns `true` when the buffer has reached capacity
    /// and must be drained before the next push.
    pub fn push(&mut self, record: Record) -> bool {
        self.records.push(record);
        self.records.len() >= self.capacity.get()
    }

    /// Remove and return all buffered records, resetting the buffer.
    ///
    /// Used both at capacity and for the final (possibly undersized) batch
    /// at end of stream.
    pub fn drain(&mut self) -> Vec<Record> {
        std::mem::replace(&mut self.records, Vec::with_capacity(self.capacity.get()))
    }

    /// Whether a final drain is needed.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of buffered records.
    pub fn len(&self) -> usize {
        self.records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drift_common::decode_record;

    fn record(txid: &str) -> Record {
        let line = format!(
            r#"{{"txid":"{txid}","timestamp":"2026-08-05T00:00:00","credit_product":"Personal Loan","loan_amount":100.0,"interest_rate":5.0,"tenor_months":12,"payment_status":"On Time","days_past_due":0,"monthly_transactions":1,"avg_transaction_amount":10.0,"common_category":"Other","customer":{{}}}}"#
        );
        decode_record(&line).unwrap()
    }

    fn capacity(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn test_ready_exactly_at_capacity() {
        let mut acc = BatchAccumulator::new(capacity(3));

        assert!(!acc.push(record("a")));
        assert!(!acc.push(record("b")));
        assert!(acc.push(record("c")));
        assert_eq!(acc.len(), 3);
    }

    #[test]
    fn test_drain_returns_in_order_and_resets() {
        let mut acc = BatchAccumulator::new(capacity(2));
        acc.push(record("a"));
        acc.push(record("b"));

        let batch = acc.drain();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].txid, "a");
        assert_eq!(batch[1].txid, "b");
        assert!(acc.is_empty());
    }

    #[test]
    fn test_full_and_trailing_batch_counts() {
        // 7 records at capacity 3: two full batches and a remainder of one.
        let mut acc = BatchAccumulator::new(capacity(3));
        let mut batches = Vec::new();

        for i in 0..7 {
            if acc.push(record(&format!("r{i}"))) {
                batches.push(acc.drain());
            }
        }
        if !acc.is_empty() {
            batches.push(acc.drain());
        }

        let sizes: Vec<usize> = batches.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![3, 3, 1]);

        // Every record in exactly one batch, original order.
        let all: Vec<&str> = batches
            .iter()
            .flatten()
            .map(|r| r.txid.as_str())
            .collect();
        assert_eq!(all, vec!["r0", "r1", "r2", "r3", "r4", "r5", "r6"]);
    }

    #[test]
    fn test_exact_multiple_leaves_nothing_buffered() {
        let mut acc = BatchAccumulator::new(capacity(2));
        assert!(!acc.push(record("a")));
        assert!(acc.push(record("b")));
        acc.drain();
        assert!(acc.is_empty());
    }
}
