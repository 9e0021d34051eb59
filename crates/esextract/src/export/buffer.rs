//! Bounded in-memory accumulation of flattened rows.

use crate::flatten::FlatRow;

/// Collects rows between flushes.
///
/// The buffer itself never writes anywhere; the exporter drains it with
/// [`take`](RowBuffer::take) whenever [`is_full`](RowBuffer::is_full) reports
/// the threshold was reached, and once more at the end of the run.
#[derive(Debug)]
pub struct RowBuffer {
    rows: Vec<FlatRow>,
    threshold: usize,
}

impl RowBuffer {
    /// Creates a buffer that fills up at `threshold` rows (minimum 1).
    pub fn new(threshold: usize) -> Self {
        Self {
            rows: Vec::new(),
            threshold: threshold.max(1),
        }
    }

    /// Appends one row.
    pub fn push(&mut self, row: FlatRow) {
        self.rows.push(row);
    }

    /// Number of buffered rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when nothing is buffered.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// True once the buffer holds at least the threshold number of rows.
    pub fn is_full(&self) -> bool {
        self.rows.len() >= self.threshold
    }

    /// Drains all buffered rows, leaving the buffer empty.
    pub fn take(&mut self) -> Vec<FlatRow> {
        std::mem::take(&mut self.rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(n: i64) -> FlatRow {
        FlatRow {
            cells: vec![json!(n)],
        }
    }

    #[test]
    fn test_buffer_fills_at_threshold() {
        let mut buffer = RowBuffer::new(3);
        buffer.push(row(1));
        buffer.push(row(2));
        assert!(!buffer.is_full());
        buffer.push(row(3));
        assert!(buffer.is_full());
    }

    #[test]
    fn test_take_drains_the_buffer() {
        let mut buffer = RowBuffer::new(2);
        buffer.push(row(1));
        buffer.push(row(2));
        let drained = buffer.take();
        assert_eq!(drained.len(), 2);
        assert!(buffer.is_empty());
        assert!(!buffer.is_full());
    }

    #[test]
    fn test_threshold_floor_is_one() {
        let mut buffer = RowBuffer::new(0);
        buffer.push(row(1));
        assert!(buffer.is_full());
    }
}
