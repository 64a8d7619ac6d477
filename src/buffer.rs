// src/buffer.rs
use std::collections::VecDeque;

/// Bounded FIFO of the most recent samples.
#[derive(Clone, Debug)]
pub struct SampleBuffer {
    buffer: VecDeque<f64>,
    capacity: usize,
}

impl SampleBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a sample, dropping the oldest once the buffer is full.
    pub fn push(&mut self, value: f64) {
        if self.buffer.len() == self.capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back(value);
    }

    pub fn extend(&mut self, values: &[f64]) {
        for &value in values {
            self.push(value);
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.buffer.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Copy of the whole buffer, oldest first.
    pub fn snapshot(&self) -> Vec<f64> {
        self.buffer.iter().copied().collect()
    }

    /// Copy of the newest `n` samples, oldest first.
    pub fn latest(&self, n: usize) -> Vec<f64> {
        let skip = self.buffer.len().saturating_sub(n);
        self.buffer.iter().skip(skip).copied().collect()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_exceeds_capacity_and_keeps_newest() {
        let mut buffer = SampleBuffer::new(1000);
        for i in 0..2500 {
            buffer.push(i as f64);
            assert!(buffer.len() <= 1000);
        }
        assert!(buffer.is_full());
        let expected: Vec<f64> = (1500..2500).map(|i| i as f64).collect();
        assert_eq!(buffer.snapshot(), expected);
    }

    #[test]
    fn latest_returns_tail_in_order() {
        let mut buffer = SampleBuffer::new(8);
        buffer.extend(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(buffer.latest(3), vec![3.0, 4.0, 5.0]);
        assert_eq!(buffer.latest(10), vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        buffer.clear();
        assert!(buffer.is_empty());
    }
}
