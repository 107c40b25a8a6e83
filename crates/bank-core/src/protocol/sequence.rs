//! Process-wide request sequence numbers (RSN).
//!
//! # What is a request sequence number? (for beginners)
//!
//! Every request the client builds is stamped with a number taken from a
//! single counter shared by the whole process.  The server uses it to
//! recognise a retransmitted request: under at-most-once semantics a request
//! whose number it has already answered is replied to from its cache instead
//! of being executed a second time.  For that to work the client must
//!
//! - never hand out the same number twice, and
//! - keep the number unchanged when it re-sends a request after a timeout.
//!
//! The first rule lives here; the second follows from encoding a request once
//! and re-sending the same bytes.
//!
//! # Thread safety
//!
//! The counter is an `AtomicU64`.  `fetch_add` reads and bumps it in one
//! indivisible step, so two threads building requests at the same time still
//! get distinct numbers, without taking a lock.

use std::sync::atomic::{AtomicU64, Ordering};

/// The counter every [`Request`](crate::protocol::Request) draws from.
pub static REQUEST_SEQUENCE: SequenceCounter = SequenceCounter::new();

/// A thread-safe, monotonically increasing counter.
///
/// Starts at 0.  Numbers are consumed when taken, whatever happens to the
/// request afterwards; a failed call never gives its number back.
///
/// # Examples
///
/// ```rust
/// use bank_core::protocol::SequenceCounter;
///
/// let counter = SequenceCounter::new();
/// assert_eq!(counter.next(), 0);
/// assert_eq!(counter.next(), 1);
/// ```
#[derive(Debug)]
pub struct SequenceCounter {
    inner: AtomicU64,
}

impl SequenceCounter {
    /// Creates a counter starting at 0.  `const` so it can back a `static`.
    pub const fn new() -> Self {
        Self {
            inner: AtomicU64::new(0),
        }
    }

    /// Returns the next number and advances the counter.
    ///
    /// `Relaxed` ordering is enough: the number only has to be unique, it does
    /// not publish any other memory to another thread.
    pub fn next(&self) -> u64 {
        self.inner.fetch_add(1, Ordering::Relaxed)
    }

    /// The number the next call to [`next`](Self::next) will return.
    pub fn peek(&self) -> u64 {
        self.inner.load(Ordering::Relaxed)
    }
}

impl Default for SequenceCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_counter_starts_at_zero() {
        let counter = SequenceCounter::new();
        assert_eq!(counter.next(), 0);
    }

    #[test]
    fn test_counter_is_strictly_increasing() {
        // Arrange
        let counter = SequenceCounter::new();

        // Act
        let values: Vec<u64> = (0..50).map(|_| counter.next()).collect();

        // Assert
        assert!(values.windows(2).all(|w| w[1] == w[0] + 1));
    }

    #[test]
    fn test_peek_does_not_consume() {
        let counter = SequenceCounter::new();
        counter.next();

        assert_eq!(counter.peek(), 1);
        assert_eq!(counter.next(), 1);
    }

    #[test]
    fn test_numbers_are_unique_across_threads() {
        // Arrange
        let counter = Arc::new(SequenceCounter::new());

        // Act
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let c = Arc::clone(&counter);
                thread::spawn(move || (0..500).map(|_| c.next()).collect::<Vec<_>>())
            })
            .collect();
        let mut all: Vec<u64> = handles
            .into_iter()
            .flat_map(|h| h.join().expect("thread panicked"))
            .collect();

        // Assert
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), 2000);
    }
}
