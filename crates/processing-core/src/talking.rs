//! Debounced "talking" state from per-frame mouth-open samples.
//!
//! Talking asserts on the first open sample and releases only after the
//! whole history has filled with closed samples.

use std::collections::VecDeque;

/// Fixed-capacity rolling history of mouth-open samples.
#[derive(Debug, Clone)]
pub struct TalkingSmoother {
    history: VecDeque<bool>,
    capacity: usize,
}

impl TalkingSmoother {
    /// Create a smoother holding at most `capacity` samples (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            history: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record one sample, evicting the oldest when full, and return the
    /// updated talking state.
    pub fn push(&mut self, mouth_open: bool) -> bool {
        if self.history.len() == self.capacity {
            self.history.pop_front();
        }
        self.history.push_back(mouth_open);
        self.is_talking()
    }

    /// True when any sample in the history is open.
    pub fn is_talking(&self) -> bool {
        self.history.iter().any(|open| *open)
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for TalkingSmoother {
    fn default() -> Self {
        Self::new(5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_asserts_immediately_and_releases_after_capacity() {
        let mut smoother = TalkingSmoother::default();
        assert!(!smoother.is_talking());
        assert!(smoother.push(true));
        for _ in 0..4 {
            assert!(smoother.push(false));
        }
        // Sixth push evicts the only open sample.
        assert!(!smoother.push(false));
    }

    #[test]
    fn test_clear() {
        let mut smoother = TalkingSmoother::new(3);
        smoother.push(true);
        smoother.clear();
        assert!(smoother.is_empty());
        assert!(!smoother.is_talking());
    }

    #[test]
    fn test_zero_capacity_is_raised_to_one() {
        let mut smoother = TalkingSmoother::new(0);
        assert_eq!(smoother.capacity(), 1);
        assert!(smoother.push(true));
        assert!(!smoother.push(false));
    }

    proptest! {
        #[test]
        fn prop_length_never_exceeds_capacity(
            capacity in 1usize..10,
            samples in proptest::collection::vec(any::<bool>(), 0..50),
        ) {
            let mut smoother = TalkingSmoother::new(capacity);
            for sample in samples {
                smoother.push(sample);
                prop_assert!(smoother.len() <= capacity);
            }
        }

        #[test]
        fn prop_talking_is_or_of_recent_samples(
            samples in proptest::collection::vec(any::<bool>(), 1..30),
        ) {
            let mut smoother = TalkingSmoother::default();
            for (i, &sample) in samples.iter().enumerate() {
                let talking = smoother.push(sample);
                let window_start = (i + 1).saturating_sub(5);
                let expected = samples[window_start..=i].iter().any(|s| *s);
                prop_assert_eq!(talking, expected);
            }
        }
    }
}
