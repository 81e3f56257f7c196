use std::collections::VecDeque;

/// Majority vote over the last few classified frames.
#[derive(Debug, Clone)]
pub struct MajorityWindow<T> {
    capacity: usize,
    samples: VecDeque<T>,
}

impl<T: Copy + PartialEq> MajorityWindow<T> {
    pub fn new(capacity: usize) -> Self {
        Self { capacity: capacity.max(1), samples: VecDeque::with_capacity(capacity) }
    }

    pub fn push(&mut self, sample: T) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Most frequent sample. Ties go to the one seen most recently.
    pub fn majority(&self) -> Option<T> {
        let mut best: Option<(T, usize)> = None;
        for (i, candidate) in self.samples.iter().enumerate().rev() {
            // Only score each value at its most recent position.
            if self.samples.iter().skip(i + 1).any(|later| later == candidate) {
                continue;
            }
            let count = self.samples.iter().filter(|s| *s == candidate).count();
            if best.is_none_or(|(_, c)| count > c) {
                best = Some((*candidate, count));
            }
        }
        best.map(|(value, _)| value)
    }

    /// Majority, but only once at least `min_samples` are collected.
    pub fn decided(&self, min_samples: usize) -> Option<T> {
        if self.samples.len() < min_samples {
            return None;
        }
        self.majority()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_only_capacity_samples() {
        let mut w = MajorityWindow::new(3);
        for s in [1, 1, 1, 2, 2] {
            w.push(s);
        }
        assert_eq!(w.len(), 3);
        assert_eq!(w.majority(), Some(2));
    }

    #[test]
    fn tie_goes_to_most_recent() {
        let mut w = MajorityWindow::new(4);
        for s in ['a', 'b', 'a', 'b'] {
            w.push(s);
        }
        assert_eq!(w.majority(), Some('b'));
    }

    #[test]
    fn undecided_below_minimum() {
        let mut w = MajorityWindow::new(10);
        for _ in 0..4 {
            w.push(Some(3));
        }
        assert_eq!(w.decided(5), None);
        w.push(None);
        assert_eq!(w.decided(5), Some(Some(3)));
        assert!(MajorityWindow::<u8>::new(5).majority().is_none());
    }
}
