//! Recursion budget for the grammar.

/// Counts nested productions and refuses to go deeper than `max_depth`.
///
/// Every successful `enter(cost)` must be paired with one `leave(cost)`.
#[derive(Debug)]
pub(crate) struct DepthCounter {
    depth: u32,
    max_depth: u32,
    exceeded: bool,
}

impl DepthCounter {
    pub(crate) fn new(max_depth: u32) -> Self {
        DepthCounter {
            depth: 0,
            max_depth,
            exceeded: false,
        }
    }

    /// Spend `cost` units. Returns false, spending nothing, when that would
    /// go past the limit.
    #[inline]
    pub(crate) fn enter(&mut self, cost: u32) -> bool {
        if self.depth.saturating_add(cost) > self.max_depth {
            self.exceeded = true;
            return false;
        }
        self.depth += cost;
        true
    }

    #[inline]
    pub(crate) fn leave(&mut self, cost: u32) {
        debug_assert!(self.depth >= cost, "DepthCounter::leave() past depth 0");
        self.depth = self.depth.saturating_sub(cost);
    }

    pub(crate) fn is_exceeded(&self) -> bool {
        self.exceeded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enter_stops_at_limit() {
        let mut counter = DepthCounter::new(2);
        assert!(counter.enter(1));
        assert!(counter.enter(1));
        assert!(!counter.enter(1));
        assert!(counter.is_exceeded());
        counter.leave(1);
        counter.leave(1);
        assert!(counter.enter(2));
    }

    #[test]
    fn test_weighted_entry() {
        let mut counter = DepthCounter::new(5);
        assert!(counter.enter(3));
        assert!(!counter.enter(3));
        assert!(counter.is_exceeded());
        assert!(counter.enter(2));
        counter.leave(2);
        counter.leave(3);
        assert!(counter.enter(5));
    }

    #[test]
    fn test_zero_limit_rejects_everything() {
        let mut counter = DepthCounter::new(0);
        assert!(!counter.enter(1));
        assert!(counter.is_exceeded());
    }
}
