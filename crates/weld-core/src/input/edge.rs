/// Turns a level-sampled input into single-shot activation edges.
///
/// The latch sets on the first active sample and only clears once an
/// inactive sample is seen, so a held input reports exactly one edge.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct EdgeLatch {
    latched: bool,
}

impl EdgeLatch {
    pub const fn new() -> Self {
        Self { latched: false }
    }

    /// Feeds one sample. Returns `true` on an inactive-to-active edge.
    pub fn update(&mut self, active: bool) -> bool {
        match (active, self.latched) {
            (true, false) => {
                self.latched = true;
                true
            }
            (false, true) => {
                self.latched = false;
                false
            }
            _ => false,
        }
    }

    /// Whether the input is currently considered held.
    pub const fn is_latched(&self) -> bool {
        self.latched
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn held_input_edges_once() {
        let mut latch = EdgeLatch::new();
        assert!(latch.update(true));
        for _ in 0..50 {
            assert!(!latch.update(true));
        }
        assert!(latch.is_latched());
    }

    #[test]
    fn release_rearms_without_an_event() {
        let mut latch = EdgeLatch::new();
        assert!(latch.update(true));
        assert!(!latch.update(false));
        assert!(!latch.is_latched());
        assert!(latch.update(true));
    }

    #[test]
    fn idle_input_never_edges() {
        let mut latch = EdgeLatch::new();
        assert!(!latch.update(false));
        assert!(!latch.update(false));
    }
}
