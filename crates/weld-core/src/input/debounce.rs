//! Contact-bounce filtering for sampled switch levels.

/// Level filter: a new level is accepted once it has been sampled
/// `polls` times in a row. With `polls` of 1 every sample is accepted.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Debounced {
    raw: bool,
    stable: bool,
    run: u8,
}

impl Debounced {
    pub const fn new(level: bool) -> Self {
        Self {
            raw: level,
            stable: level,
            run: 0,
        }
    }

    /// Feeds one sample and returns the filtered level.
    pub fn update(&mut self, level: bool, polls: u8) -> bool {
        if level == self.raw {
            self.run = self.run.saturating_add(1);
        } else {
            self.raw = level;
            self.run = 1;
        }

        if self.run >= polls.max(1) {
            self.stable = self.raw;
        }
        self.stable
    }

    pub const fn level(&self) -> bool {
        self.stable
    }
}
