//! Add/subtract/fire push-button panel decoding.

use super::{Debounced, EdgeLatch, InputEvent, InputEvents};

/// Raw levels of the three panel buttons for one sample, `true` = pressed.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ButtonLevels {
    pub increment: bool,
    pub decrement: bool,
    pub fire: bool,
}

/// Edge decoder for the push-button panel.
///
/// The panel has no dedicated field switch: holding add and subtract
/// together toggles the field instead of changing a value. The chord fires
/// on the sample where the second of the two buttons edges, and neither
/// button produces a numeric step on that sample.
///
/// Every level passes a [`Debounced`] filter first, so a release bounce is
/// never seen as a second press.
#[derive(Clone, Copy, Debug)]
pub struct TwoButtonDecoder {
    debounce_polls: u8,
    filters: [Debounced; 3],
    increment: EdgeLatch,
    decrement: EdgeLatch,
    fire: EdgeLatch,
}

impl TwoButtonDecoder {
    /// `debounce_polls` consecutive equal samples settle a button level.
    pub const fn new(debounce_polls: u8) -> Self {
        Self {
            debounce_polls,
            filters: [Debounced::new(false); 3],
            increment: EdgeLatch::new(),
            decrement: EdgeLatch::new(),
            fire: EdgeLatch::new(),
        }
    }

    pub fn decode(&mut self, raw: ButtonLevels) -> InputEvents {
        let mut events = InputEvents::new();
        let levels = self.settle(raw);

        let increment_edge = self.increment.update(levels.increment);
        let decrement_edge = self.decrement.update(levels.decrement);
        let chord = self.increment.is_latched() && self.decrement.is_latched();

        if chord && (increment_edge || decrement_edge) {
            let _ = events.push(InputEvent::ToggleField);
        } else if increment_edge {
            let _ = events.push(InputEvent::Increment);
        } else if decrement_edge {
            let _ = events.push(InputEvent::Decrement);
        }

        if self.fire.update(levels.fire) {
            let _ = events.push(InputEvent::Fire);
        }

        events
    }

    fn settle(&mut self, raw: ButtonLevels) -> ButtonLevels {
        let polls = self.debounce_polls;
        let [increment, decrement, fire] = &mut self.filters;
        ButtonLevels {
            increment: increment.update(raw.increment, polls),
            decrement: decrement.update(raw.decrement, polls),
            fire: fire.update(raw.fire, polls),
        }
    }
}
