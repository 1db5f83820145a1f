//! Rotary encoder gesture decoding: detents, acceleration and click.

use super::{EdgeLatch, InputEvent, InputEvents};

/// Detent direction reported by a quadrature decoder.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Rotation {
    Clockwise,
    CounterClockwise,
}

/// One sample of the encoder panel after quadrature and switch debouncing.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct EncoderSample {
    pub detent: Option<Rotation>,
    /// Debounced encoder push switch, `true` = pressed.
    pub switch_pressed: bool,
    /// Fire button level, `true` = pressed.
    pub fire: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct EncoderConfig {
    fast_window_ms: u32,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self { fast_window_ms: 60 }
    }
}

impl EncoderConfig {
    /// Two detents in the same direction closer than this count as fast.
    pub const fn with_fast_window_ms(mut self, fast_window_ms: u32) -> Self {
        self.fast_window_ms = fast_window_ms;
        self
    }
}

// Quadrature transition table for previous_state/current_state (AB).
// Index: (prev << 2) | curr, values are +1/-1 for valid transitions.
const QUADRATURE_TRANSITIONS: [i8; 16] = [0, -1, 1, 0, 1, 0, 0, -1, -1, 0, 0, 1, 0, 1, -1, 0];

/// Turns raw CLK/DT levels into detents.
#[derive(Debug, Clone, Copy)]
pub struct QuadratureDecoder {
    prev_ab: u8,
    transition_accum: i8,
    transitions_per_step: u8,
    direction_inverted: bool,
}

impl QuadratureDecoder {
    /// Starts from the current pin levels so power-up is not a transition.
    pub const fn new(
        clk_high: bool,
        dt_high: bool,
        transitions_per_step: u8,
        direction_inverted: bool,
    ) -> Self {
        Self {
            prev_ab: ab_from_levels(clk_high, dt_high),
            transition_accum: 0,
            transitions_per_step,
            direction_inverted,
        }
    }

    /// Feeds one sample; returns a detent once enough valid transitions in
    /// one direction have accumulated.
    pub fn update(&mut self, clk_high: bool, dt_high: bool) -> Option<Rotation> {
        let curr_ab = ab_from_levels(clk_high, dt_high);
        if curr_ab == self.prev_ab {
            return None;
        }

        let transition_idx = ((self.prev_ab << 2) | curr_ab) as usize;
        self.prev_ab = curr_ab;
        self.transition_accum = self
            .transition_accum
            .saturating_add(QUADRATURE_TRANSITIONS[transition_idx]);

        let threshold = self.transitions_per_step.max(1) as i8;
        if self.transition_accum >= threshold {
            self.transition_accum = 0;
            return Some(self.rotation(true));
        }
        if self.transition_accum <= -threshold {
            self.transition_accum = 0;
            return Some(self.rotation(false));
        }

        None
    }

    fn rotation(&self, positive_step: bool) -> Rotation {
        if positive_step != self.direction_inverted {
            Rotation::Clockwise
        } else {
            Rotation::CounterClockwise
        }
    }
}

#[inline]
const fn ab_from_levels(clk_high: bool, dt_high: bool) -> u8 {
    ((clk_high as u8) << 1) | (dt_high as u8)
}

/// Maps detents to fine or coarse steps based on rotation speed.
#[derive(Debug, Clone, Copy)]
pub struct EncoderAccelerator {
    config: EncoderConfig,
    last_detent: Option<(Rotation, u64)>,
}

impl EncoderAccelerator {
    pub const fn new(config: EncoderConfig) -> Self {
        Self {
            config,
            last_detent: None,
        }
    }

    pub fn detent(&mut self, rotation: Rotation, now_ms: u64) -> InputEvent {
        let fast = matches!(
            self.last_detent,
            Some((previous, at_ms))
                if previous == rotation
                    && now_ms.saturating_sub(at_ms) <= self.config.fast_window_ms as u64
        );
        self.last_detent = Some((rotation, now_ms));

        match (rotation, fast) {
            (Rotation::Clockwise, false) => InputEvent::Increment,
            (Rotation::Clockwise, true) => InputEvent::IncrementFast,
            (Rotation::CounterClockwise, false) => InputEvent::Decrement,
            (Rotation::CounterClockwise, true) => InputEvent::DecrementFast,
        }
    }
}

/// Edge decoder for the encoder panel: click toggles the field, rotation
/// edits, the separate fire button triggers a pulse sequence.
#[derive(Debug, Clone, Copy)]
pub struct EncoderDecoder {
    accelerator: EncoderAccelerator,
    click: EdgeLatch,
    fire: EdgeLatch,
}

impl EncoderDecoder {
    pub const fn new(config: EncoderConfig) -> Self {
        Self {
            accelerator: EncoderAccelerator::new(config),
            click: EdgeLatch::new(),
            fire: EdgeLatch::new(),
        }
    }

    pub fn decode(&mut self, sample: EncoderSample, now_ms: u64) -> InputEvents {
        let mut events = InputEvents::new();

        if self.click.update(sample.switch_pressed) {
            let _ = events.push(InputEvent::ToggleField);
        }
        if let Some(rotation) = sample.detent {
            let _ = events.push(self.accelerator.detent(rotation, now_ms));
        }
        if self.fire.update(sample.fire) {
            let _ = events.push(InputEvent::Fire);
        }

        events
    }
}
