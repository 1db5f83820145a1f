//! Input abstraction layer.

pub mod buttons;
pub mod debounce;
pub mod edge;
pub mod encoder;
pub mod mock;

pub use debounce::Debounced;
pub use edge::EdgeLatch;

/// Upper bound on events produced by one hardware sample.
pub const MAX_EVENTS_PER_POLL: usize = 4;

/// Logical actions consumed by the controller.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InputEvent {
    Increment,
    Decrement,
    /// Coarse step up, produced by fast encoder rotation.
    IncrementFast,
    /// Coarse step down, produced by fast encoder rotation.
    DecrementFast,
    /// Switch the editable field.
    ToggleField,
    /// Run one pulse sequence.
    Fire,
}

pub type InputEvents = heapless::Vec<InputEvent, MAX_EVENTS_PER_POLL>;

/// Polled input provider. Each call samples the hardware exactly once.
pub trait InputSource {
    type Error;

    fn poll(&mut self, now_ms: u64) -> Result<InputEvents, Self::Error>;
}
