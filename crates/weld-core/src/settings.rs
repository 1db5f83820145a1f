//! Persisted weld parameters and their bounds.

/// Pulse count used on first boot.
pub const DEFAULT_REPEAT_COUNT: u8 = 5;
/// Half-period used on first boot.
pub const DEFAULT_DELAY_MS: u16 = 50;

/// The two operator-tunable weld parameters.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct WeldSettings {
    /// Number of ON/OFF pulses per fire.
    pub repeat_count: u8,
    /// Duration of each ON and each OFF half of a pulse.
    pub delay_ms: u16,
}

impl Default for WeldSettings {
    fn default() -> Self {
        Self::new(DEFAULT_REPEAT_COUNT, DEFAULT_DELAY_MS)
    }
}

impl WeldSettings {
    pub const fn new(repeat_count: u8, delay_ms: u16) -> Self {
        Self {
            repeat_count,
            delay_ms,
        }
    }

    /// Forces both fields into `limits`.
    pub fn clamped(self, limits: SettingsLimits) -> Self {
        Self {
            repeat_count: self.repeat_count.clamp(1, limits.max_repeat_count),
            delay_ms: self.delay_ms.clamp(1, limits.max_delay_ms),
        }
    }

    pub fn is_within(&self, limits: SettingsLimits) -> bool {
        (1..=limits.max_repeat_count).contains(&self.repeat_count)
            && (1..=limits.max_delay_ms).contains(&self.delay_ms)
    }
}

/// Upper bounds for the editable fields. The lower bound is always 1.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SettingsLimits {
    pub max_repeat_count: u8,
    pub max_delay_ms: u16,
}

impl SettingsLimits {
    /// Add/subtract push-button panel, four-digit delay field.
    pub const BUTTONS: Self = Self {
        max_repeat_count: u8::MAX,
        max_delay_ms: 9_999,
    };

    /// Rotary encoder panel, three-digit delay field.
    pub const ENCODER: Self = Self {
        max_repeat_count: u8::MAX,
        max_delay_ms: 999,
    };
}

/// Abstract settings persistence backend.
pub trait SettingsStore {
    type Error;

    /// Returns `Ok(None)` when no valid record exists.
    fn load(&mut self) -> Result<Option<WeldSettings>, Self::Error>;
    fn save(&mut self, settings: &WeldSettings) -> Result<(), Self::Error>;
}
