//! Parameter edit state machine.

use crate::{
    input::InputEvent,
    settings::{SettingsLimits, WeldSettings},
};

/// Which settings field the operator is editing.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Field {
    #[default]
    RepeatCount,
    Delay,
}

impl Field {
    pub const fn toggled(self) -> Self {
        match self {
            Self::RepeatCount => Self::Delay,
            Self::Delay => Self::RepeatCount,
        }
    }

    /// Display row holding this field.
    pub const fn row(self) -> u8 {
        match self {
            Self::RepeatCount => 0,
            Self::Delay => 1,
        }
    }
}

/// Applies input events to the settings field selected by the cursor.
///
/// Every step saturates at the field bounds; nothing wraps and nothing
/// reaches zero.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ParameterEditor {
    limits: SettingsLimits,
    coarse_step: u16,
}

impl ParameterEditor {
    pub const fn new(limits: SettingsLimits, coarse_step: u16) -> Self {
        Self {
            limits,
            coarse_step,
        }
    }

    pub const fn limits(&self) -> SettingsLimits {
        self.limits
    }

    /// Returns whether the settings or the cursor changed.
    pub fn apply(&self, event: InputEvent, settings: &mut WeldSettings, cursor: &mut Field) -> bool {
        match event {
            InputEvent::ToggleField => {
                *cursor = cursor.toggled();
                true
            }
            InputEvent::Increment => self.adjust(settings, *cursor, 1, true),
            InputEvent::Decrement => self.adjust(settings, *cursor, 1, false),
            InputEvent::IncrementFast => self.adjust(settings, *cursor, self.coarse_step, true),
            InputEvent::DecrementFast => self.adjust(settings, *cursor, self.coarse_step, false),
            InputEvent::Fire => false,
        }
    }

    fn adjust(&self, settings: &mut WeldSettings, field: Field, step: u16, up: bool) -> bool {
        match field {
            Field::RepeatCount => {
                let current = settings.repeat_count as u16;
                let next = step_value(current, step, up, self.limits.max_repeat_count as u16);
                // Bounded by max_repeat_count, which is a u8.
                let next = next as u8;
                if next == settings.repeat_count {
                    return false;
                }
                settings.repeat_count = next;
            }
            Field::Delay => {
                let next = step_value(settings.delay_ms, step, up, self.limits.max_delay_ms);
                if next == settings.delay_ms {
                    return false;
                }
                settings.delay_ms = next;
            }
        }
        true
    }
}

fn step_value(current: u16, step: u16, up: bool, max: u16) -> u16 {
    if up {
        if current >= max {
            return current;
        }
        current.saturating_add(step).min(max)
    } else {
        current.saturating_sub(step).max(1)
    }
}
