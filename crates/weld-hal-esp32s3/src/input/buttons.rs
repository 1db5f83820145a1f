use embedded_hal::digital::InputPin;

use weld_core::input::{
    InputEvents, InputSource,
    buttons::{ButtonLevels, TwoButtonDecoder},
};

#[derive(Debug, Clone, Copy)]
pub struct ButtonConfig {
    active_high: bool,
    debounce_polls: u8,
}

impl Default for ButtonConfig {
    fn default() -> Self {
        Self {
            active_high: true,
            debounce_polls: 5,
        }
    }
}

impl ButtonConfig {
    /// `true` when a pressed button reads HIGH (external pull-downs).
    pub const fn with_active_high(mut self, active_high: bool) -> Self {
        self.active_high = active_high;
        self
    }

    /// Consecutive equal polls needed before a button level is trusted.
    pub const fn with_debounce_polls(mut self, debounce_polls: u8) -> Self {
        self.debounce_polls = debounce_polls;
        self
    }
}

#[derive(Debug)]
pub enum ButtonInputError<IncErr, DecErr, FireErr> {
    Increment(IncErr),
    Decrement(DecErr),
    Fire(FireErr),
}

/// Add/subtract/fire push-button panel. Levels are sampled raw each poll;
/// debouncing and edge detection happen in [`TwoButtonDecoder`].
#[derive(Debug)]
pub struct ButtonInput<INC, DEC, FIRE> {
    increment: INC,
    decrement: DEC,
    fire: FIRE,
    config: ButtonConfig,
    decoder: TwoButtonDecoder,
}

impl<INC, DEC, FIRE> ButtonInput<INC, DEC, FIRE>
where
    INC: InputPin,
    DEC: InputPin,
    FIRE: InputPin,
{
    pub const fn new(increment: INC, decrement: DEC, fire: FIRE, config: ButtonConfig) -> Self {
        Self {
            increment,
            decrement,
            fire,
            config,
            decoder: TwoButtonDecoder::new(config.debounce_polls),
        }
    }

    fn pressed(&self, level_high: bool) -> bool {
        level_high == self.config.active_high
    }
}

impl<INC, DEC, FIRE> InputSource for ButtonInput<INC, DEC, FIRE>
where
    INC: InputPin,
    DEC: InputPin,
    FIRE: InputPin,
{
    type Error = ButtonInputError<INC::Error, DEC::Error, FIRE::Error>;

    fn poll(&mut self, _now_ms: u64) -> Result<InputEvents, Self::Error> {
        let increment_high = self
            .increment
            .is_high()
            .map_err(ButtonInputError::Increment)?;
        let decrement_high = self
            .decrement
            .is_high()
            .map_err(ButtonInputError::Decrement)?;
        let fire_high = self.fire.is_high().map_err(ButtonInputError::Fire)?;

        let levels = ButtonLevels {
            increment: self.pressed(increment_high),
            decrement: self.pressed(decrement_high),
            fire: self.pressed(fire_high),
        };
        Ok(self.decoder.decode(levels))
    }
}
