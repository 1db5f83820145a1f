use embedded_hal::digital::InputPin;

use weld_core::input::{
    Debounced, InputEvents, InputSource,
    encoder::{EncoderConfig, EncoderDecoder, EncoderSample, QuadratureDecoder},
};

#[derive(Debug, Clone, Copy)]
pub struct RotaryConfig {
    direction_inverted: bool,
    debounce_polls: u8,
    transitions_per_step: u8,
    encoder: EncoderConfig,
}

impl Default for RotaryConfig {
    fn default() -> Self {
        Self {
            direction_inverted: false,
            debounce_polls: 3,
            transitions_per_step: 4,
            encoder: EncoderConfig::default(),
        }
    }
}

impl RotaryConfig {
    pub const fn with_direction_inverted(mut self, direction_inverted: bool) -> Self {
        self.direction_inverted = direction_inverted;
        self
    }

    pub const fn with_debounce_polls(mut self, debounce_polls: u8) -> Self {
        self.debounce_polls = debounce_polls;
        self
    }

    pub const fn with_transitions_per_step(mut self, transitions_per_step: u8) -> Self {
        self.transitions_per_step = transitions_per_step;
        self
    }

    pub const fn with_encoder(mut self, encoder: EncoderConfig) -> Self {
        self.encoder = encoder;
        self
    }
}

#[derive(Debug)]
pub enum RotaryInputError<ClkErr, DtErr, SwErr, FireErr> {
    Clk(ClkErr),
    Dt(DtErr),
    Sw(SwErr),
    Fire(FireErr),
}

type RotaryResult<ClkErr, DtErr, SwErr, FireErr, T> =
    Result<T, RotaryInputError<ClkErr, DtErr, SwErr, FireErr>>;

/// Encoder panel: quadrature knob with push switch, plus the fire button.
/// Both switches are active low (pull-ups).
#[derive(Debug)]
pub struct RotaryInput<CLK, DT, SW, FIRE> {
    clk: CLK,
    dt: DT,
    sw: SW,
    fire: FIRE,
    debounce_polls: u8,
    quadrature: QuadratureDecoder,
    switch: Debounced,
    fire_button: Debounced,
    decoder: EncoderDecoder,
}

impl<CLK, DT, SW, FIRE> RotaryInput<CLK, DT, SW, FIRE>
where
    CLK: InputPin,
    DT: InputPin,
    SW: InputPin,
    FIRE: InputPin,
{
    pub fn new(
        mut clk: CLK,
        mut dt: DT,
        mut sw: SW,
        mut fire: FIRE,
        config: RotaryConfig,
    ) -> RotaryResult<CLK::Error, DT::Error, SW::Error, FIRE::Error, Self> {
        let clk_high = clk.is_high().map_err(RotaryInputError::Clk)?;
        let dt_high = dt.is_high().map_err(RotaryInputError::Dt)?;
        let sw_pressed = sw.is_low().map_err(RotaryInputError::Sw)?;
        let fire_pressed = fire.is_low().map_err(RotaryInputError::Fire)?;

        Ok(Self {
            clk,
            dt,
            sw,
            fire,
            debounce_polls: config.debounce_polls,
            quadrature: QuadratureDecoder::new(
                clk_high,
                dt_high,
                config.transitions_per_step,
                config.direction_inverted,
            ),
            switch: Debounced::new(sw_pressed),
            fire_button: Debounced::new(fire_pressed),
            decoder: EncoderDecoder::new(config.encoder),
        })
    }
}

impl<CLK, DT, SW, FIRE> InputSource for RotaryInput<CLK, DT, SW, FIRE>
where
    CLK: InputPin,
    DT: InputPin,
    SW: InputPin,
    FIRE: InputPin,
{
    type Error = RotaryInputError<CLK::Error, DT::Error, SW::Error, FIRE::Error>;

    fn poll(&mut self, now_ms: u64) -> Result<InputEvents, Self::Error> {
        let sw_pressed = self.sw.is_low().map_err(RotaryInputError::Sw)?;
        let fire_pressed = self.fire.is_low().map_err(RotaryInputError::Fire)?;
        let clk_high = self.clk.is_high().map_err(RotaryInputError::Clk)?;
        let dt_high = self.dt.is_high().map_err(RotaryInputError::Dt)?;

        let sample = EncoderSample {
            detent: self.quadrature.update(clk_high, dt_high),
            switch_pressed: self.switch.update(sw_pressed, self.debounce_polls),
            fire: self.fire_button.update(fire_pressed, self.debounce_polls),
        };
        Ok(self.decoder.decode(sample, now_ms))
    }
}
