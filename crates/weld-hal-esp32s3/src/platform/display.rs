use embedded_hal::{delay::DelayNs, i2c::I2c};
use hd44780::{Config, DriverResult, Error, Hd44780};
use weld_core::render::CharacterDisplay;

/// Board-level adapter pairing the HD44780 driver with its delay source.
#[derive(Debug)]
pub struct CharLcd<I2C, D> {
    lcd: Hd44780<I2C>,
    delay: D,
}

impl<I2C, D> CharLcd<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    pub fn new(i2c: I2C, delay: D, config: Config) -> Self {
        Self {
            lcd: Hd44780::new(i2c, config),
            delay,
        }
    }

    /// Resets the controller into 4-bit two-line mode and clears the panel.
    pub fn initialize(&mut self) -> DriverResult<I2C::Error> {
        self.lcd.initialize(&mut self.delay)
    }
}

impl<I2C, D> CharacterDisplay for CharLcd<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    type Error = Error<I2C::Error>;

    fn clear(&mut self) -> Result<(), Self::Error> {
        self.lcd.clear(&mut self.delay)
    }

    fn set_cursor(&mut self, col: u8, row: u8) -> Result<(), Self::Error> {
        self.lcd.set_cursor(col, row, &mut self.delay)
    }

    fn write_str(&mut self, text: &str) -> Result<(), Self::Error> {
        self.lcd.write_str(text, &mut self.delay)
    }
}
