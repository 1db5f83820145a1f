#![cfg_attr(not(test), no_std)]

//! HD44780 character LCD driver for PCF8574 I2C backpacks.

pub mod protocol;

use embedded_hal::{delay::DelayNs, i2c::I2c};

use protocol::Register;

/// Driver configuration.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Config {
    /// 7-bit I2C address of the PCF8574 expander.
    pub address: u8,
    /// Visible columns.
    pub columns: u8,
    /// Visible rows.
    pub rows: u8,
    /// Backlight state applied to every transfer.
    pub backlight: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: 0x27,
            columns: 16,
            rows: 2,
            backlight: true,
        }
    }
}

impl Config {
    pub const fn with_address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }
}

/// Driver errors.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Error<I2cErr> {
    /// I2C transaction failed.
    I2c(I2cErr),
    /// Cursor position is outside the configured panel.
    InvalidInput,
}

pub type DriverResult<I2cErr> = Result<(), Error<I2cErr>>;

/// HD44780 driver running the controller in 4-bit mode.
#[derive(Debug)]
pub struct Hd44780<I2C> {
    i2c: I2C,
    config: Config,
}

impl<I2C> Hd44780<I2C>
where
    I2C: I2c,
{
    /// Creates a new driver instance. Call [`Self::initialize`] before use.
    pub fn new(i2c: I2C, config: Config) -> Self {
        Self { i2c, config }
    }

    /// Releases the owned bus.
    pub fn release(self) -> I2C {
        self.i2c
    }

    /// Runs the reset-by-instruction sequence and leaves the panel cleared.
    pub fn initialize<D>(&mut self, delay: &mut D) -> DriverResult<I2C::Error>
    where
        D: DelayNs,
    {
        // Power-on settle time before the first instruction.
        delay.delay_ms(50);

        for wait_us in [4_500, 150, 150] {
            self.write_nibble(protocol::INIT_8BIT_NIBBLE, Register::Instruction)?;
            delay.delay_us(wait_us);
        }
        self.write_nibble(protocol::INIT_4BIT_NIBBLE, Register::Instruction)?;
        delay.delay_us(protocol::COMMAND_HOLD_US);

        self.command(protocol::CMD_FUNCTION_4BIT_2LINE, delay)?;
        self.command(protocol::CMD_DISPLAY_ON, delay)?;
        self.command(protocol::CMD_ENTRY_MODE, delay)?;
        self.clear(delay)
    }

    /// Clears DDRAM and homes the cursor.
    pub fn clear<D>(&mut self, delay: &mut D) -> DriverResult<I2C::Error>
    where
        D: DelayNs,
    {
        self.write_byte(protocol::CMD_CLEAR, Register::Instruction)?;
        delay.delay_us(protocol::CLEAR_HOLD_US);
        Ok(())
    }

    /// Moves the cursor to `col`, `row` (both zero based).
    pub fn set_cursor<D>(&mut self, col: u8, row: u8, delay: &mut D) -> DriverResult<I2C::Error>
    where
        D: DelayNs,
    {
        let cmd = protocol::ddram_command(col, row, self.config.columns, self.config.rows)
            .ok_or(Error::InvalidInput)?;
        self.command(cmd, delay)
    }

    /// Writes ASCII text at the cursor. Non-ASCII characters are shown as `?`.
    pub fn write_str<D>(&mut self, text: &str, delay: &mut D) -> DriverResult<I2C::Error>
    where
        D: DelayNs,
    {
        for ch in text.chars() {
            let byte = if ch.is_ascii() { ch as u8 } else { b'?' };
            self.write_byte(byte, Register::Data)?;
            delay.delay_us(protocol::COMMAND_HOLD_US);
        }
        Ok(())
    }

    fn command<D>(&mut self, cmd: u8, delay: &mut D) -> DriverResult<I2C::Error>
    where
        D: DelayNs,
    {
        self.write_byte(cmd, Register::Instruction)?;
        delay.delay_us(protocol::COMMAND_HOLD_US);
        Ok(())
    }

    fn write_nibble(&mut self, nibble: u8, register: Register) -> DriverResult<I2C::Error> {
        let frames = protocol::nibble_frames(nibble, register, self.config.backlight);
        self.i2c
            .write(self.config.address, &frames)
            .map_err(Error::I2c)
    }

    fn write_byte(&mut self, byte: u8, register: Register) -> DriverResult<I2C::Error> {
        let frames = protocol::byte_frames(byte, register, self.config.backlight);
        self.i2c
            .write(self.config.address, &frames)
            .map_err(Error::I2c)
    }
}
