//! Command set and PCF8574 framing for HD44780 character controllers.

/// Clear display, cursor to DDRAM address 0. Needs [`CLEAR_HOLD_US`].
pub const CMD_CLEAR: u8 = 0x01;
/// Entry mode: increment address, no display shift.
pub const CMD_ENTRY_MODE: u8 = 0x06;
/// Display on, cursor off, blink off.
pub const CMD_DISPLAY_ON: u8 = 0x0C;
/// Function set: 4-bit bus, two logical lines, 5x8 font.
pub const CMD_FUNCTION_4BIT_2LINE: u8 = 0x28;
/// Set DDRAM address; OR with the address.
pub const CMD_SET_DDRAM: u8 = 0x80;

/// Nibble sent three times during the reset-by-instruction sequence.
pub const INIT_8BIT_NIBBLE: u8 = 0x30;
/// Nibble that switches the controller into 4-bit mode.
pub const INIT_4BIT_NIBBLE: u8 = 0x20;

/// Execution time of clear/home.
pub const CLEAR_HOLD_US: u32 = 1_600;
/// Execution time of every other instruction.
pub const COMMAND_HOLD_US: u32 = 50;

// PCF8574 pin mapping used by the common "LCM1602" backpacks.
pub const BIT_RS: u8 = 0x01;
pub const BIT_RW: u8 = 0x02;
pub const BIT_EN: u8 = 0x04;
pub const BIT_BACKLIGHT: u8 = 0x08;

const ROW_OFFSETS: [u8; 4] = [0x00, 0x40, 0x14, 0x54];

/// Register selected by a transfer.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Register {
    Instruction,
    Data,
}

/// Returns the `Set DDRAM address` instruction for a cell.
///
/// Returns `None` when the cell is outside a `columns` x `rows` panel.
#[inline]
pub fn ddram_command(col: u8, row: u8, columns: u8, rows: u8) -> Option<u8> {
    if col >= columns || row >= rows || row as usize >= ROW_OFFSETS.len() {
        return None;
    }

    Some(CMD_SET_DDRAM | (ROW_OFFSETS[row as usize] + col))
}

/// Frames one 4-bit transfer as two expander writes (EN high, EN low).
#[inline]
pub fn nibble_frames(nibble_high_bits: u8, register: Register, backlight: bool) -> [u8; 2] {
    let mut base = nibble_high_bits & 0xF0;
    if register == Register::Data {
        base |= BIT_RS;
    }
    if backlight {
        base |= BIT_BACKLIGHT;
    }

    [base | BIT_EN, base]
}

/// Frames a full byte as four expander writes, high nibble first.
#[inline]
pub fn byte_frames(byte: u8, register: Register, backlight: bool) -> [u8; 4] {
    let high = nibble_frames(byte & 0xF0, register, backlight);
    let low = nibble_frames(byte << 4, register, backlight);
    [high[0], high[1], low[0], low[1]]
}
