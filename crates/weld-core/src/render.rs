//! Character display abstraction and the fixed two-row settings screen.

use core::fmt::Write;

use crate::{edit::Field, settings::WeldSettings};

/// Panel width the layout is designed for.
pub const DISPLAY_COLUMNS: u8 = 16;
/// Panel height the layout is designed for.
pub const DISPLAY_ROWS: u8 = 2;

const LABEL_COL: u8 = 1;
const VALUE_COL: u8 = 10;
const BRACKET_OPEN_COL: u8 = 9;
const BRACKET_CLOSE_COL: u8 = 14;
const REPEAT_LABEL: &str = "Repeat";
const DELAY_LABEL: &str = "Delay";

/// Cursor-addressed text display.
pub trait CharacterDisplay {
    type Error;

    fn clear(&mut self) -> Result<(), Self::Error>;
    fn set_cursor(&mut self, col: u8, row: u8) -> Result<(), Self::Error>;
    fn write_str(&mut self, text: &str) -> Result<(), Self::Error>;

    fn write_number(&mut self, value: u32) -> Result<(), Self::Error> {
        let mut digits: heapless::String<10> = heapless::String::new();
        // u32::MAX has ten digits, formatting cannot overflow the buffer.
        let _ = write!(digits, "{}", value);
        self.write_str(&digits)
    }
}

/// Redraws both parameters and brackets the selected one.
pub fn draw_settings<D>(
    display: &mut D,
    settings: &WeldSettings,
    cursor: Field,
) -> Result<(), D::Error>
where
    D: CharacterDisplay,
{
    display.clear()?;

    display.set_cursor(LABEL_COL, Field::RepeatCount.row())?;
    display.write_str(REPEAT_LABEL)?;
    display.set_cursor(VALUE_COL, Field::RepeatCount.row())?;
    display.write_number(settings.repeat_count as u32)?;

    display.set_cursor(LABEL_COL, Field::Delay.row())?;
    display.write_str(DELAY_LABEL)?;
    display.set_cursor(VALUE_COL, Field::Delay.row())?;
    display.write_number(settings.delay_ms as u32)?;

    display.set_cursor(BRACKET_OPEN_COL, cursor.row())?;
    display.write_str("[")?;
    display.set_cursor(BRACKET_CLOSE_COL, cursor.row())?;
    display.write_str("]")
}

/// Two centred lines, used for the boot title.
pub fn draw_splash<D>(display: &mut D, title: &str, subtitle: &str) -> Result<(), D::Error>
where
    D: CharacterDisplay,
{
    display.clear()?;
    display.set_cursor(centered_col(title), 0)?;
    display.write_str(title)?;
    display.set_cursor(centered_col(subtitle), 1)?;
    display.write_str(subtitle)
}

fn centered_col(text: &str) -> u8 {
    let len = text.len().min(DISPLAY_COLUMNS as usize) as u8;
    (DISPLAY_COLUMNS - len) / 2
}
