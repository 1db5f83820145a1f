pub mod buttons;
pub mod rotary;
