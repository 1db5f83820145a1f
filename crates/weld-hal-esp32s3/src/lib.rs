#![no_std]

pub mod input;
pub mod platform;
pub mod storage;
