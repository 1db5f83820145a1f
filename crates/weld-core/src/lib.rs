#![cfg_attr(not(test), no_std)]

//! Hardware-agnostic spot-welder controller: settings persistence, input
//! decoding, parameter editing, display rendering and pulse sequencing.

pub mod app;
pub mod edit;
pub mod input;
pub mod render;
pub mod sequencer;
pub mod settings;
pub mod storage;
