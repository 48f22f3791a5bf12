#![cfg_attr(not(test), no_std)]

//! Board-independent logic for the mic toggle remote: network bring-up,
//! the toggle request/response exchange, button handling and the control loop.

pub mod config;
pub mod connectivity;
pub mod control;
pub mod exchange;
pub mod input;
pub mod render;
pub mod reply;
pub mod time;

#[cfg(test)]
mod testing;
