#![no_std]

//! ESP32-S3 board adapters for the mic toggle remote.

pub mod input;
pub mod network;
pub mod render;
