#![cfg_attr(not(test), no_std)]

//! Sharp LS027B7DH01 memory LCD: serial framing, an owned 1bpp frame and a
//! blocking SPI driver using software VCOM.

mod frame;
mod panel;
pub mod protocol;

pub use frame::PanelFrame;
pub use panel::{PanelError, SharpPanel};
