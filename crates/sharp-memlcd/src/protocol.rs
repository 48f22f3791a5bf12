//! Serial framing for the LS027B7DH01.
//!
//! A burst is one command header, then `[gate address][pixels][dummy]` per
//! line, then a trailer byte. Gate addresses are clocked LSB first.

pub const WIDTH: usize = 400;
pub const HEIGHT: usize = 240;
pub const LINE_BYTES: usize = WIDTH / 8;
pub const FRAME_BYTES: usize = LINE_BYTES * HEIGHT;

pub const ROW_PACKET_BYTES: usize = LINE_BYTES + 2;
pub const CLEAR_PACKET_BYTES: usize = 3;
pub const BURST_TRAILER: u8 = 0x00;

const VCOM_BIT: u8 = 0x40;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Command {
    WriteLines,
    ClearAll,
}

impl Command {
    /// First byte on the wire: mode bits plus the VCOM polarity.
    pub const fn header(self, vcom: Vcom) -> u8 {
        let mode = match self {
            Self::WriteLines => 0x80,
            Self::ClearAll => 0x20,
        };
        mode | vcom.bit()
    }
}

/// VCOM polarity carried in command headers when EMD is held low.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Vcom {
    high: bool,
}

impl Vcom {
    pub const fn is_high(self) -> bool {
        self.high
    }

    const fn bit(self) -> u8 {
        if self.high { VCOM_BIT } else { 0x00 }
    }

    /// Flips the polarity and returns the phase to send next.
    pub fn advance(&mut self) -> Self {
        self.high = !self.high;
        *self
    }
}

/// Gate address for line 1..=240.
pub fn line_address(line: u16) -> Option<u8> {
    if !(1..=HEIGHT as u16).contains(&line) {
        return None;
    }
    Some((line as u8).reverse_bits())
}

pub fn row_packet(line: u16, pixels: &[u8; LINE_BYTES]) -> Option<[u8; ROW_PACKET_BYTES]> {
    let mut packet = [0u8; ROW_PACKET_BYTES];
    packet[0] = line_address(line)?;
    packet[1..=LINE_BYTES].copy_from_slice(pixels);
    Some(packet)
}

pub const fn clear_packet(vcom: Vcom) -> [u8; CLEAR_PACKET_BYTES] {
    [Command::ClearAll.header(vcom), 0x00, 0x00]
}
