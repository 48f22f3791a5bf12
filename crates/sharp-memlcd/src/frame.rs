use crate::protocol::{HEIGHT, LINE_BYTES, ROW_PACKET_BYTES, WIDTH, row_packet};

/// Full-screen 1bpp frame; a set bit is a dark pixel, bit 7 is leftmost.
#[derive(Clone)]
pub struct PanelFrame {
    rows: [[u8; LINE_BYTES]; HEIGHT],
}

impl Default for PanelFrame {
    fn default() -> Self {
        Self::new()
    }
}

impl PanelFrame {
    pub const fn new() -> Self {
        Self {
            rows: [[0u8; LINE_BYTES]; HEIGHT],
        }
    }

    /// `dark = false` clears to white.
    pub fn fill(&mut self, dark: bool) {
        let value = if dark { 0xFF } else { 0x00 };
        for row in &mut self.rows {
            row.fill(value);
        }
    }

    /// Returns `false` and leaves the frame untouched when out of bounds.
    pub fn set_pixel(&mut self, x: usize, y: usize, dark: bool) -> bool {
        if x >= WIDTH || y >= HEIGHT {
            return false;
        }

        let byte = &mut self.rows[y][x / 8];
        let mask = 0x80 >> (x % 8);
        if dark {
            *byte |= mask;
        } else {
            *byte &= !mask;
        }
        true
    }

    pub fn is_dark(&self, x: usize, y: usize) -> Option<bool> {
        if x >= WIDTH || y >= HEIGHT {
            return None;
        }
        Some(self.rows[y][x / 8] & (0x80 >> (x % 8)) != 0)
    }

    /// Addressed row packets, top line first.
    pub fn row_packets(&self) -> impl Iterator<Item = [u8; ROW_PACKET_BYTES]> + '_ {
        (1..=HEIGHT as u16)
            .zip(self.rows.iter())
            .filter_map(|(line, pixels)| row_packet(line, pixels))
    }
}

#[cfg(feature = "embedded-graphics")]
mod graphics {
    use core::convert::Infallible;

    use embedded_graphics_core::{
        Pixel,
        draw_target::DrawTarget,
        geometry::{OriginDimensions, Size},
        pixelcolor::BinaryColor,
    };

    use super::PanelFrame;
    use crate::protocol::{HEIGHT, WIDTH};

    impl DrawTarget for PanelFrame {
        type Color = BinaryColor;
        type Error = Infallible;

        fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
        where
            I: IntoIterator<Item = Pixel<Self::Color>>,
        {
            for Pixel(point, color) in pixels {
                if let (Ok(x), Ok(y)) = (usize::try_from(point.x), usize::try_from(point.y)) {
                    let _ = self.set_pixel(x, y, color.is_on());
                }
            }
            Ok(())
        }
    }

    impl OriginDimensions for PanelFrame {
        fn size(&self) -> Size {
            Size::new(WIDTH as u32, HEIGHT as u32)
        }
    }
}
