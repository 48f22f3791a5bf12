use embedded_hal::{delay::DelayNs, digital::OutputPin, spi::SpiBus};

use crate::{
    PanelFrame,
    protocol::{BURST_TRAILER, Command, Vcom, clear_packet},
};

const POWER_ON_SETTLE_US: u32 = 60;
const CS_SETUP_NS: u32 = 3_000;
const CS_HOLD_NS: u32 = 1_000;
const CLEAR_HOLD_NS: u32 = 220_000;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum PanelError<SpiErr, PinErr> {
    Spi(SpiErr),
    Pin(PinErr),
}

/// Board-level driver: DISP enables output, EMD low selects VCOM in the
/// command header, CS is active high.
#[derive(Debug)]
pub struct SharpPanel<SPI, DISP, EMD, CS> {
    spi: SPI,
    disp: DISP,
    emd: EMD,
    cs: CS,
    vcom: Vcom,
}

impl<SPI, DISP, EMD, CS> SharpPanel<SPI, DISP, EMD, CS>
where
    SPI: SpiBus<u8>,
    DISP: OutputPin,
    EMD: OutputPin<Error = DISP::Error>,
    CS: OutputPin<Error = DISP::Error>,
{
    pub fn new(spi: SPI, disp: DISP, emd: EMD, cs: CS) -> Self {
        Self {
            spi,
            disp,
            emd,
            cs,
            vcom: Vcom::default(),
        }
    }

    pub fn initialize<D: DelayNs>(
        &mut self,
        delay: &mut D,
    ) -> Result<(), PanelError<SPI::Error, DISP::Error>> {
        self.disp.set_high().map_err(PanelError::Pin)?;
        self.emd.set_low().map_err(PanelError::Pin)?;
        self.cs.set_low().map_err(PanelError::Pin)?;
        delay.delay_us(POWER_ON_SETTLE_US);
        Ok(())
    }

    pub fn clear_all<D: DelayNs>(
        &mut self,
        delay: &mut D,
    ) -> Result<(), PanelError<SPI::Error, DISP::Error>> {
        let packet = clear_packet(self.vcom.advance());
        self.selected(delay, CLEAR_HOLD_NS, |spi| spi.write(&packet))
    }

    /// Writes every line of `frame` in one burst.
    pub fn flush_frame<D: DelayNs>(
        &mut self,
        frame: &PanelFrame,
        delay: &mut D,
    ) -> Result<(), PanelError<SPI::Error, DISP::Error>> {
        let header = Command::WriteLines.header(self.vcom.advance());
        self.selected(delay, CS_HOLD_NS, |spi| {
            spi.write(&[header])?;
            for packet in frame.row_packets() {
                spi.write(&packet)?;
            }
            spi.write(&[BURST_TRAILER])
        })
    }

    /// Runs `transfer` with CS asserted. CS is released even when the
    /// transfer fails.
    fn selected<D, F>(
        &mut self,
        delay: &mut D,
        hold_ns: u32,
        transfer: F,
    ) -> Result<(), PanelError<SPI::Error, DISP::Error>>
    where
        D: DelayNs,
        F: FnOnce(&mut SPI) -> Result<(), SPI::Error>,
    {
        self.cs.set_high().map_err(PanelError::Pin)?;
        delay.delay_ns(CS_SETUP_NS);

        let sent = transfer(&mut self.spi).and_then(|()| self.spi.flush());
        delay.delay_ns(hold_ns);
        let released = self.cs.set_low().map_err(PanelError::Pin);

        sent.map_err(PanelError::Spi)?;
        released
    }
}
