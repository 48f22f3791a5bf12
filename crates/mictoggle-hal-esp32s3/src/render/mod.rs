pub mod text;

use embedded_hal::{delay::DelayNs, digital::OutputPin, spi::SpiBus};
use log::{info, warn};
use mictoggle_core::render::{DisplaySink, Screen};

use sharp_memlcd::{PanelFrame, SharpPanel};

pub trait FrameRenderer {
    fn render(&mut self, screen: Screen<'_>, frame: &mut PanelFrame);
}

/// Renders each screen into an owned frame and pushes it to the panel.
pub struct PanelSink<R, SPI, DISP, EMD, CS, D> {
    renderer: R,
    panel: SharpPanel<SPI, DISP, EMD, CS>,
    frame: PanelFrame,
    delay: D,
    fault_logged: bool,
    flushes: u32,
}

impl<R, SPI, DISP, EMD, CS, D> PanelSink<R, SPI, DISP, EMD, CS, D>
where
    R: FrameRenderer,
    SPI: SpiBus<u8>,
    DISP: OutputPin,
    EMD: OutputPin<Error = DISP::Error>,
    CS: OutputPin<Error = DISP::Error>,
    D: DelayNs,
{
    pub fn new(renderer: R, panel: SharpPanel<SPI, DISP, EMD, CS>, delay: D) -> Self {
        Self {
            renderer,
            panel,
            frame: PanelFrame::new(),
            delay,
            fault_logged: false,
            flushes: 0,
        }
    }
}

impl<R, SPI, DISP, EMD, CS, D> DisplaySink for PanelSink<R, SPI, DISP, EMD, CS, D>
where
    R: FrameRenderer,
    SPI: SpiBus<u8>,
    DISP: OutputPin,
    EMD: OutputPin<Error = DISP::Error>,
    CS: OutputPin<Error = DISP::Error>,
    D: DelayNs,
{
    fn show(&mut self, screen: Screen<'_>) {
        self.renderer.render(screen, &mut self.frame);

        match self.panel.flush_frame(&self.frame, &mut self.delay) {
            Ok(()) => {
                if self.flushes == 0 {
                    info!("display first flush ok");
                }
                self.flushes = self.flushes.saturating_add(1);
            }
            Err(err) => {
                if !self.fault_logged {
                    warn!("display flush failed: {:?}", err);
                    self.fault_logged = true;
                }
            }
        }
    }
}
