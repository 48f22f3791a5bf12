use embedded_hal::delay::DelayNs;
use esp_hal::{
    delay::Delay,
    gpio::{Level, Output, OutputConfig, RtcPin},
    peripherals::{GPIO2, GPIO12, LPWR},
    rtc_cntl::{
        Rtc,
        sleep::{RtcioWakeupSource, WakeupLevel},
    },
};
use log::info;
use mictoggle_core::control::PowerSink;

/// Time the "powering off" frame stays up before the panel is blanked.
const POWER_OFF_NOTICE_MS: u32 = 400;

/// Deep sleep with the toggle button (GPIO12, active low) as the only wake source.
///
/// Waking restarts the firmware from boot, so the network is joined again.
pub(super) struct DeepSleepPower {
    delay: Delay,
}

impl DeepSleepPower {
    pub(super) fn new() -> Self {
        Self {
            delay: Delay::new(),
        }
    }
}

impl PowerSink for DeepSleepPower {
    fn power_off(&mut self) -> ! {
        self.delay.delay_ms(POWER_OFF_NOTICE_MS);
        info!("power: entering deep sleep; press A to wake");

        // The panel driver is still borrowed by the display sink, so DISP is
        // driven low through a fresh handle and latched through deep sleep.
        let _disp = Output::new(unsafe { GPIO2::steal() }, Level::Low, OutputConfig::default());
        let disp_hold = unsafe { GPIO2::steal() };
        disp_hold.rtcio_pad_hold(true);

        let mut rtc = Rtc::new(unsafe { LPWR::steal() });
        let mut wake_button = unsafe { GPIO12::steal() };
        let mut wake_pins: [(&mut dyn RtcPin, WakeupLevel); 1] =
            [(&mut wake_button, WakeupLevel::Low)];
        let wake_source = RtcioWakeupSource::new(&mut wake_pins);

        rtc.sleep_deep(&[&wake_source]);
    }
}
