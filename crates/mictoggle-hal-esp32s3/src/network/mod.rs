//! Wi-Fi association, TCP transport and timer adapters for the core traits.

mod tcp;
mod wifi;

use embassy_time::Timer;
use mictoggle_core::time::Clock;

pub use tcp::{TcpConnection, TcpTransport, TcpTransportError};
pub use wifi::WifiAssociation;

/// [`Clock`] backed by the embassy timer queue.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmbassyClock;

impl Clock for EmbassyClock {
    async fn sleep_ms(&mut self, ms: u32) {
        Timer::after_millis(ms as u64).await;
    }
}
