//! Display view models and the output sinks the control loop talks to.

use core::net::Ipv4Addr;

use crate::{config::ToggleRoute, reply::MicState};

pub const CAPTION_BOOT: &str = "MIC TOGGLE";
pub const CAPTION_CONNECTING: &str = "CONNECTING...";
pub const CAPTION_READY: &str = "READY";
pub const CAPTION_WORKING: &str = "WORKING...";
pub const CAPTION_FAILED: &str = "REQUEST FAILED";
pub const CAPTION_POWERING_OFF: &str = "POWERING OFF";

/// Everything the display can be asked to show.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Screen<'a> {
    Boot {
        route: ToggleRoute,
    },
    Connecting {
        ssid: &'a str,
        attempt: u32,
    },
    Ready {
        ssid: &'a str,
        address: Ipv4Addr,
        route: ToggleRoute,
    },
    Working,
    Reply {
        state: MicState,
        text: &'a str,
    },
    Failed,
    PoweringOff,
}

impl Screen<'_> {
    pub const fn caption(&self) -> &'static str {
        match self {
            Self::Boot { .. } => CAPTION_BOOT,
            Self::Connecting { .. } => CAPTION_CONNECTING,
            Self::Ready { .. } => CAPTION_READY,
            Self::Working => CAPTION_WORKING,
            Self::Reply { state, .. } => state.caption(),
            Self::Failed => CAPTION_FAILED,
            Self::PoweringOff => CAPTION_POWERING_OFF,
        }
    }
}

/// Fire-and-forget text output.
pub trait DisplaySink {
    fn show(&mut self, screen: Screen<'_>);
}
