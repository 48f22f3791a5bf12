//! Static device configuration: credentials, endpoint, toggle route and timing.

use core::{fmt, net::Ipv4Addr, str::FromStr};

/// Response buffer capacity, one slot of which is reserved for the terminator.
pub const RESPONSE_CAPACITY: usize = 250;

pub const ASSOCIATION_POLL: PollPolicy = PollPolicy::new(500, 20);
pub const DATA_WAIT_POLL: PollPolicy = PollPolicy::new(10, 50);
pub const IDLE_TICK_MS: u32 = 20;

const TOGGLE_BT_REQUEST: &str = "GET /toggle_bt HTTP/1.1\r\n\r\n";
const TOGGLE_USB_REQUEST: &str = "GET /toggle_usb HTTP/1.1\r\n\r\n";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConfigError {
    InvalidAddress,
    InvalidPort,
    UnknownRoute,
}

/// Wi-Fi credentials source.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct WifiConfig {
    pub ssid: &'static str,
    pub password: &'static str,
}

impl WifiConfig {
    pub const fn new(ssid: &'static str, password: &'static str) -> Self {
        Self { ssid, password }
    }
}

/// Address and port of the toggle service.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Endpoint {
    pub address: Ipv4Addr,
    pub port: u16,
}

impl Endpoint {
    pub const fn new(address: Ipv4Addr, port: u16) -> Self {
        Self { address, port }
    }

    /// Parses the dotted IPv4 address and decimal port baked in at build time.
    pub fn parse(address: &str, port: &str) -> Result<Self, ConfigError> {
        let address =
            Ipv4Addr::from_str(address.trim()).map_err(|_| ConfigError::InvalidAddress)?;
        let port = u16::from_str(port.trim()).map_err(|_| ConfigError::InvalidPort)?;
        if port == 0 {
            return Err(ConfigError::InvalidPort);
        }

        Ok(Self { address, port })
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.address, self.port)
    }
}

/// Which microphone the remote service switches to when un-muting.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ToggleRoute {
    #[default]
    Bluetooth,
    Usb,
}

impl ToggleRoute {
    pub fn parse(name: &str) -> Result<Self, ConfigError> {
        let name = name.trim();
        if name.eq_ignore_ascii_case("bt") || name.eq_ignore_ascii_case("bluetooth") {
            Ok(Self::Bluetooth)
        } else if name.eq_ignore_ascii_case("usb") {
            Ok(Self::Usb)
        } else {
            Err(ConfigError::UnknownRoute)
        }
    }

    pub const fn request(self) -> RequestTemplate {
        match self {
            Self::Bluetooth => RequestTemplate::new(TOGGLE_BT_REQUEST),
            Self::Usb => RequestTemplate::new(TOGGLE_USB_REQUEST),
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Bluetooth => "BT",
            Self::Usb => "USB",
        }
    }
}

/// Immutable request sent on every exchange: a request line followed by a blank line.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RequestTemplate(&'static str);

impl RequestTemplate {
    pub const fn new(raw: &'static str) -> Self {
        Self(raw)
    }

    pub const fn as_bytes(self) -> &'static [u8] {
        self.0.as_bytes()
    }

    pub const fn as_str(self) -> &'static str {
        self.0
    }

    /// First line without its terminator, for logs.
    pub fn request_line(self) -> &'static str {
        self.0.split("\r\n").next().unwrap_or(self.0)
    }
}

/// Fixed-interval bounded polling.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PollPolicy {
    pub interval_ms: u32,
    pub max_polls: u16,
}

impl PollPolicy {
    pub const fn new(interval_ms: u32, max_polls: u16) -> Self {
        Self {
            interval_ms,
            max_polls,
        }
    }

    pub const fn window_ms(self) -> u32 {
        self.interval_ms.saturating_mul(self.max_polls as u32)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DeviceConfig {
    pub wifi: WifiConfig,
    pub endpoint: Endpoint,
    pub route: ToggleRoute,
    pub association: PollPolicy,
    pub data_wait: PollPolicy,
    pub idle_tick_ms: u32,
}

impl DeviceConfig {
    pub const fn new(wifi: WifiConfig, endpoint: Endpoint, route: ToggleRoute) -> Self {
        Self {
            wifi,
            endpoint,
            route,
            association: ASSOCIATION_POLL,
            data_wait: DATA_WAIT_POLL,
            idle_tick_ms: IDLE_TICK_MS,
        }
    }

    pub const fn with_association(mut self, association: PollPolicy) -> Self {
        self.association = association;
        self
    }

    pub const fn with_data_wait(mut self, data_wait: PollPolicy) -> Self {
        self.data_wait = data_wait;
        self
    }

    pub const fn with_idle_tick_ms(mut self, idle_tick_ms: u32) -> Self {
        self.idle_tick_ms = idle_tick_ms;
        self
    }
}
