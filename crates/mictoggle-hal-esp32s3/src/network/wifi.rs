use embassy_net::Stack;
use esp_radio::wifi::{ClientConfig, ModeConfig, WifiController, WifiError};
use log::{debug, info};
use mictoggle_core::{
    config::WifiConfig,
    connectivity::{Association, ConnectionStatus, LinkInfo},
};

/// Station-mode association over the esp-radio controller.
///
/// The link only counts as connected once the radio reports association,
/// the interface is up and DHCP handed out an IPv4 address.
pub struct WifiAssociation<'a, 'd> {
    controller: &'a mut WifiController<'d>,
    stack: Stack<'d>,
    ssid: Option<&'static str>,
    configured: bool,
}

impl<'a, 'd> WifiAssociation<'a, 'd> {
    pub fn new(controller: &'a mut WifiController<'d>, stack: Stack<'d>) -> Self {
        Self {
            controller,
            stack,
            ssid: None,
            configured: false,
        }
    }

    fn configure(&mut self, credentials: &WifiConfig) -> Result<(), WifiError> {
        let client_config = ClientConfig::default()
            .with_ssid(credentials.ssid.into())
            .with_password(credentials.password.into());
        self.controller
            .set_config(&ModeConfig::Client(client_config))?;
        self.configured = true;
        Ok(())
    }
}

impl Association for WifiAssociation<'_, '_> {
    type Error = WifiError;

    fn begin(&mut self, credentials: &WifiConfig) -> Result<(), Self::Error> {
        let started = self.controller.is_started().unwrap_or(false);
        if started {
            // Drop whatever half-finished association the previous attempt left.
            let _ = self.controller.disconnect();
        }

        if !self.configured || self.ssid != Some(credentials.ssid) {
            self.configure(credentials)?;
        }
        self.ssid = Some(credentials.ssid);

        if !started {
            info!("wifi starting station");
            self.controller.start()?;
        }

        debug!("wifi connect ssid={}", credentials.ssid);
        self.controller.connect()
    }

    fn status(&mut self) -> ConnectionStatus {
        // The controller answers with an error while the station is still
        // disconnected; that is an association in progress, not a failure.
        let associated = matches!(self.controller.is_connected(), Ok(true));
        ConnectionStatus::from_link(
            associated,
            self.stack.is_link_up(),
            self.stack.config_v4().is_some(),
        )
    }

    fn link_info(&mut self) -> Option<LinkInfo> {
        let config = self.stack.config_v4()?;
        Some(LinkInfo::new(
            self.ssid.unwrap_or_default(),
            config.address.address(),
        ))
    }
}
