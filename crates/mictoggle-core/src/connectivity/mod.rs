//! Network association gate run once at startup.
//!
//! The manager keeps re-issuing association attempts until the link is
//! confirmed. There is no give-up path: the device has nothing useful to do
//! without the network.

use core::{fmt::Debug, net::Ipv4Addr};

use heapless::String as HeaplessString;
use log::{debug, info, warn};

use crate::{
    config::{PollPolicy, WifiConfig},
    time::Clock,
};

pub const SSID_BYTES: usize = 32;

/// Association state reported by the radio.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConnectionStatus {
    Idle,
    Connected,
    Failed,
}

impl ConnectionStatus {
    /// Folds station and interface readings into a status. An association
    /// still in flight, or a radio that cannot answer yet, reads as `Idle`;
    /// `Failed` is reserved for drivers that report an explicit rejection.
    pub const fn from_link(associated: bool, link_up: bool, addressed: bool) -> Self {
        if associated && link_up && addressed {
            Self::Connected
        } else {
            Self::Idle
        }
    }
}

/// Read-only diagnostics exposed once connected.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LinkInfo {
    pub ssid: HeaplessString<SSID_BYTES>,
    pub address: Ipv4Addr,
}

impl LinkInfo {
    /// SSIDs longer than [`SSID_BYTES`] are cut on a char boundary.
    pub fn new(ssid: &str, address: Ipv4Addr) -> Self {
        let mut stored = HeaplessString::new();
        for ch in ssid.chars() {
            if stored.push(ch).is_err() {
                break;
            }
        }

        Self {
            ssid: stored,
            address,
        }
    }
}

/// Radio-side association driver.
pub trait Association {
    type Error: Debug;

    /// Kicks off one association attempt. Must not wait for the link.
    fn begin(&mut self, credentials: &WifiConfig) -> Result<(), Self::Error>;

    fn status(&mut self) -> ConnectionStatus;

    fn link_info(&mut self) -> Option<LinkInfo>;
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConnectState {
    Connecting { attempt: u32, polls: u16 },
    Connected,
}

/// Progress notifications for the boot screen.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConnectProgress {
    AttemptStarted {
        attempt: u32,
    },
    AttemptAbandoned {
        attempt: u32,
        status: ConnectionStatus,
    },
    Connected {
        attempts: u32,
    },
}

pub struct ConnectivityManager {
    policy: PollPolicy,
    state: ConnectState,
    status: ConnectionStatus,
    attempts: u32,
    link: Option<LinkInfo>,
}

impl ConnectivityManager {
    pub const fn new(policy: PollPolicy) -> Self {
        Self {
            policy,
            state: ConnectState::Connecting {
                attempt: 0,
                polls: 0,
            },
            status: ConnectionStatus::Idle,
            attempts: 0,
            link: None,
        }
    }

    pub fn state(&self) -> ConnectState {
        self.state
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    /// Association attempts issued so far, across all `connect` calls.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn link_info(&self) -> Option<&LinkInfo> {
        self.link.as_ref()
    }

    /// Blocks until the radio reports a confirmed connection.
    pub async fn connect<A, C>(
        &mut self,
        radio: &mut A,
        clock: &mut C,
        credentials: &WifiConfig,
    ) -> LinkInfo
    where
        A: Association,
        C: Clock,
    {
        self.connect_with(radio, clock, credentials, |_| {}).await
    }

    /// Same as [`Self::connect`], reporting each attempt to `observe`.
    pub async fn connect_with<A, C, F>(
        &mut self,
        radio: &mut A,
        clock: &mut C,
        credentials: &WifiConfig,
        mut observe: F,
    ) -> LinkInfo
    where
        A: Association,
        C: Clock,
        F: FnMut(ConnectProgress),
    {
        loop {
            if self.refresh(radio) == ConnectionStatus::Connected {
                return self.finish(radio, credentials, &mut observe);
            }

            self.attempts = self.attempts.saturating_add(1);
            let attempt = self.attempts;
            self.state = ConnectState::Connecting { attempt, polls: 0 };
            observe(ConnectProgress::AttemptStarted { attempt });
            info!("wifi attempt={} ssid={}", attempt, credentials.ssid);

            if let Err(err) = radio.begin(credentials) {
                warn!("wifi attempt={} begin failed: {:?}", attempt, err);
                self.status = ConnectionStatus::Failed;
                observe(ConnectProgress::AttemptAbandoned {
                    attempt,
                    status: ConnectionStatus::Failed,
                });
                clock.sleep_ms(self.policy.interval_ms).await;
                continue;
            }

            let mut polls = 0u16;
            while polls < self.policy.max_polls {
                clock.sleep_ms(self.policy.interval_ms).await;
                polls += 1;
                self.state = ConnectState::Connecting { attempt, polls };

                match self.refresh(radio) {
                    ConnectionStatus::Connected => {
                        return self.finish(radio, credentials, &mut observe);
                    }
                    ConnectionStatus::Failed => break,
                    ConnectionStatus::Idle => {
                        debug!("wifi attempt={} poll={} still idle", attempt, polls);
                    }
                }
            }

            warn!(
                "wifi attempt={} polls={} status={:?}; restarting association",
                attempt, polls, self.status
            );
            observe(ConnectProgress::AttemptAbandoned {
                attempt,
                status: self.status,
            });
        }
    }

    fn refresh<A: Association>(&mut self, radio: &mut A) -> ConnectionStatus {
        self.status = radio.status();
        self.status
    }

    fn finish<A, F>(&mut self, radio: &mut A, credentials: &WifiConfig, observe: &mut F) -> LinkInfo
    where
        A: Association,
        F: FnMut(ConnectProgress),
    {
        // A link without an address report still counts; show the SSID we asked for.
        let link = radio
            .link_info()
            .unwrap_or_else(|| LinkInfo::new(credentials.ssid, Ipv4Addr::UNSPECIFIED));

        info!(
            "wifi connected ssid={} address={} attempts={}",
            link.ssid, link.address, self.attempts
        );
        self.state = ConnectState::Connected;
        self.link = Some(link.clone());
        observe(ConnectProgress::Connected {
            attempts: self.attempts,
        });
        link
    }
}

#[cfg(test)]
mod tests;
