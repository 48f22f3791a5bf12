use embassy_futures::block_on;

use super::*;
use crate::testing::FakeClock;

const CREDENTIALS: WifiConfig = WifiConfig::new("studio", "hunter2");
const POLICY: PollPolicy = PollPolicy::new(500, 20);

/// Reports `Connected` once `connect_after_polls` status reads have happened
/// during the attempt numbered `connect_on_attempt`.
struct ScriptedRadio {
    initially_connected: bool,
    connect_on_attempt: u32,
    connect_after_polls: u32,
    fail_begin_on: Option<u32>,
    failed_status_on: Option<u32>,
    begins: u32,
    polls_this_attempt: u32,
    connected: bool,
}

impl ScriptedRadio {
    fn new(connect_on_attempt: u32, connect_after_polls: u32) -> Self {
        Self {
            initially_connected: false,
            connect_on_attempt,
            connect_after_polls,
            fail_begin_on: None,
            failed_status_on: None,
            begins: 0,
            polls_this_attempt: 0,
            connected: false,
        }
    }

    fn already_connected() -> Self {
        let mut radio = Self::new(u32::MAX, 0);
        radio.initially_connected = true;
        radio.connected = true;
        radio
    }
}

impl Association for ScriptedRadio {
    type Error = &'static str;

    fn begin(&mut self, credentials: &WifiConfig) -> Result<(), Self::Error> {
        assert_eq!(credentials.ssid, "studio");
        self.begins += 1;
        self.polls_this_attempt = 0;
        if self.fail_begin_on == Some(self.begins) {
            return Err("radio busy");
        }
        Ok(())
    }

    fn status(&mut self) -> ConnectionStatus {
        if self.connected {
            return ConnectionStatus::Connected;
        }
        if self.begins == 0 {
            return ConnectionStatus::Idle;
        }

        self.polls_this_attempt += 1;
        if self.failed_status_on == Some(self.begins) {
            return ConnectionStatus::Failed;
        }
        if self.begins == self.connect_on_attempt
            && self.polls_this_attempt >= self.connect_after_polls
        {
            self.connected = true;
            return ConnectionStatus::Connected;
        }
        ConnectionStatus::Idle
    }

    fn link_info(&mut self) -> Option<LinkInfo> {
        self.connected
            .then(|| LinkInfo::new("studio", Ipv4Addr::new(192, 168, 4, 7)))
    }
}

#[test]
fn connects_during_first_attempt() {
    let mut radio = ScriptedRadio::new(1, 3);
    let mut clock = FakeClock::default();
    let mut manager = ConnectivityManager::new(POLICY);

    let link = block_on(manager.connect(&mut radio, &mut clock, &CREDENTIALS));

    assert_eq!(link.ssid.as_str(), "studio");
    assert_eq!(link.address, Ipv4Addr::new(192, 168, 4, 7));
    assert_eq!(radio.begins, 1);
    assert_eq!(clock.sleeps, vec![500, 500, 500]);
    assert_eq!(manager.state(), ConnectState::Connected);
    assert_eq!(manager.status(), ConnectionStatus::Connected);
    assert_eq!(manager.link_info(), Some(&link));
}

#[test]
fn abandons_attempt_after_poll_budget_and_retries() {
    let mut radio = ScriptedRadio::new(3, 2);
    let mut clock = FakeClock::default();
    let mut manager = ConnectivityManager::new(POLICY);

    block_on(manager.connect(&mut radio, &mut clock, &CREDENTIALS));

    assert_eq!(radio.begins, 3);
    assert_eq!(manager.attempts(), 3);
    // Two full 20-poll windows, then two polls into the third attempt.
    assert_eq!(clock.sleeps.len(), 42);
    assert_eq!(clock.total_ms(), 42 * 500);
}

#[test]
fn already_connected_radio_skips_association() {
    let mut radio = ScriptedRadio::already_connected();
    let mut clock = FakeClock::default();
    let mut manager = ConnectivityManager::new(POLICY);

    block_on(manager.connect(&mut radio, &mut clock, &CREDENTIALS));
    block_on(manager.connect(&mut radio, &mut clock, &CREDENTIALS));

    assert!(radio.initially_connected);
    assert_eq!(radio.begins, 0);
    assert!(clock.sleeps.is_empty());
    assert_eq!(manager.attempts(), 0);
    assert_eq!(manager.state(), ConnectState::Connected);
}

#[test]
fn second_connect_after_success_returns_immediately() {
    let mut radio = ScriptedRadio::new(1, 1);
    let mut clock = FakeClock::default();
    let mut manager = ConnectivityManager::new(POLICY);

    block_on(manager.connect(&mut radio, &mut clock, &CREDENTIALS));
    let sleeps_after_first = clock.sleeps.len();
    block_on(manager.connect(&mut radio, &mut clock, &CREDENTIALS));

    assert_eq!(radio.begins, 1);
    assert_eq!(clock.sleeps.len(), sleeps_after_first);
}

#[test]
fn failed_begin_waits_one_interval_then_retries() {
    let mut radio = ScriptedRadio::new(2, 1);
    radio.fail_begin_on = Some(1);
    let mut clock = FakeClock::default();
    let mut manager = ConnectivityManager::new(POLICY);

    let mut progress = Vec::new();
    block_on(
        manager.connect_with(&mut radio, &mut clock, &CREDENTIALS, |event| {
            progress.push(event)
        }),
    );

    assert_eq!(radio.begins, 2);
    assert_eq!(clock.sleeps, vec![500, 500]);
    assert_eq!(
        progress,
        vec![
            ConnectProgress::AttemptStarted { attempt: 1 },
            ConnectProgress::AttemptAbandoned {
                attempt: 1,
                status: ConnectionStatus::Failed,
            },
            ConnectProgress::AttemptStarted { attempt: 2 },
            ConnectProgress::Connected { attempts: 2 },
        ]
    );
}

#[test]
fn slow_association_gets_the_whole_poll_window() {
    let mut radio = ScriptedRadio::new(1, POLICY.max_polls as u32);
    let mut clock = FakeClock::default();
    let mut manager = ConnectivityManager::new(POLICY);

    block_on(manager.connect(&mut radio, &mut clock, &CREDENTIALS));

    assert_eq!(radio.begins, 1);
    assert_eq!(manager.attempts(), 1);
    assert_eq!(clock.total_ms(), POLICY.window_ms());
}

#[test]
fn link_readings_only_connect_when_all_are_up() {
    use ConnectionStatus::{Connected, Idle};
    let status = ConnectionStatus::from_link;

    assert_eq!(status(true, true, true), Connected);
    assert_eq!(status(true, true, false), Idle);
    assert_eq!(status(true, false, true), Idle);
    // A station that is not associated yet, or cannot be queried, keeps polling.
    assert_eq!(status(false, true, true), Idle);
    assert_eq!(status(false, false, false), Idle);
}

#[test]
fn failed_status_cuts_attempt_short() {
    let mut radio = ScriptedRadio::new(2, 1);
    radio.failed_status_on = Some(1);
    let mut clock = FakeClock::default();
    let mut manager = ConnectivityManager::new(POLICY);

    block_on(manager.connect(&mut radio, &mut clock, &CREDENTIALS));

    assert_eq!(radio.begins, 2);
    // One poll in the failed attempt, one in the successful one.
    assert_eq!(clock.sleeps.len(), 2);
}

#[test]
fn missing_link_report_falls_back_to_requested_ssid() {
    struct Bare;

    impl Association for Bare {
        type Error = ();

        fn begin(&mut self, _credentials: &WifiConfig) -> Result<(), Self::Error> {
            Ok(())
        }

        fn status(&mut self) -> ConnectionStatus {
            ConnectionStatus::Connected
        }

        fn link_info(&mut self) -> Option<LinkInfo> {
            None
        }
    }

    let mut clock = FakeClock::default();
    let mut manager = ConnectivityManager::new(POLICY);
    let link = block_on(manager.connect(&mut Bare, &mut clock, &CREDENTIALS));

    assert_eq!(link.ssid.as_str(), "studio");
    assert_eq!(link.address, Ipv4Addr::UNSPECIFIED);
}

#[test]
fn long_ssid_is_truncated() {
    let long = "a-very-long-network-name-that-keeps-going";
    let link = LinkInfo::new(long, Ipv4Addr::LOCALHOST);
    assert_eq!(link.ssid.len(), SSID_BYTES);
    assert!(long.starts_with(link.ssid.as_str()));
}
