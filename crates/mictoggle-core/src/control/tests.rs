use core::net::Ipv4Addr;
use std::collections::VecDeque;

use embassy_futures::block_on;

use super::*;
use crate::{
    config::{Endpoint, PollPolicy, RESPONSE_CAPACITY, ToggleRoute, WifiConfig},
    input::mock::MockButtons,
    testing::{FakeClock, ScriptedTransport},
};

const LIVE_REPLY: &[u8] = b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\n\r\nLive";

type Sample = Result<ButtonEdges, &'static str>;

#[derive(Default)]
struct ScriptedButtons {
    samples: VecDeque<Sample>,
}

impl ScriptedButtons {
    fn new(samples: impl IntoIterator<Item = Sample>) -> Self {
        Self {
            samples: samples.into_iter().collect(),
        }
    }
}

impl ButtonSource for ScriptedButtons {
    type Error = &'static str;

    fn sample(&mut self) -> Result<ButtonEdges, Self::Error> {
        self.samples.pop_front().unwrap_or(Ok(ButtonEdges::NONE))
    }
}

#[derive(Default)]
struct RecordingDisplay {
    shown: Vec<(&'static str, String)>,
}

impl RecordingDisplay {
    fn captions(&self) -> Vec<&'static str> {
        self.shown.iter().map(|(caption, _)| *caption).collect()
    }
}

impl DisplaySink for RecordingDisplay {
    fn show(&mut self, screen: Screen<'_>) {
        let text = match screen {
            Screen::Reply { text, .. } => text.to_owned(),
            _ => String::new(),
        };
        self.shown.push((screen.caption(), text));
    }
}

struct Bench<B> {
    buttons: B,
    transport: ScriptedTransport,
    clock: FakeClock,
    display: RecordingDisplay,
}

impl<B: ButtonSource> Bench<B>
where
    B::Error: core::fmt::Debug,
{
    fn new(buttons: B, transport: ScriptedTransport) -> Self {
        Self {
            buttons,
            transport,
            clock: FakeClock::default(),
            display: RecordingDisplay::default(),
        }
    }

    fn tick(&mut self, control: &mut ControlLoop<RESPONSE_CAPACITY>) -> TickResult {
        block_on(control.tick(
            &mut self.buttons,
            &mut self.transport,
            &mut self.clock,
            &mut self.display,
        ))
    }
}

fn pressing(samples: impl IntoIterator<Item = Sample>) -> Bench<ScriptedButtons> {
    let buttons = ScriptedButtons::new(samples);
    Bench::new(buttons, ScriptedTransport::replying(LIVE_REPLY))
}

fn control() -> ControlLoop<RESPONSE_CAPACITY> {
    ControlLoop::new(
        Exchange::new(
            Endpoint::new(Ipv4Addr::new(10, 0, 0, 2), 8080),
            ToggleRoute::Bluetooth.request(),
            PollPolicy::new(10, 50),
        ),
        20,
    )
}

#[test]
fn idle_tick_only_sleeps() {
    let mut bench = Bench::new(MockButtons::new(), ScriptedTransport::replying(LIVE_REPLY));
    let mut control = control();

    let result = bench.tick(&mut control);

    assert_eq!(result, TickResult::Idle);
    assert_eq!(bench.clock.sleeps, vec![20]);
    assert!(bench.transport.opened.is_empty());
    assert!(bench.display.shown.is_empty());
}

#[test]
fn button_a_runs_one_exchange_and_shows_reply() {
    let mut bench = pressing([Ok(ButtonEdges::new(true, false))]);
    let mut control = control();

    let result = bench.tick(&mut control);

    assert_eq!(result, TickResult::Exchanged);
    assert_eq!(bench.transport.opened.len(), 1);
    assert_eq!(bench.transport.closes, 1);
    assert_eq!(
        bench.display.shown,
        vec![
            ("WORKING...", String::new()),
            ("MIC LIVE", "Live".to_owned()),
        ]
    );
    assert_eq!(control.exchanges(), 1);
    assert_eq!(control.failures(), 0);
    assert!(bench.clock.sleeps.is_empty());
}

#[test]
fn unrecognised_reply_is_shown_verbatim() {
    let mut bench = pressing([Ok(ButtonEdges::new(true, false))]);
    bench.transport = ScriptedTransport::replying(b"HTTP/1.1 200 OK\r\n\r\nmic=BT");
    let mut control = control();

    bench.tick(&mut control);

    let expected = ("REPLY", "mic=BT".to_owned());
    assert_eq!(bench.display.shown.last(), Some(&expected));
}

#[test]
fn connect_failure_is_reported_and_loop_continues() {
    let mut bench = pressing([
        Ok(ButtonEdges::new(true, false)),
        Ok(ButtonEdges::NONE),
        Ok(ButtonEdges::new(true, false)),
    ]);
    bench.transport = ScriptedTransport::refusing();
    let mut control = control();

    let results: Vec<_> = (0..3).map(|_| bench.tick(&mut control)).collect();

    assert_eq!(
        results,
        vec![
            TickResult::Exchanged,
            TickResult::Idle,
            TickResult::Exchanged,
        ]
    );
    assert_eq!(
        bench.display.captions(),
        vec![
            "WORKING...",
            "REQUEST FAILED",
            "WORKING...",
            "REQUEST FAILED",
        ]
    );
    assert_eq!(control.exchanges(), 2);
    assert_eq!(control.failures(), 2);
    assert_eq!(bench.clock.sleeps, vec![20]);
}

#[test]
fn button_b_requests_power_off_without_network() {
    let mut bench = pressing([Ok(ButtonEdges::new(false, true))]);
    let mut control = control();

    let result = bench.tick(&mut control);

    assert_eq!(result, TickResult::PowerOffRequested);
    assert!(bench.transport.opened.is_empty());
    assert_eq!(bench.display.captions(), vec!["POWERING OFF"]);
    assert!(bench.clock.sleeps.is_empty());
}

#[test]
fn both_edges_toggle_before_powering_off() {
    let mut bench = pressing([Ok(ButtonEdges::new(true, true))]);
    let mut control = control();

    let result = bench.tick(&mut control);

    assert_eq!(result, TickResult::PowerOffRequested);
    assert_eq!(bench.transport.opened.len(), 1);
    assert_eq!(
        bench.display.captions(),
        vec!["WORKING...", "MIC LIVE", "POWERING OFF"]
    );
}

#[test]
fn sample_error_counts_as_idle() {
    let mut bench = pressing([Err("gpio fault")]);
    let mut control = control();

    let result = bench.tick(&mut control);

    assert_eq!(result, TickResult::Idle);
    assert_eq!(bench.clock.sleeps, vec![20]);
    assert!(bench.display.shown.is_empty());
}

#[test]
fn each_press_opens_a_fresh_connection() {
    let mut bench = pressing([
        Ok(ButtonEdges::new(true, false)),
        Ok(ButtonEdges::new(true, false)),
    ]);
    let mut control = control();

    for _ in 0..2 {
        bench.tick(&mut control);
    }

    let request_len = ToggleRoute::Bluetooth.request().as_bytes().len();
    assert_eq!(bench.transport.opened.len(), 2);
    assert_eq!(bench.transport.closes, 2);
    assert_eq!(bench.transport.written.len(), 2 * request_len);
    assert_eq!(control.exchange().last_reply(), "Live");
}

#[test]
fn from_config_uses_configured_idle_tick() {
    let config = DeviceConfig::new(
        WifiConfig::new("studio", "secret"),
        Endpoint::new(Ipv4Addr::new(10, 0, 0, 2), 8080),
        ToggleRoute::Bluetooth,
    )
    .with_idle_tick_ms(35);
    let mut control = ControlLoop::<RESPONSE_CAPACITY>::from_config(&config);
    let buttons = ScriptedButtons::default();
    let mut bench = Bench::new(buttons, ScriptedTransport::replying(LIVE_REPLY));

    bench.tick(&mut control);

    assert_eq!(bench.clock.sleeps, vec![35]);
}
