//! Single control loop: sample buttons, run the exchange or power off, idle.

use core::fmt::Debug;

use log::{info, warn};

use crate::{
    config::DeviceConfig,
    exchange::{Exchange, Transport},
    input::{ButtonEdges, ButtonEvent, ButtonSource},
    render::{DisplaySink, Screen},
    reply::MicState,
    time::Clock,
};

/// Irreversible power-down.
pub trait PowerSink {
    fn power_off(&mut self) -> !;
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TickResult {
    Idle,
    Exchanged,
    PowerOffRequested,
}

pub struct ControlLoop<const N: usize> {
    exchange: Exchange<N>,
    idle_tick_ms: u32,
    exchanges: u32,
    failures: u32,
}

impl<const N: usize> ControlLoop<N> {
    pub const fn new(exchange: Exchange<N>, idle_tick_ms: u32) -> Self {
        Self {
            exchange,
            idle_tick_ms,
            exchanges: 0,
            failures: 0,
        }
    }

    pub fn from_config(config: &DeviceConfig) -> Self {
        Self::new(Exchange::from_config(config), config.idle_tick_ms)
    }

    pub fn exchange(&self) -> &Exchange<N> {
        &self.exchange
    }

    pub fn exchanges(&self) -> u32 {
        self.exchanges
    }

    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// One loop iteration.
    ///
    /// Both edges in the same sample are handled A first, then B. Only an
    /// idle tick sleeps; an exchange already took its own time.
    pub async fn tick<B, T, C, D>(
        &mut self,
        buttons: &mut B,
        transport: &mut T,
        clock: &mut C,
        display: &mut D,
    ) -> TickResult
    where
        B: ButtonSource,
        B::Error: Debug,
        T: Transport,
        C: Clock,
        D: DisplaySink,
    {
        let edges = match buttons.sample() {
            Ok(edges) => edges,
            Err(err) => {
                warn!("button sample failed: {:?}", err);
                ButtonEdges::NONE
            }
        };

        let mut result = TickResult::Idle;
        for event in edges.events() {
            match event {
                ButtonEvent::PressedA => {
                    self.trigger(transport, clock, display).await;
                    result = TickResult::Exchanged;
                }
                ButtonEvent::PressedB => {
                    info!("power button pressed after {} exchanges", self.exchanges);
                    display.show(Screen::PoweringOff);
                    return TickResult::PowerOffRequested;
                }
                ButtonEvent::None => {}
            }
        }

        if result == TickResult::Idle {
            clock.sleep_ms(self.idle_tick_ms).await;
        }
        result
    }

    /// Runs ticks until the power button, then hands over to `power`.
    pub async fn run<B, T, C, D, P>(
        &mut self,
        buttons: &mut B,
        transport: &mut T,
        clock: &mut C,
        display: &mut D,
        power: &mut P,
    ) -> !
    where
        B: ButtonSource,
        B::Error: Debug,
        T: Transport,
        C: Clock,
        D: DisplaySink,
        P: PowerSink,
    {
        loop {
            if self.tick(buttons, transport, clock, display).await == TickResult::PowerOffRequested
            {
                power.power_off();
            }
        }
    }

    async fn trigger<T, C, D>(&mut self, transport: &mut T, clock: &mut C, display: &mut D)
    where
        T: Transport,
        C: Clock,
        D: DisplaySink,
    {
        display.show(Screen::Working);
        self.exchanges = self.exchanges.saturating_add(1);

        match self.exchange.toggle(transport, clock).await {
            Ok(text) => {
                let state = MicState::classify(text);
                info!(
                    "toggle #{} reply={:?} state={:?}",
                    self.exchanges, text, state
                );
                display.show(Screen::Reply { state, text });
            }
            Err(err) => {
                self.failures = self.failures.saturating_add(1);
                warn!(
                    "toggle #{} failed: {:?} (failures={})",
                    self.exchanges, err, self.failures
                );
                display.show(Screen::Failed);
            }
        }
    }
}

#[cfg(test)]
mod tests;
