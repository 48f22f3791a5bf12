//! Button abstraction layer.

mod debounce;
pub mod mock;

pub use debounce::EdgeDetector;

/// One button transition observed in a tick.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ButtonEvent {
    /// Trigger the toggle exchange.
    PressedA,
    /// Power the device off.
    PressedB,
    None,
}

/// Press edges seen since the previous sample.
///
/// Presses that happen while the control loop is busy are not queued; they
/// are simply never sampled.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ButtonEdges {
    pub a: bool,
    pub b: bool,
}

impl ButtonEdges {
    pub const NONE: Self = Self::new(false, false);

    pub const fn new(a: bool, b: bool) -> Self {
        Self { a, b }
    }

    pub const fn any(self) -> bool {
        self.a || self.b
    }

    /// Events in dispatch order: A before B.
    pub fn events(self) -> impl Iterator<Item = ButtonEvent> {
        [
            if self.a {
                ButtonEvent::PressedA
            } else {
                ButtonEvent::None
            },
            if self.b {
                ButtonEvent::PressedB
            } else {
                ButtonEvent::None
            },
        ]
        .into_iter()
        .filter(|event| *event != ButtonEvent::None)
    }
}

/// Polled, edge-triggered button pair.
pub trait ButtonSource {
    type Error;

    fn sample(&mut self) -> Result<ButtonEdges, Self::Error>;
}
