use embedded_hal::digital::InputPin;

use mictoggle_core::input::{ButtonEdges, ButtonSource, EdgeDetector};

#[derive(Debug, Clone, Copy)]
pub struct ButtonConfig {
    active_low: bool,
    debounce_polls: u8,
}

impl Default for ButtonConfig {
    fn default() -> Self {
        Self {
            active_low: true,
            debounce_polls: 3,
        }
    }
}

impl ButtonConfig {
    pub const fn with_active_low(mut self, active_low: bool) -> Self {
        self.active_low = active_low;
        self
    }

    pub const fn with_debounce_polls(mut self, debounce_polls: u8) -> Self {
        self.debounce_polls = debounce_polls;
        self
    }
}

#[derive(Debug)]
pub enum ButtonError<AErr, BErr> {
    A(AErr),
    B(BErr),
}

type ButtonResult<AErr, BErr, T> = Result<T, ButtonError<AErr, BErr>>;

/// Toggle (A) and power (B) push buttons on two GPIO inputs.
#[derive(Debug)]
pub struct DualButtons<A, B> {
    a: A,
    b: B,
    config: ButtonConfig,
    a_edges: EdgeDetector,
    b_edges: EdgeDetector,
}

impl<A, B> DualButtons<A, B>
where
    A: InputPin,
    B: InputPin,
{
    /// Buttons held during construction must be released before they fire.
    pub fn new(mut a: A, mut b: B, config: ButtonConfig) -> ButtonResult<A::Error, B::Error, Self> {
        let a_pressed = Self::read_pressed(&mut a, config.active_low).map_err(ButtonError::A)?;
        let b_pressed = Self::read_pressed(&mut b, config.active_low).map_err(ButtonError::B)?;

        Ok(Self {
            a,
            b,
            config,
            a_edges: EdgeDetector::new(a_pressed, config.debounce_polls),
            b_edges: EdgeDetector::new(b_pressed, config.debounce_polls),
        })
    }

    fn read_pressed<P: InputPin>(pin: &mut P, active_low: bool) -> Result<bool, P::Error> {
        let high = pin.is_high()?;
        Ok(if active_low { !high } else { high })
    }
}

impl<A, B> ButtonSource for DualButtons<A, B>
where
    A: InputPin,
    B: InputPin,
{
    type Error = ButtonError<A::Error, B::Error>;

    fn sample(&mut self) -> Result<ButtonEdges, Self::Error> {
        let a_pressed =
            Self::read_pressed(&mut self.a, self.config.active_low).map_err(ButtonError::A)?;
        let b_pressed =
            Self::read_pressed(&mut self.b, self.config.active_low).map_err(ButtonError::B)?;

        Ok(ButtonEdges::new(
            self.a_edges.update(a_pressed),
            self.b_edges.update(b_pressed),
        ))
    }
}
