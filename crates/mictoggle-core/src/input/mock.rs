use super::{ButtonEdges, ButtonSource};

/// No-hardware button source used during bring-up.
#[derive(Default, Debug, Clone, Copy)]
pub struct MockButtons;

impl MockButtons {
    pub const fn new() -> Self {
        Self
    }
}

impl ButtonSource for MockButtons {
    type Error = core::convert::Infallible;

    fn sample(&mut self) -> Result<ButtonEdges, Self::Error> {
        Ok(ButtonEdges::NONE)
    }
}
