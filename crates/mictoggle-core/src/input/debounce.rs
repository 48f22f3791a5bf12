/// Debounced press-edge detector for one button.
///
/// A level change is accepted after it has been seen on `debounce_polls`
/// further samples; only the released-to-pressed transition is an edge.
#[derive(Clone, Copy, Debug)]
pub struct EdgeDetector {
    raw: bool,
    stable: bool,
    stable_count: u8,
    debounce_polls: u8,
}

impl EdgeDetector {
    pub const fn new(initially_pressed: bool, debounce_polls: u8) -> Self {
        Self {
            raw: initially_pressed,
            stable: initially_pressed,
            stable_count: 0,
            debounce_polls,
        }
    }

    pub const fn is_pressed(&self) -> bool {
        self.stable
    }

    /// Feeds one sample; returns `true` on a debounced press edge.
    pub fn update(&mut self, pressed: bool) -> bool {
        if pressed == self.raw {
            self.stable_count = self.stable_count.saturating_add(1);
        } else {
            self.raw = pressed;
            self.stable_count = 0;
        }

        let threshold = self.debounce_polls.max(1);
        if self.stable_count >= threshold && self.stable != self.raw {
            self.stable = self.raw;
            return self.stable;
        }

        false
    }
}
