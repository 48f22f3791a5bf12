use core::str;

/// Blank line that ends the response headers.
pub const HEADER_BOUNDARY: [u8; 4] = *b"\r\n\r\n";

/// Header/body split state.
///
/// While scanning headers, `matched` counts how many bytes of
/// [`HEADER_BOUNDARY`] the most recent bytes complete. Reaching four means
/// the last four bytes written since the cursor last started over are
/// exactly `CR LF CR LF`, which also implies at least four bytes were seen.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ScanState {
    ScanningHeaders { matched: u8 },
    InBody,
}

/// What the buffer should do with the byte just stored.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ScanAction {
    KeepHeader,
    DiscardHeaders,
    KeepBody,
}

/// Pure boundary scanner: `(state, byte) -> (state, action)`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BodyScanner {
    state: ScanState,
}

impl Default for BodyScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl BodyScanner {
    pub const fn new() -> Self {
        Self {
            state: ScanState::ScanningHeaders { matched: 0 },
        }
    }

    pub const fn state(self) -> ScanState {
        self.state
    }

    pub const fn in_body(self) -> bool {
        matches!(self.state, ScanState::InBody)
    }

    pub const fn step(self, byte: u8) -> (Self, ScanAction) {
        let matched = match self.state {
            ScanState::InBody => return (self, ScanAction::KeepBody),
            ScanState::ScanningHeaders { matched } => matched,
        };

        let next = if byte == HEADER_BOUNDARY[matched as usize] {
            matched + 1
        } else if byte == HEADER_BOUNDARY[0] {
            // "\r\n\r\r" or "\r\r": the stray CR may still start the boundary.
            1
        } else {
            0
        };

        if next as usize == HEADER_BOUNDARY.len() {
            (
                Self {
                    state: ScanState::InBody,
                },
                ScanAction::DiscardHeaders,
            )
        } else {
            (
                Self {
                    state: ScanState::ScanningHeaders { matched: next },
                },
                ScanAction::KeepHeader,
            )
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PushOutcome {
    Stored,
    BodyStarted,
    Full,
}

/// Fixed-capacity response storage with in-place header skipping.
///
/// The cursor never passes `N - 1`; the last slot is kept for the terminator.
#[derive(Clone)]
pub struct ResponseBuffer<const N: usize> {
    bytes: [u8; N],
    cursor: usize,
    scanner: BodyScanner,
}

impl<const N: usize> Default for ResponseBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> ResponseBuffer<N> {
    pub const fn new() -> Self {
        const {
            assert!(
                N > HEADER_BOUNDARY.len(),
                "response buffer must hold the header boundary plus a terminator"
            )
        };

        Self {
            bytes: [0u8; N],
            cursor: 0,
            scanner: BodyScanner::new(),
        }
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
        self.scanner = BodyScanner::new();
        self.bytes[0] = 0;
    }

    /// Highest cursor value; index of the reserved terminator slot when full.
    pub const fn limit(&self) -> usize {
        N - 1
    }

    pub fn is_full(&self) -> bool {
        self.cursor >= self.limit()
    }

    pub fn len(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.cursor == 0
    }

    pub fn body_started(&self) -> bool {
        self.scanner.in_body()
    }

    pub fn push(&mut self, byte: u8) -> PushOutcome {
        if self.is_full() {
            return PushOutcome::Full;
        }

        self.bytes[self.cursor] = byte;
        self.cursor += 1;

        let (scanner, action) = self.scanner.step(byte);
        self.scanner = scanner;
        match action {
            ScanAction::DiscardHeaders => {
                self.cursor = 0;
                PushOutcome::BodyStarted
            }
            ScanAction::KeepHeader | ScanAction::KeepBody => PushOutcome::Stored,
        }
    }

    /// Marks end-of-text at the cursor and overwrites malformed UTF-8 in the
    /// capture with `?`.
    pub fn terminate(&mut self) {
        self.mask_invalid_utf8();
        self.bytes[self.cursor] = 0;
    }

    fn mask_invalid_utf8(&mut self) {
        let mut start = 0;
        while let Err(err) = str::from_utf8(&self.bytes[start..self.cursor]) {
            let bad = start + err.valid_up_to();
            // A sequence cut off by the end of the capture is left to `as_text`.
            let Some(len) = err.error_len() else {
                break;
            };
            self.bytes[bad..bad + len].fill(b'?');
            start = bad + len;
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.cursor]
    }

    /// Captured bytes as text, cut back before the first malformed sequence.
    /// After `terminate` only an incomplete trailing sequence can be cut.
    pub fn as_text(&self) -> &str {
        let captured = self.as_bytes();
        match str::from_utf8(captured) {
            Ok(text) => text,
            Err(err) => str::from_utf8(&captured[..err.valid_up_to()]).unwrap_or(""),
        }
    }

    #[cfg(test)]
    pub(crate) fn raw(&self) -> &[u8; N] {
        &self.bytes
    }
}
