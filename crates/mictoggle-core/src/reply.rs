//! Interpretation of the toggle service's reply text.

/// Microphone state as reported back by the service.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MicState {
    Live,
    Muted,
    Unknown,
}

impl MicState {
    /// The service answers a toggle with a bare `Live` or `Muted`; anything
    /// else is shown verbatim under an `Unknown` caption.
    pub fn classify(reply: &str) -> Self {
        let word = reply.trim();
        if word.eq_ignore_ascii_case("live") {
            Self::Live
        } else if word.eq_ignore_ascii_case("muted") {
            Self::Muted
        } else {
            Self::Unknown
        }
    }

    pub const fn caption(self) -> &'static str {
        match self {
            Self::Live => "MIC LIVE",
            Self::Muted => "MIC MUTED",
            Self::Unknown => "REPLY",
        }
    }
}
