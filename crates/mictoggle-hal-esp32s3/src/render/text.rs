use core::fmt::Write;

use embedded_graphics::{
    mono_font::{
        MonoTextStyle,
        ascii::{FONT_6X10, FONT_9X18, FONT_10X20},
    },
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::{Line, PrimitiveStyle},
    text::{Baseline, Text},
};
use heapless::String as HeaplessString;
use mictoggle_core::render::Screen;
use sharp_memlcd::{PanelFrame, protocol::WIDTH};

use super::FrameRenderer;

const MARGIN_X: i32 = 12;
const CAPTION_Y: i32 = 14;
const RULE_Y: i32 = 42;
const BODY_Y: i32 = 56;
const BODY_LINE_HEIGHT: i32 = 20;
const BODY_MAX_LINES: usize = 8;
const BODY_CHARS_PER_LINE: usize = (WIDTH - 2 * MARGIN_X as usize) / 9;
const FOOTER_Y: i32 = 226;
const FOOTER_HINT: &str = "A: TOGGLE   B: POWER OFF";

type DetailLine = HeaplessString<64>;

/// Caption, rule, body text and key hint footer on a white frame.
#[derive(Debug, Default)]
pub struct TextScreenRenderer {
    body_lines: usize,
}

impl TextScreenRenderer {
    pub const fn new() -> Self {
        Self { body_lines: 0 }
    }

    fn body_line(&mut self, text: &str, frame: &mut PanelFrame) {
        if self.body_lines >= BODY_MAX_LINES {
            return;
        }

        let style = MonoTextStyle::new(&FONT_9X18, BinaryColor::On);
        let y = BODY_Y + self.body_lines as i32 * BODY_LINE_HEIGHT;
        let origin = Point::new(MARGIN_X, y);
        let _ = Text::with_baseline(text, origin, style, Baseline::Top).draw(frame);
        self.body_lines += 1;
    }

    fn detail(&mut self, frame: &mut PanelFrame, args: core::fmt::Arguments<'_>) {
        let mut line = DetailLine::new();
        let _ = line.write_fmt(args);
        self.body_line(&line, frame);
    }

    /// Hard-wraps `text` at the line width, honouring embedded newlines.
    fn wrapped(&mut self, text: &str, frame: &mut PanelFrame) {
        for paragraph in text.lines() {
            let mut rest = paragraph.trim_end_matches('\r');
            if rest.is_empty() {
                self.body_line("", frame);
                continue;
            }
            while !rest.is_empty() {
                let split = rest
                    .char_indices()
                    .nth(BODY_CHARS_PER_LINE)
                    .map_or(rest.len(), |(index, _)| index);
                let (line, tail) = rest.split_at(split);
                self.body_line(line, frame);
                rest = tail;
            }
        }
    }
}

impl FrameRenderer for TextScreenRenderer {
    fn render(&mut self, screen: Screen<'_>, frame: &mut PanelFrame) {
        frame.fill(false);
        self.body_lines = 0;

        let caption_style = MonoTextStyle::new(&FONT_10X20, BinaryColor::On);
        let _ = Text::with_baseline(
            screen.caption(),
            Point::new(MARGIN_X, CAPTION_Y),
            caption_style,
            Baseline::Top,
        )
        .draw(frame);
        let _ = Line::new(
            Point::new(MARGIN_X, RULE_Y),
            Point::new(WIDTH as i32 - MARGIN_X, RULE_Y),
        )
        .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 2))
        .draw(frame);

        match screen {
            Screen::Boot { route } => {
                self.detail(frame, format_args!("route: {}", route.label()));
            }
            Screen::Connecting { ssid, attempt } => {
                self.detail(frame, format_args!("ssid: {}", ssid));
                self.detail(frame, format_args!("attempt {}", attempt));
            }
            Screen::Ready {
                ssid,
                address,
                route,
            } => {
                self.detail(frame, format_args!("ssid: {}", ssid));
                self.detail(frame, format_args!("ip: {}", address));
                self.detail(frame, format_args!("route: {}", route.label()));
            }
            Screen::Working => self.body_line("sending toggle request", frame),
            Screen::Reply { text, .. } => {
                if text.is_empty() {
                    self.body_line("(empty reply)", frame);
                } else {
                    self.wrapped(text, frame);
                }
            }
            Screen::Failed => {
                self.body_line("server unreachable", frame);
                self.body_line("press A to retry", frame);
            }
            Screen::PoweringOff => self.body_line("press A to wake", frame),
        }

        let footer_style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
        let _ = Text::with_baseline(
            FOOTER_HINT,
            Point::new(MARGIN_X, FOOTER_Y),
            footer_style,
            Baseline::Top,
        )
        .draw(frame);
    }
}
