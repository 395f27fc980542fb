/// crossterm frame sink: paints the 80x25 cell grid into a terminal.
///
/// How it works:
///   1. `init()` enters raw mode and the alternate screen, hides the cursor
///   2. each `present()` compares the frame with the previous one and only
///      emits commands for cells that changed, batched with `queue!`
///   3. one flush per frame; `cleanup()` restores the terminal
///
/// Cells carry code page 437 bytes; they are translated to Unicode here.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute, queue,
    style::{self, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::consts::{MAP_WIDTH, SCREEN_CELLS};

use super::renderer::{Color, FrameSink, ScreenCell};

pub struct TerminalSink {
    writer: BufWriter<io::Stdout>,
    /// What the terminal currently shows; `None` forces a full repaint.
    shown: Vec<Option<ScreenCell>>,
    enhanced_keys: bool,
}

impl TerminalSink {
    pub fn new() -> Self {
        TerminalSink {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            shown: vec![None; SCREEN_CELLS],
            enhanced_keys: false,
        }
    }

    /// Enter raw mode. Returns whether the terminal reports key releases.
    pub fn init(&mut self) -> io::Result<bool> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(style::Color::Black),
            Clear(ClearType::All)
        )?;

        self.enhanced_keys = terminal::supports_keyboard_enhancement().unwrap_or(false);
        if self.enhanced_keys {
            execute!(
                self.writer,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
        }
        self.shown.fill(None);
        Ok(self.enhanced_keys)
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        if self.enhanced_keys {
            execute!(self.writer, PopKeyboardEnhancementFlags)?;
        }
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }
}

impl FrameSink for TerminalSink {
    fn present(&mut self, cells: &[ScreenCell]) -> io::Result<()> {
        let mut last: Option<(Color, Color)> = None;
        let mut cursor_at: Option<usize> = None;

        for (i, &cell) in cells.iter().enumerate().take(SCREEN_CELLS) {
            if self.shown[i] == Some(cell) {
                continue;
            }
            if cursor_at != Some(i) {
                queue!(self.writer, MoveTo((i % MAP_WIDTH) as u16, (i / MAP_WIDTH) as u16))?;
            }
            if last != Some((cell.fg, cell.bg)) {
                queue!(
                    self.writer,
                    SetForegroundColor(term_color(cell.fg)),
                    SetBackgroundColor(term_color(cell.bg))
                )?;
                last = Some((cell.fg, cell.bg));
            }
            queue!(self.writer, Print(cp437_char(cell.ch)))?;
            self.shown[i] = Some(cell);
            // the cursor wraps to the next row at the right edge
            cursor_at = if (i + 1) % MAP_WIDTH == 0 { None } else { Some(i + 1) };
        }

        self.writer.flush()
    }
}

fn term_color(c: Color) -> style::Color {
    match c {
        Color::Black => style::Color::Black,
        Color::Blue => style::Color::DarkBlue,
        Color::Green => style::Color::DarkGreen,
        Color::Cyan => style::Color::DarkCyan,
        Color::Red => style::Color::DarkRed,
        Color::Magenta => style::Color::DarkMagenta,
        Color::Brown => style::Color::DarkYellow,
        Color::LightGray => style::Color::Grey,
        Color::DarkGray => style::Color::DarkGrey,
        Color::LightBlue => style::Color::Blue,
        Color::LightGreen => style::Color::Green,
        Color::LightCyan => style::Color::Cyan,
        Color::LightRed => style::Color::Red,
        Color::LightMagenta => style::Color::Magenta,
        Color::Yellow => style::Color::Yellow,
        Color::White => style::Color::White,
    }
}

/// Code page 437 to Unicode for the glyphs the game draws.
/// Printable ASCII maps to itself; anything else unmapped shows as '?'.
pub fn cp437_char(b: u8) -> char {
    match b {
        0x20..=0x7E => b as char,
        0x01 => '☺',
        0x02 => '☻',
        0x03 => '♥',
        0x04 => '♦',
        0x09 => '○',
        0x0F => '☼',
        0xB0 => '░',
        0xB1 => '▒',
        0xB2 => '▓',
        0xB3 => '│',
        0xBA => '║',
        0xBB => '╗',
        0xBC => '╝',
        0xC4 => '─',
        0xC8 => '╚',
        0xC9 => '╔',
        0xCD => '═',
        0xDB => '█',
        0xE8 => 'Φ',
        0xF9 => '∙',
        0x00 => ' ',
        _ => '?',
    }
}
