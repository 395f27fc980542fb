/// Keyboard adapter: crossterm key events to scancode edges.
///
/// Feeds `Input::on_key(scancode, pressed)` the way a keyboard interrupt
/// would. Terminals that report key releases (keyboard enhancement) pass
/// them straight through. Others only send presses and auto-repeats, so a
/// key counts as released after `HOLD_TIMEOUT` without a repeat.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, poll};

use crate::domain::input::{Input, Key};

/// After this long without a Press/Repeat event the key is considered up.
/// Only used when the terminal doesn't report Release events.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

/// Set-1 make code for a crossterm key, 0 when the key has none.
pub fn scancode_for(code: KeyCode) -> u8 {
    match code {
        KeyCode::Esc => Key::Esc.scancode(),
        KeyCode::Enter => Key::Enter.scancode(),
        KeyCode::Up => Key::Up.scancode(),
        KeyCode::Down => Key::Down.scancode(),
        KeyCode::Left => Key::Left.scancode(),
        KeyCode::Right => Key::Right.scancode(),
        KeyCode::Backspace => 0x0E,
        KeyCode::Tab => 0x0F,
        KeyCode::Char(c) => char_scancode(c.to_ascii_lowercase()),
        _ => 0,
    }
}

fn char_scancode(c: char) -> u8 {
    const ROW_Q: &[u8] = b"qwertyuiop";
    const ROW_A: &[u8] = b"asdfghjkl";
    const ROW_Z: &[u8] = b"zxcvbnm";
    if c == ' ' {
        return Key::Space.scancode();
    }
    if !c.is_ascii() {
        return 0;
    }
    let b = c as u8;
    let find = |row: &[u8], base: u8| row.iter().position(|&k| k == b).map(|i| base + i as u8);
    match b {
        b'1'..=b'9' => 0x02 + (b - b'1'),
        b'0' => 0x0B,
        _ => find(ROW_Q, 0x10)
            .or_else(|| find(ROW_A, 0x1E))
            .or_else(|| find(ROW_Z, 0x2C))
            .unwrap_or(0),
    }
}

pub struct KeyboardAdapter {
    /// Last Press/Repeat per held key.
    last_active: HashMap<KeyCode, Instant>,
    /// Whether to honor Release events.
    pub honor_release: bool,
    interrupted: bool,
}

impl KeyboardAdapter {
    pub fn new(honor_release: bool) -> Self {
        KeyboardAdapter {
            last_active: HashMap::with_capacity(16),
            honor_release,
            interrupted: false,
        }
    }

    /// Ctrl+C was seen.
    pub fn interrupted(&self) -> bool {
        self.interrupted
    }

    /// Drain every pending terminal event into `input`.
    pub fn drain_events(&mut self, input: &Input) {
        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.handle_key(key, input, Instant::now());
            }
        }
        self.expire(input, Instant::now());
    }

    fn handle_key(&mut self, key: KeyEvent, input: &Input, now: Instant) {
        if key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
        {
            self.interrupted = true;
            return;
        }
        let code = normalize(key.code);

        match key.kind {
            KeyEventKind::Release if self.honor_release => {
                if self.last_active.remove(&code).is_some() {
                    input.on_key(scancode_for(code), false);
                }
            }
            // without enhancement, releases are synthesized by expire()
            KeyEventKind::Release => {}
            _ => {
                if self.last_active.insert(code, now).is_none() {
                    input.on_key(scancode_for(code), true);
                }
            }
        }
    }

    /// Release keys whose auto-repeat went quiet.
    fn expire(&mut self, input: &Input, now: Instant) {
        if self.honor_release {
            return;
        }
        self.last_active.retain(|code, t| {
            let alive = now.duration_since(*t) < HOLD_TIMEOUT;
            if !alive {
                input.on_key(scancode_for(*code), false);
            }
            alive
        });
    }
}

/// 'W' and 'w' are the same physical key.
fn normalize(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}
