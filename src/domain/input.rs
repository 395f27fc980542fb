//! Input latch between the keyboard source and the simulation.
//!
//! The keyboard collaborator calls `on_key(scancode, pressed)` whenever a key
//! changes; the simulation calls `snapshot()` exactly once per tick. Every
//! field is an atomic so the producer may run preemptively (interrupt or
//! another thread) without locks: one producer writes, one consumer drains.
//!
//! Latch policy:
//!   - Movement press latches a one-shot `direction` and sets `held_dir`.
//!     Release clears `held_dir` only if it still holds that direction.
//!   - A direction held for `hold_threshold` frames repeats once per tick.
//!   - `Space` sets one-shot `attack_pressed` and sticky `attack_held`
//!     (cleared on release).
//!   - `Enter` / `P` are one-shot. `Esc` / `Q` set a sticky quit flag that only
//!     `clear_quit()` resets.
//!   - Every key, recognized or not, sets `any_key_pressed` and `last_key`.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};

use super::entity::Direction;

/// PC set-1 make codes for the keys the game understands.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum Key {
    Esc = 0x01,
    Q = 0x10,
    W = 0x11,
    P = 0x19,
    Enter = 0x1C,
    A = 0x1E,
    S = 0x1F,
    D = 0x20,
    Space = 0x39,
    Up = 0x48,
    Left = 0x4B,
    Right = 0x4D,
    Down = 0x50,
}

impl Key {
    pub fn from_scancode(code: u8) -> Option<Key> {
        Some(match code {
            0x01 => Key::Esc,
            0x10 => Key::Q,
            0x11 => Key::W,
            0x19 => Key::P,
            0x1C => Key::Enter,
            0x1E => Key::A,
            0x1F => Key::S,
            0x20 => Key::D,
            0x39 => Key::Space,
            0x48 => Key::Up,
            0x4B => Key::Left,
            0x4D => Key::Right,
            0x50 => Key::Down,
            _ => return None,
        })
    }

    pub fn scancode(self) -> u8 {
        self as u8
    }

    pub fn direction(self) -> Direction {
        match self {
            Key::W | Key::Up => Direction::Up,
            Key::S | Key::Down => Direction::Down,
            Key::A | Key::Left => Direction::Left,
            Key::D | Key::Right => Direction::Right,
            _ => Direction::None,
        }
    }
}

fn encode_dir(d: Direction) -> u8 {
    match d {
        Direction::None => 0,
        Direction::Up => 1,
        Direction::Down => 2,
        Direction::Left => 3,
        Direction::Right => 4,
    }
}

fn decode_dir(v: u8) -> Direction {
    match v {
        1 => Direction::Up,
        2 => Direction::Down,
        3 => Direction::Left,
        4 => Direction::Right,
        _ => Direction::None,
    }
}

/// What the simulation sees for one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    pub direction: Direction,
    pub held_dir: Direction,
    pub action_pressed: bool,
    pub attack_pressed: bool,
    pub attack_held: bool,
    pub pause_pressed: bool,
    pub quit_pressed: bool,
    pub any_key_pressed: bool,
    pub last_key: u8,
}

#[derive(Debug, Default)]
pub struct Input {
    direction: AtomicU8,
    held_dir: AtomicU8,
    held_fresh: AtomicBool,
    held_since: AtomicU32,
    action_pressed: AtomicBool,
    attack_pressed: AtomicBool,
    attack_held: AtomicBool,
    pause_pressed: AtomicBool,
    quit_pressed: AtomicBool,
    any_key_pressed: AtomicBool,
    last_key: AtomicU8,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    /// Producer side: one key edge.
    pub fn on_key(&self, scancode: u8, pressed: bool) {
        if pressed {
            self.any_key_pressed.store(true, Ordering::Release);
            self.last_key.store(scancode, Ordering::Release);
        }

        let Some(key) = Key::from_scancode(scancode) else { return };

        let dir = key.direction();
        if dir != Direction::None {
            if pressed {
                self.held_dir.store(encode_dir(dir), Ordering::Release);
                self.held_fresh.store(true, Ordering::Release);
                self.direction.store(encode_dir(dir), Ordering::Release);
            } else {
                let _ = self.held_dir.compare_exchange(
                    encode_dir(dir), encode_dir(Direction::None),
                    Ordering::AcqRel, Ordering::Acquire,
                );
            }
            return;
        }

        match key {
            Key::Space => {
                if pressed {
                    self.attack_pressed.store(true, Ordering::Release);
                }
                self.attack_held.store(pressed, Ordering::Release);
            }
            Key::Enter if pressed => self.action_pressed.store(true, Ordering::Release),
            Key::P if pressed => self.pause_pressed.store(true, Ordering::Release),
            Key::Esc | Key::Q if pressed => self.quit_pressed.store(true, Ordering::Release),
            _ => {}
        }
    }

    /// Consumer side: drain one-shot latches and compute this tick's
    /// movement intent. `frame` is the frame counter; a held direction
    /// repeats once it has been down for `hold_threshold` frames.
    pub fn snapshot(&self, frame: u32, hold_threshold: u32) -> InputSnapshot {
        let latched = decode_dir(self.direction.swap(0, Ordering::AcqRel));
        let held = self.held_dir();

        if self.held_fresh.swap(false, Ordering::AcqRel) {
            self.held_since.store(frame, Ordering::Release);
        }

        let direction = if latched != Direction::None {
            latched
        } else if held != Direction::None
            && frame.wrapping_sub(self.held_since.load(Ordering::Acquire)) >= hold_threshold
        {
            held
        } else {
            Direction::None
        };

        InputSnapshot {
            direction,
            held_dir: held,
            action_pressed: self.action_pressed.swap(false, Ordering::AcqRel),
            attack_pressed: self.attack_pressed.swap(false, Ordering::AcqRel),
            attack_held: self.attack_held.load(Ordering::Acquire),
            pause_pressed: self.pause_pressed.swap(false, Ordering::AcqRel),
            quit_pressed: self.quit_pressed.load(Ordering::Acquire),
            any_key_pressed: self.any_key_pressed.swap(false, Ordering::AcqRel),
            last_key: self.last_key.load(Ordering::Acquire),
        }
    }

    pub fn held_dir(&self) -> Direction {
        decode_dir(self.held_dir.load(Ordering::Acquire))
    }

    pub fn clear_quit(&self) {
        self.quit_pressed.store(false, Ordering::Release);
    }

    /// Drop every latch (used when switching scenes so a stale press
    /// does not leak into the next one).
    pub fn reset(&self) {
        self.direction.store(0, Ordering::Release);
        self.held_dir.store(0, Ordering::Release);
        self.held_fresh.store(false, Ordering::Release);
        self.action_pressed.store(false, Ordering::Release);
        self.attack_pressed.store(false, Ordering::Release);
        self.attack_held.store(false, Ordering::Release);
        self.pause_pressed.store(false, Ordering::Release);
        self.quit_pressed.store(false, Ordering::Release);
        self.any_key_pressed.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOLD: u32 = 7;

    #[test]
    fn press_release_leaves_direction_latched() {
        let input = Input::new();
        input.on_key(Key::D.scancode(), true);
        input.on_key(Key::D.scancode(), false);
        assert_eq!(input.held_dir(), Direction::None);
        let snap = input.snapshot(0, HOLD);
        assert_eq!(snap.direction, Direction::Right);
        assert_eq!(snap.held_dir, Direction::None);
        // consumed
        assert_eq!(input.snapshot(1, HOLD).direction, Direction::None);
    }

    #[test]
    fn release_of_other_direction_keeps_held() {
        let input = Input::new();
        input.on_key(Key::A.scancode(), true);
        input.on_key(Key::W.scancode(), true);
        input.on_key(Key::A.scancode(), false);
        assert_eq!(input.held_dir(), Direction::Up);
        // arrow key with same direction releases it
        input.on_key(Key::Up.scancode(), false);
        assert_eq!(input.held_dir(), Direction::None);
    }

    #[test]
    fn held_direction_repeats_after_threshold() {
        let input = Input::new();
        input.on_key(Key::Right.scancode(), true);
        assert_eq!(input.snapshot(10, HOLD).direction, Direction::Right);
        for f in 11..(10 + HOLD) {
            assert_eq!(input.snapshot(f, HOLD).direction, Direction::None, "frame {f}");
        }
        assert_eq!(input.snapshot(10 + HOLD, HOLD).direction, Direction::Right);
        assert_eq!(input.snapshot(11 + HOLD, HOLD).direction, Direction::Right);
        input.on_key(Key::Right.scancode(), false);
        assert_eq!(input.snapshot(12 + HOLD, HOLD).direction, Direction::None);
    }

    #[test]
    fn one_shots_clear_on_read_but_held_does_not() {
        let input = Input::new();
        input.on_key(Key::Space.scancode(), true);
        input.on_key(Key::Enter.scancode(), true);
        input.on_key(Key::P.scancode(), true);
        let s = input.snapshot(0, HOLD);
        assert!(s.attack_pressed && s.attack_held && s.action_pressed && s.pause_pressed);
        let s = input.snapshot(1, HOLD);
        assert!(!s.attack_pressed && !s.action_pressed && !s.pause_pressed);
        assert!(s.attack_held);
        input.on_key(Key::Space.scancode(), false);
        assert!(!input.snapshot(2, HOLD).attack_held);
    }

    #[test]
    fn quit_is_sticky_until_cleared() {
        let input = Input::new();
        input.on_key(Key::Esc.scancode(), true);
        assert!(input.snapshot(0, HOLD).quit_pressed);
        assert!(input.snapshot(1, HOLD).quit_pressed);
        input.clear_quit();
        assert!(!input.snapshot(2, HOLD).quit_pressed);
    }

    #[test]
    fn unknown_keys_only_touch_any_key_and_last_key() {
        let input = Input::new();
        input.on_key(0x2E, true);
        let s = input.snapshot(0, HOLD);
        assert!(s.any_key_pressed);
        assert_eq!(s.last_key, 0x2E);
        assert_eq!(s.direction, Direction::None);
        assert!(!s.attack_pressed && !s.action_pressed && !s.quit_pressed);
        assert!(!input.snapshot(1, HOLD).any_key_pressed);
    }
}
