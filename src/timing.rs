//! Raw clock, frame pacing and FPS measurement.
//!
//! Everything here runs on the raw millisecond clock
//! (`BASE_TICKS_PER_SECOND`). The game clock lives in `GameState::tick`
//! and is never mixed with these values.

use std::time::{Duration, Instant};

use crate::domain::consts::BASE_TICKS_PER_SECOND;

/// The monotonic tick collaborator.
pub trait TickSource {
    /// Raw ticks since start, wrapping at `u32::MAX`.
    fn now_ticks(&self) -> u32;
    /// Yield until at least one tick has elapsed.
    fn wait_for_tick(&self);
}

pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        SystemClock { start: Instant::now() }
    }
}

impl TickSource for SystemClock {
    fn now_ticks(&self) -> u32 {
        // wraps after ~49 days, same as a 32-bit tick counter
        self.start.elapsed().as_millis() as u32
    }

    fn wait_for_tick(&self) {
        std::thread::sleep(Duration::from_millis(1000 / BASE_TICKS_PER_SECOND as u64));
    }
}

/// Decides when the next frame is due.
///
/// Frame `n` of a second is due `n * BASE_TICKS_PER_SECOND / fps` raw ticks
/// after the second began, so the rounding of a single interval never
/// accumulates: 60 fps gives 60 frames per 1000 ms, not 62.
pub struct FramePacer {
    fps: u32,
    origin: Option<u32>,
    frames: u32,
}

impl FramePacer {
    pub fn new(fps: u32) -> Self {
        FramePacer { fps: fps.clamp(1, BASE_TICKS_PER_SECOND), origin: None, frames: 0 }
    }

    /// Raw ticks from the start of the second to frame `n`.
    fn due(&self, n: u32) -> u32 {
        (n as u64 * BASE_TICKS_PER_SECOND as u64 / self.fps as u64) as u32
    }

    /// True when a frame should run at `now`. A late frame catches up by at
    /// most one: after a long stall the schedule restarts from `now`.
    pub fn frame_due(&mut self, now: u32) -> bool {
        let Some(origin) = self.origin else {
            self.origin = Some(now);
            self.frames = 0;
            return true;
        };
        let elapsed = now.wrapping_sub(origin);
        if elapsed < self.due(self.frames + 1) {
            return false;
        }
        if elapsed >= self.due(self.frames + 2) {
            self.origin = Some(now);
            self.frames = 0;
            return true;
        }
        self.frames += 1;
        if self.frames == self.fps {
            self.origin = Some(origin.wrapping_add(BASE_TICKS_PER_SECOND));
            self.frames = 0;
        }
        true
    }
}

/// Frames counted over one-second windows.
pub struct FpsMeter {
    window_start: Option<u32>,
    frames: u32,
    fps: u32,
}

impl FpsMeter {
    pub fn new() -> Self {
        FpsMeter { window_start: None, frames: 0, fps: 0 }
    }

    pub fn frame(&mut self, now: u32) {
        let start = *self.window_start.get_or_insert(now);
        self.frames += 1;
        let elapsed = now.wrapping_sub(start);
        if elapsed >= BASE_TICKS_PER_SECOND {
            self.fps = self.frames * BASE_TICKS_PER_SECOND / elapsed;
            self.frames = 0;
            self.window_start = Some(now);
        }
    }

    /// Rate over the last complete window.
    pub fn fps(&self) -> u32 {
        self.fps
    }
}

#[cfg(test)]
pub struct FakeClock {
    pub now: std::cell::Cell<u32>,
}

#[cfg(test)]
impl TickSource for FakeClock {
    fn now_ticks(&self) -> u32 {
        self.now.get()
    }

    fn wait_for_tick(&self) {
        self.now.set(self.now.get().wrapping_add(1));
    }
}
