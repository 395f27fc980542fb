//! VGA text-mode encoding: each cell becomes `{ch, (bg << 4) | fg}`.
//!
//! Reference adapter for a VGA text buffer. The terminal binary never
//! selects it (it presents through `TerminalSink`), so outside tests
//! nothing here is called; the tests drive it to pin down the byte layout
//! a bare-metal build would write.

#![cfg_attr(not(test), allow(dead_code))]

use std::io;

use crate::domain::consts::SCREEN_CELLS;

use super::renderer::{FrameSink, ScreenCell};

pub const VGA_BYTES: usize = SCREEN_CELLS * 2;

pub fn attribute(cell: ScreenCell) -> u8 {
    (cell.bg.index() << 4) | (cell.fg.index() & 0x0F)
}

/// Encode a frame into `out`. Cells beyond what `out` can hold are dropped.
pub fn encode_vga(cells: &[ScreenCell], out: &mut [u8]) {
    for (cell, pair) in cells.iter().zip(out.chunks_exact_mut(2)) {
        pair[0] = cell.ch;
        pair[1] = attribute(*cell);
    }
}

/// In-memory text buffer laid out like video memory at 0xB8000.
pub struct VgaSink {
    bytes: Box<[u8; VGA_BYTES]>,
    frames: u64,
}

impl Default for VgaSink {
    fn default() -> Self {
        Self::new()
    }
}

impl VgaSink {
    pub fn new() -> Self {
        VgaSink { bytes: Box::new([0; VGA_BYTES]), frames: 0 }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes[..]
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl FrameSink for VgaSink {
    fn present(&mut self, cells: &[ScreenCell]) -> io::Result<()> {
        if cells.len() != SCREEN_CELLS {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("frame has {} cells, expected {SCREEN_CELLS}", cells.len()),
            ));
        }
        encode_vga(cells, &mut self.bytes[..]);
        self.frames += 1;
        Ok(())
    }
}
