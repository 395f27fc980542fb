/// Presentation layer: double-buffered 80x25 character grid.
///
/// How it works:
///   1. `compose()` draws the whole frame into `back` (map, rocks, enemies,
///      pump trail, player, fire, HUD, then the scene overlay)
///   2. `present()` copies `back` into `front` and hands `front` to the sink
///   3. The sink owns the actual output (terminal, VGA bytes, test buffer)
///
/// Cells hold code page 437 bytes and 4-bit VGA colors. Every drawing
/// primitive clips to the grid; nothing here allocates after `new()`.

use std::fmt;
use std::io::{self, Cursor, Write};

use crate::domain::consts::{
    MAP_HEIGHT, MAP_WIDTH, ROW_BORDER, ROW_SKY_END, ROW_SKY_START,
    ROW_STATUS_BOTTOM, ROW_STATUS_TOP, SCREEN_CELLS,
};
use crate::domain::entity::{Direction, Enemy, EnemyKind, EnemyState, PlayerState, Rock, RockState};
use crate::domain::map::layer_of_row;
use crate::domain::tile::TileKind;
use crate::sim::world::{GameState, Scene};

// ── Colors ──

/// The 16-color VGA text palette, in attribute order.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum Color {
    Black = 0,
    Blue = 1,
    Green = 2,
    Cyan = 3,
    Red = 4,
    Magenta = 5,
    Brown = 6,
    LightGray = 7,
    DarkGray = 8,
    LightBlue = 9,
    LightGreen = 10,
    LightCyan = 11,
    LightRed = 12,
    LightMagenta = 13,
    Yellow = 14,
    White = 15,
}

impl Color {
    pub fn index(self) -> u8 {
        self as u8
    }
}

// ── Glyphs (code page 437) ──

pub mod glyph {
    pub const FACE: u8 = 0x02;
    pub const FACE_HOLLOW: u8 = 0x01;
    pub const HEART: u8 = 0x03;
    pub const DIAMOND: u8 = 0x04;
    pub const RING: u8 = 0x09;
    pub const SUN: u8 = 0x0F;
    pub const SHADE_LIGHT: u8 = 0xB0;
    pub const SHADE_DARK: u8 = 0xB2;
    pub const BLOCK: u8 = 0xDB;
    pub const LINE_H: u8 = 0xC4;
    pub const LINE_V: u8 = 0xB3;
    pub const DOUBLE_H: u8 = 0xCD;
    pub const DOUBLE_V: u8 = 0xBA;
    pub const CORNER_TL: u8 = 0xC9;
    pub const CORNER_TR: u8 = 0xBB;
    pub const CORNER_BL: u8 = 0xC8;
    pub const CORNER_BR: u8 = 0xBC;
    pub const PHI: u8 = 0xE8;
}

// ── ScreenCell ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ScreenCell {
    pub ch: u8,
    pub fg: Color,
    pub bg: Color,
}

impl ScreenCell {
    pub const BLANK: ScreenCell = ScreenCell { ch: b' ', fg: Color::LightGray, bg: Color::Black };

    pub const fn new(ch: u8, fg: Color, bg: Color) -> Self {
        ScreenCell { ch, fg, bg }
    }
}

/// Where a finished frame goes.
pub trait FrameSink {
    /// `cells` is row-major, exactly `MAP_WIDTH * MAP_HEIGHT` long.
    fn present(&mut self, cells: &[ScreenCell]) -> io::Result<()>;
}

/// Fixed background/foreground for a screen row: status bars, sky, the
/// four earth layers and the border.
pub fn layer_color(row: usize) -> (Color, Color) {
    const LAYER_COLORS: [(Color, Color); 4] = [
        (Color::Brown, Color::Yellow),
        (Color::Yellow, Color::Brown),
        (Color::LightRed, Color::Red),
        (Color::LightMagenta, Color::Magenta),
    ];
    if row == ROW_STATUS_TOP || row == ROW_STATUS_BOTTOM {
        return (Color::White, Color::Blue);
    }
    if (ROW_SKY_START..=ROW_SKY_END).contains(&row) {
        return (Color::White, Color::LightBlue);
    }
    if row == ROW_BORDER {
        return (Color::LightGray, Color::DarkGray);
    }
    match layer_of_row(row as i32) {
        Some(layer) => LAYER_COLORS[layer],
        None => (Color::LightGray, Color::Black),
    }
}

fn layer_bg(row: i32) -> Color {
    if row < 0 {
        return Color::Black;
    }
    layer_color(row as usize).1
}

/// Frame-dependent readings the game state does not carry.
#[derive(Clone, Copy, Debug, Default)]
pub struct HudStats {
    pub fps: u32,
}

// ── Renderer ──

pub struct Renderer {
    front: Vec<ScreenCell>,
    back: Vec<ScreenCell>,
    dirty: bool,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            front: vec![ScreenCell::BLANK; SCREEN_CELLS],
            back: vec![ScreenCell::BLANK; SCREEN_CELLS],
            dirty: true,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// The frame being composed.
    pub fn back(&self) -> &[ScreenCell] {
        &self.back
    }

    /// The frame last handed to the sink.
    pub fn front(&self) -> &[ScreenCell] {
        &self.front
    }

    pub fn cell(&self, x: i32, y: i32) -> Option<ScreenCell> {
        index(x, y).map(|i| self.back[i])
    }

    // ── Primitives ──

    pub fn clear(&mut self) {
        for row in 0..MAP_HEIGHT {
            let (fg, bg) = layer_color(row);
            let start = row * MAP_WIDTH;
            self.back[start..start + MAP_WIDTH].fill(ScreenCell::new(b' ', fg, bg));
        }
        self.dirty = true;
    }

    pub fn put_cell(&mut self, x: i32, y: i32, cell: ScreenCell) {
        if let Some(i) = index(x, y) {
            self.back[i] = cell;
            self.dirty = true;
        }
    }

    /// Write text keeping each cell's current colors.
    pub fn put_string(&mut self, x: i32, y: i32, text: &str) {
        for (i, b) in text.bytes().enumerate() {
            let cx = x + i as i32;
            if let Some(idx) = index(cx, y) {
                self.back[idx].ch = b;
                self.dirty = true;
            }
        }
    }

    pub fn put_string_colored(&mut self, x: i32, y: i32, text: &str, fg: Color, bg: Color) {
        self.put_bytes_colored(x, y, text.as_bytes(), fg, bg);
    }

    fn put_bytes_colored(&mut self, x: i32, y: i32, bytes: &[u8], fg: Color, bg: Color) {
        for (i, &b) in bytes.iter().enumerate() {
            self.put_cell(x + i as i32, y, ScreenCell::new(b, fg, bg));
        }
    }

    /// Formatted text without a heap buffer. Output past one row is cut.
    fn put_fmt(&mut self, x: i32, y: i32, fg: Color, bg: Color, args: fmt::Arguments) {
        let mut buf = [0u8; MAP_WIDTH];
        let mut cur = Cursor::new(&mut buf[..]);
        // a full buffer just truncates the line
        let _ = cur.write_fmt(args);
        let len = cur.position() as usize;
        self.put_bytes_colored(x, y, &buf[..len], fg, bg);
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, cell: ScreenCell) {
        for cy in y..y + h {
            for cx in x..x + w {
                self.put_cell(cx, cy, cell);
            }
        }
    }

    pub fn horizontal_line(&mut self, x: i32, y: i32, len: i32, cell: ScreenCell) {
        self.fill_rect(x, y, len, 1, cell);
    }

    pub fn vertical_line(&mut self, x: i32, y: i32, len: i32, cell: ScreenCell) {
        self.fill_rect(x, y, 1, len, cell);
    }

    /// Copy the composed frame to `front` and flush it.
    pub fn present(&mut self, sink: &mut dyn FrameSink) -> io::Result<()> {
        self.front.copy_from_slice(&self.back);
        sink.present(&self.front)?;
        self.dirty = false;
        Ok(())
    }

    // ══════════════════════════════════════════════════════════════
    // Compose
    // ══════════════════════════════════════════════════════════════

    pub fn compose(&mut self, state: &GameState, hud: &HudStats) {
        self.clear();

        match state.scene {
            Scene::Menu => {
                self.compose_menu(state);
                return;
            }
            Scene::Credits => {
                self.compose_credits(state);
                return;
            }
            _ => {}
        }

        self.compose_map(state);
        for r in &state.rocks {
            self.compose_rock(r, state.tick);
        }
        for e in &state.enemies {
            self.compose_enemy(e, state.tick);
        }
        self.compose_pump(state);
        self.compose_player(state);
        for e in &state.enemies {
            self.compose_fire(e, state);
        }
        self.compose_hud(state, hud);

        match state.scene {
            Scene::RoundStart => {
                self.compose_banner(state.frame, "ROUND", Some(state.round), "GET READY", Color::Yellow);
            }
            Scene::Paused => {
                self.compose_banner(state.frame, "PAUSED", None, "P to resume", Color::LightCyan);
            }
            Scene::RoundClear => {
                self.compose_banner(state.frame, "ROUND CLEAR", None, "well dug!", Color::LightGreen);
            }
            Scene::GameOver => {
                self.compose_banner(state.frame, "GAME OVER", None, "press any key", Color::LightRed);
            }
            Scene::Victory => {
                self.compose_banner(state.frame, "YOU WIN", None, "press any key", Color::Yellow);
            }
            Scene::Playing if !state.player.is_alive() => {
                self.compose_banner(state.frame, "OUCH", None, "", Color::LightRed);
            }
            _ => {}
        }
    }

    fn compose_map(&mut self, state: &GameState) {
        for y in ROW_SKY_START..=ROW_BORDER {
            let (lfg, lbg) = layer_color(y);
            for x in 0..MAP_WIDTH {
                let cell = match state.map.tile(x as i32, y as i32) {
                    TileKind::Sky => ScreenCell::new(b' ', lfg, lbg),
                    TileKind::Dirt => ScreenCell::new(glyph::SHADE_LIGHT, lfg, lbg),
                    TileKind::Empty => ScreenCell::new(b' ', Color::LightGray, Color::Black),
                    TileKind::Wall => ScreenCell::new(glyph::SHADE_DARK, Color::DarkGray, lbg),
                    TileKind::Border => ScreenCell::new(glyph::DOUBLE_H, lfg, lbg),
                    TileKind::Gem => ScreenCell::new(glyph::DIAMOND, Color::LightCyan, Color::Black),
                    TileKind::Bonus => ScreenCell::new(glyph::SUN, Color::Yellow, Color::Black),
                    TileKind::Invalid => ScreenCell::BLANK,
                };
                self.put_cell(x as i32, y as i32, cell);
            }
        }
    }

    fn compose_rock(&mut self, r: &Rock, tick: u32) {
        if !r.active {
            return;
        }
        let ch = match r.state {
            RockState::Stable | RockState::Falling => glyph::BLOCK,
            // shakes between two shades
            RockState::Wobbling => if (tick / 4) % 2 == 0 { glyph::BLOCK } else { glyph::SHADE_DARK },
            RockState::Blinking => {
                if r.blink_count % 2 == 1 {
                    return;
                }
                glyph::BLOCK
            }
            RockState::Landed => return,
        };
        self.put_cell(r.x, r.y, ScreenCell::new(ch, Color::LightGray, Color::Black));
    }

    fn compose_enemy(&mut self, e: &Enemy, tick: u32) {
        if !e.is_live() {
            return;
        }
        let (base_ch, base_fg) = match e.kind {
            EnemyKind::Pooka => (glyph::FACE_HOLLOW, Color::LightRed),
            EnemyKind::Fygar => (glyph::PHI, Color::LightGreen),
        };
        let cell = match e.state {
            EnemyState::Normal => ScreenCell::new(base_ch, base_fg, Color::Black),
            // eyes drifting through the earth
            EnemyState::Ghost => {
                let fg = if (tick / 8) % 2 == 0 { base_fg } else { Color::White };
                ScreenCell::new(b'"', fg, layer_bg(e.y))
            }
            EnemyState::Inflating => {
                const INFLATE: [u8; 4] = [b'o', b'O', glyph::RING, glyph::SUN];
                let i = (e.inflate_level.max(1) as usize - 1).min(INFLATE.len() - 1);
                ScreenCell::new(INFLATE[i], base_fg, Color::Black)
            }
            EnemyState::Paralyzed => {
                let fg = if e.blink_count % 2 == 0 { base_fg } else { Color::DarkGray };
                ScreenCell::new(base_ch, fg, Color::Black)
            }
            EnemyState::Dead => return,
        };
        self.put_cell(e.x, e.y, cell);
    }

    fn compose_pump(&mut self, state: &GameState) {
        let p = &state.player;
        if !p.pumping || p.pump_length == 0 {
            return;
        }
        let ch = if p.pump_dir.is_vertical() { glyph::LINE_V } else { glyph::LINE_H };
        let (dx, dy) = p.pump_dir.delta();
        for d in 1..=p.pump_length as i32 {
            self.put_cell(p.x + dx * d, p.y + dy * d, ScreenCell::new(ch, Color::White, Color::Black));
        }
    }

    fn compose_player(&mut self, state: &GameState) {
        let p = &state.player;
        let bg = match state.map.tile(p.x, p.y) {
            TileKind::Sky => layer_bg(p.y),
            _ => Color::Black,
        };
        let cell = match p.state {
            PlayerState::Dead => ScreenCell::new(b'X', Color::LightRed, bg),
            PlayerState::Attacking => ScreenCell::new(glyph::FACE, Color::LightCyan, bg),
            _ => ScreenCell::new(glyph::FACE, Color::White, bg),
        };
        self.put_cell(p.x, p.y, cell);

        if p.attacking {
            let ch = match p.facing {
                Direction::Left => b'<',
                Direction::Right => b'>',
                Direction::Up => b'^',
                Direction::Down => b'v',
                Direction::None => return,
            };
            let (nx, ny) = p.facing.step(p.x, p.y);
            if state.map.is_walkable(nx, ny) {
                self.put_cell(nx, ny, ScreenCell::new(ch, Color::LightCyan, Color::Black));
            }
        }
    }

    fn compose_fire(&mut self, e: &Enemy, state: &GameState) {
        if !e.is_live() || !e.fire.active {
            return;
        }
        let (dx, dy) = e.fire.dir.delta();
        let fg = if state.tick % 2 == 0 { Color::Yellow } else { Color::LightRed };
        for d in 1..=state.tuning.fygar_fire_range as i32 {
            self.put_cell(e.x + dx * d, e.y + dy * d, ScreenCell::new(b'*', fg, Color::Red));
        }
    }

    // ── HUD ──

    fn compose_hud(&mut self, state: &GameState, hud: &HudStats) {
        let (fg, bg) = layer_color(ROW_STATUS_TOP);
        let top = ROW_STATUS_TOP as i32;
        let bottom = ROW_STATUS_BOTTOM as i32;

        self.put_fmt(1, top, fg, bg, format_args!("SCORE {:06}", state.score));
        self.put_fmt(16, top, Color::Yellow, bg, format_args!("HI {:06}", state.high_score));
        self.put_fmt(30, top, fg, bg, format_args!("ROUND {}", state.round));
        self.put_string_colored(42, top, "LIVES", fg, bg);
        for i in 0..state.lives.min(9) as i32 {
            self.put_cell(48 + i, top, ScreenCell::new(glyph::HEART, Color::LightRed, bg));
        }

        let secs = state.tick / state.tuning.ticks_per_second();
        self.put_fmt(1, bottom, fg, bg, format_args!("TIME {:02}:{:02}", secs / 60, secs % 60));
        self.put_fmt(14, bottom, fg, bg, format_args!("FPS {}", hud.fps));
        self.put_string_colored(30, bottom, "WASD move  SPC pump  ENT zap  P pause", Color::LightGray, bg);
    }

    // ── Overlays ──

    fn draw_box(&mut self, x: i32, y: i32, w: i32, h: i32, fg: Color, bg: Color) {
        self.fill_rect(x, y, w, h, ScreenCell::new(b' ', fg, bg));
        self.horizontal_line(x + 1, y, w - 2, ScreenCell::new(glyph::DOUBLE_H, fg, bg));
        self.horizontal_line(x + 1, y + h - 1, w - 2, ScreenCell::new(glyph::DOUBLE_H, fg, bg));
        self.vertical_line(x, y + 1, h - 2, ScreenCell::new(glyph::DOUBLE_V, fg, bg));
        self.vertical_line(x + w - 1, y + 1, h - 2, ScreenCell::new(glyph::DOUBLE_V, fg, bg));
        self.put_cell(x, y, ScreenCell::new(glyph::CORNER_TL, fg, bg));
        self.put_cell(x + w - 1, y, ScreenCell::new(glyph::CORNER_TR, fg, bg));
        self.put_cell(x, y + h - 1, ScreenCell::new(glyph::CORNER_BL, fg, bg));
        self.put_cell(x + w - 1, y + h - 1, ScreenCell::new(glyph::CORNER_BR, fg, bg));
    }

    fn put_centered(&mut self, y: i32, text: &str, fg: Color, bg: Color) {
        let x = (MAP_WIDTH as i32 - text.len() as i32) / 2;
        self.put_string_colored(x, y, text, fg, bg);
    }

    /// Centered box with a title (optionally numbered) and a blinking hint.
    fn compose_banner(&mut self, frame: u32, title: &str, number: Option<u32>, hint: &str, fg: Color) {
        const W: i32 = 30;
        const H: i32 = 5;
        let x = (MAP_WIDTH as i32 - W) / 2;
        let y = (MAP_HEIGHT as i32 - H) / 2;
        self.draw_box(x, y, W, H, fg, Color::Black);

        match number {
            Some(n) => {
                let mut buf = [0u8; 32];
                let mut cur = Cursor::new(&mut buf[..]);
                let _ = write!(cur, "{title} {n}");
                let len = cur.position() as usize;
                let tx = (MAP_WIDTH as i32 - len as i32) / 2;
                self.put_bytes_colored(tx, y + 1, &buf[..len], fg, Color::Black);
            }
            None => self.put_centered(y + 1, title, fg, Color::Black),
        }
        if (frame / 20) % 2 == 0 {
            self.put_centered(y + 3, hint, Color::LightGray, Color::Black);
        }
    }

    fn compose_menu(&mut self, state: &GameState) {
        self.fill_rect(0, 0, MAP_WIDTH as i32, MAP_HEIGHT as i32, ScreenCell::BLANK);
        self.draw_box(16, 3, 48, 18, Color::Yellow, Color::Black);
        self.put_centered(5, "B  U  R  R  O  W", Color::Yellow, Color::Black);
        self.put_centered(7, "dig deep, pump hard, mind the rocks", Color::LightGray, Color::Black);

        self.put_cell(30, 9, ScreenCell::new(glyph::FACE, Color::White, Color::Black));
        self.put_string_colored(32, 9, "you", Color::LightGray, Color::Black);
        self.put_cell(30, 10, ScreenCell::new(glyph::FACE_HOLLOW, Color::LightRed, Color::Black));
        self.put_string_colored(32, 10, "pooka", Color::LightGray, Color::Black);
        self.put_cell(30, 11, ScreenCell::new(glyph::PHI, Color::LightGreen, Color::Black));
        self.put_string_colored(32, 11, "fygar (breathes fire)", Color::LightGray, Color::Black);
        self.put_cell(30, 12, ScreenCell::new(glyph::BLOCK, Color::LightGray, Color::Black));
        self.put_string_colored(32, 12, "rock", Color::LightGray, Color::Black);

        self.put_centered(14, "WASD / arrows   move and dig", Color::LightCyan, Color::Black);
        self.put_centered(15, "SPACE (hold)    pump", Color::LightCyan, Color::Black);
        self.put_centered(16, "ENTER           paralysis ray", Color::LightCyan, Color::Black);

        self.put_fmt(31, 18, Color::Yellow, Color::Black, format_args!("HIGH SCORE {:06}", state.high_score));
        if (state.frame / 30) % 2 == 0 {
            self.put_centered(22, "SPACE / ENTER to start    ESC to quit", Color::White, Color::Black);
        }
    }

    fn compose_credits(&mut self, state: &GameState) {
        self.fill_rect(0, 0, MAP_WIDTH as i32, MAP_HEIGHT as i32, ScreenCell::BLANK);
        self.put_centered(6, "B U R R O W", Color::Yellow, Color::Black);
        self.put_centered(9, "a tunnel digging arcade game", Color::LightGray, Color::Black);
        self.put_centered(10, "for the 80x25 text screen", Color::LightGray, Color::Black);
        self.put_fmt(30, 13, Color::White, Color::Black, format_args!("FINAL SCORE {:06}", state.score));
        self.put_fmt(30, 14, Color::Yellow, Color::Black, format_args!("HIGH SCORE  {:06}", state.high_score));
        self.put_centered(18, "thanks for playing", Color::LightCyan, Color::Black);
        if (state.frame / 30) % 2 == 0 {
            self.put_centered(22, "press any key", Color::White, Color::Black);
        }
    }
}

fn index(x: i32, y: i32) -> Option<usize> {
    if x < 0 || y < 0 || x as usize >= MAP_WIDTH || y as usize >= MAP_HEIGHT {
        return None;
    }
    Some(y as usize * MAP_WIDTH + x as usize)
}

/// Test sink that keeps a copy of the last frame.
#[cfg(test)]
#[derive(Default)]
pub struct CaptureSink {
    pub frames: usize,
    pub last: Vec<ScreenCell>,
}

#[cfg(test)]
impl FrameSink for CaptureSink {
    fn present(&mut self, cells: &[ScreenCell]) -> io::Result<()> {
        self.frames += 1;
        self.last.clear();
        self.last.extend_from_slice(cells);
        Ok(())
    }
}
