/// Entities: Player, Enemy (Pooka / Fygar) and Rock.
/// Each carries its own state machine; cross-entity effects (scoring,
/// crushing, inflating) are resolved by the simulation, never by pointers
/// between entities.

use super::consts::{
    FYGAR_SPEED_LIMIT, MIN_ENEMY_SPEED_LIMIT, PARALYZE_BLINKS, PARALYZE_BLINK_TICKS,
    POOKA_SPEED_LIMIT,
};

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Direction {
    #[default]
    None,
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Neighbor enumeration order, also the pathfinder's tie-break order.
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::None => (0, 0),
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::None => Direction::None,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, Direction::Up | Direction::Down)
    }

    pub fn step(self, x: i32, y: i32) -> (i32, i32) {
        let (dx, dy) = self.delta();
        (x + dx, y + dy)
    }
}

// ── Player ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PlayerState {
    Idle,
    Moving,
    Digging,
    Pumping,
    Attacking,
    Dead,
}

#[derive(Clone, Debug)]
pub struct Player {
    pub x: i32,
    pub y: i32,
    pub facing: Direction,
    pub move_cooldown: u32,
    pub speed_limit: u32,
    pub pumping: bool,
    pub pump_length: usize,
    pub pump_dir: Direction,
    pub attacking: bool,
    pub attack_timer: u32,
    pub state: PlayerState,
}

impl Player {
    pub fn new(x: i32, y: i32, speed_limit: u32) -> Self {
        Player {
            x, y,
            facing: Direction::Right,
            move_cooldown: 0,
            speed_limit,
            pumping: false,
            pump_length: 0,
            pump_dir: Direction::None,
            attacking: false,
            attack_timer: 0,
            state: PlayerState::Idle,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.state != PlayerState::Dead
    }

    pub fn retract_pump(&mut self) {
        self.pumping = false;
        self.pump_length = 0;
        self.pump_dir = Direction::None;
    }
}

// ── Enemy ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum EnemyKind {
    Pooka,
    Fygar,
}

impl EnemyKind {
    pub fn base_speed_limit(self) -> u32 {
        match self {
            EnemyKind::Pooka => POOKA_SPEED_LIMIT,
            EnemyKind::Fygar => FYGAR_SPEED_LIMIT,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum EnemyState {
    Normal,
    Ghost,
    Inflating,
    Paralyzed,
    Dead,
}

/// Fygar fire bookkeeping. Tick marks are on the game clock.
#[derive(Clone, Debug, Default)]
pub struct FireState {
    pub active: bool,
    pub start_tick: u32,
    pub end_tick: u32,
    pub duration: u32,
    pub dir: Direction,
}

#[derive(Clone, Debug)]
pub struct Enemy {
    pub x: i32,
    pub y: i32,
    pub spawn_x: i32,
    pub spawn_y: i32,
    pub facing: Direction,
    pub kind: EnemyKind,
    pub state: EnemyState,
    pub active: bool,
    pub speed_counter: u32,
    pub speed_limit: u32,
    pub inflate_level: u8,
    pub stuck_timer: u32,
    pub blink_count: u8,
    pub blink_timer: u8,
    pub has_left_tunnel: bool,
    pub fire: FireState,
}

/// Outcome of one paralysis tick.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BlinkTick {
    Blinking,
    Expired,
}

impl Enemy {
    /// `speed_bonus` lowers the speed limit (faster enemy) for rounds past
    /// the last defined level.
    pub fn new(x: i32, y: i32, kind: EnemyKind, speed_bonus: u32) -> Self {
        let speed_limit = kind
            .base_speed_limit()
            .saturating_sub(speed_bonus)
            .max(MIN_ENEMY_SPEED_LIMIT);
        Enemy {
            x, y,
            spawn_x: x,
            spawn_y: y,
            facing: Direction::Left,
            kind,
            state: EnemyState::Normal,
            active: true,
            speed_counter: speed_limit,
            speed_limit,
            inflate_level: 0,
            stuck_timer: 0,
            blink_count: 0,
            blink_timer: 0,
            has_left_tunnel: false,
            fire: FireState::default(),
        }
    }

    pub fn is_live(&self) -> bool {
        self.active && self.state != EnemyState::Dead
    }

    /// Can this enemy hurt the player on contact?
    pub fn is_harmful(&self) -> bool {
        self.is_live() && !matches!(self.state, EnemyState::Inflating | EnemyState::Paralyzed)
    }

    pub fn paralyze(&mut self) {
        self.state = EnemyState::Paralyzed;
        self.blink_count = PARALYZE_BLINKS;
        self.blink_timer = PARALYZE_BLINK_TICKS;
        self.inflate_level = 0;
        self.fire.active = false;
    }

    /// Advance the paralysis countdown by one tick.
    pub fn tick_paralysis(&mut self) -> BlinkTick {
        if self.blink_timer > 0 {
            self.blink_timer -= 1;
        }
        if self.blink_timer == 0 {
            self.blink_count = self.blink_count.saturating_sub(1);
            if self.blink_count == 0 {
                return BlinkTick::Expired;
            }
            self.blink_timer = PARALYZE_BLINK_TICKS;
        }
        BlinkTick::Blinking
    }

    /// Return to the spawn cell in Normal state (after a player respawn).
    pub fn reset_to_spawn(&mut self) {
        self.x = self.spawn_x;
        self.y = self.spawn_y;
        self.state = EnemyState::Normal;
        self.inflate_level = 0;
        self.stuck_timer = 0;
        self.has_left_tunnel = false;
        self.speed_counter = self.speed_limit;
        self.fire.active = false;
    }

    pub fn kill(&mut self) {
        self.state = EnemyState::Dead;
        self.active = false;
        self.fire.active = false;
    }
}

// ── Rock ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RockState {
    Stable,
    Wobbling,
    Falling,
    Blinking,
    Landed,
}

#[derive(Clone, Debug)]
pub struct Rock {
    pub x: i32,
    pub y: i32,
    pub state: RockState,
    pub active: bool,
    pub wobble_timer: u32,
    pub falling_kill: bool,
    pub blink_count: u32,
    pub blink_timer: u32,
}

impl Rock {
    pub fn new(x: i32, y: i32) -> Self {
        Rock {
            x, y,
            state: RockState::Stable,
            active: true,
            wobble_timer: 0,
            falling_kill: false,
            blink_count: 0,
            blink_timer: 0,
        }
    }

    /// Stable and wobbling rocks are obstacles for the player.
    pub fn blocks_player(&self) -> bool {
        self.active && matches!(self.state, RockState::Stable | RockState::Wobbling)
    }

    /// Any rock still on the field is an obstacle for enemies.
    pub fn blocks_enemy(&self) -> bool {
        self.active && self.state != RockState::Landed
    }

    pub fn start_wobble(&mut self, ticks: u32) {
        self.state = RockState::Wobbling;
        self.wobble_timer = ticks;
    }

    /// Returns true when the wobble just finished and the rock starts falling.
    pub fn tick_wobble(&mut self) -> bool {
        if self.wobble_timer > 0 {
            self.wobble_timer -= 1;
        }
        if self.wobble_timer == 0 {
            self.state = RockState::Falling;
            return true;
        }
        false
    }

    pub fn land(&mut self, blink_count: u32, blink_duration: u32) {
        self.state = RockState::Blinking;
        self.blink_count = blink_count;
        self.blink_timer = blink_duration;
    }

    /// Returns true when the last blink finished and the rock is gone.
    pub fn tick_blink(&mut self, blink_duration: u32) -> bool {
        if self.blink_timer > 0 {
            self.blink_timer -= 1;
        }
        if self.blink_timer == 0 {
            self.blink_count = self.blink_count.saturating_sub(1);
            if self.blink_count == 0 {
                self.state = RockState::Landed;
                self.active = false;
                return true;
            }
            self.blink_timer = blink_duration;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_opposites() {
        for d in Direction::ALL {
            assert_eq!(d.opposite().opposite(), d);
            let (dx, dy) = d.delta();
            let (ox, oy) = d.opposite().delta();
            assert_eq!((dx + ox, dy + oy), (0, 0));
        }
        assert_eq!(Direction::None.delta(), (0, 0));
    }

    #[test]
    fn paralysis_lasts_blinks_times_five_ticks() {
        let mut e = Enemy::new(5, 5, EnemyKind::Pooka, 0);
        e.paralyze();
        let mut ticks = 0;
        loop {
            ticks += 1;
            if e.tick_paralysis() == BlinkTick::Expired { break; }
            assert!(ticks < 1000);
        }
        assert_eq!(ticks, PARALYZE_BLINKS as u32 * PARALYZE_BLINK_TICKS as u32);
    }

    #[test]
    fn speed_bonus_floors_at_minimum() {
        let e = Enemy::new(0, 0, EnemyKind::Pooka, 100);
        assert_eq!(e.speed_limit, MIN_ENEMY_SPEED_LIMIT);
        let f = Enemy::new(0, 0, EnemyKind::Fygar, 1);
        assert_eq!(f.speed_limit, FYGAR_SPEED_LIMIT - 1);
    }

    #[test]
    fn harmful_excludes_inflating_and_paralyzed() {
        let mut e = Enemy::new(0, 0, EnemyKind::Fygar, 0);
        assert!(e.is_harmful());
        e.state = EnemyState::Inflating;
        assert!(!e.is_harmful());
        e.paralyze();
        assert!(!e.is_harmful());
        e.state = EnemyState::Ghost;
        assert!(e.is_harmful());
        e.kill();
        assert!(!e.is_harmful());
        assert!(!e.is_live());
    }

    #[test]
    fn rock_wobble_then_fall() {
        let mut r = Rock::new(3, 4);
        assert!(r.blocks_player());
        r.start_wobble(3);
        assert!(!r.tick_wobble());
        assert!(!r.tick_wobble());
        assert!(r.tick_wobble());
        assert_eq!(r.state, RockState::Falling);
        assert!(!r.blocks_player());
        assert!(r.blocks_enemy());
    }

    #[test]
    fn rock_blink_lifecycle() {
        let mut r = Rock::new(0, 0);
        r.land(2, 3);
        assert_eq!(r.state, RockState::Blinking);
        let mut ticks = 0;
        while !r.tick_blink(3) {
            ticks += 1;
            assert!(ticks < 100);
        }
        assert_eq!(ticks + 1, 6);
        assert_eq!(r.state, RockState::Landed);
        assert!(!r.active);
        assert!(!r.blocks_enemy());
    }
}
