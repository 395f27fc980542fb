/// Player step: movement with digging, the pump and the paralysis ray.
///
/// Order within the player's turn:
///   1. attack timer
///   2. attack (Enter), which does not consume the turn
///   3. pump (Space held), which pins the player in place
///   4. otherwise retract the pump and try to move

use crate::domain::consts::{
    ATTACK_TICKS, BONUS_POINTS, GEM_POINTS, INFLATE_LEVELS, MAX_PUMP_LENGTH, ROW_BORDER,
    ROW_SKY_END, ROW_SKY_START,
};
use crate::domain::entity::{Direction, EnemyState, PlayerState};
use crate::domain::input::InputSnapshot;
use crate::domain::tile::TileKind;

use super::event::GameEvent;
use super::world::GameState;

/// In Playing, Enter (`action_pressed`) fires the ray and Space is read only
/// as held (`attack_held`); Space's one-shot latch matters to the Menu alone.
pub fn update_player(state: &mut GameState, input: &InputSnapshot) {
    if !state.player.is_alive() { return; }

    if state.player.attack_timer > 0 {
        state.player.attack_timer -= 1;
        if state.player.attack_timer == 0 {
            state.player.attacking = false;
            if state.player.state == PlayerState::Attacking {
                state.player.state = PlayerState::Idle;
            }
        }
    }

    if input.action_pressed {
        attack(state);
    }

    if input.attack_held {
        pump(state);
        return;
    }

    if state.player.pumping {
        state.player.retract_pump();
        state.player.state = PlayerState::Idle;
    }

    resolve_movement(state, input.direction);
}

// ══════════════════════════════════════════════════════════════
// Movement
// ══════════════════════════════════════════════════════════════

fn resolve_movement(state: &mut GameState, dir: Direction) {
    if dir != Direction::None {
        state.player.facing = dir;
    }

    if state.player.move_cooldown > 0 {
        state.player.move_cooldown -= 1;
        return;
    }

    if dir == Direction::None {
        if matches!(state.player.state, PlayerState::Moving | PlayerState::Digging) {
            state.player.state = PlayerState::Idle;
        }
        return;
    }

    try_move(state, dir);
}

/// Can the player stand on (x, y)? Rows above the sky line and the border
/// row are off limits, as are walls and rocks that have not started falling.
pub fn player_can_enter(state: &GameState, x: i32, y: i32) -> bool {
    if y < ROW_SKY_END as i32 || y >= ROW_BORDER as i32 {
        return false;
    }
    let tile = state.map.tile(x, y);
    if tile == TileKind::Invalid || (tile.is_solid() && !tile.is_diggable()) {
        return false;
    }
    !state.rock_blocks_player(x, y)
}

/// One step in `dir`. Returns true if the player moved.
pub fn try_move(state: &mut GameState, dir: Direction) -> bool {
    let (nx, ny) = dir.step(state.player.x, state.player.y);
    state.player.facing = dir;
    if !player_can_enter(state, nx, ny) {
        return false;
    }

    if state.map.dig(nx, ny) {
        state.player.state = PlayerState::Digging;
        state.push_event(GameEvent::Dug { x: nx, y: ny });
    } else {
        state.player.state = PlayerState::Moving;
    }
    state.player.x = nx;
    state.player.y = ny;
    state.player.move_cooldown = state.player.speed_limit;

    match state.map.take_pickup(nx, ny) {
        Some(TileKind::Bonus) => {
            state.add_score(BONUS_POINTS);
            state.push_event(GameEvent::BonusTaken { x: nx, y: ny, points: BONUS_POINTS });
        }
        Some(TileKind::Gem) => {
            state.add_score(GEM_POINTS);
            state.push_event(GameEvent::GemTaken { x: nx, y: ny, points: GEM_POINTS });
        }
        _ => {}
    }
    true
}

// ══════════════════════════════════════════════════════════════
// Pump
// ══════════════════════════════════════════════════════════════

/// Cells a pump or ray may pass through.
fn ray_open(state: &GameState, x: i32, y: i32) -> bool {
    let tile = state.map.tile(x, y);
    tile != TileKind::Invalid
        && !tile.is_solid()
        && y >= ROW_SKY_START as i32
        && y < ROW_BORDER as i32
        && !state.rock_blocks_enemy(x, y)
}

fn ray_cell(x: i32, y: i32, dir: Direction, dist: usize) -> (i32, i32) {
    let (dx, dy) = dir.delta();
    (x + dx * dist as i32, y + dy * dist as i32)
}

/// Extend the pump one cell along the facing direction and inflate the
/// first enemy it reaches.
pub fn pump(state: &mut GameState) {
    let p = &mut state.player;
    if p.pump_dir != p.facing {
        p.pump_dir = p.facing;
        p.pump_length = 0;
    }
    p.pumping = true;
    p.state = PlayerState::Pumping;
    let (px, py, dir) = (p.x, p.y, p.pump_dir);

    if state.player.pump_length < MAX_PUMP_LENGTH {
        let (nx, ny) = ray_cell(px, py, dir, state.player.pump_length + 1);
        if ray_open(state, nx, ny) {
            state.player.pump_length += 1;
        }
    }

    for dist in 1..=state.player.pump_length {
        let (cx, cy) = ray_cell(px, py, dir, dist);
        let target = state.enemies.iter().position(|e| {
            e.is_live()
                && e.x == cx
                && e.y == cy
                && matches!(e.state, EnemyState::Normal | EnemyState::Ghost | EnemyState::Inflating)
        });
        if let Some(id) = target {
            state.player.pump_length = dist;
            let e = &mut state.enemies[id];
            if e.state == EnemyState::Inflating {
                e.inflate_level = (e.inflate_level + 1).min(INFLATE_LEVELS);
            } else {
                e.state = EnemyState::Inflating;
                e.inflate_level = 1;
                e.fire.active = false;
            }
            let level = e.inflate_level;
            state.push_event(GameEvent::EnemyInflated { id, level });
            return;
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Attack
// ══════════════════════════════════════════════════════════════

/// Paralysis ray along the facing direction. Stops at the first solid
/// cell or at the first cell holding an enemy; every live enemy on that
/// cell is paralyzed.
pub fn attack(state: &mut GameState) {
    if state.player.attack_timer > 0 { return; }
    let dir = state.player.facing;
    if dir == Direction::None { return; }

    state.player.attacking = true;
    state.player.attack_timer = ATTACK_TICKS;
    if !state.player.pumping {
        state.player.state = PlayerState::Attacking;
    }

    let range = if dir.is_vertical() {
        state.tuning.attack_range_v
    } else {
        state.tuning.attack_range_h
    };
    let (px, py) = (state.player.x, state.player.y);

    for dist in 1..=range as usize {
        let (cx, cy) = ray_cell(px, py, dir, dist);
        if !ray_open(state, cx, cy) {
            return;
        }
        let mut hit = false;
        for id in 0..state.enemies.len() {
            let e = &mut state.enemies[id];
            if !e.is_live() || e.x != cx || e.y != cy {
                continue;
            }
            hit = true;
            if e.state != EnemyState::Paralyzed {
                e.paralyze();
                state.push_event(GameEvent::EnemyParalyzed { id });
            }
        }
        if hit {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::EnemyKind;

    fn snap(direction: Direction) -> InputSnapshot {
        InputSnapshot { direction, ..InputSnapshot::default() }
    }

    fn underground(x: i32, y: i32) -> GameState {
        let mut s = GameState::arena();
        s.open_row(y, x, x);
        s.player.x = x;
        s.player.y = y;
        s
    }

    #[test]
    fn walking_into_dirt_digs_it() {
        let mut s = underground(20, 10);
        update_player(&mut s, &snap(Direction::Down));
        assert_eq!((s.player.x, s.player.y), (20, 11));
        assert_eq!(s.map.tile(20, 11), TileKind::Empty);
        assert_eq!(s.player.state, PlayerState::Digging);
        assert!(s.events.contains(&GameEvent::Dug { x: 20, y: 11 }));
    }

    #[test]
    fn cooldown_spaces_out_steps() {
        let mut s = underground(20, 10);
        s.open_row(10, 20, 40);
        let mut xs = vec![];
        for _ in 0..9 {
            update_player(&mut s, &snap(Direction::Right));
            xs.push(s.player.x);
        }
        // moves every speed_limit + 1 ticks
        assert_eq!(xs, vec![21, 21, 21, 21, 22, 22, 22, 22, 23]);
    }

    #[test]
    fn boundaries_reject_moves_but_turn_the_player() {
        let mut s = GameState::arena();
        assert!(!try_move(&mut s, Direction::Up)); // above the sky line
        assert_eq!(s.player.facing, Direction::Up);
        assert_eq!((s.player.x, s.player.y), (10, 2));

        let mut s = underground(30, ROW_BORDER as i32 - 1);
        assert!(!try_move(&mut s, Direction::Down));

        let mut s = underground(30, 10);
        s.map.set_tile(31, 10, TileKind::Wall);
        assert!(!try_move(&mut s, Direction::Right));

        let mut s = GameState::arena();
        s.player.x = 0;
        assert!(!try_move(&mut s, Direction::Left));
    }

    #[test]
    fn stable_rock_blocks_falling_rock_does_not() {
        let mut s = underground(30, 10);
        s.open_row(10, 30, 31);
        let r = s.spawn_rock(31, 10).expect("room");
        assert!(!try_move(&mut s, Direction::Right));
        s.rocks[r].state = crate::domain::entity::RockState::Falling;
        assert!(try_move(&mut s, Direction::Right));
    }

    #[test]
    fn pickups_score_and_vanish() {
        let mut s = GameState::arena();
        s.map.set_tile(11, 2, TileKind::Bonus);
        s.map.set_tile(12, 2, TileKind::Gem);
        assert!(try_move(&mut s, Direction::Right));
        assert_eq!(s.score, BONUS_POINTS);
        s.player.move_cooldown = 0;
        assert!(try_move(&mut s, Direction::Right));
        assert_eq!(s.score, BONUS_POINTS + GEM_POINTS);
        assert_eq!(s.map.tile(11, 2), TileKind::Empty);
        assert_eq!(s.map.tile(12, 2), TileKind::Empty);
    }

    #[test]
    fn pump_extends_to_max_and_stops_at_dirt() {
        let mut s = underground(20, 10);
        s.open_row(10, 20, 30);
        s.player.facing = Direction::Right;
        for expected in [1, 2, 3, 3, 3] {
            pump(&mut s);
            assert_eq!(s.player.pump_length, expected);
        }
        assert_eq!(MAX_PUMP_LENGTH, 3);

        let mut s = underground(20, 10);
        s.open_row(10, 20, 21);
        s.player.facing = Direction::Right;
        pump(&mut s);
        pump(&mut s);
        assert_eq!(s.player.pump_length, 1);
    }

    #[test]
    fn pump_hooks_the_first_enemy_and_shortens() {
        let mut s = underground(20, 10);
        s.open_row(10, 20, 30);
        s.player.facing = Direction::Right;
        pump(&mut s);
        pump(&mut s);
        assert_eq!(s.player.pump_length, 2);
        let near = s.place_enemy(21, 10, EnemyKind::Pooka);
        let far = s.place_enemy(22, 10, EnemyKind::Pooka);
        pump(&mut s);
        assert_eq!(s.player.pump_length, 1);
        assert_eq!(s.enemies[near].state, EnemyState::Inflating);
        assert_eq!(s.enemies[far].state, EnemyState::Normal);
    }

    #[test]
    fn turning_resets_the_pump() {
        let mut s = underground(20, 10);
        s.open_row(10, 18, 24);
        s.player.facing = Direction::Right;
        pump(&mut s);
        pump(&mut s);
        s.player.facing = Direction::Left;
        pump(&mut s);
        assert_eq!(s.player.pump_dir, Direction::Left);
        assert_eq!(s.player.pump_length, 1);
    }

    #[test]
    fn releasing_space_retracts() {
        let mut s = underground(20, 10);
        s.open_row(10, 20, 30);
        let held = InputSnapshot { attack_held: true, ..InputSnapshot::default() };
        update_player(&mut s, &held);
        assert!(s.player.pumping);
        update_player(&mut s, &InputSnapshot::default());
        assert!(!s.player.pumping);
        assert_eq!(s.player.pump_length, 0);
        assert_eq!(s.player.state, PlayerState::Idle);
    }

    #[test]
    fn attack_paralyzes_first_enemy_cell_only() {
        let mut s = underground(20, 10);
        s.open_row(10, 20, 30);
        s.player.facing = Direction::Right;
        let a = s.place_enemy(23, 10, EnemyKind::Pooka);
        let b = s.place_enemy(23, 10, EnemyKind::Fygar);
        let c = s.place_enemy(24, 10, EnemyKind::Pooka);
        attack(&mut s);
        assert_eq!(s.enemies[a].state, EnemyState::Paralyzed);
        assert_eq!(s.enemies[b].state, EnemyState::Paralyzed);
        assert_eq!(s.enemies[c].state, EnemyState::Normal);
        assert_eq!(s.player.attack_timer, ATTACK_TICKS);
    }

    #[test]
    fn attack_range_depends_on_axis() {
        // horizontal reaches 4, vertical reaches 3
        let mut s = underground(20, 10);
        s.open_row(10, 20, 30);
        s.player.facing = Direction::Right;
        let far = s.place_enemy(25, 10, EnemyKind::Pooka);
        let edge = s.place_enemy(24, 10, EnemyKind::Pooka);
        s.enemies[edge].kill();
        attack(&mut s);
        assert_eq!(s.enemies[far].state, EnemyState::Normal);

        let mut s = underground(20, 10);
        for y in 10..=14 {
            s.open_row(y, 20, 20);
        }
        s.player.facing = Direction::Down;
        let reach = s.place_enemy(20, 13, EnemyKind::Pooka);
        attack(&mut s);
        assert_eq!(s.enemies[reach].state, EnemyState::Paralyzed);

        let mut s = underground(20, 10);
        for y in 10..=14 {
            s.open_row(y, 20, 20);
        }
        s.player.facing = Direction::Down;
        let beyond = s.place_enemy(20, 14, EnemyKind::Pooka);
        attack(&mut s);
        assert_eq!(s.enemies[beyond].state, EnemyState::Normal);
    }

    #[test]
    fn attack_is_blocked_by_dirt_and_cooldown() {
        let mut s = underground(20, 10);
        s.open_row(10, 22, 24);
        s.player.facing = Direction::Right;
        let e = s.place_enemy(23, 10, EnemyKind::Pooka);
        attack(&mut s);
        assert_eq!(s.enemies[e].state, EnemyState::Normal);
        assert_eq!(s.player.attack_timer, ATTACK_TICKS);
        s.open_row(10, 21, 21);
        attack(&mut s);
        assert_eq!(s.enemies[e].state, EnemyState::Normal);
    }
}
