/// Enemy step, run once per tick for every live enemy in roster order.
///
///   1. Paralyzed: count down the blinks, die at the end
///   2. Inflating: deflate unless the pump is on, burst at full size
///   3. hold still while sharing the player's cell
///   4. speed counter gate
///   5. Fygar fire (may replace the move)
///   6. chase: Normal walks tunnels, Ghost drifts through dirt
///   7. stuck accounting and the Normal → Ghost switch

use crate::domain::consts::{INFLATE_LEVELS, ROW_BORDER, ROW_SKY_START};
use crate::domain::entity::{BlinkTick, Direction, EnemyKind, EnemyState};
use crate::domain::map::layer_points;

use super::event::{DeathCause, GameEvent, KillCause};
use super::world::GameState;

/// Column stride of the fallback direction seed.
const SEED_STRIDE: i32 = 79;

pub fn update_enemies(state: &mut GameState) {
    for id in 0..state.enemies.len() {
        update_enemy(state, id);
    }
}

fn update_enemy(state: &mut GameState, id: usize) {
    if !state.enemies[id].is_live() { return; }

    match state.enemies[id].state {
        EnemyState::Paralyzed => {
            if state.enemies[id].tick_paralysis() == BlinkTick::Expired {
                let points = layer_points(state.enemies[id].y);
                state.kill_enemy(id, points, KillCause::Paralysis);
            }
            return;
        }
        EnemyState::Inflating => {
            resolve_inflation(state, id);
            return;
        }
        _ => {}
    }

    // already on the player: hold still so the contact check sees it
    if state.player.is_alive() && on_player(state, id) {
        return;
    }

    if state.enemies[id].speed_counter > 0 {
        state.enemies[id].speed_counter -= 1;
        return;
    }

    if state.enemies[id].kind == EnemyKind::Fygar && resolve_fire(state, id) {
        return;
    }

    match state.enemies[id].state {
        EnemyState::Normal => step_normal(state, id),
        EnemyState::Ghost => step_ghost(state, id),
        _ => {}
    }

    let e = &mut state.enemies[id];
    e.speed_counter = e.speed_limit;
    e.stuck_timer = e.stuck_timer.saturating_add(1);

    if e.state == EnemyState::Normal
        && e.stuck_timer > state.ghost_threshold
        && !line_of_sight(state, id)
    {
        let e = &mut state.enemies[id];
        e.state = EnemyState::Ghost;
        e.has_left_tunnel = false;
        state.push_event(GameEvent::EnemyGhosted { id });
    }
}

// ══════════════════════════════════════════════════════════════
// Inflation
// ══════════════════════════════════════════════════════════════

fn resolve_inflation(state: &mut GameState, id: usize) {
    if state.player.pumping {
        if state.enemies[id].inflate_level >= INFLATE_LEVELS {
            let points = layer_points(state.enemies[id].y);
            state.kill_enemy(id, points, KillCause::Pump);
        }
        return;
    }

    let e = &mut state.enemies[id];
    e.inflate_level = e.inflate_level.saturating_sub(1);
    if e.inflate_level == 0 {
        e.state = EnemyState::Normal;
    }
}

// ══════════════════════════════════════════════════════════════
// Fygar fire
// ══════════════════════════════════════════════════════════════

/// Fire arbitration. Returns true when the Fygar spends this tick on fire
/// instead of moving. The speed counter is left at zero while firing so
/// the fire is re-checked every tick.
fn resolve_fire(state: &mut GameState, id: usize) -> bool {
    let now = state.tick;

    if state.enemies[id].fire.active {
        let f = &mut state.enemies[id].fire;
        if now.wrapping_sub(f.start_tick) >= f.duration {
            f.active = false;
            f.end_tick = now;
            state.push_event(GameEvent::FireEnded { id });
        } else {
            scorch(state, id);
            return true;
        }
    }

    let e = &state.enemies[id];
    if now.wrapping_sub(e.fire.end_tick) < state.tuning.fygar_fire_cooldown {
        return false;
    }

    let toward = if state.player.x < e.x {
        Direction::Left
    } else if state.player.x > e.x {
        Direction::Right
    } else if e.facing == Direction::Right {
        Direction::Right
    } else {
        Direction::Left
    };

    for dir in [toward, toward.opposite()] {
        if fire_lane_clear(state, id, dir) {
            let duration = state.tuning.fygar_fire_duration;
            let e = &mut state.enemies[id];
            e.facing = dir;
            e.fire.active = true;
            e.fire.start_tick = now;
            e.fire.duration = duration;
            e.fire.dir = dir;
            state.push_event(GameEvent::FireStarted { id, dir });
            scorch(state, id);
            return true;
        }
    }
    false
}

/// Fire needs exactly `fygar_fire_range` open cells and a closed cell
/// right after them.
fn fire_lane_clear(state: &GameState, id: usize, dir: Direction) -> bool {
    let e = &state.enemies[id];
    let range = state.tuning.fygar_fire_range as i32;
    let (dx, dy) = dir.delta();
    let open = |d: i32| {
        let (x, y) = (e.x + dx * d, e.y + dy * d);
        state.map.is_walkable(x, y) && !state.rock_blocks_enemy(x, y)
    };
    (1..=range).all(|d| open(d)) && !open(range + 1)
}

/// Is (x, y) inside enemy `id`'s active fire?
pub fn in_fire(state: &GameState, id: usize, x: i32, y: i32) -> bool {
    let e = &state.enemies[id];
    if !e.is_live() || !e.fire.active || y != e.y {
        return false;
    }
    let dist = (x - e.x) * e.fire.dir.delta().0;
    dist >= 1 && dist <= state.tuning.fygar_fire_range as i32
}

fn scorch(state: &mut GameState, id: usize) {
    if state.player.is_alive() && in_fire(state, id, state.player.x, state.player.y) {
        state.kill_player(DeathCause::Fire);
    }
}

// ══════════════════════════════════════════════════════════════
// Motion
// ══════════════════════════════════════════════════════════════

/// Enemies stay inside the playfield rows, never share a cell with a rock,
/// and only cross solid ground while ghosting.
fn enemy_can_enter(state: &GameState, x: i32, y: i32, through_dirt: bool) -> bool {
    if y < ROW_SKY_START as i32 || y >= ROW_BORDER as i32 || !state.map.is_valid(x, y) {
        return false;
    }
    if state.rock_blocks_enemy(x, y) {
        return false;
    }
    let tile = state.map.tile(x, y);
    tile.is_walkable() || (through_dirt && tile.is_solid())
}

fn move_enemy(state: &mut GameState, id: usize, dir: Direction) {
    let e = &mut state.enemies[id];
    let (nx, ny) = dir.step(e.x, e.y);
    e.x = nx;
    e.y = ny;
    e.facing = dir;
}

/// Deterministic fallback when the chase has nothing to offer.
fn wander(state: &mut GameState, id: usize, through_dirt: bool) -> bool {
    let (x, y, stuck) = {
        let e = &state.enemies[id];
        (e.x, e.y, e.stuck_timer as i32)
    };
    let start = (x + y * SEED_STRIDE + stuck).rem_euclid(4) as usize;
    for k in 0..4 {
        let dir = Direction::ALL[(start + k) % 4];
        let (nx, ny) = dir.step(x, y);
        if enemy_can_enter(state, nx, ny, through_dirt) {
            move_enemy(state, id, dir);
            return true;
        }
    }
    false
}

fn on_player(state: &GameState, id: usize) -> bool {
    let e = &state.enemies[id];
    e.x == state.player.x && e.y == state.player.y
}

/// Move enemy `id` off the player's cell, drifting through dirt as a
/// ghost when no tunnel neighbour is free.
pub fn step_aside(state: &mut GameState, id: usize) {
    if wander(state, id, false) {
        return;
    }
    if wander(state, id, true) {
        let e = &mut state.enemies[id];
        e.state = EnemyState::Ghost;
        e.has_left_tunnel = !state.map.is_walkable(e.x, e.y);
    }
}

fn chase_direction(state: &mut GameState, id: usize, allow_walls: bool) -> Option<Direction> {
    let from = (state.enemies[id].x, state.enemies[id].y);
    let to = (state.player.x, state.player.y);
    let dir = state.pathfinder.shortest_direction(&state.map, from, to, allow_walls)?;
    let (nx, ny) = dir.step(from.0, from.1);
    enemy_can_enter(state, nx, ny, allow_walls).then_some(dir)
}

fn step_normal(state: &mut GameState, id: usize) {
    match chase_direction(state, id, false) {
        Some(dir) => {
            move_enemy(state, id, dir);
            state.enemies[id].stuck_timer = 0;
        }
        None => {
            wander(state, id, false);
        }
    }
}

fn step_ghost(state: &mut GameState, id: usize) {
    match chase_direction(state, id, true) {
        Some(dir) => move_enemy(state, id, dir),
        None => {
            if !wander(state, id, true) { return; }
        }
    }

    let (x, y) = (state.enemies[id].x, state.enemies[id].y);
    let e = &mut state.enemies[id];
    if !state.map.is_walkable(x, y) {
        e.has_left_tunnel = true;
    } else if e.has_left_tunnel {
        e.state = EnemyState::Normal;
        e.has_left_tunnel = false;
        e.stuck_timer = 0;
        state.push_event(GameEvent::EnemyRecovered { id });
    }
}

/// Same row or column with nothing but open cells in between.
pub fn line_of_sight(state: &GameState, id: usize) -> bool {
    let e = &state.enemies[id];
    let (px, py) = (state.player.x, state.player.y);
    if e.x == px {
        let (lo, hi) = (e.y.min(py), e.y.max(py));
        ((lo + 1)..hi).all(|y| state.map.is_walkable(px, y))
    } else if e.y == py {
        let (lo, hi) = (e.x.min(px), e.x.max(px));
        ((lo + 1)..hi).all(|x| state.map.is_walkable(x, py))
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::consts::{PARALYZE_BLINKS, PARALYZE_BLINK_TICKS};
    use crate::domain::entity::PlayerState;
    use crate::domain::tile::TileKind;

    /// Advance the game clock and run one enemy phase.
    fn tick(s: &mut GameState) {
        s.tick += 1;
        s.events.clear();
        update_enemies(s);
    }

    fn ready(s: &mut GameState, id: usize) {
        s.enemies[id].speed_counter = 0;
    }

    #[test]
    fn normal_enemy_follows_the_tunnel() {
        let mut s = GameState::arena();
        s.open_row(10, 20, 40);
        s.player.x = 20;
        s.player.y = 10;
        let id = s.place_enemy(30, 10, EnemyKind::Pooka);
        ready(&mut s, id);
        tick(&mut s);
        assert_eq!((s.enemies[id].x, s.enemies[id].y), (29, 10));
        assert_eq!(s.enemies[id].facing, Direction::Left);
        assert_eq!(s.enemies[id].stuck_timer, 1);
        // waits speed_limit ticks before the next step
        for _ in 0..s.enemies[id].speed_limit {
            tick(&mut s);
            assert_eq!(s.enemies[id].x, 29);
        }
        tick(&mut s);
        assert_eq!(s.enemies[id].x, 28);
    }

    #[test]
    fn enemies_never_enter_rocks() {
        let mut s = GameState::arena();
        s.open_row(10, 20, 40);
        s.player.x = 20;
        s.player.y = 10;
        let id = s.place_enemy(30, 10, EnemyKind::Pooka);
        s.spawn_rock(29, 10);
        ready(&mut s, id);
        tick(&mut s);
        assert_eq!((s.enemies[id].x, s.enemies[id].y), (31, 10));
    }

    #[test]
    fn paralysis_ends_in_one_kill() {
        let mut s = GameState::arena();
        let id = s.place_enemy(30, 10, EnemyKind::Pooka);
        s.enemies[id].paralyze();
        let total = PARALYZE_BLINKS as u32 * PARALYZE_BLINK_TICKS as u32;
        for _ in 1..total {
            tick(&mut s);
            assert_eq!(s.enemies[id].state, EnemyState::Paralyzed);
            assert_eq!((s.enemies[id].x, s.enemies[id].y), (30, 10));
        }
        tick(&mut s);
        assert_eq!(s.enemies[id].state, EnemyState::Dead);
        assert_eq!(s.score, 300);
        assert_eq!(s.live_enemies, 0);
        tick(&mut s);
        assert_eq!(s.score, 300);
    }

    #[test]
    fn inflated_enemy_deflates_without_pump() {
        let mut s = GameState::arena();
        let id = s.place_enemy(30, 10, EnemyKind::Pooka);
        s.enemies[id].state = EnemyState::Inflating;
        s.enemies[id].inflate_level = 2;
        tick(&mut s);
        assert_eq!(s.enemies[id].inflate_level, 1);
        assert_eq!(s.enemies[id].state, EnemyState::Inflating);
        tick(&mut s);
        assert_eq!(s.enemies[id].state, EnemyState::Normal);

        s.enemies[id].state = EnemyState::Inflating;
        s.enemies[id].inflate_level = INFLATE_LEVELS;
        s.player.pumping = true;
        tick(&mut s);
        assert_eq!(s.enemies[id].state, EnemyState::Dead);
        assert_eq!(s.score, 300);
    }

    #[test]
    fn fygar_burns_player_in_range() {
        let mut s = GameState::arena();
        s.open_row(10, 43, 45);
        s.player.x = 43;
        s.player.y = 10;
        let id = s.place_enemy(45, 10, EnemyKind::Fygar);
        s.enemies[id].facing = Direction::Left;
        ready(&mut s, id);
        let cooldown = s.tuning.fygar_fire_cooldown;
        s.tick = cooldown;

        tick(&mut s);
        assert!(s.enemies[id].fire.active);
        assert_eq!(s.enemies[id].fire.dir, Direction::Left);
        assert_eq!(s.player.state, PlayerState::Dead);
        let started = s.enemies[id].fire.start_tick;

        let duration = s.tuning.fygar_fire_duration;
        for _ in 1..duration {
            tick(&mut s);
            assert!(s.enemies[id].fire.active);
            assert_eq!((s.enemies[id].x, s.enemies[id].y), (45, 10));
        }
        tick(&mut s);
        assert!(!s.enemies[id].fire.active);
        assert_eq!(s.enemies[id].fire.end_tick, started + duration);

        // cooling down: no fire until the cooldown has passed
        let end = s.enemies[id].fire.end_tick;
        while s.tick < end + cooldown - 1 {
            tick(&mut s);
            assert!(!s.enemies[id].fire.active, "refired at tick {}", s.tick);
        }
    }

    #[test]
    fn fygar_needs_exact_lane() {
        let mut s = GameState::arena();
        s.open_row(10, 42, 45);
        s.player.x = 43;
        s.player.y = 10;
        let id = s.place_enemy(45, 10, EnemyKind::Fygar);
        s.tick = s.tuning.fygar_fire_cooldown;
        // three open cells to the left, none to the right
        assert!(!fire_lane_clear(&s, id, Direction::Left));
        assert!(!fire_lane_clear(&s, id, Direction::Right));
        s.map.set_tile(42, 10, TileKind::Dirt);
        assert!(fire_lane_clear(&s, id, Direction::Left));
    }

    #[test]
    fn fygar_tries_the_far_side() {
        let mut s = GameState::arena();
        s.open_row(10, 45, 47);
        s.player.x = 20;
        s.player.y = 10;
        let id = s.place_enemy(45, 10, EnemyKind::Fygar);
        ready(&mut s, id);
        s.tick = s.tuning.fygar_fire_cooldown;
        tick(&mut s);
        assert!(s.enemies[id].fire.active);
        assert_eq!(s.enemies[id].fire.dir, Direction::Right);
        assert!(s.player.is_alive());
    }

    #[test]
    fn stuck_enemy_ghosts_through_dirt_and_recovers() {
        let mut s = GameState::arena();
        s.player.x = 10;
        s.player.y = 2;
        let id = s.place_enemy(40, 12, EnemyKind::Pooka);
        let threshold = s.ghost_threshold;
        s.enemies[id].stuck_timer = threshold;
        ready(&mut s, id);
        assert!(!line_of_sight(&s, id));

        tick(&mut s);
        assert_eq!(s.enemies[id].state, EnemyState::Ghost);
        assert_eq!((s.enemies[id].x, s.enemies[id].y), (40, 12));

        let dirt_before = s.map.count(TileKind::Dirt);
        let mut crossed_dirt = false;
        for _ in 0..5000 {
            tick(&mut s);
            let (x, y) = (s.enemies[id].x, s.enemies[id].y);
            if s.map.is_walkable(x, y) && crossed_dirt {
                break;
            }
            if !s.map.is_walkable(x, y) {
                crossed_dirt = true;
                assert_eq!(s.enemies[id].state, EnemyState::Ghost);
                assert!(s.enemies[id].has_left_tunnel);
            }
        }
        assert!(crossed_dirt);
        assert!(s.map.is_walkable(s.enemies[id].x, s.enemies[id].y));
        assert_eq!(s.enemies[id].state, EnemyState::Normal);
        assert!(s.events.contains(&GameEvent::EnemyRecovered { id }));
        // ghosts do not dig
        assert_eq!(s.map.count(TileKind::Dirt), dirt_before);
    }

    #[test]
    fn line_of_sight_prevents_ghosting() {
        let mut s = GameState::arena();
        s.open_row(12, 20, 40);
        s.map.set_tile(20, 12, TileKind::Wall);
        s.map.set_tile(21, 12, TileKind::Wall);
        s.player.x = 22;
        s.player.y = 12;
        let id = s.place_enemy(40, 12, EnemyKind::Pooka);
        assert!(line_of_sight(&s, id));
        s.enemies[id].stuck_timer = s.ghost_threshold + 5;
        // boxed in by a rock that does not break the line of sight
        s.spawn_rock(39, 12);
        ready(&mut s, id);
        tick(&mut s);
        assert_eq!(s.enemies[id].state, EnemyState::Normal);
    }

    #[test]
    fn wander_is_deterministic() {
        let mut a = GameState::arena();
        let ida = a.place_enemy(30, 10, EnemyKind::Pooka);
        a.open_row(10, 29, 31);
        a.open_row(9, 30, 30);
        let mut b = GameState::arena();
        let idb = b.place_enemy(30, 10, EnemyKind::Pooka);
        b.open_row(10, 29, 31);
        b.open_row(9, 30, 30);
        assert!(wander(&mut a, ida, false));
        assert!(wander(&mut b, idb, false));
        assert_eq!((a.enemies[ida].x, a.enemies[ida].y), (b.enemies[idb].x, b.enemies[idb].y));
        // seed = 30 + 10*79 = 820, 820 % 4 = 0 → Up first
        assert_eq!((a.enemies[ida].x, a.enemies[ida].y), (30, 9));
    }
}
