/// Rock physics.
///
/// Stable → Wobbling (ground below dug out) → Falling → Blinking (landed)
/// → Landed. A falling rock crushes whatever stands in its cell or the cell
/// just below, then either lands or drops one row. Once falling it cannot
/// be stopped except by landing.

use crate::domain::entity::RockState;
use crate::domain::map::layer_points;

use super::event::{DeathCause, GameEvent, KillCause};
use super::world::GameState;

pub fn update_rocks(state: &mut GameState) {
    for id in 0..state.rocks.len() {
        if !state.rocks[id].active { continue; }

        match state.rocks[id].state {
            RockState::Stable => {
                if !supported(state, id) {
                    let ticks = state.tuning.rock_wobble_ticks;
                    state.rocks[id].start_wobble(ticks);
                    state.push_event(GameEvent::RockLoosened { id });
                }
            }
            RockState::Wobbling => {
                if state.rocks[id].tick_wobble() {
                    state.push_event(GameEvent::RockFalling { id });
                }
            }
            RockState::Falling => fall(state, id),
            RockState::Blinking => {
                let duration = state.tuning.rock_blink_duration;
                state.rocks[id].tick_blink(duration);
            }
            RockState::Landed => {}
        }
    }
}

/// Something holds the rock up: solid ground, the map edge, or another
/// rock that is still on the field.
fn supported(state: &GameState, id: usize) -> bool {
    let r = &state.rocks[id];
    let (x, below) = (r.x, r.y + 1);
    !state.map.is_valid(x, below)
        || state.map.is_solid(x, below)
        || state
            .rocks
            .iter()
            .enumerate()
            .any(|(j, o)| j != id && o.x == x && o.y == below && o.blocks_enemy())
}

fn fall(state: &mut GameState, id: usize) {
    let (x, y) = (state.rocks[id].x, state.rocks[id].y);
    crush(state, id, x, y);
    crush(state, id, x, y + 1);

    if supported(state, id) {
        let (count, duration) = (state.tuning.rock_blink_count, state.tuning.rock_blink_duration);
        state.rocks[id].land(count, duration);
        state.push_event(GameEvent::RockLanded { id, x, y });
    } else {
        state.rocks[id].y += 1;
    }
}

fn crush(state: &mut GameState, id: usize, x: i32, y: i32) {
    if state.player.is_alive() && state.player.x == x && state.player.y == y {
        state.rocks[id].falling_kill = true;
        state.kill_player(DeathCause::Rock);
    }

    let multiplier = state.tuning.rock_kill_multiplier;
    for e in 0..state.enemies.len() {
        let victim = &state.enemies[e];
        if victim.is_live() && victim.x == x && victim.y == y {
            state.rocks[id].falling_kill = true;
            state.kill_enemy(e, multiplier * layer_points(y), KillCause::Rock);
        }
    }
}
