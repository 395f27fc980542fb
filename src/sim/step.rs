/// The step function: advances the game by one tick.
///
/// Input is sampled exactly once at the top. While Playing, updates run in
/// a fixed order:
///   1. Player (attack, pump, movement)
///   2. Enemies
///   3. Rocks
///   4. Contact between player and enemies
///   5. Round-clear check
///
/// Every other scene only counts frames or waits for a key.

use crate::domain::input::{Input, InputSnapshot};
use crate::domain::consts::MAX_ROUNDS;
use crate::domain::entity::PlayerState;

use super::enemy::{step_aside, update_enemies};
use super::event::{DeathCause, GameEvent};
use super::level::load_round;
use super::player::update_player;
use super::rock::update_rocks;
use super::world::{GameState, Scene};

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn update(state: &mut GameState, input: &Input) {
    state.events.clear();
    state.frame = state.frame.wrapping_add(1);
    let snap = input.snapshot(state.frame, state.tuning.hold_threshold());

    if snap.quit_pressed {
        input.clear_quit();
        resolve_quit(state);
        return;
    }

    match state.scene {
        Scene::Menu => {
            if snap.action_pressed || snap.attack_pressed {
                // the start key must not carry over as a pump
                input.reset();
                new_game(state);
            }
        }
        Scene::RoundStart => {
            if count_down(state) {
                state.set_scene(Scene::Playing);
            }
        }
        Scene::Playing => {
            if snap.pause_pressed {
                state.set_scene(Scene::Paused);
                return;
            }
            play_tick(state, &snap);
        }
        Scene::Paused => {
            if snap.pause_pressed {
                state.set_scene(Scene::Playing);
            }
        }
        Scene::RoundClear => {
            if count_down(state) {
                next_round(state);
            }
        }
        Scene::GameOver | Scene::Victory => {
            if snap.any_key_pressed {
                state.set_scene(Scene::Credits);
            }
        }
        Scene::Credits => {
            if snap.any_key_pressed {
                state.set_scene(Scene::Menu);
            }
        }
    }
}

/// Tick the scene timer. True once it has run out.
fn count_down(state: &mut GameState) -> bool {
    if state.scene_timer > 0 {
        state.scene_timer -= 1;
    }
    state.scene_timer == 0
}

fn resolve_quit(state: &mut GameState) {
    match state.scene {
        Scene::Menu => state.exit_requested = true,
        _ => state.set_scene(Scene::Menu),
    }
}

// ══════════════════════════════════════════════════════════════
// Session / round transitions
// ══════════════════════════════════════════════════════════════

pub fn new_game(state: &mut GameState) {
    state.score = 0;
    state.lives = state.tuning.initial_lives;
    state.tick = 0;
    start_round(state, 1);
}

fn start_round(state: &mut GameState, round: u32) {
    load_round(state, round);
    state.scene_timer = state.tuning.round_start_delay;
    state.set_scene(Scene::RoundStart);
    if state.scene_timer == 0 {
        state.set_scene(Scene::Playing);
    }
}

fn next_round(state: &mut GameState) {
    let round = state.round + 1;
    if round > MAX_ROUNDS {
        state.round = round;
        state.set_scene(Scene::Victory);
        return;
    }
    start_round(state, round);
}

// ══════════════════════════════════════════════════════════════
// Playing
// ══════════════════════════════════════════════════════════════

fn play_tick(state: &mut GameState, snap: &InputSnapshot) {
    if !state.player.is_alive() {
        // world frozen until the respawn timer runs out
        if count_down(state) {
            respawn(state);
        }
        return;
    }

    state.tick = state.tick.wrapping_add(1);

    update_player(state, snap);
    update_enemies(state);
    update_rocks(state);
    resolve_contact(state);
    resolve_round_clear(state);
    debug_assert_eq!(state.live_enemies, state.count_live_enemies());
}

fn resolve_contact(state: &mut GameState) {
    if !state.player.is_alive() { return; }
    let (px, py) = (state.player.x, state.player.y);
    let touched = state
        .enemies
        .iter()
        .any(|e| e.is_harmful() && e.x == px && e.y == py);
    if touched {
        state.kill_player(DeathCause::Contact);
    }
}

fn resolve_round_clear(state: &mut GameState) {
    if state.live_enemies > 0 || state.scene != Scene::Playing {
        return;
    }
    let mark = match state.enemies_cleared_mark {
        Some(mark) => mark,
        None => {
            let mark = state.tick.wrapping_add(2 * state.tuning.ticks_per_second());
            state.enemies_cleared_mark = Some(mark);
            state.push_event(GameEvent::EnemiesCleared { tick: state.tick });
            mark
        }
    };
    if state.tick >= mark {
        state.scene_timer = state.tuning.level_clear_delay;
        state.push_event(GameEvent::RoundCleared { round: state.round });
        state.set_scene(Scene::RoundClear);
        if state.scene_timer == 0 {
            next_round(state);
        }
    }
}

/// Bring the player back where they fell; live enemies go home. An enemy
/// whose home is the player's cell stays where it is instead, and steps
/// aside if it is standing there too.
fn respawn(state: &mut GameState) {
    let p = &mut state.player;
    p.retract_pump();
    p.attacking = false;
    p.attack_timer = 0;
    p.move_cooldown = 0;
    p.state = PlayerState::Idle;

    let now = state.tick;
    let home = (state.player.x, state.player.y);
    for id in 0..state.enemies.len() {
        let e = &mut state.enemies[id];
        if !e.is_live() {
            continue;
        }
        let was = (e.x, e.y);
        e.reset_to_spawn();
        e.fire.end_tick = now;
        if (e.x, e.y) != home {
            continue;
        }
        (e.x, e.y) = was;
        if was == home {
            step_aside(state, id);
        }
    }
    state.push_event(GameEvent::PlayerRespawned);
}
