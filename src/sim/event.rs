/// Events emitted during a simulation tick.
/// The loop drains them for logging; nothing in the simulation reads them back.

use crate::domain::entity::Direction;

use super::world::Scene;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum KillCause {
    Pump,
    Paralysis,
    Rock,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DeathCause {
    Contact,
    Fire,
    Rock,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameEvent {
    Dug { x: i32, y: i32 },
    BonusTaken { x: i32, y: i32, points: u32 },
    GemTaken { x: i32, y: i32, points: u32 },
    EnemyInflated { id: usize, level: u8 },
    EnemyParalyzed { id: usize },
    EnemyGhosted { id: usize },
    EnemyRecovered { id: usize },
    EnemyKilled { id: usize, x: i32, y: i32, points: u32, cause: KillCause },
    FireStarted { id: usize, dir: Direction },
    FireEnded { id: usize },
    RockLoosened { id: usize },
    RockFalling { id: usize },
    RockLanded { id: usize, x: i32, y: i32 },
    PlayerKilled { x: i32, y: i32, cause: DeathCause, lives_left: u32 },
    PlayerRespawned,
    EnemiesCleared { tick: u32 },
    RoundCleared { round: u32 },
    SceneChanged { from: Scene, to: Scene },
}
