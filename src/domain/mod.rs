pub mod consts;
pub mod entity;
pub mod input;
pub mod map;
pub mod pathfinder;
pub mod tile;
