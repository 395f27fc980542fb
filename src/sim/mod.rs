pub mod enemy;
pub mod event;
pub mod level;
pub mod player;
pub mod rock;
pub mod step;
pub mod world;
