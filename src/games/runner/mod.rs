/// Endless runner: jump with both arms raised, duck by dropping the head.
pub mod entities;
pub mod game;

pub use game::RunnerGame;
