pub mod game;

pub use game::MemoryGame;
