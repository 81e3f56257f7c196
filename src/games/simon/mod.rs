pub mod game;

pub use game::SimonGame;
