pub mod game;

pub use game::DanceGame;
