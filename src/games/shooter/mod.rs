pub mod game;

pub use game::ShooterGame;
