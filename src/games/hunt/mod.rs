pub mod game;

pub use game::HuntGame;
