/// Pong: the classic palm-driven match and the five-level face-driven ladder.
pub mod game;
pub mod pro;

pub use game::PongGame;
pub use pro::PongProGame;
