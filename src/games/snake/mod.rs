pub mod game;

pub use game::{Direction, SnakeGame};
