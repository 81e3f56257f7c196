/// Head-steered maze: a random DFS maze walked by nose motion.
pub mod game;
pub mod generator;

pub use game::MazeGame;
pub use generator::{generate, Cell, MazeGrid};
