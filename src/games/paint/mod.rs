pub mod canvas;
pub mod game;
pub mod templates;

pub use game::PaintGame;
