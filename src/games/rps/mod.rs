pub mod game;

pub use game::{judge, RoundResult, RpsGame};
