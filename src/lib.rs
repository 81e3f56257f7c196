pub mod cli;

pub mod core {
    pub mod config;
    pub mod emulator;
    pub mod engine;
    pub mod entity;
    pub mod feed;
    pub mod game;
    pub mod geometry;
    pub mod landmarks;
    pub mod menu;
    pub mod renderer;
    pub mod session;
    pub mod smoothing;
}

pub mod games;
pub mod gesture;

// Re-export for convenience
pub use crate::core::game::{ArcadeGame, Tracking};
