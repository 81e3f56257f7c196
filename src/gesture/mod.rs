//! Heuristic classifiers turning landmarks into game input.
pub mod face;
pub mod hand;
pub mod pose;
pub mod synthetic;
