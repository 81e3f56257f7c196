/// Core game interface for the camterm engine
use crossterm::event::KeyEvent;
use ratatui::{layout::Rect, Frame};

use crate::core::landmarks::{DetectionFrame, HandLandmark};
use crate::core::session::{Outcome, Summary, Tick};

/// What a game needs the detector (or the emulator) to report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tracking {
    /// Hand landmarks; the emulator places `anchor` under the pointer.
    Hands { anchor: HandLandmark },
    Pose,
    Face,
    Objects,
}

/// Main game trait that all games implement.
///
/// The engine owns the phase machine; a game only sees `reset` at the start of
/// each session and `on_tick` while playing.
pub trait ArcadeGame: Send {
    /// Game input produced from one detection frame. `Default` is the neutral input.
    type Input: Clone + Default + std::fmt::Debug;

    fn tracking(&self) -> Tracking;

    /// Controls shown on the menu screen.
    fn controls(&self) -> &'static [&'static str] {
        &[]
    }

    /// Fresh state for a new session.
    fn reset(&mut self);

    /// Maps detections to input. Returns the neutral input when no subject is present.
    fn classify(&self, frame: &DetectionFrame) -> Self::Input;

    /// Advances one tick. Returning an outcome ends the session.
    fn on_tick(&mut self, input: &Self::Input, tick: &Tick) -> Option<Outcome>;

    /// Keys not consumed by the engine while playing.
    fn handle_key(&mut self, _key: KeyEvent) {}

    fn render(&self, frame: &mut Frame, area: Rect);

    /// Results screen content.
    fn summary(&self) -> Summary;
}
