use std::collections::VecDeque;

use crossterm::event::{KeyCode, KeyEvent};
use rand::rngs::StdRng;
use ratatui::{layout::Rect as Area, style::Color, Frame};
use tracing::{info, warn};

use crate::core::config::{ArcadeConfig, FaceThresholds};
use crate::core::game::{ArcadeGame, Tracking};
use crate::core::geometry::Vec2;
use crate::core::landmarks::DetectionFrame;
use crate::core::renderer::{draw_field, draw_hud, split_hud, stat, Playfield};
use crate::core::session::{Outcome, Summary, Tick};
use crate::gesture::face::{nose, NoseCalibration};

use super::generator::{generate, Cell, MazeGrid};

pub const COLS: usize = 19;
pub const ROWS: usize = 13;
const CELL: f32 = 60.0;
const FIELD: Playfield = Playfield::new(COLS as f32 * CELL, ROWS as f32 * CELL);
const PLAYER_RADIUS: f32 = CELL / 3.0;
const TRAIL: usize = 30;

/// Nose position in detector pixels, `None` when no face is visible.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NoseInput(pub Option<Vec2>);

pub struct MazeGame {
    rng: StdRng,
    thresholds: FaceThresholds,
    frame_size: Vec2,
    grid: MazeGrid,
    player: Vec2,
    trail: VecDeque<Vec2>,
    calibration: NoseCalibration,
    motion: Vec2,
    elapsed: f32,
    finish_time: Option<f32>,
    mazes: u32,
}

fn cell_center(col: usize, row: usize) -> Vec2 {
    Vec2::new((col as f32 + 0.5) * CELL, (row as f32 + 0.5) * CELL)
}

fn cell_of(p: Vec2) -> (i64, i64) {
    ((p.x / CELL).floor() as i64, (p.y / CELL).floor() as i64)
}

impl MazeGame {
    pub fn new(config: &ArcadeConfig) -> Self {
        let th = config.thresholds.face.clone();
        let mut game = Self {
            rng: config.rng(),
            calibration: NoseCalibration::new(th.calibration_frames),
            thresholds: th,
            frame_size: Vec2::new(config.frame_width, config.frame_height),
            grid: MazeGrid::default(),
            player: Vec2::ZERO,
            trail: VecDeque::with_capacity(TRAIL),
            motion: Vec2::ZERO,
            elapsed: 0.0,
            finish_time: None,
            mazes: 0,
        };
        game.reset();
        game
    }

    /// New maze, player back at the entrance, clock restarted.
    pub fn regenerate(&mut self) {
        match generate(COLS, ROWS, &mut self.rng) {
            Ok(grid) => self.grid = grid,
            Err(e) => warn!(error = %e, "maze generation failed, keeping the previous maze"),
        }
        let (col, row) = self.grid.entrance();
        self.player = cell_center(col, row);
        self.trail.clear();
        self.elapsed = 0.0;
        self.finish_time = None;
        self.mazes += 1;
    }

    /// Moves unless the destination lies in a wall.
    pub fn try_move(&mut self, delta: Vec2) -> bool {
        let next = self.player + delta;
        let (col, row) = cell_of(next);
        if self.grid.get(col, row) != Cell::Path {
            return false;
        }
        self.player = next;
        if self.trail.len() == TRAIL {
            self.trail.pop_front();
        }
        self.trail.push_back(next);
        true
    }

    fn at_exit(&self) -> bool {
        let (col, row) = self.grid.exit();
        cell_of(self.player) == (col as i64, row as i64)
    }
}

impl ArcadeGame for MazeGame {
    type Input = NoseInput;

    fn tracking(&self) -> Tracking {
        Tracking::Face
    }

    fn controls(&self) -> &'static [&'static str] {
        &[
            "Keep your head still while the nose position calibrates",
            "Then move your head to roll the ball through the maze",
            "Losing your face restarts calibration",
            "[R] New maze",
        ]
    }

    fn reset(&mut self) {
        self.mazes = 0;
        self.calibration.reset();
        self.motion = Vec2::ZERO;
        self.regenerate();
    }

    fn classify(&self, frame: &DetectionFrame) -> NoseInput {
        NoseInput(frame.face().map(|f| {
            let n = nose(f);
            Vec2::new(n.x * self.frame_size.x, n.y * self.frame_size.y)
        }))
    }

    fn on_tick(&mut self, input: &NoseInput, tick: &Tick) -> Option<Outcome> {
        match input.0 {
            None => {
                self.calibration.reset();
                self.motion = Vec2::ZERO;
            }
            Some(nose_px) if tick.fresh => {
                self.motion = self.calibration.update(nose_px, &self.thresholds).unwrap_or(Vec2::ZERO);
            }
            Some(_) => {}
        }
        if !self.calibration.is_calibrated() {
            return None;
        }
        self.elapsed += tick.dt;
        // Raising the head moves the ball up, so tracker y is flipped into world y.
        self.try_move(Vec2::new(self.motion.x, -self.motion.y));
        if self.at_exit() {
            self.finish_time = Some(self.elapsed);
            info!(seconds = self.elapsed, "maze solved");
            return Some(Outcome::Victory);
        }
        None
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if matches!(key.code, KeyCode::Char('r') | KeyCode::Char('R')) {
            self.regenerate();
        }
    }

    fn render(&self, frame: &mut Frame, area: Area) {
        let (hud, body) = split_hud(area);
        let status = if self.calibration.is_calibrated() {
            stat("TIME", format!("{:.1}s", self.elapsed))
        } else {
            stat("CALIBRATING", format!("{:.0}%", self.calibration.progress() * 100.0))
        };
        draw_hud(frame, hud, vec![status, stat("MAZE", self.mazes)]);
        draw_field(frame, body, FIELD, "HEAD MAZE", |p| {
            for row in 0..self.grid.rows {
                for col in 0..self.grid.cols {
                    if !self.grid.is_path(col as i64, row as i64) {
                        p.fill_rect(col as f32 * CELL, row as f32 * CELL, CELL, CELL, Color::Blue);
                    }
                }
            }
            let (ex, ey) = self.grid.exit();
            let exit = cell_center(ex, ey);
            p.disc(exit.x, exit.y, PLAYER_RADIUS, Color::Green);
            let trail: Vec<(f32, f32)> = self.trail.iter().map(|t| (t.x, t.y)).collect();
            p.points(&trail, Color::DarkGray);
            p.disc(self.player.x, self.player.y, PLAYER_RADIUS, Color::Yellow);
        });
    }

    fn summary(&self) -> Summary {
        match self.finish_time {
            Some(t) => Summary::default().line(format!("Escaped in {t:.1} seconds")),
            None => Summary::default().line("The maze is still waiting"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game() -> MazeGame {
        MazeGame::new(&ArcadeConfig { seed: Some(8), ..Default::default() })
    }

    fn calibrated(g: &mut MazeGame, at: Vec2) {
        let fresh = Tick { index: 1, dt: 1.0 / 60.0, fresh: true };
        for _ in 0..g.thresholds.calibration_frames {
            g.on_tick(&NoseInput(Some(at)), &fresh);
        }
        assert!(g.calibration.is_calibrated());
    }

    #[test]
    fn starts_at_the_entrance_of_a_full_maze() {
        let g = game();
        assert_eq!((g.grid.cols, g.grid.rows), (COLS, ROWS));
        assert_eq!(cell_of(g.player), (0, 1));
    }

    #[test]
    fn walls_block_movement() {
        let mut g = game();
        assert!(!g.try_move(Vec2::new(0.0, -CELL)));
        assert!(g.try_move(Vec2::new(CELL, 0.0)));
        assert_eq!(g.trail.len(), 1);
    }

    #[test]
    fn no_movement_until_calibrated() {
        let mut g = game();
        let start = g.player;
        let tick = Tick { index: 1, dt: 1.0 / 60.0, fresh: true };
        g.on_tick(&NoseInput(Some(Vec2::new(600.0, 240.0))), &tick);
        assert_eq!(g.player, start);
        assert_eq!(g.elapsed, 0.0);
    }

    #[test]
    fn head_to_the_right_moves_right() {
        let mut g = game();
        calibrated(&mut g, Vec2::new(320.0, 240.0));
        let start = g.player;
        let tick = Tick { index: 2, dt: 1.0 / 60.0, fresh: true };
        g.on_tick(&NoseInput(Some(Vec2::new(360.0, 240.0))), &tick);
        assert!((g.player.x - start.x - 3.0).abs() < 1e-3);
        assert_eq!(g.player.y, start.y);
    }

    #[test]
    fn losing_the_face_restarts_calibration() {
        let mut g = game();
        calibrated(&mut g, Vec2::new(320.0, 240.0));
        g.on_tick(&NoseInput(None), &Tick { index: 3, dt: 1.0 / 60.0, fresh: true });
        assert!(!g.calibration.is_calibrated());
    }

    #[test]
    fn reaching_the_exit_wins() {
        let mut g = game();
        calibrated(&mut g, Vec2::new(320.0, 240.0));
        let (ex, ey) = g.grid.exit();
        g.player = cell_center(ex - 1, ey);
        let tick = Tick { index: 4, dt: 1.0 / 60.0, fresh: true };
        let mut outcome = None;
        for _ in 0..20 {
            outcome = g.on_tick(&NoseInput(Some(Vec2::new(420.0, 240.0))), &tick);
            if outcome.is_some() {
                break;
            }
        }
        assert_eq!(outcome, Some(Outcome::Victory));
        assert!(g.finish_time.is_some());
    }
}
