use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{layout::Rect as Area, style::Color, Frame};
use tracing::{info, warn};

use crate::core::config::ArcadeConfig;
use crate::core::game::{ArcadeGame, Tracking};
use crate::core::geometry::Vec2;
use crate::core::landmarks::{DetectionFrame, HandLandmark};
use crate::core::renderer::{draw_field, draw_hud, split_hud, stat, Playfield};
use crate::core::session::{Outcome, Summary, Tick, Timer};
use crate::gesture::hand::is_drawing;

use super::canvas::{Canvas, Rgb, BACKGROUND};
use super::templates::Template;

pub const FIELD: Playfield = Playfield::new(1220.0, 930.0);
const BRUSH_SIZES: [f32; 5] = [2.0, 5.0, 10.0, 18.0, 30.0];
const DEFAULT_BRUSH: usize = 2;
const STEPS: usize = 5;
const TRAIL: usize = 12;
const STATUS_SECS: f32 = 2.0;
/// Raster pixels between samples when drawing the canvas to the terminal.
const SAMPLE: usize = 6;

pub const PALETTE: [(&str, Rgb); 12] = [
    ("Red", [255, 65, 65]),
    ("Orange", [255, 140, 0]),
    ("Yellow", [255, 220, 0]),
    ("Green", [50, 255, 100]),
    ("Cyan", [0, 230, 255]),
    ("Blue", [65, 105, 255]),
    ("Purple", [180, 80, 255]),
    ("Pink", [255, 105, 180]),
    ("Brown", [139, 90, 60]),
    ("White", [255, 255, 255]),
    ("Gray", [150, 150, 150]),
    ("Black", [20, 20, 20]),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Brush,
    Eraser,
}

/// Index fingertip in canvas pixels and whether the drawing gesture is held.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PaintInput {
    pub cursor: Option<Vec2>,
    pub drawing: bool,
}

fn rgb(c: Rgb) -> Color {
    Color::Rgb(c[0], c[1], c[2])
}

pub struct PaintGame {
    save_dir: PathBuf,
    canvas: Canvas,
    tool: Tool,
    color: usize,
    brush: usize,
    template: Option<Template>,
    last: Option<Vec2>,
    trail: VecDeque<Vec2>,
    drawing: bool,
    status: Option<(String, Timer)>,
    saved: Vec<PathBuf>,
}

impl PaintGame {
    pub fn new(config: &ArcadeConfig) -> Self {
        let mut game = Self {
            save_dir: config.save_dir.clone(),
            canvas: Canvas::new(FIELD.width as usize, FIELD.height as usize),
            tool: Tool::Brush,
            color: 0,
            brush: DEFAULT_BRUSH,
            template: None,
            last: None,
            trail: VecDeque::new(),
            drawing: false,
            status: None,
            saved: Vec::new(),
        };
        game.reset();
        game
    }

    fn ink(&self) -> (Rgb, f32) {
        let size = BRUSH_SIZES[self.brush];
        match self.tool {
            Tool::Brush => (PALETTE[self.color].1, size),
            Tool::Eraser => (BACKGROUND, size * 2.0),
        }
    }

    fn notify(&mut self, message: impl Into<String>) {
        self.status = Some((message.into(), Timer::new(STATUS_SECS)));
    }

    fn lift(&mut self) {
        self.canvas.end_stroke();
        self.last = None;
    }

    /// Paints from the previous fingertip position in even steps.
    fn paint_to(&mut self, at: Vec2) {
        let (color, size) = self.ink();
        match self.last {
            Some(from) => {
                for step in 0..STEPS {
                    self.canvas.add_point(from.lerp(at, step as f32 / STEPS as f32), color, size);
                }
            }
            None => self.canvas.add_point(at, color, size),
        }
        self.last = Some(at);
    }

    fn save(&mut self) {
        self.lift();
        match self.canvas.save(&self.save_dir) {
            Ok(path) => {
                info!(path = %path.display(), "painting saved");
                self.notify(format!("Saved {}", path.display()));
                self.saved.push(path);
            }
            Err(e) => {
                warn!(error = ?e, "failed to save painting");
                self.notify(format!("Save failed: {e}"));
            }
        }
    }

    fn next_template(&mut self) {
        self.template = match self.template {
            None => Some(Template::ALL[0]),
            Some(current) => {
                let index = Template::ALL.iter().position(|t| *t == current).unwrap_or_default();
                Template::ALL.get(index + 1).copied()
            }
        };
    }
}

impl ArcadeGame for PaintGame {
    type Input = PaintInput;

    fn tracking(&self) -> Tracking {
        Tracking::Hands { anchor: HandLandmark::IndexTip }
    }

    fn controls(&self) -> &'static [&'static str] {
        &[
            "Raise only your index finger to draw, lower it to lift the brush",
            "[B] Brush  [E] Eraser  [N] Next color  [Up/Down] Brush size",
            "[U] Undo  [C] Clear  [T] Guide template  [S] Save",
        ]
    }

    fn reset(&mut self) {
        self.canvas.clear();
        self.tool = Tool::Brush;
        self.color = 0;
        self.brush = DEFAULT_BRUSH;
        self.template = None;
        self.last = None;
        self.trail.clear();
        self.drawing = false;
        self.status = None;
        self.saved.clear();
    }

    fn classify(&self, frame: &DetectionFrame) -> PaintInput {
        match frame.hand() {
            Some(hand) => {
                let tip = hand.kp(HandLandmark::IndexTip);
                PaintInput { cursor: Some(Vec2::new(tip.x * FIELD.width, tip.y * FIELD.height)), drawing: is_drawing(hand) }
            }
            None => PaintInput::default(),
        }
    }

    fn on_tick(&mut self, input: &PaintInput, tick: &Tick) -> Option<Outcome> {
        if let Some((_, timer)) = &mut self.status {
            if timer.tick(tick.dt) {
                self.status = None;
            }
        }
        if !tick.fresh {
            return None;
        }
        self.drawing = input.drawing && input.cursor.is_some();
        match input.cursor {
            Some(at) => {
                self.trail.push_back(at);
                if self.trail.len() > TRAIL {
                    self.trail.pop_front();
                }
                if input.drawing {
                    self.paint_to(at);
                } else {
                    self.lift();
                }
            }
            None => {
                self.trail.clear();
                self.lift();
            }
        }
        None
    }

    fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('b') => self.tool = Tool::Brush,
            KeyCode::Char('e') => self.tool = Tool::Eraser,
            KeyCode::Char('c') => {
                self.canvas.clear();
                self.last = None;
            }
            KeyCode::Char('u') => {
                self.last = None;
                if !self.canvas.undo() {
                    self.notify("Nothing to undo");
                }
            }
            KeyCode::Char('s') => self.save(),
            KeyCode::Char('t') => self.next_template(),
            KeyCode::Char('n') => {
                self.color = (self.color + 1) % PALETTE.len();
                self.tool = Tool::Brush;
            }
            KeyCode::Up => self.brush = (self.brush + 1).min(BRUSH_SIZES.len() - 1),
            KeyCode::Down => self.brush = self.brush.saturating_sub(1),
            _ => {}
        }
    }

    fn render(&self, frame: &mut Frame, area: Area) {
        let (hud, body) = split_hud(area);
        let tool = match self.tool {
            Tool::Brush => PALETTE[self.color].0,
            Tool::Eraser => "Eraser",
        };
        let status = self.status.as_ref().map_or_else(
            || if self.drawing { "Drawing".to_string() } else { "Raise your index finger".to_string() },
            |(message, _)| message.clone(),
        );
        draw_hud(
            frame,
            hud,
            vec![
                stat("TOOL", tool),
                stat("SIZE", BRUSH_SIZES[self.brush]),
                stat("GUIDE", self.template.map_or("none", |t| t.name())),
                stat("STATUS", status),
            ],
        );

        let mut inked: HashMap<Rgb, Vec<(f32, f32)>> = HashMap::new();
        for y in (0..self.canvas.height()).step_by(SAMPLE) {
            for x in (0..self.canvas.width()).step_by(SAMPLE) {
                if let Some(pixel) = self.canvas.pixel(x, y).filter(|p| *p != BACKGROUND) {
                    inked.entry(pixel).or_default().push((x as f32, y as f32));
                }
            }
        }
        draw_field(frame, body, FIELD, "AIR PAINT", |p| {
            if let Some(template) = self.template {
                for line in template.outline(Vec2::new(FIELD.width / 2.0, FIELD.height / 2.0)) {
                    for pair in line.windows(2) {
                        p.line(pair[0].x, pair[0].y, pair[1].x, pair[1].y, Color::DarkGray);
                    }
                }
                p.layer();
            }
            for (color, points) in &inked {
                p.points(points, rgb(*color));
            }
            p.layer();
            let (ink, size) = self.ink();
            let cursor = match (self.drawing, self.tool) {
                (true, Tool::Eraser) => Color::LightRed,
                (true, Tool::Brush) => rgb(ink),
                (false, _) => Color::White,
            };
            let trail: Vec<(f32, f32)> = self.trail.iter().map(|v| (v.x, v.y)).collect();
            p.points(&trail, Color::Gray);
            if let Some(at) = self.trail.back() {
                p.circle(at.x, at.y, size + 3.0, cursor);
            }
        });
    }

    fn summary(&self) -> Summary {
        let mut summary = Summary::default().line(format!("Strokes on the canvas: {}", self.canvas.strokes().len()));
        for path in &self.saved {
            summary = summary.line(format!("Saved {}", path.display()));
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game() -> PaintGame {
        PaintGame::new(&ArcadeConfig::default())
    }

    fn tick() -> Tick {
        Tick { index: 1, dt: 1.0 / 60.0, fresh: true }
    }

    fn draw(at: Vec2) -> PaintInput {
        PaintInput { cursor: Some(at), drawing: true }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::from(code)
    }

    #[test]
    fn drawing_then_lifting_makes_one_stroke() {
        let mut g = game();
        g.on_tick(&draw(Vec2::new(100.0, 100.0)), &tick());
        g.on_tick(&draw(Vec2::new(200.0, 100.0)), &tick());
        g.on_tick(&PaintInput { cursor: Some(Vec2::new(200.0, 100.0)), drawing: false }, &tick());
        assert_eq!(g.canvas.strokes().len(), 1);
        assert_eq!(g.canvas.strokes()[0].points.len(), 1 + STEPS);
        assert_eq!(g.canvas.pixel(150, 100), Some(PALETTE[0].1));
    }

    #[test]
    fn undo_key_removes_the_last_stroke() {
        let mut g = game();
        g.on_tick(&draw(Vec2::new(100.0, 100.0)), &tick());
        g.on_tick(&PaintInput::default(), &tick());
        g.handle_key(key(KeyCode::Char('n')));
        g.on_tick(&draw(Vec2::new(300.0, 300.0)), &tick());
        g.handle_key(key(KeyCode::Char('u')));
        assert_eq!(g.canvas.strokes().len(), 1);
        assert_eq!(g.canvas.pixel(300, 300), Some(BACKGROUND));
        assert_eq!(g.canvas.pixel(100, 100), Some(PALETTE[0].1));
    }

    #[test]
    fn eraser_paints_background_at_double_size() {
        let mut g = game();
        g.handle_key(key(KeyCode::Char('e')));
        assert_eq!(g.ink(), (BACKGROUND, BRUSH_SIZES[DEFAULT_BRUSH] * 2.0));
        g.handle_key(key(KeyCode::Char('n')));
        assert_eq!(g.tool, Tool::Brush);
    }

    #[test]
    fn brush_size_is_clamped() {
        let mut g = game();
        for _ in 0..10 {
            g.handle_key(key(KeyCode::Up));
        }
        assert_eq!(BRUSH_SIZES[g.brush], 30.0);
        for _ in 0..10 {
            g.handle_key(key(KeyCode::Down));
        }
        assert_eq!(BRUSH_SIZES[g.brush], 2.0);
    }

    #[test]
    fn templates_cycle_back_to_none() {
        let mut g = game();
        for expected in Template::ALL {
            g.handle_key(key(KeyCode::Char('t')));
            assert_eq!(g.template, Some(expected));
        }
        g.handle_key(key(KeyCode::Char('t')));
        assert_eq!(g.template, None);
    }

    #[test]
    fn save_writes_a_png_into_save_dir() {
        let dir = std::env::temp_dir().join(format!("camterm-paint-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let mut g = PaintGame::new(&ArcadeConfig { save_dir: dir.clone(), ..Default::default() });
        g.on_tick(&draw(Vec2::new(10.0, 10.0)), &tick());
        g.handle_key(key(KeyCode::Char('s')));
        assert_eq!(g.saved.len(), 1);
        let path = &g.saved[0];
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("painting_") && name.ends_with(".png"));
        let decoded = image::open(path).unwrap().to_rgb8();
        assert_eq!(decoded.dimensions(), (1220, 930));
        assert_eq!(Some(decoded.get_pixel(10, 10).0), g.canvas.pixel(10, 10));
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn failed_save_is_reported_and_play_goes_on() {
        let mut g = PaintGame::new(&ArcadeConfig { save_dir: PathBuf::from("/definitely/not/here"), ..Default::default() });
        g.handle_key(key(KeyCode::Char('s')));
        assert!(g.saved.is_empty());
        let (message, _) = g.status.clone().unwrap();
        assert!(message.starts_with("Save failed"));
        assert_eq!(g.on_tick(&draw(Vec2::new(5.0, 5.0)), &tick()), None);
    }
}
