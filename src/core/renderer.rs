/// Drawing helpers shared by the games: a world-space canvas and a HUD line.
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Circle, Context, Line as CanvasLine, Points, Rectangle},
        Block, Borders, Paragraph,
    },
    Frame,
};

use crate::core::landmarks::{Pose, PoseLandmark as P};

/// Limb segments drawn for a body pose.
const BONES: [(P, P); 12] = [
    (P::LeftShoulder, P::RightShoulder),
    (P::LeftShoulder, P::LeftElbow),
    (P::LeftElbow, P::LeftWrist),
    (P::RightShoulder, P::RightElbow),
    (P::RightElbow, P::RightWrist),
    (P::LeftShoulder, P::LeftHip),
    (P::RightShoulder, P::RightHip),
    (P::LeftHip, P::RightHip),
    (P::LeftHip, P::LeftKnee),
    (P::LeftKnee, P::LeftAnkle),
    (P::RightHip, P::RightKnee),
    (P::RightKnee, P::RightAnkle),
];

/// World size of a game. World y grows downward; the canvas flips it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Playfield {
    pub width: f32,
    pub height: f32,
}

impl Playfield {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Draws in world coordinates on top of a ratatui canvas context.
pub struct Painter<'p, 'a> {
    ctx: &'p mut Context<'a>,
    field: Playfield,
}

impl<'p, 'a> Painter<'p, 'a> {
    fn y(&self, y: f32) -> f64 {
        f64::from(self.field.height - y)
    }

    /// Outline of a rectangle whose top-left corner is `(x, y)`.
    pub fn rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) {
        let bottom = self.y(y + h);
        self.ctx.draw(&Rectangle { x: f64::from(x), y: bottom, width: f64::from(w), height: f64::from(h), color });
    }

    /// Rectangle filled with horizontal lines.
    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) {
        let step = (self.field.height / 120.0).max(1.0);
        let mut row = y;
        while row <= y + h {
            self.line(x, row, x + w, row, color);
            row += step;
        }
    }

    pub fn circle(&mut self, x: f32, y: f32, radius: f32, color: Color) {
        let y = self.y(y);
        self.ctx.draw(&Circle { x: f64::from(x), y, radius: f64::from(radius), color });
    }

    /// Concentric rings down to the center.
    pub fn disc(&mut self, x: f32, y: f32, radius: f32, color: Color) {
        let step = (self.field.height / 150.0).max(1.0);
        let mut r = radius;
        while r > 0.0 {
            self.circle(x, y, r, color);
            r -= step;
        }
        self.points(&[(x, y)], color);
    }

    pub fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, color: Color) {
        let (y1, y2) = (self.y(y1), self.y(y2));
        self.ctx.draw(&CanvasLine { x1: f64::from(x1), y1, x2: f64::from(x2), y2, color });
    }

    pub fn points(&mut self, coords: &[(f32, f32)], color: Color) {
        let coords: Vec<(f64, f64)> = coords.iter().map(|(x, y)| (f64::from(*x), self.y(*y))).collect();
        self.ctx.draw(&Points { coords: &coords, color });
    }

    /// Text whose left edge starts at `(x, y)`.
    pub fn text(&mut self, x: f32, y: f32, text: impl Into<String>, color: Color) {
        let y = self.y(y);
        self.ctx.print(f64::from(x), y, Span::styled(text.into(), Style::default().fg(color)));
    }

    /// Stick figure of a normalized pose scaled into the box at `(x, y)` of size `w` by `h`.
    pub fn skeleton(&mut self, pose: &Pose, x: f32, y: f32, w: f32, h: f32, color: Color) {
        let at = |id: P| {
            let kp = pose.kp(id);
            (x + kp.x * w, y + kp.y * h)
        };
        for (a, b) in BONES {
            let ((x1, y1), (x2, y2)) = (at(a), at(b));
            self.line(x1, y1, x2, y2, color);
        }
        let (nx, ny) = at(P::Nose);
        self.circle(nx, ny, w.min(h) * 0.04, color);
    }

    /// Starts a new layer so later shapes draw over earlier ones.
    pub fn layer(&mut self) {
        self.ctx.layer();
    }
}

/// Renders a bordered braille canvas mapped onto `field`.
pub fn draw_field<F>(frame: &mut Frame, area: Rect, field: Playfield, title: &str, paint: F)
where
    F: Fn(&mut Painter),
{
    let canvas = Canvas::default()
        .block(Block::default().borders(Borders::ALL).title(format!(" {title} ")))
        .marker(Marker::Braille)
        .x_bounds([0.0, f64::from(field.width)])
        .y_bounds([0.0, f64::from(field.height)])
        .paint(|ctx| {
            let mut painter = Painter { ctx, field };
            paint(&mut painter);
        });
    frame.render_widget(canvas, area);
}

/// Splits a game area into a one-line HUD on top and the playfield below.
pub fn split_hud(area: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(area);
    (chunks[0], chunks[1])
}

/// A labelled HUD value.
pub fn stat<'a>(label: &'a str, value: impl ToString) -> Vec<Span<'a>> {
    vec![
        Span::styled(format!(" {label} "), Style::default().fg(Color::DarkGray)),
        Span::styled(value.to_string(), Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
        Span::raw("  "),
    ]
}

pub fn draw_hud(frame: &mut Frame, area: Rect, stats: Vec<Vec<Span>>) {
    let spans: Vec<Span> = stats.into_iter().flatten().collect();
    frame.render_widget(Paragraph::new(Line::from(spans)).alignment(Alignment::Left), area);
}

/// Dims a color by the fraction of life left, for fading particles.
pub fn fade(color: Color, fraction: f32) -> Color {
    match color {
        Color::Rgb(r, g, b) => {
            let f = fraction.clamp(0.0, 1.0);
            let scale = |c: u8| (f32::from(c) * f) as u8;
            Color::Rgb(scale(r), scale(g), scale(b))
        }
        other if fraction < 0.35 => match other {
            Color::White | Color::Gray => Color::DarkGray,
            _ => other,
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    #[test]
    fn field_renders_text_in_world_space() {
        let mut terminal = Terminal::new(TestBackend::new(40, 12)).unwrap();
        terminal
            .draw(|f| {
                let area = f.area();
                draw_field(f, area, Playfield::new(100.0, 100.0), "test", |p| {
                    p.rect(10.0, 10.0, 20.0, 20.0, Color::White);
                    p.text(0.0, 99.0, "LOW", Color::Yellow);
                })
            })
            .unwrap();
        let buffer = terminal.backend().buffer().clone();
        let rendered: String = buffer.content.iter().map(|c| c.symbol()).collect();
        assert!(rendered.contains("LOW"));
        assert!(rendered.contains("test"));
    }

    #[test]
    fn fading_scales_rgb() {
        assert_eq!(fade(Color::Rgb(200, 100, 0), 0.5), Color::Rgb(100, 50, 0));
        assert_eq!(fade(Color::White, 0.1), Color::DarkGray);
    }
}
