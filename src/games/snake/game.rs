use std::collections::VecDeque;

use rand::{rngs::StdRng, Rng};
use ratatui::{layout::Rect as Area, style::Color, Frame};

use crate::core::config::{ArcadeConfig, SnakeZone};
use crate::core::game::{ArcadeGame, Tracking};
use crate::core::landmarks::{DetectionFrame, HandLandmark};
use crate::core::renderer::{draw_field, draw_hud, split_hud, stat, Playfield};
use crate::core::session::{Outcome, Summary, Tick};

pub const COLS: i32 = 40;
pub const ROWS: i32 = 30;
const MOVES_PER_SEC: f32 = 10.0;
const FIELD: Playfield = Playfield::new(COLS as f32, ROWS as f32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

/// Direction from the palm's position: near an edge steers toward it, the middle keeps going.
pub fn palm_direction(x: f32, y: f32, zone: SnakeZone) -> Option<Direction> {
    let SnakeZone(z) = zone;
    if x < z {
        Some(Direction::Left)
    } else if x > 1.0 - z {
        Some(Direction::Right)
    } else if y < z {
        Some(Direction::Up)
    } else if y > 1.0 - z {
        Some(Direction::Down)
    } else {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Steer(pub Option<Direction>);

pub struct SnakeGame {
    rng: StdRng,
    zone: SnakeZone,
    body: VecDeque<(i32, i32)>,
    heading: Direction,
    /// Direction of the last grid move. Turns are checked against it, not against `heading`.
    moved: Direction,
    food: (i32, i32),
    score: u32,
    clock: f32,
}

impl SnakeGame {
    pub fn new(config: &ArcadeConfig) -> Self {
        let mut game = Self {
            rng: config.rng(),
            zone: config.thresholds.snake_zone,
            body: VecDeque::new(),
            heading: Direction::Right,
            moved: Direction::Right,
            food: (0, 0),
            score: 0,
            clock: 0.0,
        };
        game.reset();
        game
    }

    fn head(&self) -> (i32, i32) {
        self.body.front().copied().unwrap_or((COLS / 2, ROWS / 2))
    }

    /// Turns unless the new heading would reverse into the body. Several turns can
    /// arrive between two moves, so the check is against the last move made.
    pub fn steer(&mut self, dir: Direction) {
        if self.body.len() > 1 && dir == self.moved.opposite() {
            return;
        }
        self.heading = dir;
    }

    /// Food on a random free cell. `false` when the board is full.
    fn place_food(&mut self) -> bool {
        let free: Vec<(i32, i32)> = (0..ROWS)
            .flat_map(|y| (0..COLS).map(move |x| (x, y)))
            .filter(|cell| !self.body.contains(cell))
            .collect();
        if free.is_empty() {
            return false;
        }
        self.food = free[self.rng.random_range(0..free.len())];
        true
    }

    /// One grid move. Returns an outcome when the snake dies or fills the board.
    fn step(&mut self) -> Option<Outcome> {
        self.moved = self.heading;
        let (dx, dy) = self.heading.delta();
        let (hx, hy) = self.head();
        let next = (hx + dx, hy + dy);
        if next.0 < 0 || next.0 >= COLS || next.1 < 0 || next.1 >= ROWS {
            return Some(Outcome::GameOver);
        }
        let eating = next == self.food;
        if !eating {
            self.body.pop_back();
        }
        if self.body.contains(&next) {
            return Some(Outcome::GameOver);
        }
        self.body.push_front(next);
        if eating {
            self.score += 1;
            if !self.place_food() {
                return Some(Outcome::Victory);
            }
        }
        None
    }
}

impl ArcadeGame for SnakeGame {
    type Input = Steer;

    fn tracking(&self) -> Tracking {
        Tracking::Hands { anchor: HandLandmark::Wrist }
    }

    fn controls(&self) -> &'static [&'static str] {
        &["Move your palm to the left, right, top or bottom edge to turn", "Eat the food, avoid the walls and yourself"]
    }

    fn reset(&mut self) {
        let (cx, cy) = (COLS / 2, ROWS / 2);
        self.body = VecDeque::from([(cx, cy), (cx - 1, cy), (cx - 2, cy)]);
        self.heading = Direction::Right;
        self.moved = Direction::Right;
        self.score = 0;
        self.clock = 0.0;
        self.place_food();
    }

    fn classify(&self, frame: &DetectionFrame) -> Steer {
        Steer(frame.hand().and_then(|h| {
            let palm = h.kp(HandLandmark::Wrist);
            palm_direction(palm.x, palm.y, self.zone)
        }))
    }

    fn on_tick(&mut self, input: &Steer, tick: &Tick) -> Option<Outcome> {
        if let Some(dir) = input.0 {
            self.steer(dir);
        }
        self.clock += tick.dt;
        let interval = 1.0 / MOVES_PER_SEC;
        while self.clock >= interval {
            self.clock -= interval;
            if let Some(outcome) = self.step() {
                return Some(outcome);
            }
        }
        None
    }

    fn render(&self, frame: &mut Frame, area: Area) {
        let (hud, body) = split_hud(area);
        draw_hud(frame, hud, vec![stat("SCORE", self.score), stat("LENGTH", self.body.len())]);
        draw_field(frame, body, FIELD, "SNAKE", |p| {
            p.fill_rect(self.food.0 as f32 + 0.2, self.food.1 as f32 + 0.2, 0.6, 0.6, Color::Red);
            for (i, (x, y)) in self.body.iter().enumerate() {
                let color = if i == 0 { Color::LightGreen } else { Color::Green };
                p.fill_rect(*x as f32 + 0.1, *y as f32 + 0.1, 0.8, 0.8, color);
            }
        });
    }

    fn summary(&self) -> Summary {
        Summary::default().line(format!("Food eaten: {}", self.score)).line(format!("Final length: {}", self.body.len()))
    }
}
