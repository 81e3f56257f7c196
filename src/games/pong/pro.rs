use crossterm::event::{KeyCode, KeyEvent};
use rand::{rngs::StdRng, Rng};
use ratatui::{layout::Rect as Area, style::Color, Frame};

use crate::core::config::ArcadeConfig;
use crate::core::entity::{burst, update_all, Particle};
use crate::core::game::{ArcadeGame, Tracking};
use crate::core::geometry::{Rect, Vec2};
use crate::core::landmarks::DetectionFrame;
use crate::core::renderer::{draw_field, draw_hud, fade, split_hud, stat, Playfield};
use crate::core::session::{Outcome, Summary, Tick};
use crate::gesture::face::eye_height;

use super::game::{chase, Ball, PaddleInput};

pub const FIELD: Playfield = Playfield::new(1400.0, 900.0);
const PADDLE_W: f32 = 20.0;
const PADDLE_H: f32 = 120.0;
const MIN_AI_PADDLE: f32 = 60.0;
const AI_SHRINK: f32 = 2.0;
const SHRINK_EVERY_RALLIES: u32 = 3;
const MAX_MULTIPLIER: f32 = 2.5;
const PARTICLE_LIFE: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Level {
    pub name: &'static str,
    pub ai_speed: f32,
    pub ai_error: f32,
    pub ball_speed: f32,
    pub win_score: u32,
    pub particles: usize,
    pub speed_increase: f32,
}

pub const LEVELS: [Level; 5] = [
    Level { name: "BEGINNER", ai_speed: 7.0, ai_error: 25.0, ball_speed: 8.0, win_score: 5, particles: 10, speed_increase: 0.15 },
    Level { name: "INTERMEDIATE", ai_speed: 9.0, ai_error: 20.0, ball_speed: 10.0, win_score: 7, particles: 15, speed_increase: 0.18 },
    Level { name: "ADVANCED", ai_speed: 11.0, ai_error: 15.0, ball_speed: 12.0, win_score: 10, particles: 20, speed_increase: 0.20 },
    Level { name: "EXPERT", ai_speed: 13.0, ai_error: 10.0, ball_speed: 14.0, win_score: 12, particles: 25, speed_increase: 0.22 },
    Level { name: "LEGENDARY", ai_speed: 15.0, ai_error: 5.0, ball_speed: 16.0, win_score: 15, particles: 30, speed_increase: 0.25 },
];

pub struct PongProGame {
    rng: StdRng,
    level: usize,
    player: Rect,
    ai: Rect,
    ball: Ball,
    particles: Vec<Particle>,
    player_score: u32,
    ai_score: u32,
    rallies: u32,
    total_points: u32,
    paused: bool,
}

impl PongProGame {
    pub fn new(config: &ArcadeConfig) -> Self {
        let mut game = Self {
            rng: config.rng(),
            level: 0,
            player: Rect::default(),
            ai: Rect::default(),
            ball: Ball::new(FIELD),
            particles: Vec::new(),
            player_score: 0,
            ai_score: 0,
            rallies: 0,
            total_points: 0,
            paused: false,
        };
        game.reset();
        game
    }

    fn current(&self) -> &Level {
        &LEVELS[self.level]
    }

    fn start_level(&mut self, level: usize) {
        self.level = level;
        let mid = FIELD.height / 2.0 - PADDLE_H / 2.0;
        self.player = Rect::new(40.0, mid, PADDLE_W, PADDLE_H);
        self.ai = Rect::new(FIELD.width - 40.0 - PADDLE_W, mid, PADDLE_W, PADDLE_H);
        self.player_score = 0;
        self.ai_score = 0;
        self.rallies = 0;
        self.particles.clear();
        self.serve();
    }

    /// Center serve within 45 degrees of horizontal, toward either side.
    fn serve(&mut self) {
        let speed = self.current().ball_speed;
        let angle = self.rng.random_range(-std::f32::consts::FRAC_PI_4..=std::f32::consts::FRAC_PI_4);
        let side = if self.rng.random_bool(0.5) { 1.0 } else { -1.0 };
        self.ball = Ball::new(FIELD);
        self.ball.vel = Vec2::new(angle.cos() * speed * side, angle.sin() * speed);
    }

    fn on_paddle_hit(&mut self) {
        let level = *self.current();
        self.ball.vel.y += self.rng.random_range(-2.0..=2.0);
        self.ball.speed_up(level.speed_increase, MAX_MULTIPLIER);
        let at = self.ball.rect.center();
        let color = if self.ball.vel.x > 0.0 { Color::Cyan } else { Color::Red };
        self.particles.extend(
            burst(&mut self.rng, at, level.particles, 2.0..6.0, PARTICLE_LIFE, color).into_iter().map(|p| p.with_size(6.0)),
        );
        self.rallies += 1;
        if self.rallies % SHRINK_EVERY_RALLIES == 0 && self.ai.h > MIN_AI_PADDLE {
            let center = self.ai.center().y;
            self.ai.h = (self.ai.h - AI_SHRINK).max(MIN_AI_PADDLE);
            self.ai.y = (center - self.ai.h / 2.0).clamp(0.0, FIELD.height - self.ai.h);
        }
    }
}

impl ArcadeGame for PongProGame {
    type Input = PaddleInput;

    fn tracking(&self) -> Tracking {
        Tracking::Face
    }

    fn controls(&self) -> &'static [&'static str] {
        &[
            "Move your head up and down, the paddle follows your eyes",
            "Win a level to unlock the next; beat LEGENDARY to win",
            "Every 3 rallies the AI paddle shrinks",
            "[SPACE] Pause",
        ]
    }

    fn reset(&mut self) {
        self.total_points = 0;
        self.paused = false;
        self.start_level(0);
    }

    fn classify(&self, frame: &DetectionFrame) -> PaddleInput {
        PaddleInput(frame.face().map(eye_height))
    }

    fn on_tick(&mut self, input: &PaddleInput, _tick: &Tick) -> Option<Outcome> {
        if self.paused {
            return None;
        }
        // Without a face the paddle stays where it was.
        if let Some(y) = input.0 {
            let target = y.clamp(0.0, 1.0) * FIELD.height;
            self.player.y = (target - self.player.h / 2.0).clamp(0.0, FIELD.height - self.player.h);
        }

        let level = *self.current();
        let aim = self.ball.rect.center().y + self.rng.random_range(-level.ai_error..=level.ai_error);
        chase(&mut self.ai, aim, level.ai_speed, 10.0, FIELD);

        self.ball.step(FIELD);
        let player = self.player;
        let ai = self.ai;
        if self.ball.bounce_off(&player, 1.0, &mut self.rng) || self.ball.bounce_off(&ai, -1.0, &mut self.rng) {
            self.on_paddle_hit();
        }
        update_all(&mut self.particles);

        if self.ball.rect.right() < 0.0 {
            self.ai_score += 1;
            self.serve();
        } else if self.ball.rect.x > FIELD.width {
            self.player_score += 1;
            self.total_points += 1;
            self.serve();
        }

        if self.ai_score >= level.win_score {
            return Some(Outcome::GameOver);
        }
        if self.player_score >= level.win_score {
            if self.level + 1 == LEVELS.len() {
                return Some(Outcome::Victory);
            }
            self.start_level(self.level + 1);
        }
        None
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char(' ') {
            self.paused = !self.paused;
        }
    }

    fn render(&self, frame: &mut Frame, area: Area) {
        let level = self.current();
        let (hud, body) = split_hud(area);
        draw_hud(
            frame,
            hud,
            vec![
                stat("LEVEL", format!("{} {}", self.level + 1, level.name)),
                stat("YOU", self.player_score),
                stat("AI", self.ai_score),
                stat("TO WIN", level.win_score),
                stat("SPEED", format!("{:.2}x", self.ball.multiplier)),
            ],
        );
        draw_field(frame, body, FIELD, "PONG PRO", |p| {
            p.line(FIELD.width / 2.0, 0.0, FIELD.width / 2.0, FIELD.height, Color::DarkGray);
            for particle in &self.particles {
                p.circle(particle.pos.x, particle.pos.y, particle.current_size(), fade(particle.color, particle.life.fraction()));
            }
            p.fill_rect(self.player.x, self.player.y, self.player.w, self.player.h, Color::Cyan);
            p.fill_rect(self.ai.x, self.ai.y, self.ai.w, self.ai.h, Color::Red);
            let c = self.ball.rect.center();
            p.disc(c.x, c.y, self.ball.rect.w / 2.0, Color::White);
            if self.paused {
                p.text(FIELD.width / 2.0 - 60.0, FIELD.height / 2.0, "PAUSED", Color::Yellow);
            }
        });
    }

    fn summary(&self) -> Summary {
        Summary::default()
            .line(format!("Reached level {} ({})", self.level + 1, self.current().name))
            .line(format!("Final level score: you {} - {} AI", self.player_score, self.ai_score))
            .line(format!("Points scored overall: {}", self.total_points))
    }
}
