use rand::{rngs::StdRng, Rng};
use ratatui::{layout::Rect as Area, style::Color, Frame};

use crate::core::config::ArcadeConfig;
use crate::core::entity::{burst, update_all, Particle};
use crate::core::game::{ArcadeGame, Tracking};
use crate::core::geometry::{circle_hits_rect, Rect, Vec2};
use crate::core::landmarks::{DetectionFrame, HandLandmark};
use crate::core::renderer::{draw_field, draw_hud, fade, split_hud, stat, Playfield};
use crate::core::session::{Outcome, Scoreboard, Summary, Tick};

const FIELD: Playfield = Playfield::new(1400.0, 900.0);
const PADDLE_W: f32 = 150.0;
const PADDLE_H: f32 = 20.0;
const PADDLE_Y: f32 = 840.0;
const PADDLE_EASE: f32 = 0.3;
const BALL_RADIUS: f32 = 12.0;
const BALL_SPEED: f32 = 8.0;
const MIN_SPEED: f32 = BALL_SPEED * 0.8;
const MAX_BOUNCE: f32 = 60.0;
const BLOCK_ROWS: usize = 6;
const BLOCK_COLS: usize = 14;
const BLOCK_W: f32 = 90.0;
const BLOCK_H: f32 = 30.0;
const BLOCK_GAP: f32 = 5.0;
const BLOCK_TOP: f32 = 80.0;
const LIVES: u32 = 3;

const ROW_COLORS: [Color; BLOCK_ROWS] =
    [Color::Red, Color::LightRed, Color::Yellow, Color::Green, Color::Cyan, Color::Blue];

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub rect: Rect,
    pub hp: u32,
    pub max_hp: u32,
    pub color: Color,
}

/// Upper rows take more hits: row 0 has `rows` hp, the bottom row 1.
pub fn build_wall() -> Vec<Block> {
    let width = BLOCK_COLS as f32 * (BLOCK_W + BLOCK_GAP) - BLOCK_GAP;
    let left = (FIELD.width - width) / 2.0;
    (0..BLOCK_ROWS)
        .flat_map(|row| {
            (0..BLOCK_COLS).map(move |col| {
                let hp = (BLOCK_ROWS - row) as u32;
                Block {
                    rect: Rect::new(
                        left + col as f32 * (BLOCK_W + BLOCK_GAP),
                        BLOCK_TOP + row as f32 * (BLOCK_H + BLOCK_GAP),
                        BLOCK_W,
                        BLOCK_H,
                    ),
                    hp,
                    max_hp: hp,
                    color: ROW_COLORS[row],
                }
            })
        })
        .collect()
}

/// Outgoing velocity off the paddle: the further from center, the steeper the angle.
pub fn paddle_bounce(ball_x: f32, paddle: &Rect, speed: f32) -> Vec2 {
    let offset = ((ball_x - paddle.center().x) / (paddle.w / 2.0)).clamp(-1.0, 1.0);
    let angle = (offset * MAX_BOUNCE).to_radians();
    let speed = speed.max(MIN_SPEED);
    Vec2::new(angle.sin() * speed, -angle.cos() * speed)
}

/// Mean wrist x over all visible hands.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WristX(pub Option<f32>);

pub struct BreakoutGame {
    rng: StdRng,
    paddle: Rect,
    ball: Vec2,
    vel: Vec2,
    blocks: Vec<Block>,
    particles: Vec<Particle>,
    board: Scoreboard,
    cleared: u32,
}

impl BreakoutGame {
    pub fn new(config: &ArcadeConfig) -> Self {
        let mut game = Self {
            rng: config.rng(),
            paddle: Rect::default(),
            ball: Vec2::ZERO,
            vel: Vec2::ZERO,
            blocks: Vec::new(),
            particles: Vec::new(),
            board: Scoreboard::new(LIVES),
            cleared: 0,
        };
        game.reset();
        game
    }

    /// Ball back above the paddle, launched upward at a random angle.
    fn serve(&mut self) {
        self.ball = Vec2::new(self.paddle.center().x, PADDLE_Y - BALL_RADIUS * 3.0);
        let angle = self.rng.random_range(-30.0f32..=30.0).to_radians();
        self.vel = Vec2::new(angle.sin() * BALL_SPEED, -angle.cos() * BALL_SPEED);
    }

    fn hit_block(&mut self) {
        let Some(i) = self.blocks.iter().position(|b| circle_hits_rect(self.ball, BALL_RADIUS, &b.rect)) else {
            return;
        };
        let rect = self.blocks[i].rect;
        if self.ball.x >= rect.x && self.ball.x <= rect.right() {
            self.vel.y = -self.vel.y;
        } else {
            self.vel.x = -self.vel.x;
        }
        let block = &mut self.blocks[i];
        block.hp -= 1;
        if block.hp == 0 {
            let block = self.blocks.remove(i);
            self.board.award(u64::from(block.max_hp) * 10);
            self.cleared += 1;
            self.particles.extend(burst(&mut self.rng, rect.center(), 12, 2.0..5.0, 30, block.color));
        }
    }
}

impl ArcadeGame for BreakoutGame {
    type Input = WristX;

    fn tracking(&self) -> Tracking {
        Tracking::Hands { anchor: HandLandmark::Wrist }
    }

    fn controls(&self) -> &'static [&'static str] {
        &["Move your wrist left and right to steer the paddle", "Upper rows need more hits", "3 lives"]
    }

    fn reset(&mut self) {
        self.paddle = Rect::new(FIELD.width / 2.0 - PADDLE_W / 2.0, PADDLE_Y, PADDLE_W, PADDLE_H);
        self.blocks = build_wall();
        self.particles.clear();
        self.board = Scoreboard::new(LIVES);
        self.cleared = 0;
        self.serve();
    }

    fn classify(&self, frame: &DetectionFrame) -> WristX {
        if frame.hands.is_empty() {
            return WristX(None);
        }
        let sum: f32 = frame.hands.iter().map(|h| h.kp(HandLandmark::Wrist).x).sum();
        WristX(Some(sum / frame.hands.len() as f32))
    }

    fn on_tick(&mut self, input: &WristX, _tick: &Tick) -> Option<Outcome> {
        let target = input.0.unwrap_or(0.5).clamp(0.0, 1.0) * FIELD.width;
        let x = self.paddle.center().x + (target - self.paddle.center().x) * PADDLE_EASE;
        self.paddle.x = (x - PADDLE_W / 2.0).clamp(0.0, FIELD.width - PADDLE_W);

        self.ball += self.vel;
        if self.ball.x - BALL_RADIUS <= 0.0 {
            self.ball.x = BALL_RADIUS;
            self.vel.x = self.vel.x.abs();
        } else if self.ball.x + BALL_RADIUS >= FIELD.width {
            self.ball.x = FIELD.width - BALL_RADIUS;
            self.vel.x = -self.vel.x.abs();
        }
        if self.ball.y - BALL_RADIUS <= 0.0 {
            self.ball.y = BALL_RADIUS;
            self.vel.y = self.vel.y.abs();
        }

        if self.vel.y > 0.0 && circle_hits_rect(self.ball, BALL_RADIUS, &self.paddle) {
            self.vel = paddle_bounce(self.ball.x, &self.paddle, self.vel.length());
            self.ball.y = self.paddle.y - BALL_RADIUS;
            self.board.bump_combo();
        }
        self.hit_block();
        update_all(&mut self.particles);

        if self.ball.y - BALL_RADIUS > FIELD.height {
            if !self.board.lose_life() {
                return Some(Outcome::GameOver);
            }
            self.serve();
        }
        if self.blocks.is_empty() {
            return Some(Outcome::Victory);
        }
        None
    }

    fn render(&self, frame: &mut Frame, area: Area) {
        let (hud, body) = split_hud(area);
        draw_hud(
            frame,
            hud,
            vec![
                stat("SCORE", self.board.score),
                stat("LIVES", "♥".repeat(self.board.lives as usize)),
                stat("COMBO", self.board.combo),
                stat("BLOCKS", self.blocks.len()),
            ],
        );
        draw_field(frame, body, FIELD, "BREAKOUT", |p| {
            for block in &self.blocks {
                p.fill_rect(block.rect.x, block.rect.y, block.rect.w, block.rect.h, block.color);
                if block.hp < block.max_hp {
                    p.rect(block.rect.x, block.rect.y, block.rect.w, block.rect.h, Color::White);
                }
            }
            for particle in &self.particles {
                p.circle(particle.pos.x, particle.pos.y, particle.current_size(), fade(particle.color, particle.life.fraction()));
            }
            p.fill_rect(self.paddle.x, self.paddle.y, self.paddle.w, self.paddle.h, Color::Cyan);
            p.disc(self.ball.x, self.ball.y, BALL_RADIUS, Color::White);
        });
    }

    fn summary(&self) -> Summary {
        Summary::default()
            .line(format!("Score: {}", self.board.score))
            .line(format!("Blocks cleared: {}", self.cleared))
            .line(format!("Best combo: {}", self.board.best_combo))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game() -> BreakoutGame {
        BreakoutGame::new(&ArcadeConfig { seed: Some(9), ..Default::default() })
    }

    fn tick() -> Tick {
        Tick { index: 1, dt: 1.0 / 60.0, fresh: true }
    }

    #[test]
    fn upper_rows_are_sturdier() {
        let wall = build_wall();
        assert_eq!(wall.len(), BLOCK_ROWS * BLOCK_COLS);
        assert_eq!(wall[0].hp, 6);
        assert_eq!(wall.last().map(|b| b.hp), Some(1));
        assert!(wall.iter().all(|b| b.rect.x >= 0.0 && b.rect.right() <= FIELD.width));
    }

    #[test]
    fn paddle_edge_sends_ball_sideways() {
        let paddle = Rect::new(100.0, PADDLE_Y, PADDLE_W, PADDLE_H);
        let center = paddle_bounce(paddle.center().x, &paddle, BALL_SPEED);
        assert!(center.x.abs() < 1e-4 && center.y < 0.0);
        let edge = paddle_bounce(paddle.right(), &paddle, 1.0);
        assert!(edge.x > 0.0);
        assert!((edge.length() - MIN_SPEED).abs() < 1e-3);
    }

    #[test]
    fn last_hit_on_a_block_scores_with_combo() {
        let mut g = game();
        let target = g.blocks.len() - 1;
        let rect = g.blocks[target].rect;
        g.board.combo = 2;
        g.ball = Vec2::new(rect.center().x, rect.bottom() + BALL_RADIUS - 1.0);
        g.vel = Vec2::new(0.0, -BALL_SPEED);
        g.hit_block();
        assert_eq!(g.blocks.len(), BLOCK_ROWS * BLOCK_COLS - 1);
        assert_eq!(g.board.score, 12);
        assert!(g.vel.y > 0.0);
    }

    #[test]
    fn dropping_the_ball_costs_a_life_and_the_combo() {
        let mut g = game();
        g.board.combo = 4;
        g.ball = Vec2::new(10.0, FIELD.height + 50.0);
        g.vel = Vec2::new(0.0, BALL_SPEED);
        assert_eq!(g.on_tick(&WristX(None), &tick()), None);
        assert_eq!(g.board.lives, 2);
        assert_eq!(g.board.combo, 0);
    }

    #[test]
    fn paddle_eases_toward_the_wrist() {
        let mut g = game();
        let before = g.paddle.center().x;
        g.on_tick(&WristX(Some(1.0)), &tick());
        let moved = g.paddle.center().x - before;
        assert!((moved - (FIELD.width - before) * PADDLE_EASE).abs() < 1e-3);
    }
}
