use rand::{rngs::StdRng, Rng};
use ratatui::{layout::Rect as Area, style::Color, Frame};

use crate::core::config::{ArcadeConfig, FaceThresholds};
use crate::core::game::{ArcadeGame, Tracking};
use crate::core::geometry::{circle_hits_rect, Rect, Vec2};
use crate::core::landmarks::DetectionFrame;
use crate::core::renderer::{draw_field, draw_hud, split_hud, stat, Playfield};
use crate::core::session::{Outcome, Scoreboard, Summary, Tick};
use crate::gesture::face::lane;

const FIELD: Playfield = Playfield::new(1400.0, 900.0);
pub const LANES: usize = 3;
const LANE_WIDTH: f32 = 200.0;
const PLAYER_SIZE: f32 = 70.0;
const PLAYER_Y: f32 = 700.0;
const PLAYER_EASE: f32 = 0.2;
const SPEED: f32 = 12.0;
const OBSTACLE_W: f32 = 60.0;
const OBSTACLE_H: f32 = 80.0;
const COIN_RADIUS: f32 = 20.0;
const OBSTACLE_EVERY: u64 = 60;
const COIN_EVERY: u64 = 120;
const COIN_CHANCE: f64 = 0.6;
const INVINCIBLE_TICKS: u32 = 60;
const LIVES: u32 = 3;
const PASS_POINTS: u64 = 10;
const COIN_POINTS: u64 = 50;

/// Center x of a lane.
pub fn lane_x(lane: usize) -> f32 {
    FIELD.width / 2.0 - LANE_WIDTH + lane as f32 * LANE_WIDTH
}

fn road() -> Rect {
    Rect::new(lane_x(0) - LANE_WIDTH / 2.0, 0.0, LANE_WIDTH * LANES as f32, FIELD.height)
}

#[derive(Debug, Clone, PartialEq)]
struct Obstacle {
    rect: Rect,
    passed: bool,
}

/// Lane picked by the nose; the centre lane when no face is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaneInput(pub usize);

impl Default for LaneInput {
    fn default() -> Self {
        Self(1)
    }
}

pub struct DodgeGame {
    rng: StdRng,
    thresholds: FaceThresholds,
    player_x: f32,
    target_lane: usize,
    obstacles: Vec<Obstacle>,
    coins: Vec<Vec2>,
    board: Scoreboard,
    invincible: u32,
    frames: u64,
    passed: u32,
    coins_collected: u32,
}

impl DodgeGame {
    pub fn new(config: &ArcadeConfig) -> Self {
        let mut game = Self {
            rng: config.rng(),
            thresholds: config.thresholds.face.clone(),
            player_x: lane_x(1),
            target_lane: 1,
            obstacles: Vec::new(),
            coins: Vec::new(),
            board: Scoreboard::new(LIVES),
            invincible: 0,
            frames: 0,
            passed: 0,
            coins_collected: 0,
        };
        game.reset();
        game
    }

    fn player_rect(&self) -> Rect {
        Rect::centered(Vec2::new(self.player_x, PLAYER_Y), PLAYER_SIZE, PLAYER_SIZE)
    }

    fn random_lane(&mut self) -> usize {
        self.rng.random_range(0..LANES)
    }
}

impl ArcadeGame for DodgeGame {
    type Input = LaneInput;

    fn tracking(&self) -> Tracking {
        Tracking::Face
    }

    fn controls(&self) -> &'static [&'static str] {
        &["Lean your head left, centre or right to change lanes", "Dodge the obstacles, grab the coins", "3 lives"]
    }

    fn reset(&mut self) {
        self.player_x = lane_x(1);
        self.target_lane = 1;
        self.obstacles.clear();
        self.coins.clear();
        self.board = Scoreboard::new(LIVES);
        self.invincible = 0;
        self.frames = 0;
        self.passed = 0;
        self.coins_collected = 0;
    }

    fn classify(&self, frame: &DetectionFrame) -> LaneInput {
        frame.face().map(|f| LaneInput(lane(f, &self.thresholds))).unwrap_or_default()
    }

    fn on_tick(&mut self, input: &LaneInput, _tick: &Tick) -> Option<Outcome> {
        self.target_lane = input.0.min(LANES - 1);
        self.player_x += (lane_x(self.target_lane) - self.player_x) * PLAYER_EASE;
        self.invincible = self.invincible.saturating_sub(1);

        self.frames += 1;
        if self.frames % OBSTACLE_EVERY == 0 {
            let x = lane_x(self.random_lane());
            self.obstacles.push(Obstacle { rect: Rect::new(x - OBSTACLE_W / 2.0, -OBSTACLE_H, OBSTACLE_W, OBSTACLE_H), passed: false });
        }
        if self.frames % COIN_EVERY == 0 && self.rng.random_bool(COIN_CHANCE) {
            let x = lane_x(self.random_lane());
            self.coins.push(Vec2::new(x, -50.0));
        }

        for obstacle in &mut self.obstacles {
            obstacle.rect.y += SPEED;
        }
        for coin in &mut self.coins {
            coin.y += SPEED;
        }
        self.obstacles.retain(|o| o.rect.y < FIELD.height + 100.0);
        self.coins.retain(|c| c.y < FIELD.height + 50.0);

        let player = self.player_rect();
        let mut hit = false;
        for obstacle in &mut self.obstacles {
            if self.invincible == 0 && !hit && obstacle.rect.overlaps(&player) {
                hit = true;
                obstacle.rect.y = FIELD.height + 200.0;
            } else if !obstacle.passed && obstacle.rect.y > PLAYER_Y {
                obstacle.passed = true;
                self.passed += 1;
                self.board.add(PASS_POINTS);
            }
        }
        self.obstacles.retain(|o| o.rect.y < FIELD.height + 100.0);
        if hit {
            self.invincible = INVINCIBLE_TICKS;
            if !self.board.lose_life() {
                return Some(Outcome::GameOver);
            }
        }

        let before = self.coins.len();
        self.coins.retain(|c| !circle_hits_rect(*c, COIN_RADIUS, &player));
        let taken = before - self.coins.len();
        self.coins_collected += taken as u32;
        self.board.add(COIN_POINTS * taken as u64);
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
                stat("COINS", self.coins_collected),
            ],
        );
        draw_field(frame, body, FIELD, "LANE DODGE", |p| {
            let road = road();
            p.rect(road.x, road.y, road.w, road.h, Color::Yellow);
            let dash = (self.frames as f32 * SPEED) % 100.0;
            for lane in 1..LANES {
                let x = road.x + lane as f32 * LANE_WIDTH;
                let mut y = dash - 100.0;
                while y < FIELD.height {
                    p.line(x, y, x, y + 40.0, Color::DarkGray);
                    y += 100.0;
                }
            }
            for coin in &self.coins {
                p.disc(coin.x, coin.y, COIN_RADIUS, Color::Yellow);
            }
            for obstacle in &self.obstacles {
                p.fill_rect(obstacle.rect.x, obstacle.rect.y, obstacle.rect.w, obstacle.rect.h, Color::Red);
            }
            // Blink while invincible.
            if self.invincible % 10 < 5 {
                let r = self.player_rect();
                p.fill_rect(r.x, r.y, r.w, r.h, Color::Cyan);
            }
            for lane in 0..LANES {
                let color = if lane == self.target_lane { Color::Cyan } else { Color::DarkGray };
                p.circle(lane_x(lane), FIELD.height - 60.0, 15.0, color);
            }
        });
    }

    fn summary(&self) -> Summary {
        Summary::default()
            .line(format!("Score: {}", self.board.score))
            .line(format!("Obstacles passed: {}", self.passed))
            .line(format!("Coins: {}", self.coins_collected))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::synthetic;

    fn game() -> DodgeGame {
        DodgeGame::new(&ArcadeConfig { seed: Some(2), ..Default::default() })
    }

    fn tick() -> Tick {
        Tick { index: 1, dt: 1.0 / 60.0, fresh: true }
    }

    #[test]
    fn nose_picks_the_lane() {
        let g = game();
        let frame = |x: f32| DetectionFrame { faces: vec![synthetic::face(Vec2::new(x, 0.5))], ..Default::default() };
        assert_eq!(g.classify(&frame(0.1)), LaneInput(0));
        assert_eq!(g.classify(&frame(0.5)), LaneInput(1));
        assert_eq!(g.classify(&frame(0.9)), LaneInput(2));
        assert_eq!(g.classify(&DetectionFrame::default()), LaneInput(1));
    }

    #[test]
    fn player_eases_toward_the_lane() {
        let mut g = game();
        g.on_tick(&LaneInput(2), &tick());
        let expected = lane_x(1) + (lane_x(2) - lane_x(1)) * PLAYER_EASE;
        assert!((g.player_x - expected).abs() < 1e-3);
    }

    #[test]
    fn hit_costs_a_life_then_grants_invincibility() {
        let mut g = game();
        let player = g.player_rect();
        g.obstacles.push(Obstacle { rect: Rect::new(player.x, player.y - SPEED, OBSTACLE_W, OBSTACLE_H), passed: false });
        g.obstacles.push(Obstacle { rect: Rect::new(player.x, player.y - SPEED, OBSTACLE_W, OBSTACLE_H), passed: false });
        assert_eq!(g.on_tick(&LaneInput(1), &tick()), None);
        assert_eq!(g.board.lives, 2);
        assert_eq!(g.invincible, INVINCIBLE_TICKS);
        g.on_tick(&LaneInput(1), &tick());
        assert_eq!(g.board.lives, 2);
    }

    #[test]
    fn coins_pay_fifty() {
        let mut g = game();
        g.coins.push(Vec2::new(lane_x(1), PLAYER_Y - SPEED));
        g.on_tick(&LaneInput(1), &tick());
        assert_eq!(g.board.score, COIN_POINTS);
        assert_eq!(g.coins_collected, 1);
    }

    #[test]
    fn lanes_are_two_hundred_apart() {
        assert_eq!(lane_x(0), 500.0);
        assert_eq!(lane_x(2) - lane_x(1), LANE_WIDTH);
    }
}
