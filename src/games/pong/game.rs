use rand::{rngs::StdRng, Rng};
use ratatui::{layout::Rect as Area, style::Color, Frame};

use crate::core::config::{ArcadeConfig, PongControl};
use crate::core::game::{ArcadeGame, Tracking};
use crate::core::geometry::{Rect, Vec2};
use crate::core::landmarks::{DetectionFrame, HandLandmark};
use crate::core::renderer::{draw_field, draw_hud, split_hud, stat, Playfield};
use crate::core::session::{Outcome, Summary, Tick};
use crate::gesture::face::eye_height;

pub const FIELD: Playfield = Playfield::new(1000.0, 600.0);
const PADDLE_W: f32 = 20.0;
const PADDLE_H: f32 = 100.0;
const BALL_SIZE: f32 = 20.0;
const BALL_SPEED: f32 = 7.0;
const MAX_MULTIPLIER: f32 = 2.0;
const SPEEDUP: f32 = 0.05;
const SPEEDUP_EVERY: u64 = 180;
const AI_BASE_SPEED: f32 = 7.0;
const AI_DEADBAND: f32 = 10.0;
const WIN_SCORE: u32 = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct Ball {
    pub rect: Rect,
    pub vel: Vec2,
    pub multiplier: f32,
}

impl Ball {
    pub fn new(field: Playfield) -> Self {
        Self {
            rect: Rect::centered(Vec2::new(field.width / 2.0, field.height / 2.0), BALL_SIZE, BALL_SIZE),
            vel: Vec2::ZERO,
            multiplier: 1.0,
        }
    }

    /// Back to the center, heading diagonally in a random direction.
    pub fn serve_diagonal(&mut self, rng: &mut StdRng, field: Playfield, speed: f32) {
        self.rect = Rect::centered(Vec2::new(field.width / 2.0, field.height / 2.0), self.rect.w, self.rect.h);
        let sx = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
        let sy = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
        self.vel = Vec2::new(speed * sx, speed * sy);
    }

    /// Moves and bounces off the top and bottom walls.
    pub fn step(&mut self, field: Playfield) {
        self.rect.x += self.vel.x * self.multiplier;
        self.rect.y += self.vel.y * self.multiplier;
        if self.rect.y <= 0.0 {
            self.rect.y = 0.0;
            self.vel.y = self.vel.y.abs();
        } else if self.rect.bottom() >= field.height {
            self.rect.y = field.height - self.rect.h;
            self.vel.y = -self.vel.y.abs();
        }
    }

    /// Sends the ball back toward `direction` (+1 right, -1 left) when it meets `paddle`.
    pub fn bounce_off(&mut self, paddle: &Rect, direction: f32, rng: &mut StdRng) -> bool {
        let moving_toward = self.vel.x * direction < 0.0;
        if !moving_toward || !self.rect.overlaps(paddle) {
            return false;
        }
        self.vel.x = self.vel.x.abs() * direction;
        self.vel.y = rng.random_range(self.vel.y - 2.0..=self.vel.y + 2.0);
        true
    }

    pub fn speed_up(&mut self, amount: f32, max: f32) {
        self.multiplier = (self.multiplier + amount).min(max);
    }
}

/// Paddle whose center eases toward a target height at a capped speed.
pub fn chase(paddle: &mut Rect, target_y: f32, speed: f32, deadband: f32, field: Playfield) {
    let center = paddle.center().y;
    if center < target_y - deadband {
        paddle.y += speed;
    } else if center > target_y + deadband {
        paddle.y -= speed;
    }
    paddle.y = paddle.y.clamp(0.0, field.height - paddle.h);
}

/// AI speed and aim error for a player lead of `diff` points.
pub fn ai_difficulty(diff: i32) -> (f32, f32) {
    match diff {
        d if d >= 2 => (AI_BASE_SPEED + 2.0, 5.0),
        1 => (AI_BASE_SPEED + 1.0, 10.0),
        0 => (AI_BASE_SPEED, 15.0),
        -1 => (AI_BASE_SPEED - 1.0, 25.0),
        _ => ((AI_BASE_SPEED - 2.0).max(3.0), 40.0),
    }
}

/// Normalized paddle height; `None` when nobody is visible.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PaddleInput(pub Option<f32>);

pub struct PongGame {
    rng: StdRng,
    control: PongControl,
    player: Rect,
    ai: Rect,
    ball: Ball,
    player_score: u32,
    ai_score: u32,
    rallies: u32,
}

impl PongGame {
    pub fn new(config: &ArcadeConfig) -> Self {
        let mut game = Self {
            rng: config.rng(),
            control: config.pong_control,
            player: Rect::default(),
            ai: Rect::default(),
            ball: Ball::new(FIELD),
            player_score: 0,
            ai_score: 0,
            rallies: 0,
        };
        game.reset();
        game
    }
}

impl ArcadeGame for PongGame {
    type Input = PaddleInput;

    fn tracking(&self) -> Tracking {
        match self.control {
            PongControl::Hand => Tracking::Hands { anchor: HandLandmark::Wrist },
            PongControl::Eyes => Tracking::Face,
        }
    }

    fn controls(&self) -> &'static [&'static str] {
        match self.control {
            PongControl::Hand => &[
                "Raise or lower your palm to move the left paddle",
                "First to 5 points wins",
                "The AI gets sharper when you lead",
                "Set \"pong_control\": \"eyes\" in the config to steer with your eyes",
            ],
            PongControl::Eyes => &[
                "Move your head up and down, the left paddle follows your eyes",
                "First to 5 points wins",
                "The AI gets sharper when you lead",
            ],
        }
    }

    fn reset(&mut self) {
        let mid = FIELD.height / 2.0 - PADDLE_H / 2.0;
        self.player = Rect::new(30.0, mid, PADDLE_W, PADDLE_H);
        self.ai = Rect::new(FIELD.width - 30.0 - PADDLE_W, mid, PADDLE_W, PADDLE_H);
        self.ball = Ball::new(FIELD);
        self.ball.serve_diagonal(&mut self.rng, FIELD, BALL_SPEED);
        self.player_score = 0;
        self.ai_score = 0;
        self.rallies = 0;
    }

    fn classify(&self, frame: &DetectionFrame) -> PaddleInput {
        match self.control {
            PongControl::Hand => PaddleInput(frame.hand().map(|h| h.kp(HandLandmark::Wrist).y)),
            PongControl::Eyes => PaddleInput(frame.face().map(eye_height)),
        }
    }

    fn on_tick(&mut self, input: &PaddleInput, tick: &Tick) -> Option<Outcome> {
        let target = input.0.map_or(FIELD.height / 2.0, |y| y.clamp(0.0, 1.0) * FIELD.height);
        self.player.y = (target - PADDLE_H / 2.0).clamp(0.0, FIELD.height - PADDLE_H);

        let (ai_speed, ai_error) = ai_difficulty(self.player_score as i32 - self.ai_score as i32);
        let aim = self.ball.rect.center().y + self.rng.random_range(-ai_error..=ai_error);
        chase(&mut self.ai, aim, ai_speed, AI_DEADBAND, FIELD);

        if tick.every(SPEEDUP_EVERY) {
            self.ball.speed_up(SPEEDUP, MAX_MULTIPLIER);
        }
        self.ball.step(FIELD);

        let left_hit = self.ball.bounce_off(&self.player, 1.0, &mut self.rng);
        let right_hit = self.ball.bounce_off(&self.ai, -1.0, &mut self.rng);
        if left_hit || right_hit {
            self.rallies += 1;
            self.ball.speed_up(SPEEDUP, MAX_MULTIPLIER);
        }

        if self.ball.rect.right() < 0.0 {
            self.ai_score += 1;
            self.ball.serve_diagonal(&mut self.rng, FIELD, BALL_SPEED);
        } else if self.ball.rect.x > FIELD.width {
            self.player_score += 1;
            self.ball.serve_diagonal(&mut self.rng, FIELD, BALL_SPEED);
        }

        if self.player_score >= WIN_SCORE {
            Some(Outcome::Victory)
        } else if self.ai_score >= WIN_SCORE {
            Some(Outcome::GameOver)
        } else {
            None
        }
    }

    fn render(&self, frame: &mut Frame, area: Area) {
        let (hud, body) = split_hud(area);
        draw_hud(
            frame,
            hud,
            vec![
                stat("YOU", self.player_score),
                stat("AI", self.ai_score),
                stat("SPEED", format!("{:.2}x", self.ball.multiplier)),
                stat("RALLIES", self.rallies),
            ],
        );
        draw_field(frame, body, FIELD, "PONG", |p| {
            let mut y = 0.0;
            while y < FIELD.height {
                p.line(FIELD.width / 2.0, y, FIELD.width / 2.0, y + 15.0, Color::DarkGray);
                y += 30.0;
            }
            p.fill_rect(self.player.x, self.player.y, self.player.w, self.player.h, Color::Cyan);
            p.fill_rect(self.ai.x, self.ai.y, self.ai.w, self.ai.h, Color::Red);
            let c = self.ball.rect.center();
            p.disc(c.x, c.y, BALL_SIZE / 2.0, Color::White);
        });
    }

    fn summary(&self) -> Summary {
        Summary::default()
            .line(format!("You {} - {} AI", self.player_score, self.ai_score))
            .line(format!("Paddle hits: {}", self.rallies))
            .line(format!("Top ball speed: {:.2}x", self.ball.multiplier))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::synthetic::{self, HandPreset};

    fn game() -> PongGame {
        PongGame::new(&ArcadeConfig { seed: Some(3), ..Default::default() })
    }

    fn tick(index: u64) -> Tick {
        Tick { index, dt: 1.0 / 60.0, fresh: true }
    }

    #[test]
    fn difficulty_follows_score_gap() {
        assert_eq!(ai_difficulty(3), (9.0, 5.0));
        assert_eq!(ai_difficulty(0), (7.0, 15.0));
        assert_eq!(ai_difficulty(-5), (5.0, 40.0));
    }

    #[test]
    fn control_mode_picks_the_tracked_subject() {
        let frame = DetectionFrame {
            hands: vec![synthetic::hand(HandPreset::OpenHand, HandLandmark::Wrist, Vec2::new(0.5, 0.2), 1.0)],
            faces: vec![synthetic::face(Vec2::new(0.5, 0.7))],
            ..Default::default()
        };

        let hand = game();
        assert_eq!(hand.tracking(), Tracking::Hands { anchor: HandLandmark::Wrist });
        let PaddleInput(Some(y)) = hand.classify(&frame) else { panic!("no hand input") };
        assert!((y - 0.2).abs() < 1e-5);

        let eyes = PongGame::new(&ArcadeConfig { pong_control: PongControl::Eyes, ..Default::default() });
        assert_eq!(eyes.tracking(), Tracking::Face);
        let PaddleInput(Some(y)) = eyes.classify(&frame) else { panic!("no eye input") };
        assert!((y - 0.66).abs() < 1e-5);
        assert_eq!(eyes.classify(&DetectionFrame::default()), PaddleInput(None));
    }

    #[test]
    fn no_hand_centers_the_paddle() {
        let mut g = game();
        g.on_tick(&PaddleInput(None), &tick(1));
        assert_eq!(g.player.center().y, FIELD.height / 2.0);
        g.on_tick(&PaddleInput(Some(0.0)), &tick(2));
        assert_eq!(g.player.y, 0.0);
    }

    #[test]
    fn paddle_sends_ball_back() {
        let mut g = game();
        g.ball.rect = Rect::new(g.player.right() - 5.0, g.player.y + 10.0, BALL_SIZE, BALL_SIZE);
        g.ball.vel = Vec2::new(-7.0, 0.0);
        assert!(g.ball.bounce_off(&g.player.clone(), 1.0, &mut g.rng));
        assert!(g.ball.vel.x > 0.0);
        assert!(g.ball.vel.y.abs() <= 2.0);
    }

    #[test]
    fn missed_ball_scores_for_the_ai() {
        let mut g = game();
        g.ball.rect.x = -100.0;
        g.ball.vel = Vec2::new(-7.0, 0.0);
        g.on_tick(&PaddleInput(Some(0.0)), &tick(1));
        assert_eq!(g.ai_score, 1);
        assert_eq!(g.ball.rect.center(), Vec2::new(FIELD.width / 2.0, FIELD.height / 2.0));
    }

    #[test]
    fn fifth_point_wins() {
        let mut g = game();
        g.player_score = 4;
        g.ball.rect.x = FIELD.width + 50.0;
        g.ball.vel = Vec2::new(7.0, 0.0);
        assert_eq!(g.on_tick(&PaddleInput(None), &tick(1)), Some(Outcome::Victory));
    }
}
