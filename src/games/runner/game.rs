use rand::{rngs::StdRng, Rng};
use ratatui::{layout::Rect as Area, style::Color, Frame};
use tracing::debug;

use crate::core::config::{ArcadeConfig, PoseThresholds};
use crate::core::entity::{update_all, Particle};
use crate::core::game::{ArcadeGame, Tracking};
use crate::core::geometry::Vec2;
use crate::core::landmarks::DetectionFrame;
use crate::core::renderer::{draw_field, draw_hud, fade, split_hud, stat, Playfield};
use crate::core::session::{rating, Outcome, Scoreboard, Summary, Tick};
use crate::gesture::pose::{jump_duck, JumpDuck};

use super::entities::{
    Coin, Obstacle, ObstacleKind, Player, PowerKind, PowerUp, COIN_RADIUS, GROUND_Y, PLAYER_SIZE, PLAYER_X,
    POWERUP_RADIUS,
};

const FIELD: Playfield = Playfield::new(1400.0, 900.0);
const BASE_SPEED: f32 = 12.0;
const MAX_SPEED: f32 = 25.0;
const MAX_LEVEL: f32 = 2.5;
const SPAWN_RATE: u64 = 75;
const MIN_SPAWN_RATE: u64 = 40;
const POWERUP_EVERY: u64 = 300;
const MAGNET_RANGE: f32 = 200.0;
const SHIELD_BONUS: u64 = 100;
const POWERUP_POINTS: u64 = 25;
const PARTICLE_LIFE: u32 = 20;
const PARTICLE_GRAVITY: f32 = 0.3;
const RATINGS: [(f32, &str); 3] = [(1001.0, "LEGENDARY"), (501.0, "INCREDIBLE"), (251.0, "GREAT")];

/// Speed multiplier from distance: +0.1 every 10 obstacles, capped at 2.5.
pub fn speed_level(distance: u64) -> f32 {
    (1.0 + (distance / 10) as f32 * 0.1).min(MAX_LEVEL)
}

/// Ticks between obstacle spawns, shrinking with distance.
pub fn spawn_rate(distance: u64) -> u64 {
    SPAWN_RATE.saturating_sub(distance / 5).max(MIN_SPAWN_RATE)
}

pub struct RunnerGame {
    rng: StdRng,
    thresholds: PoseThresholds,
    player: Player,
    obstacles: Vec<Obstacle>,
    coins: Vec<Coin>,
    powerups: Vec<PowerUp>,
    particles: Vec<Particle>,
    board: Scoreboard,
    distance: u64,
    coins_collected: u32,
    frames: u64,
    scroll: f32,
}

impl RunnerGame {
    pub fn new(config: &ArcadeConfig) -> Self {
        let mut game = Self {
            rng: config.rng(),
            thresholds: config.thresholds.pose.clone(),
            player: Player::default(),
            obstacles: Vec::new(),
            coins: Vec::new(),
            powerups: Vec::new(),
            particles: Vec::new(),
            board: Scoreboard::new(1),
            distance: 0,
            coins_collected: 0,
            frames: 0,
            scroll: 0.0,
        };
        game.reset();
        game
    }

    fn spawn(&mut self, speed: f32) {
        let kind = if self.rng.random_bool(0.7) { ObstacleKind::Ground } else { ObstacleKind::Air };
        let width = self.rng.random_range(40.0..=70.0);
        let height = self.rng.random_range(60.0..=100.0);
        self.obstacles.push(Obstacle::new(FIELD.width, kind, width, height, speed));
        if self.rng.random_bool(0.5) {
            let y = self.rng.random_range(GROUND_Y - 250.0..=GROUND_Y - 100.0);
            self.coins.push(Coin { pos: Vec2::new(FIELD.width + 100.0, y) });
        }
    }

    fn spawn_powerup(&mut self) {
        let kind = PowerKind::ALL[self.rng.random_range(0..PowerKind::ALL.len())];
        let y = self.rng.random_range(GROUND_Y - 250.0..=GROUND_Y - 150.0);
        self.powerups.push(PowerUp { pos: Vec2::new(FIELD.width + 150.0, y), kind });
    }

    fn sparkle(&mut self, at: Vec2, color: Color) {
        for _ in 0..5 {
            let vel = Vec2::new(self.rng.random_range(-3.0..=3.0), self.rng.random_range(-5.0..=-2.0));
            self.particles.push(Particle::new(at, vel, PARTICLE_LIFE, color).with_gravity(PARTICLE_GRAVITY));
        }
    }

    /// Collisions and passes. Returns false when an unshielded hit ends the run.
    fn resolve_obstacles(&mut self, level: f32) -> bool {
        let hitbox = self.player.hitbox();
        let mut survived = true;
        let mut absorbed = false;
        for obstacle in &mut self.obstacles {
            if obstacle.rect.overlaps(&hitbox) {
                if self.player.shield > 0 && !absorbed {
                    absorbed = true;
                    obstacle.rect.x = -obstacle.rect.w - 1.0;
                } else {
                    survived = false;
                }
            } else if !obstacle.passed && obstacle.rect.right() < PLAYER_X {
                obstacle.passed = true;
                self.board.add(10 * level as u64);
                self.board.bump_combo();
                self.distance += 1;
            }
        }
        if absorbed {
            debug!("shield absorbed a hit");
            self.player.shield = 0;
            self.board.add(SHIELD_BONUS);
        }
        survived
    }

    fn collect(&mut self) {
        let player = self.player.clone();
        let (taken, kept): (Vec<Coin>, Vec<Coin>) =
            std::mem::take(&mut self.coins).into_iter().partition(|c| player.reaches(c.pos, COIN_RADIUS));
        self.coins = kept;
        for coin in taken {
            self.board.add(50 + 5 * u64::from(self.board.combo));
            self.coins_collected += 1;
            self.sparkle(coin.pos, Color::Yellow);
        }

        let (taken, kept): (Vec<PowerUp>, Vec<PowerUp>) =
            std::mem::take(&mut self.powerups).into_iter().partition(|p| player.reaches(p.pos, POWERUP_RADIUS));
        self.powerups = kept;
        for power in taken {
            power.kind.apply(&mut self.player);
            self.board.add(POWERUP_POINTS);
            self.sparkle(power.pos, Color::Cyan);
        }
    }
}

impl ArcadeGame for RunnerGame {
    type Input = JumpDuck;

    fn tracking(&self) -> Tracking {
        Tracking::Pose
    }

    fn controls(&self) -> &'static [&'static str] {
        &[
            "Raise both arms above your shoulders to jump",
            "Bend down to duck",
            "Power-ups: [S] shield, [M] coin magnet, [T] slow motion",
        ]
    }

    fn reset(&mut self) {
        self.player = Player::default();
        self.obstacles.clear();
        self.coins.clear();
        self.powerups.clear();
        self.particles.clear();
        self.board = Scoreboard::new(1);
        self.distance = 0;
        self.coins_collected = 0;
        self.frames = 0;
        self.scroll = 0.0;
    }

    fn classify(&self, frame: &DetectionFrame) -> JumpDuck {
        frame.pose.as_ref().map(|p| jump_duck(p, &self.thresholds)).unwrap_or_default()
    }

    fn on_tick(&mut self, input: &JumpDuck, _tick: &Tick) -> Option<Outcome> {
        self.player.update(input.jump, input.duck);

        let level = speed_level(self.distance);
        let speed = (BASE_SPEED * level).min(MAX_SPEED);
        let factor = self.player.speed_factor();

        self.frames += 1;
        if self.frames % spawn_rate(self.distance) == 0 {
            self.spawn(speed);
        }
        if self.frames % POWERUP_EVERY == 0 && self.rng.random_bool(0.5) {
            self.spawn_powerup();
        }

        let magnet = self.player.magnet > 0;
        let center = self.player.center();
        for obstacle in &mut self.obstacles {
            obstacle.advance(factor);
        }
        for coin in &mut self.coins {
            let pull = (magnet && coin.pos.distance(center) < MAGNET_RANGE).then_some(center);
            coin.advance(speed * factor, pull);
        }
        for power in &mut self.powerups {
            power.pos.x -= speed * factor;
        }
        self.obstacles.retain(Obstacle::on_screen);
        self.coins.retain(Coin::on_screen);
        self.powerups.retain(PowerUp::on_screen);

        if !self.resolve_obstacles(level) {
            return Some(Outcome::GameOver);
        }
        self.obstacles.retain(Obstacle::on_screen);
        self.collect();
        update_all(&mut self.particles);
        self.scroll += speed * factor;
        None
    }

    fn render(&self, frame: &mut Frame, area: Area) {
        let (hud, body) = split_hud(area);
        let mut stats = vec![
            stat("SCORE", self.board.score),
            stat("DISTANCE", self.distance),
            stat("COMBO", self.board.combo),
            stat("SPEED", format!("{:.1}x", speed_level(self.distance))),
        ];
        if self.player.shield > 0 {
            stats.push(stat("SHIELD", format!("{}s", self.player.shield / 60)));
        }
        if self.player.magnet > 0 {
            stats.push(stat("MAGNET", format!("{}s", self.player.magnet / 60)));
        }
        if self.player.slow > 0 {
            stats.push(stat("SLOW", format!("{}s", self.player.slow / 60)));
        }
        draw_hud(frame, hud, stats);

        draw_field(frame, body, FIELD, "ENDLESS RUNNER", |p| {
            p.line(0.0, GROUND_Y, FIELD.width, GROUND_Y, Color::Green);
            let offset = self.scroll % 100.0;
            let mut x = -offset;
            while x < FIELD.width {
                p.line(x, GROUND_Y + 10.0, x + 40.0, GROUND_Y + 10.0, Color::DarkGray);
                x += 100.0;
            }
            for obstacle in &self.obstacles {
                let color = match obstacle.kind {
                    ObstacleKind::Ground => Color::Red,
                    ObstacleKind::Air => Color::LightRed,
                };
                p.fill_rect(obstacle.rect.x, obstacle.rect.y, obstacle.rect.w, obstacle.rect.h, color);
            }
            for coin in &self.coins {
                p.disc(coin.pos.x, coin.pos.y, COIN_RADIUS, Color::Yellow);
            }
            for power in &self.powerups {
                p.circle(power.pos.x, power.pos.y, POWERUP_RADIUS, Color::Cyan);
                p.text(power.pos.x - 5.0, power.pos.y, power.kind.label(), Color::White);
            }
            for particle in &self.particles {
                p.points(&[(particle.pos.x, particle.pos.y)], fade(particle.color, particle.life.fraction()));
            }
            let body = self.player.hitbox();
            let color = if self.player.shield > 0 { Color::Cyan } else { Color::Magenta };
            p.fill_rect(body.x, body.y, body.w, body.h, color);
            if self.player.shield > 0 {
                let c = self.player.center();
                p.circle(c.x, c.y, PLAYER_SIZE, Color::Cyan);
            }
        });
    }

    fn summary(&self) -> Summary {
        Summary::default()
            .line(format!("Score: {}", self.board.score))
            .line(format!("Distance: {}", self.distance))
            .line(format!("Coins: {}", self.coins_collected))
            .line(format!("Best combo: {}", self.board.best_combo))
            .rated(rating(self.board.score as f32, &RATINGS, "GOOD JOB"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game() -> RunnerGame {
        RunnerGame::new(&ArcadeConfig { seed: Some(17), ..Default::default() })
    }

    fn tick() -> Tick {
        Tick { index: 1, dt: 1.0 / 60.0, fresh: true }
    }

    #[test]
    fn pacing_follows_distance() {
        assert_eq!(speed_level(0), 1.0);
        assert!((speed_level(25) - 1.2).abs() < 1e-5);
        assert_eq!(speed_level(1000), MAX_LEVEL);
        assert_eq!(spawn_rate(0), 75);
        assert_eq!(spawn_rate(50), 65);
        assert_eq!(spawn_rate(500), 40);
    }

    #[test]
    fn hitting_an_obstacle_ends_the_run() {
        let mut g = game();
        g.obstacles.push(Obstacle::new(PLAYER_X, ObstacleKind::Ground, 50.0, 80.0, 0.0));
        assert_eq!(g.on_tick(&JumpDuck::default(), &tick()), Some(Outcome::GameOver));
    }

    #[test]
    fn shield_absorbs_one_hit() {
        let mut g = game();
        g.player.shield = 100;
        g.obstacles.push(Obstacle::new(PLAYER_X, ObstacleKind::Ground, 50.0, 80.0, 0.0));
        assert_eq!(g.on_tick(&JumpDuck::default(), &tick()), None);
        assert_eq!(g.player.shield, 0);
        assert_eq!(g.board.score, SHIELD_BONUS);
        assert!(g.obstacles.is_empty());
    }

    #[test]
    fn passing_scores_and_builds_combo() {
        let mut g = game();
        g.obstacles.push(Obstacle::new(PLAYER_X - 60.0, ObstacleKind::Ground, 50.0, 80.0, 0.0));
        g.on_tick(&JumpDuck::default(), &tick());
        assert_eq!(g.board.score, 10);
        assert_eq!(g.board.combo, 1);
        assert_eq!(g.distance, 1);
    }

    #[test]
    fn air_obstacles_miss_a_grounded_player() {
        let mut g = game();
        g.obstacles.push(Obstacle::new(PLAYER_X, ObstacleKind::Air, 50.0, 80.0, 0.0));
        assert_eq!(g.on_tick(&JumpDuck::default(), &tick()), None);
    }

    #[test]
    fn coins_pay_with_combo() {
        let mut g = game();
        g.board.combo = 4;
        let at = g.player.center() + Vec2::new(BASE_SPEED, 0.0);
        g.coins.push(Coin { pos: at });
        g.on_tick(&JumpDuck::default(), &tick());
        assert_eq!(g.board.score, 70);
        assert_eq!(g.coins_collected, 1);
        assert_eq!(g.particles.len(), 5);
    }
}
