use rand::{rngs::StdRng, Rng};
use ratatui::{layout::Rect as Area, style::Color, Frame};

use crate::core::config::ArcadeConfig;
use crate::core::entity::{burst, update_all, Entity, Lifetime, Particle};
use crate::core::game::{ArcadeGame, Tracking};
use crate::core::geometry::{circles_touch, Vec2};
use crate::core::landmarks::{DetectionFrame, HandLandmark};
use crate::core::renderer::{draw_field, draw_hud, fade, split_hud, stat, Playfield};
use crate::core::session::{rating, Outcome, Scoreboard, Summary, Tick, Timer};

const FIELD: Playfield = Playfield::new(1400.0, 900.0);
const ROUND_SECS: f32 = 60.0;
const TARGET_SECS: f32 = 2.0;
const MAX_RADIUS: f32 = 80.0;
const MIN_RADIUS: f32 = 15.0;
const HIT_RANGE: f32 = 60.0;
const SPAWN_START: f32 = 1.0;
const SPAWN_STEP: f32 = 0.05;
const SPAWN_MIN: f32 = 0.5;
const CROWDED: usize = 5;
const HIT_PARTICLES: usize = 15;
const MAX_HANDS: usize = 2;
const RATINGS: [(f32, &str); 3] = [(1000.0, "LEGENDARY REFLEXES"), (500.0, "SHARP SHOOTER"), (250.0, "GOOD HANDS")];

#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub pos: Vec2,
    pub value: u64,
    pub life: Lifetime,
    pub hit: bool,
}

impl Target {
    /// Grows to full size during the first quarter of its life.
    pub fn radius(&self) -> f32 {
        let age = 1.0 - self.life.fraction();
        (MAX_RADIUS * (age * 4.0).min(1.0)).max(MIN_RADIUS)
    }

    fn color(&self) -> Color {
        match self.value {
            50 => Color::Magenta,
            40 => Color::Red,
            30 => Color::Yellow,
            20 => Color::Green,
            _ => Color::Cyan,
        }
    }
}

impl Entity for Target {
    fn update(&mut self) {
        self.life.tick();
    }

    fn alive(&self) -> bool {
        !self.hit && !self.life.is_expired()
    }
}

/// Index fingertips of up to two hands, in world units.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Cursors(pub Vec<Vec2>);

pub struct TargetsGame {
    rng: StdRng,
    target_ticks: u32,
    targets: Vec<Target>,
    particles: Vec<Particle>,
    board: Scoreboard,
    clock: Timer,
    spawn_interval: f32,
    since_spawn: f32,
    hits: u32,
    misses: u32,
}

impl TargetsGame {
    pub fn new(config: &ArcadeConfig) -> Self {
        let mut game = Self {
            rng: config.rng(),
            target_ticks: config.ticks(TARGET_SECS),
            targets: Vec::new(),
            particles: Vec::new(),
            board: Scoreboard::new(0),
            clock: Timer::new(ROUND_SECS),
            spawn_interval: SPAWN_START,
            since_spawn: 0.0,
            hits: 0,
            misses: 0,
        };
        game.reset();
        game
    }

    fn spawn(&mut self) {
        let margin = MAX_RADIUS + 20.0;
        let pos = Vec2::new(
            self.rng.random_range(margin..FIELD.width - margin),
            self.rng.random_range(margin..FIELD.height - margin),
        );
        let value = self.rng.random_range(1..=5u64) * 10;
        self.targets.push(Target { pos, value, life: Lifetime::new(self.target_ticks), hit: false });
        if self.targets.len() > CROWDED {
            self.spawn_interval = (self.spawn_interval - SPAWN_STEP).max(SPAWN_MIN);
        }
    }

    fn check_hits(&mut self, cursors: &[Vec2]) {
        for target in self.targets.iter_mut().filter(|t| t.alive()) {
            if cursors.iter().any(|c| circles_touch(*c, 0.0, target.pos, HIT_RANGE)) {
                target.hit = true;
                self.board.hit(target.value);
                self.hits += 1;
                self.particles.extend(burst(&mut self.rng, target.pos, HIT_PARTICLES, 3.0..8.0, 30, target.color()));
            }
        }
    }
}

impl ArcadeGame for TargetsGame {
    type Input = Cursors;

    fn tracking(&self) -> Tracking {
        Tracking::Hands { anchor: HandLandmark::IndexTip }
    }

    fn controls(&self) -> &'static [&'static str] {
        &[
            "Touch the targets with your index fingertip, two hands work",
            "Consecutive hits build a combo, a vanished target breaks it",
            "60 seconds on the clock",
        ]
    }

    fn reset(&mut self) {
        self.targets.clear();
        self.particles.clear();
        self.board = Scoreboard::new(0);
        self.clock.restart();
        self.spawn_interval = SPAWN_START;
        self.since_spawn = 0.0;
        self.hits = 0;
        self.misses = 0;
    }

    fn classify(&self, frame: &DetectionFrame) -> Cursors {
        Cursors(
            frame
                .hands
                .iter()
                .take(MAX_HANDS)
                .map(|h| {
                    let tip = h.kp(HandLandmark::IndexTip);
                    Vec2::new(tip.x * FIELD.width, tip.y * FIELD.height)
                })
                .collect(),
        )
    }

    fn on_tick(&mut self, input: &Cursors, tick: &Tick) -> Option<Outcome> {
        if self.clock.tick(tick.dt) {
            return Some(Outcome::Victory);
        }
        self.since_spawn += tick.dt;
        if self.since_spawn >= self.spawn_interval {
            self.since_spawn = 0.0;
            self.spawn();
        }

        self.check_hits(&input.0);
        let expired = self.targets.iter().filter(|t| !t.hit && t.life.is_expired()).count();
        if expired > 0 {
            self.misses += expired as u32;
            self.board.miss();
        }
        update_all(&mut self.targets);
        update_all(&mut self.particles);
        None
    }

    fn render(&self, frame: &mut Frame, area: Area) {
        let (hud, body) = split_hud(area);
        draw_hud(
            frame,
            hud,
            vec![
                stat("SCORE", self.board.score),
                stat("COMBO", self.board.combo),
                stat("TIME", format!("{:.0}s", self.clock.remaining().ceil())),
            ],
        );
        draw_field(frame, body, FIELD, "TARGET SMASH", |p| {
            for target in self.targets.iter().filter(|t| t.alive()) {
                let r = target.radius();
                p.circle(target.pos.x, target.pos.y, r, target.color());
                p.circle(target.pos.x, target.pos.y, r * 0.6, target.color());
                p.disc(target.pos.x, target.pos.y, r * 0.25, Color::White);
            }
            for particle in &self.particles {
                p.circle(particle.pos.x, particle.pos.y, particle.current_size(), fade(particle.color, particle.life.fraction()));
            }
        });
    }

    fn summary(&self) -> Summary {
        let attempts = self.hits + self.misses;
        let accuracy = if attempts == 0 { 0.0 } else { self.hits as f32 * 100.0 / attempts as f32 };
        Summary::default()
            .line(format!("Score: {}", self.board.score))
            .line(format!("Targets hit: {}  missed: {}", self.hits, self.misses))
            .line(format!("Accuracy: {accuracy:.0}%"))
            .line(format!("Best combo: {}", self.board.best_combo))
            .rated(rating(self.board.score as f32, &RATINGS, "KEEP PRACTICING"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game() -> TargetsGame {
        TargetsGame::new(&ArcadeConfig { seed: Some(21), ..Default::default() })
    }

    fn tick() -> Tick {
        Tick { index: 1, dt: 1.0 / 60.0, fresh: true }
    }

    fn target_at(pos: Vec2, value: u64, ticks: u32) -> Target {
        Target { pos, value, life: Lifetime::new(ticks), hit: false }
    }

    #[test]
    fn touching_a_target_scores_with_combo() {
        let mut g = game();
        g.board.combo = 5;
        g.targets.push(target_at(Vec2::new(500.0, 500.0), 40, 120));
        g.on_tick(&Cursors(vec![Vec2::new(540.0, 500.0)]), &tick());
        assert_eq!(g.board.score, 60);
        assert_eq!(g.board.combo, 6);
        assert_eq!(g.particles.len(), HIT_PARTICLES);
        assert!(g.targets.iter().all(|t| t.pos != Vec2::new(500.0, 500.0)));
    }

    #[test]
    fn expired_target_resets_combo() {
        let mut g = game();
        g.board.combo = 3;
        g.targets.push(target_at(Vec2::new(200.0, 200.0), 10, 1));
        g.on_tick(&Cursors::default(), &tick());
        assert_eq!(g.board.combo, 3);
        g.on_tick(&Cursors::default(), &tick());
        assert_eq!(g.board.combo, 0);
        assert_eq!(g.misses, 1);
    }

    #[test]
    fn crowding_speeds_up_spawns() {
        let mut g = game();
        for _ in 0..8 {
            g.spawn();
        }
        assert!((g.spawn_interval - (SPAWN_START - 3.0 * SPAWN_STEP)).abs() < 1e-5);
        for _ in 0..20 {
            g.spawn();
        }
        assert_eq!(g.spawn_interval, SPAWN_MIN);
    }

    #[test]
    fn targets_grow_to_full_size() {
        let mut t = target_at(Vec2::ZERO, 10, 100);
        assert_eq!(t.radius(), MIN_RADIUS);
        for _ in 0..50 {
            t.update();
        }
        assert_eq!(t.radius(), MAX_RADIUS);
    }

    #[test]
    fn clock_ends_the_round() {
        let mut g = game();
        let long = Tick { index: 1, dt: ROUND_SECS, fresh: false };
        assert_eq!(g.on_tick(&Cursors::default(), &long), Some(Outcome::Victory));
    }
}
