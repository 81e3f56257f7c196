use rand::{rngs::StdRng, Rng};
use ratatui::{layout::Rect as Area, style::Color, Frame};
use tracing::debug;

use crate::core::config::ArcadeConfig;
use crate::core::entity::{burst, update_all, Entity, Particle};
use crate::core::game::{ArcadeGame, Tracking};
use crate::core::geometry::{circles_touch, Vec2};
use crate::core::landmarks::{DetectionFrame, HandLandmark};
use crate::core::renderer::{draw_field, draw_hud, fade, split_hud, stat, Playfield};
use crate::core::session::{Outcome, Scoreboard, Summary, Tick};
use crate::gesture::hand::is_fist;

pub const FIELD: Playfield = Playfield::new(1400.0, 900.0);
const PLAYER_SIZE: f32 = 60.0;
const EASING: f32 = 0.3;
const FIRE_COOLDOWN: u32 = 15;
const BULLET_SPEED: f32 = 15.0;
const BULLET_RADIUS: f32 = 5.0;
const ENEMY_EVERY: u64 = 60;
const ENEMY_SPEED: f32 = 3.0;
const ENEMY_HP: u32 = 2;
const KILL_POINTS: u64 = 100;
const EXPLOSION_PARTICLES: usize = 20;
const EXPLOSION_LIFE: u32 = 33;
const CONTACT_DAMAGE: u32 = 25;
const MAX_HEALTH: u32 = 100;
const MAX_ESCAPED: u32 = 10;
const STARS: usize = 150;
const ENEMY_COLORS: [Color; 4] = [Color::Red, Color::LightRed, Color::Magenta, Color::LightGreen];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bullet {
    pub pos: Vec2,
    spent: bool,
}

impl Entity for Bullet {
    fn update(&mut self) {
        self.pos.y -= BULLET_SPEED;
    }

    fn alive(&self) -> bool {
        !self.spent && self.pos.y > -20.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Enemy {
    pub pos: Vec2,
    pub size: f32,
    pub speed: f32,
    pub hp: u32,
    color: Color,
    /// Set once the enemy has left the field, hit the player or been destroyed.
    gone: bool,
}

impl Enemy {
    fn radius(&self) -> f32 {
        self.size / 2.0
    }
}

impl Entity for Enemy {
    fn update(&mut self) {
        self.pos.y += self.speed;
    }

    fn alive(&self) -> bool {
        !self.gone
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Star {
    pos: Vec2,
    speed: f32,
}

/// Mean index tip in world units and whether any hand is a fist.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ShipInput {
    pub aim: Option<Vec2>,
    pub firing: bool,
}

pub struct ShooterGame {
    rng: StdRng,
    player: Vec2,
    cooldown: u32,
    health: u32,
    bullets: Vec<Bullet>,
    enemies: Vec<Enemy>,
    particles: Vec<Particle>,
    stars: Vec<Star>,
    board: Scoreboard,
    escaped: u32,
    kills: u32,
    shots: u32,
}

impl ShooterGame {
    pub fn new(config: &ArcadeConfig) -> Self {
        let mut game = Self {
            rng: config.rng(),
            player: Vec2::ZERO,
            cooldown: 0,
            health: MAX_HEALTH,
            bullets: Vec::new(),
            enemies: Vec::new(),
            particles: Vec::new(),
            stars: Vec::new(),
            board: Scoreboard::new(0),
            escaped: 0,
            kills: 0,
            shots: 0,
        };
        game.reset();
        game
    }

    fn steer(&mut self, aim: Option<Vec2>) {
        if let Some(target) = aim {
            self.player = self.player + (target - self.player) * EASING;
        }
        self.player.x = self.player.x.clamp(50.0, FIELD.width - 50.0);
        self.player.y = self.player.y.clamp(200.0, FIELD.height - 50.0);
    }

    fn fire(&mut self) {
        if self.cooldown > 0 {
            return;
        }
        self.cooldown = FIRE_COOLDOWN;
        self.shots += 1;
        self.bullets.push(Bullet { pos: Vec2::new(self.player.x, self.player.y - PLAYER_SIZE / 2.0), spent: false });
    }

    fn spawn_enemy(&mut self) {
        let enemy = Enemy {
            pos: Vec2::new(self.rng.random_range(50.0..FIELD.width - 50.0), -50.0),
            size: self.rng.random_range(40.0..=70.0),
            speed: ENEMY_SPEED + self.rng.random_range(-1.0..=2.0),
            hp: ENEMY_HP,
            color: ENEMY_COLORS[self.rng.random_range(0..ENEMY_COLORS.len())],
            gone: false,
        };
        self.enemies.push(enemy);
    }

    /// Each bullet hits at most one enemy.
    fn resolve_shots(&mut self) {
        for bullet in self.bullets.iter_mut().filter(|b| b.alive()) {
            let Some(enemy) =
                self.enemies.iter_mut().find(|e| e.alive() && circles_touch(e.pos, e.radius(), bullet.pos, BULLET_RADIUS))
            else {
                continue;
            };
            bullet.spent = true;
            enemy.hp = enemy.hp.saturating_sub(1);
            if enemy.hp == 0 {
                enemy.gone = true;
                self.kills += 1;
                self.board.hit(KILL_POINTS);
                self.particles.extend(
                    burst(&mut self.rng, enemy.pos, EXPLOSION_PARTICLES, 2.0..8.0, EXPLOSION_LIFE, enemy.color)
                        .into_iter()
                        .map(|p| p.with_size(8.0)),
                );
            }
        }
    }

    fn resolve_enemies(&mut self) {
        for enemy in self.enemies.iter_mut().filter(|e| e.alive()) {
            if circles_touch(enemy.pos, enemy.radius(), self.player, PLAYER_SIZE / 2.0) {
                enemy.gone = true;
                self.health = self.health.saturating_sub(CONTACT_DAMAGE);
                debug!(health = self.health, "ship hit");
            } else if enemy.pos.y > FIELD.height {
                enemy.gone = true;
                self.escaped += 1;
                self.board.miss();
            }
        }
    }
}

impl ArcadeGame for ShooterGame {
    type Input = ShipInput;

    fn tracking(&self) -> Tracking {
        Tracking::Hands { anchor: HandLandmark::IndexTip }
    }

    fn controls(&self) -> &'static [&'static str] {
        &[
            "Point with your index finger to fly the ship",
            "Close your fist to fire",
            "Ten aliens slipping past, or an empty health bar, ends the run",
        ]
    }

    fn reset(&mut self) {
        self.player = Vec2::new(FIELD.width / 2.0, FIELD.height - 150.0);
        self.cooldown = 0;
        self.health = MAX_HEALTH;
        self.bullets.clear();
        self.enemies.clear();
        self.particles.clear();
        self.board = Scoreboard::new(0);
        self.escaped = 0;
        self.kills = 0;
        self.shots = 0;
        self.stars = (0..STARS)
            .map(|_| Star {
                pos: Vec2::new(self.rng.random_range(0.0..FIELD.width), self.rng.random_range(0.0..FIELD.height)),
                speed: self.rng.random_range(0.5..2.0),
            })
            .collect();
    }

    fn classify(&self, frame: &DetectionFrame) -> ShipInput {
        if frame.hands.is_empty() {
            return ShipInput::default();
        }
        let sum = frame.hands.iter().fold(Vec2::ZERO, |acc, h| {
            let tip = h.kp(HandLandmark::IndexTip);
            acc + Vec2::new(tip.x * FIELD.width, tip.y * FIELD.height)
        });
        ShipInput { aim: Some(sum * (1.0 / frame.hands.len() as f32)), firing: frame.hands.iter().any(is_fist) }
    }

    fn on_tick(&mut self, input: &ShipInput, tick: &Tick) -> Option<Outcome> {
        self.steer(input.aim);
        self.cooldown = self.cooldown.saturating_sub(1);
        if input.firing {
            self.fire();
        }
        if tick.every(ENEMY_EVERY) {
            self.spawn_enemy();
        }
        for star in &mut self.stars {
            star.pos.y += star.speed;
            if star.pos.y > FIELD.height {
                star.pos = Vec2::new(self.rng.random_range(0.0..FIELD.width), 0.0);
            }
        }

        update_all(&mut self.bullets);
        update_all(&mut self.enemies);
        update_all(&mut self.particles);
        self.resolve_shots();
        self.resolve_enemies();

        if self.escaped >= MAX_ESCAPED || self.health == 0 {
            return Some(Outcome::GameOver);
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
                stat("HEALTH", format!("{}%", self.health)),
                stat("ESCAPED", format!("{}/{}", self.escaped, MAX_ESCAPED)),
            ],
        );
        draw_field(frame, body, FIELD, "SPACE SHOOTER", |p| {
            let stars: Vec<(f32, f32)> = self.stars.iter().map(|s| (s.pos.x, s.pos.y)).collect();
            p.points(&stars, Color::DarkGray);
            for particle in &self.particles {
                p.circle(particle.pos.x, particle.pos.y, particle.current_size(), fade(particle.color, particle.life.fraction()));
            }
            for enemy in self.enemies.iter().filter(|e| e.alive()) {
                p.disc(enemy.pos.x, enemy.pos.y, enemy.radius(), enemy.color);
            }
            for bullet in self.bullets.iter().filter(|b| b.alive()) {
                p.disc(bullet.pos.x, bullet.pos.y, BULLET_RADIUS, Color::Yellow);
            }
            let (x, y, h) = (self.player.x, self.player.y, PLAYER_SIZE / 2.0);
            p.line(x, y - h, x - h, y + h, Color::Cyan);
            p.line(x - h, y + h, x + h, y + h, Color::Cyan);
            p.line(x + h, y + h, x, y - h, Color::Cyan);
        });
    }

    fn summary(&self) -> Summary {
        let accuracy = if self.shots == 0 { 0.0 } else { self.kills as f32 * 200.0 / self.shots as f32 };
        Summary::default()
            .line(format!("Score: {}", self.board.score))
            .line(format!("Aliens destroyed: {}  Escaped: {}", self.kills, self.escaped))
            .line(format!("Best kill streak: {}", self.board.best_combo))
            .line(format!("Shot accuracy: {:.0}%", accuracy.min(100.0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game() -> ShooterGame {
        ShooterGame::new(&ArcadeConfig { seed: Some(13), ..Default::default() })
    }

    fn tick(index: u64) -> Tick {
        Tick { index, dt: 1.0 / 60.0, fresh: true }
    }

    fn enemy_at(pos: Vec2) -> Enemy {
        Enemy { pos, size: 50.0, speed: 0.0, hp: ENEMY_HP, color: Color::Red, gone: false }
    }

    #[test]
    fn ship_eases_toward_the_finger() {
        let mut g = game();
        let start = g.player;
        let target = Vec2::new(start.x + 100.0, start.y);
        g.steer(Some(target));
        assert!((g.player.x - (start.x + 30.0)).abs() < 1e-3);
        g.steer(Some(Vec2::new(0.0, 0.0)));
        assert!(g.player.x >= 50.0 && g.player.y >= 200.0);
    }

    #[test]
    fn fist_fires_on_cooldown() {
        let mut g = game();
        let input = ShipInput { aim: None, firing: true };
        for i in 1..=16 {
            g.on_tick(&input, &tick(i));
        }
        assert_eq!(g.shots, 2);
    }

    #[test]
    fn two_hits_destroy_an_enemy() {
        let mut g = game();
        let at = Vec2::new(400.0, 300.0);
        g.enemies.push(enemy_at(at));
        g.bullets.push(Bullet { pos: at, spent: false });
        g.resolve_shots();
        assert_eq!(g.enemies[0].hp, 1);
        assert_eq!(g.board.score, 0);
        g.bullets.push(Bullet { pos: at, spent: false });
        g.resolve_shots();
        assert_eq!(g.board.score, KILL_POINTS);
        assert_eq!(g.particles.len(), EXPLOSION_PARTICLES);
        assert!(!g.enemies[0].alive());
    }

    #[test]
    fn ramming_costs_health() {
        let mut g = game();
        g.enemies.push(enemy_at(g.player));
        g.resolve_enemies();
        assert_eq!(g.health, MAX_HEALTH - CONTACT_DAMAGE);
        assert!(!g.enemies[0].alive());
    }

    #[test]
    fn tenth_escape_is_game_over() {
        let mut g = game();
        g.escaped = MAX_ESCAPED - 1;
        g.enemies.push(enemy_at(Vec2::new(100.0, FIELD.height + 10.0)));
        assert_eq!(g.on_tick(&ShipInput::default(), &tick(1)), Some(Outcome::GameOver));
    }
}
