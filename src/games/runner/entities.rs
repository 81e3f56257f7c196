use crate::core::geometry::{circles_touch, Rect, Vec2};

pub const GROUND_Y: f32 = 700.0;
pub const PLAYER_SIZE: f32 = 60.0;
pub const PLAYER_X: f32 = 200.0;
const GRAVITY: f32 = 1.5;
const JUMP_FORCE: f32 = -22.0;
const JUMP_COOLDOWN: u32 = 15;
const PICKUP_SLACK: f32 = 10.0;
pub const COIN_RADIUS: f32 = 15.0;
pub const POWERUP_RADIUS: f32 = 20.0;

pub const SHIELD_TICKS: u32 = 300;
pub const MAGNET_TICKS: u32 = 360;
pub const SLOW_TICKS: u32 = 240;

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub y: f32,
    pub vy: f32,
    pub jumping: bool,
    pub ducking: bool,
    pub cooldown: u32,
    pub shield: u32,
    pub magnet: u32,
    pub slow: u32,
}

impl Default for Player {
    fn default() -> Self {
        Self { y: GROUND_Y - PLAYER_SIZE, vy: 0.0, jumping: false, ducking: false, cooldown: 0, shield: 0, magnet: 0, slow: 0 }
    }
}

impl Player {
    pub fn update(&mut self, jump: bool, duck: bool) {
        self.cooldown = self.cooldown.saturating_sub(1);
        if jump && !self.jumping && !self.ducking && self.cooldown == 0 {
            self.vy = JUMP_FORCE;
            self.jumping = true;
            self.cooldown = JUMP_COOLDOWN;
        }
        self.ducking = duck && !self.jumping;

        self.vy += GRAVITY;
        self.y += self.vy;
        if self.y >= GROUND_Y - PLAYER_SIZE {
            self.y = GROUND_Y - PLAYER_SIZE;
            self.vy = 0.0;
            self.jumping = false;
        }

        self.shield = self.shield.saturating_sub(1);
        self.magnet = self.magnet.saturating_sub(1);
        self.slow = self.slow.saturating_sub(1);
    }

    /// Ducking keeps only the lower half of the body.
    pub fn hitbox(&self) -> Rect {
        if self.ducking {
            Rect::new(PLAYER_X, self.y + PLAYER_SIZE / 2.0, PLAYER_SIZE, PLAYER_SIZE / 2.0)
        } else {
            Rect::new(PLAYER_X, self.y, PLAYER_SIZE, PLAYER_SIZE)
        }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(PLAYER_X + PLAYER_SIZE / 2.0, self.y + PLAYER_SIZE / 2.0)
    }

    /// Whether a pickup of `radius` at `at` is within reach.
    pub fn reaches(&self, at: Vec2, radius: f32) -> bool {
        circles_touch(self.center(), PLAYER_SIZE / 2.0 + PICKUP_SLACK, at, radius)
    }

    pub fn speed_factor(&self) -> f32 {
        if self.slow > 0 {
            0.5
        } else {
            1.0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObstacleKind {
    Ground,
    Air,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Obstacle {
    pub rect: Rect,
    pub kind: ObstacleKind,
    /// Scroll speed fixed at spawn time.
    pub speed: f32,
    pub passed: bool,
}

impl Obstacle {
    pub fn new(x: f32, kind: ObstacleKind, width: f32, height: f32, speed: f32) -> Self {
        let (y, h) = match kind {
            ObstacleKind::Ground => (GROUND_Y - height, height),
            ObstacleKind::Air => (GROUND_Y - 200.0, 50.0),
        };
        Self { rect: Rect::new(x, y, width, h), kind, speed, passed: false }
    }

    pub fn advance(&mut self, factor: f32) {
        self.rect.x -= self.speed * factor;
    }

    pub fn on_screen(&self) -> bool {
        self.rect.right() > 0.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Coin {
    pub pos: Vec2,
}

impl Coin {
    /// Scrolls left; inside the magnet range it also drifts 15% of the way to the player.
    pub fn advance(&mut self, dx: f32, magnet_target: Option<Vec2>) {
        self.pos.x -= dx;
        if let Some(target) = magnet_target {
            self.pos = self.pos.lerp(target, 0.15);
        }
    }

    pub fn on_screen(&self) -> bool {
        self.pos.x > -COIN_RADIUS * 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerKind {
    Shield,
    Magnet,
    Slow,
}

impl PowerKind {
    pub const ALL: [PowerKind; 3] = [PowerKind::Shield, PowerKind::Magnet, PowerKind::Slow];

    pub fn label(self) -> &'static str {
        match self {
            PowerKind::Shield => "S",
            PowerKind::Magnet => "M",
            PowerKind::Slow => "T",
        }
    }

    pub fn apply(self, player: &mut Player) {
        match self {
            PowerKind::Shield => player.shield = SHIELD_TICKS,
            PowerKind::Magnet => player.magnet = MAGNET_TICKS,
            PowerKind::Slow => player.slow = SLOW_TICKS,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PowerUp {
    pub pos: Vec2,
    pub kind: PowerKind,
}

impl PowerUp {
    pub fn on_screen(&self) -> bool {
        self.pos.x > -POWERUP_RADIUS * 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jump_lands_back_on_the_ground() {
        let mut p = Player::default();
        p.update(true, false);
        assert!(p.jumping);
        assert!(p.y < GROUND_Y - PLAYER_SIZE);
        for _ in 0..60 {
            p.update(false, false);
        }
        assert!(!p.jumping);
        assert_eq!(p.y, GROUND_Y - PLAYER_SIZE);
    }

    #[test]
    fn cannot_duck_mid_air_and_ducking_halves_the_hitbox() {
        let mut p = Player::default();
        p.update(false, true);
        assert!(p.ducking);
        assert_eq!(p.hitbox().h, PLAYER_SIZE / 2.0);
        p.update(true, true);
        assert!(!p.jumping);

        let mut p = Player::default();
        p.update(true, false);
        p.update(false, true);
        assert!(!p.ducking);
    }

    #[test]
    fn cooldown_blocks_immediate_rejump() {
        let mut p = Player::default();
        p.update(true, false);
        p.jumping = false;
        p.update(true, false);
        assert_eq!(p.vy, -22.0 + 1.5 + 1.5);
    }

    #[test]
    fn magnet_pulls_coins() {
        let mut coin = Coin { pos: Vec2::new(400.0, 600.0) };
        coin.advance(0.0, Some(Vec2::new(300.0, 600.0)));
        assert!((coin.pos.x - 385.0).abs() < 1e-3);
        assert_eq!(coin.pos.y, 600.0);
    }
}
