use std::ops::{Add, AddAssign, Mul, Sub};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f32 {
        self.x.hypot(self.y)
    }

    pub fn distance(self, other: Vec2) -> f32 {
        (self - other).length()
    }

    pub fn distance_sq(self, other: Vec2) -> f32 {
        let d = self - other;
        d.x * d.x + d.y * d.y
    }

    /// Moves `factor` of the way toward `target`.
    pub fn lerp(self, target: Vec2, factor: f32) -> Vec2 {
        self + (target - self) * factor
    }

    pub fn midpoint(self, other: Vec2) -> Vec2 {
        self.lerp(other, 0.5)
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

/// Axis-aligned rectangle, `(x, y)` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn centered(center: Vec2, w: f32, h: f32) -> Self {
        Self::new(center.x - w / 2.0, center.y - h / 2.0, w, h)
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Strict overlap: rectangles that only share an edge do not collide.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right() && other.x < self.right() && self.y < other.bottom() && other.y < self.bottom()
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }
}

/// Circles touch when the center distance is at most the sum of the radii.
pub fn circles_touch(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    let reach = ra + rb;
    a.distance_sq(b) <= reach * reach
}

/// Circle against rectangle, using the rectangle point closest to the center.
pub fn circle_hits_rect(center: Vec2, radius: f32, rect: &Rect) -> bool {
    let closest = Vec2::new(center.x.clamp(rect.x, rect.right()), center.y.clamp(rect.y, rect.bottom()));
    center.distance_sq(closest) <= radius * radius
}

/// Angle at `b` formed by `a-b-c`, in degrees within 0..=180.
pub fn joint_angle(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    let raw = ((c.y - b.y).atan2(c.x - b.x) - (a.y - b.y).atan2(a.x - b.x)).to_degrees().abs();
    if raw > 180.0 {
        360.0 - raw
    } else {
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circles_at_exact_reach_touch() {
        assert!(circles_touch(Vec2::new(0.0, 0.0), 1.0, Vec2::new(3.0, 4.0), 4.0));
    }

    #[test]
    fn circles_beyond_reach_do_not_touch() {
        assert!(!circles_touch(Vec2::new(0.0, 0.0), 1.0, Vec2::new(3.0, 4.01), 4.0));
        assert!(!circles_touch(Vec2::new(0.0, 0.0), 2.0, Vec2::new(10.0, 0.0), 7.5));
    }

    #[test]
    fn rects_sharing_an_edge_do_not_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(!a.overlaps(&Rect::new(10.0, 0.0, 5.0, 5.0)));
        assert!(a.overlaps(&Rect::new(9.0, 9.0, 5.0, 5.0)));
    }

    #[test]
    fn circle_rect_contact() {
        let r = Rect::new(10.0, 10.0, 20.0, 10.0);
        assert!(circle_hits_rect(Vec2::new(5.0, 15.0), 5.0, &r));
        assert!(!circle_hits_rect(Vec2::new(4.0, 15.0), 5.0, &r));
    }

    #[test]
    fn joint_angles() {
        let straight = joint_angle(Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(2.0, 0.0));
        assert!((straight - 180.0).abs() < 1e-3);
        let right = joint_angle(Vec2::new(0.0, 1.0), Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0));
        assert!((right - 90.0).abs() < 1e-3);
    }
}
