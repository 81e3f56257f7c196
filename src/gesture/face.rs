/// Head-driven controls read from the face mesh.
use crate::core::config::FaceThresholds;
use crate::core::geometry::Vec2;
use crate::core::landmarks::{Face, FaceLandmark};

/// Lane 0..=2 from the nose's horizontal position.
pub fn lane(face: &Face, th: &FaceThresholds) -> usize {
    let x = face.kp(FaceLandmark::NoseTip).x;
    if x < th.lane_left {
        0
    } else if x > th.lane_right {
        2
    } else {
        1
    }
}

pub fn eye_height(face: &Face) -> f32 {
    face.kp(FaceLandmark::EyeLower).y
}

pub fn nose(face: &Face) -> Vec2 {
    face.kp(FaceLandmark::NoseTip).xy()
}

/// Learns the resting nose position, then turns head offsets into motion.
#[derive(Debug, Clone)]
pub struct NoseCalibration {
    samples: Vec<Vec2>,
    center: Option<Vec2>,
    frames: usize,
}

impl NoseCalibration {
    pub fn new(frames: usize) -> Self {
        Self { samples: Vec::with_capacity(frames), center: None, frames: frames.max(1) }
    }

    pub fn reset(&mut self) {
        self.samples.clear();
        self.center = None;
    }

    pub fn is_calibrated(&self) -> bool {
        self.center.is_some()
    }

    /// 0.0..=1.0 while collecting samples.
    pub fn progress(&self) -> f32 {
        if self.center.is_some() {
            1.0
        } else {
            self.samples.len() as f32 / self.frames as f32
        }
    }

    /// Feeds one nose position in pixels. Returns the motion once calibrated.
    ///
    /// Offsets inside the deadzone are ignored and the deadzone is taken off
    /// larger ones. Motion is scaled by the sensitivity with y inverted.
    pub fn update(&mut self, nose_px: Vec2, th: &FaceThresholds) -> Option<Vec2> {
        let Some(center) = self.center else {
            self.samples.push(nose_px);
            if self.samples.len() >= self.frames {
                let sum = self.samples.iter().fold(Vec2::ZERO, |acc, p| acc + *p);
                self.center = Some(sum * (1.0 / self.samples.len() as f32));
            }
            return None;
        };
        let d = nose_px - center;
        let axis = |v: f32| if v.abs() > th.deadzone { (v - th.deadzone * v.signum()) * th.sensitivity } else { 0.0 };
        Some(Vec2::new(axis(d.x), -axis(d.y)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::synthetic::face;

    #[test]
    fn lanes_split_at_thresholds() {
        let th = FaceThresholds::default();
        assert_eq!(lane(&face(Vec2::new(0.2, 0.5)), &th), 0);
        assert_eq!(lane(&face(Vec2::new(0.5, 0.5)), &th), 1);
        assert_eq!(lane(&face(Vec2::new(0.8, 0.5)), &th), 2);
    }

    #[test]
    fn calibration_then_deadzone_and_inversion() {
        let th = FaceThresholds { calibration_frames: 3, ..Default::default() };
        let mut cal = NoseCalibration::new(th.calibration_frames);
        for _ in 0..3 {
            assert_eq!(cal.update(Vec2::new(320.0, 240.0), &th), None);
        }
        assert!(cal.is_calibrated());
        assert_eq!(cal.update(Vec2::new(340.0, 250.0), &th), Some(Vec2::ZERO));
        let moved = cal.update(Vec2::new(420.0, 140.0), &th).unwrap();
        assert!((moved.x - 21.0).abs() < 1e-3);
        assert!((moved.y - 21.0).abs() < 1e-3);
        cal.reset();
        assert!(!cal.is_calibrated());
    }
}
