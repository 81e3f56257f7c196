/// Synthetic detections for the pointer emulator and for tests.
///
/// Shapes are laid out so the heuristics in `hand` and `pose` read them the same
/// way they read a real detector.
use crate::core::geometry::Vec2;
use crate::core::landmarks::{
    DetectedObject, Face, FaceLandmark, Hand, HandLandmark, Keypoint, Pose, PoseLandmark as P, FACE_POINTS, HAND_POINTS,
    POSE_POINTS,
};
use crate::gesture::hand::HandSign;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandPreset {
    Point,
    OpenHand,
    Fist,
    Sign(HandSign),
}

impl HandPreset {
    pub const ALL: [HandPreset; 7] = [
        HandPreset::Point,
        HandPreset::OpenHand,
        HandPreset::Fist,
        HandPreset::Sign(HandSign::Peace),
        HandPreset::Sign(HandSign::Rock),
        HandPreset::Sign(HandSign::Ok),
        HandPreset::Sign(HandSign::ThumbsUp),
    ];

    pub fn name(&self) -> &'static str {
        match self {
            HandPreset::Point => "POINT",
            HandPreset::OpenHand => "OPEN HAND",
            HandPreset::Fist => "FIST",
            HandPreset::Sign(sign) => sign.name(),
        }
    }

    /// Extended flags: thumb, index, middle, ring, pinky.
    fn extended(&self) -> [bool; 5] {
        match self {
            HandPreset::Point => [false, true, false, false, false],
            HandPreset::OpenHand | HandPreset::Sign(HandSign::OpenHand) => [true; 5],
            HandPreset::Fist => [false; 5],
            HandPreset::Sign(HandSign::Peace) => [false, true, true, false, false],
            HandPreset::Sign(HandSign::Rock) => [false, true, false, false, true],
            HandPreset::Sign(HandSign::Ok) => [false, false, true, true, true],
            HandPreset::Sign(HandSign::ThumbsUp) => [true, false, false, false, false],
        }
    }
}

/// Builds a 21-point hand of size `scale`, translated so `anchor` lands on `at`.
pub fn hand(preset: HandPreset, anchor: HandLandmark, at: Vec2, scale: f32) -> Hand {
    let ext = preset.extended();
    // Wrist at the origin, fingers pointing up (negative y), thumb to the left.
    let mut rel = vec![Vec2::ZERO; HAND_POINTS];
    rel[1] = Vec2::new(-0.1, -0.05);
    if ext[0] {
        rel[2] = Vec2::new(-0.2, -0.12);
        rel[3] = Vec2::new(-0.28, -0.2);
        rel[4] = Vec2::new(-0.36, -0.3);
    } else {
        rel[2] = Vec2::new(-0.18, -0.12);
        rel[3] = Vec2::new(-0.2, -0.2);
        rel[4] = Vec2::new(-0.12, -0.22);
    }
    for (finger, base_x) in [-0.1f32, 0.0, 0.1, 0.2].into_iter().enumerate() {
        let first = 5 + finger * 4;
        let ys = if ext[finger + 1] { [-0.3, -0.5, -0.65, -0.8] } else { [-0.3, -0.5, -0.42, -0.36] };
        for (k, y) in ys.into_iter().enumerate() {
            rel[first + k] = Vec2::new(base_x, y);
        }
    }
    if preset == HandPreset::Sign(HandSign::Ok) {
        rel[4] = rel[8] + Vec2::new(0.01, 0.01);
    }
    let origin = at - rel[anchor as usize] * scale;
    Hand::new(rel.into_iter().map(|p| to_kp(origin + p * scale)).collect())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PosePreset {
    Neutral,
    ArmsUp,
    Crouch,
    TPose,
    YPose,
    Squat,
    Warrior,
    Star,
    Flamingo,
    Airplane,
    Dab,
}

impl PosePreset {
    pub const ALL: [PosePreset; 11] = [
        PosePreset::Neutral,
        PosePreset::ArmsUp,
        PosePreset::Crouch,
        PosePreset::TPose,
        PosePreset::YPose,
        PosePreset::Squat,
        PosePreset::Warrior,
        PosePreset::Star,
        PosePreset::Flamingo,
        PosePreset::Airplane,
        PosePreset::Dab,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PosePreset::Neutral => "STANDING",
            PosePreset::ArmsUp => "ARMS UP",
            PosePreset::Crouch => "CROUCH",
            PosePreset::TPose => "T-POSE",
            PosePreset::YPose => "Y-POSE",
            PosePreset::Squat => "SQUAT",
            PosePreset::Warrior => "WARRIOR",
            PosePreset::Star => "STAR",
            PosePreset::Flamingo => "FLAMINGO",
            PosePreset::Airplane => "AIRPLANE",
            PosePreset::Dab => "DAB",
        }
    }
}

/// A standing figure facing the camera; the subject's left is on the image right.
fn standing() -> Vec<Vec2> {
    let mut p = vec![Vec2::ZERO; POSE_POINTS];
    let mut set = |id: P, x: f32, y: f32| p[id as usize] = Vec2::new(x, y);
    set(P::Nose, 0.5, 0.2);
    set(P::LeftEyeInner, 0.51, 0.18);
    set(P::LeftEye, 0.52, 0.18);
    set(P::LeftEyeOuter, 0.53, 0.18);
    set(P::RightEyeInner, 0.49, 0.18);
    set(P::RightEye, 0.48, 0.18);
    set(P::RightEyeOuter, 0.47, 0.18);
    set(P::LeftEar, 0.55, 0.19);
    set(P::RightEar, 0.45, 0.19);
    set(P::MouthLeft, 0.52, 0.23);
    set(P::MouthRight, 0.48, 0.23);
    set(P::LeftShoulder, 0.6, 0.35);
    set(P::RightShoulder, 0.4, 0.35);
    set(P::LeftElbow, 0.62, 0.5);
    set(P::RightElbow, 0.38, 0.5);
    set(P::LeftWrist, 0.63, 0.62);
    set(P::RightWrist, 0.37, 0.62);
    set(P::LeftHip, 0.55, 0.6);
    set(P::RightHip, 0.45, 0.6);
    set(P::LeftKnee, 0.55, 0.78);
    set(P::RightKnee, 0.45, 0.78);
    set(P::LeftAnkle, 0.55, 0.95);
    set(P::RightAnkle, 0.45, 0.95);
    p
}

/// Hand and foot points follow their wrist or ankle.
fn attach_extremities(p: &mut [Vec2]) {
    let lw = p[P::LeftWrist as usize];
    let rw = p[P::RightWrist as usize];
    let la = p[P::LeftAnkle as usize];
    let ra = p[P::RightAnkle as usize];
    p[P::LeftPinky as usize] = lw + Vec2::new(0.01, 0.03);
    p[P::LeftIndex as usize] = lw + Vec2::new(0.0, 0.035);
    p[P::LeftThumb as usize] = lw + Vec2::new(-0.01, 0.025);
    p[P::RightPinky as usize] = rw + Vec2::new(-0.01, 0.03);
    p[P::RightIndex as usize] = rw + Vec2::new(0.0, 0.035);
    p[P::RightThumb as usize] = rw + Vec2::new(0.01, 0.025);
    p[P::LeftHeel as usize] = la + Vec2::new(0.0, 0.01);
    p[P::RightHeel as usize] = ra + Vec2::new(0.0, 0.01);
    p[P::LeftFootIndex as usize] = la + Vec2::new(0.02, 0.02);
    p[P::RightFootIndex as usize] = ra + Vec2::new(-0.02, 0.02);
}

pub fn pose(preset: PosePreset) -> Pose {
    let mut p = standing();
    let mut set = |id: P, x: f32, y: f32| p[id as usize] = Vec2::new(x, y);
    match preset {
        PosePreset::Neutral => {}
        PosePreset::ArmsUp => {
            set(P::LeftElbow, 0.62, 0.22);
            set(P::RightElbow, 0.38, 0.22);
            set(P::LeftWrist, 0.63, 0.08);
            set(P::RightWrist, 0.37, 0.08);
        }
        PosePreset::Crouch | PosePreset::Airplane => {}
        PosePreset::TPose => {
            set(P::LeftElbow, 0.75, 0.35);
            set(P::RightElbow, 0.25, 0.35);
            set(P::LeftWrist, 0.9, 0.35);
            set(P::RightWrist, 0.1, 0.35);
        }
        PosePreset::YPose => {
            set(P::LeftElbow, 0.68, 0.22);
            set(P::RightElbow, 0.32, 0.22);
            set(P::LeftWrist, 0.75, 0.08);
            set(P::RightWrist, 0.25, 0.08);
        }
        PosePreset::Squat => {
            set(P::LeftHip, 0.55, 0.7);
            set(P::RightHip, 0.45, 0.7);
            set(P::LeftKnee, 0.65, 0.8);
            set(P::RightKnee, 0.35, 0.8);
        }
        PosePreset::Warrior => {
            set(P::LeftKnee, 0.6, 0.72);
            set(P::LeftAnkle, 0.65, 0.78);
        }
        PosePreset::Star => {
            set(P::LeftElbow, 0.76, 0.3);
            set(P::RightElbow, 0.24, 0.3);
            set(P::LeftWrist, 0.92, 0.25);
            set(P::RightWrist, 0.08, 0.25);
            set(P::LeftKnee, 0.64, 0.78);
            set(P::RightKnee, 0.36, 0.78);
            set(P::LeftAnkle, 0.72, 0.95);
            set(P::RightAnkle, 0.28, 0.95);
        }
        PosePreset::Flamingo => {
            set(P::LeftKnee, 0.6, 0.65);
            set(P::LeftAnkle, 0.55, 0.72);
        }
        PosePreset::Dab => {
            set(P::LeftElbow, 0.48, 0.3);
            set(P::LeftWrist, 0.45, 0.22);
            set(P::RightElbow, 0.3, 0.25);
            set(P::RightWrist, 0.2, 0.15);
        }
    }
    match preset {
        // Bent over: head and arms drop below hip level minus the duck margin.
        PosePreset::Crouch => {
            for point in &mut p[..=P::RightThumb as usize] {
                point.y += 0.38;
            }
        }
        // Leaning forward with arms level.
        PosePreset::Airplane => {
            for point in &mut p[..=P::MouthRight as usize] {
                point.y += 0.15;
            }
            for (id, x) in [(P::LeftShoulder, 0.6), (P::RightShoulder, 0.4), (P::LeftElbow, 0.75), (P::RightElbow, 0.25), (P::LeftWrist, 0.9), (P::RightWrist, 0.1)] {
                p[id as usize] = Vec2::new(x, 0.42);
            }
        }
        _ => {}
    }
    attach_extremities(&mut p);
    Pose { landmarks: p.into_iter().map(to_kp).collect() }
}

/// A face mesh with the nose tip on `at`.
pub fn face(at: Vec2) -> Face {
    let mut landmarks = vec![to_kp(at); FACE_POINTS];
    landmarks[FaceLandmark::EyeLower as usize] = to_kp(at + Vec2::new(0.03, -0.04));
    Face { landmarks }
}

/// An object held at `at`.
pub fn object(label: &str, at: Vec2) -> DetectedObject {
    let half = 0.12;
    DetectedObject {
        label: label.to_string(),
        confidence: 0.9,
        bbox: [at.x - half, at.y - half, at.x + half, at.y + half],
    }
}

fn to_kp(p: Vec2) -> Keypoint {
    Keypoint { x: p.x, y: p.y, z: 0.0, visibility: Some(1.0) }
}
