/// Body-pose heuristics on MediaPipe pose landmarks.
use crate::core::config::PoseThresholds;
use crate::core::geometry::{joint_angle, Vec2};
use crate::core::landmarks::{Pose, PoseLandmark as P};

fn at(pose: &Pose, id: P) -> Vec2 {
    pose.kp(id).xy()
}

/// Angle at `b` in degrees.
pub fn angle_at(pose: &Pose, a: P, b: P, c: P) -> f32 {
    joint_angle(at(pose, a), at(pose, b), at(pose, c))
}

fn mean_hip_y(pose: &Pose) -> f32 {
    (pose.kp(P::LeftHip).y + pose.kp(P::RightHip).y) / 2.0
}

/// Poses called out by the Simon game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyPose {
    T,
    Y,
    Squat,
    Warrior,
    Star,
    Flamingo,
    Airplane,
    Dab,
}

impl BodyPose {
    pub const ALL: [BodyPose; 8] = [
        BodyPose::T,
        BodyPose::Y,
        BodyPose::Squat,
        BodyPose::Warrior,
        BodyPose::Star,
        BodyPose::Flamingo,
        BodyPose::Airplane,
        BodyPose::Dab,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BodyPose::T => "T-POSE",
            BodyPose::Y => "Y-POSE",
            BodyPose::Squat => "SQUAT",
            BodyPose::Warrior => "WARRIOR",
            BodyPose::Star => "STAR",
            BodyPose::Flamingo => "FLAMINGO",
            BodyPose::Airplane => "AIRPLANE",
            BodyPose::Dab => "DAB",
        }
    }

    pub fn hint(self) -> &'static str {
        match self {
            BodyPose::T => "Arms straight out to the sides",
            BodyPose::Y => "Both hands above your head",
            BodyPose::Squat => "Bend your knees",
            BodyPose::Warrior => "Lift one foot, hands below the waist",
            BodyPose::Star => "Spread arms and legs wide",
            BodyPose::Flamingo => "Stand on one leg",
            BodyPose::Airplane => "Lean forward with arms level",
            BodyPose::Dab => "Hide your face in one elbow",
        }
    }
}

pub fn matches(pose: &Pose, target: BodyPose, th: &PoseThresholds) -> bool {
    match target {
        BodyPose::T => {
            let left = angle_at(pose, P::LeftWrist, P::LeftElbow, P::LeftShoulder);
            let right = angle_at(pose, P::RightWrist, P::RightElbow, P::RightShoulder);
            left > th.t_elbow_angle
                && right > th.t_elbow_angle
                && pose.kp(P::LeftWrist).y < pose.kp(P::LeftElbow).y + 0.1
        }
        BodyPose::Y => {
            let nose = pose.kp(P::Nose).y;
            pose.kp(P::LeftWrist).y < nose && pose.kp(P::RightWrist).y < nose
        }
        BodyPose::Squat => angle_at(pose, P::LeftHip, P::LeftKnee, P::LeftAnkle) < th.squat_knee_angle,
        BodyPose::Warrior => {
            (pose.kp(P::LeftAnkle).y - pose.kp(P::RightAnkle).y).abs() > th.warrior_ankle_gap
                && pose.kp(P::LeftWrist).y < 0.7
                && pose.kp(P::RightWrist).y < 0.7
        }
        BodyPose::Star => {
            (pose.kp(P::LeftAnkle).x - pose.kp(P::RightAnkle).x).abs() > th.star_leg_spread
                && (pose.kp(P::LeftWrist).x - pose.kp(P::RightWrist).x).abs() > th.star_arm_spread
        }
        BodyPose::Flamingo => {
            (pose.kp(P::LeftAnkle).y - pose.kp(P::RightAnkle).y).abs() > th.flamingo_ankle_gap
                || (pose.kp(P::LeftKnee).y - pose.kp(P::RightKnee).y).abs() > th.flamingo_knee_gap
        }
        BodyPose::Airplane => {
            let level = |wrist: P, shoulder: P| (pose.kp(wrist).y - pose.kp(shoulder).y).abs() < th.airplane_arm_level;
            level(P::LeftWrist, P::LeftShoulder)
                && level(P::RightWrist, P::RightShoulder)
                && mean_hip_y(pose) - pose.kp(P::Nose).y < th.airplane_torso
        }
        BodyPose::Dab => at(pose, P::LeftWrist).distance(at(pose, P::Nose)) < th.dab_reach,
    }
}

/// Every Simon pose the body currently satisfies.
pub fn matching_poses(pose: &Pose, th: &PoseThresholds) -> Vec<BodyPose> {
    BodyPose::ALL.into_iter().filter(|target| matches(pose, *target, th)).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JumpDuck {
    pub jump: bool,
    pub duck: bool,
}

/// Jump with both wrists raised above the shoulders, duck with the head dropped toward the hips.
pub fn jump_duck(pose: &Pose, th: &PoseThresholds) -> JumpDuck {
    let raised = |wrist: P, shoulder: P| pose.kp(wrist).y < pose.kp(shoulder).y - th.jump_margin;
    JumpDuck {
        jump: raised(P::LeftWrist, P::LeftShoulder) && raised(P::RightWrist, P::RightShoulder),
        duck: pose.kp(P::Nose).y > mean_hip_y(pose) - th.duck_margin,
    }
}

/// Joints compared when matching dance poses.
pub const DANCE_JOINTS: [P; 12] = [
    P::LeftShoulder,
    P::RightShoulder,
    P::LeftElbow,
    P::RightElbow,
    P::LeftWrist,
    P::RightWrist,
    P::LeftHip,
    P::RightHip,
    P::LeftKnee,
    P::RightKnee,
    P::LeftAnkle,
    P::RightAnkle,
];

/// Joint positions relative to the torso center, in shoulder widths.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedPose {
    points: Vec<(P, Vec2)>,
}

impl NormalizedPose {
    pub fn from_pose(pose: &Pose, joints: &[P]) -> Self {
        let torso = [P::LeftShoulder, P::RightShoulder, P::LeftHip, P::RightHip];
        let center = torso.iter().fold(Vec2::ZERO, |acc, id| acc + at(pose, *id)) * 0.25;
        let shoulders = at(pose, P::LeftShoulder).distance(at(pose, P::RightShoulder));
        let scale = if shoulders > 0.0 { shoulders } else { 0.1 };
        let points = joints.iter().map(|id| (*id, (at(pose, *id) - center) * (1.0 / scale))).collect();
        Self { points }
    }

    /// Mean distance over joints present in both poses; `None` when nothing overlaps.
    pub fn distance(&self, other: &NormalizedPose) -> Option<f32> {
        let pairs: Vec<f32> = self
            .points
            .iter()
            .filter_map(|(id, p)| other.points.iter().find(|(oid, _)| oid == id).map(|(_, q)| p.distance(*q)))
            .collect();
        if pairs.is_empty() {
            None
        } else {
            Some(pairs.iter().sum::<f32>() / pairs.len() as f32)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::synthetic::{pose, PosePreset};

    fn th() -> PoseThresholds {
        PoseThresholds::default()
    }

    #[test]
    fn standing_matches_nothing() {
        let p = pose(PosePreset::Neutral);
        assert!(matching_poses(&p, &th()).is_empty());
        assert_eq!(jump_duck(&p, &th()), JumpDuck::default());
    }

    #[test]
    fn presets_satisfy_their_pose() {
        let cases = [
            (PosePreset::TPose, BodyPose::T),
            (PosePreset::YPose, BodyPose::Y),
            (PosePreset::Squat, BodyPose::Squat),
            (PosePreset::Warrior, BodyPose::Warrior),
            (PosePreset::Star, BodyPose::Star),
            (PosePreset::Flamingo, BodyPose::Flamingo),
            (PosePreset::Airplane, BodyPose::Airplane),
            (PosePreset::Dab, BodyPose::Dab),
        ];
        for (preset, expected) in cases {
            assert!(matches(&pose(preset), expected, &th()), "{preset:?} should read as {expected:?}");
        }
    }

    #[test]
    fn arms_up_jumps_and_crouch_ducks() {
        assert_eq!(jump_duck(&pose(PosePreset::ArmsUp), &th()), JumpDuck { jump: true, duck: false });
        assert_eq!(jump_duck(&pose(PosePreset::Crouch), &th()), JumpDuck { jump: false, duck: true });
    }

    #[test]
    fn normalized_distance_ignores_position_and_scale() {
        let base = pose(PosePreset::Star);
        let mut moved = base.clone();
        for kp in &mut moved.landmarks {
            kp.x = kp.x * 0.5 + 0.2;
            kp.y = kp.y * 0.5 + 0.1;
        }
        let a = NormalizedPose::from_pose(&base, &DANCE_JOINTS);
        let b = NormalizedPose::from_pose(&moved, &DANCE_JOINTS);
        assert!(a.distance(&b).unwrap() < 1e-4);
        let other = NormalizedPose::from_pose(&pose(PosePreset::Squat), &DANCE_JOINTS);
        assert!(a.distance(&other).unwrap() > 0.3);
    }
}
