/// Detection types delivered by the landmark feed, one `DetectionFrame` per camera frame.
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::geometry::Vec2;

/// One normalized landmark. `x`/`y` are in 0..1 of the camera image, y grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawKeypoint")]
pub struct Keypoint {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub visibility: Option<f32>,
}

impl Keypoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y, z: 0.0, visibility: None }
    }

    pub fn xy(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// Wire forms accepted for a keypoint: `[x, y]`, `[x, y, z]`, `[x, y, z, v]` or an object.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawKeypoint {
    Array(Vec<f32>),
    Object {
        x: f32,
        y: f32,
        #[serde(default)]
        z: f32,
        #[serde(default)]
        visibility: Option<f32>,
    },
}

impl TryFrom<RawKeypoint> for Keypoint {
    type Error = String;

    fn try_from(raw: RawKeypoint) -> Result<Self, Self::Error> {
        match raw {
            RawKeypoint::Array(v) => match v.as_slice() {
                [x, y] => Ok(Keypoint { x: *x, y: *y, z: 0.0, visibility: None }),
                [x, y, z] => Ok(Keypoint { x: *x, y: *y, z: *z, visibility: None }),
                [x, y, z, vis] => Ok(Keypoint { x: *x, y: *y, z: *z, visibility: Some(*vis) }),
                other => Err(format!("keypoint array needs 2 to 4 numbers, got {}", other.len())),
            },
            RawKeypoint::Object { x, y, z, visibility } => Ok(Keypoint { x, y, z, visibility }),
        }
    }
}

/// MediaPipe hand landmark ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandLandmark {
    Wrist = 0,
    ThumbCmc = 1,
    ThumbMcp = 2,
    ThumbIp = 3,
    ThumbTip = 4,
    IndexMcp = 5,
    IndexPip = 6,
    IndexDip = 7,
    IndexTip = 8,
    MiddleMcp = 9,
    MiddlePip = 10,
    MiddleDip = 11,
    MiddleTip = 12,
    RingMcp = 13,
    RingPip = 14,
    RingDip = 15,
    RingTip = 16,
    PinkyMcp = 17,
    PinkyPip = 18,
    PinkyDip = 19,
    PinkyTip = 20,
}

pub const HAND_POINTS: usize = 21;

/// MediaPipe pose landmark ids. "Left" is the subject's left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoseLandmark {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

pub const POSE_POINTS: usize = 33;

/// Face mesh points the games read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceLandmark {
    NoseTip = 1,
    EyeLower = 159,
}

/// A face mesh must reach at least the highest id in `FaceLandmark`.
pub const FACE_POINTS: usize = 160;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hand {
    #[serde(default)]
    pub handedness: Option<String>,
    pub landmarks: Vec<Keypoint>,
}

impl Hand {
    pub fn new(landmarks: Vec<Keypoint>) -> Self {
        Self { handedness: None, landmarks }
    }

    /// Landmarks are validated on ingestion, so indexing is in range.
    pub fn kp(&self, id: HandLandmark) -> Keypoint {
        self.landmarks[id as usize]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub landmarks: Vec<Keypoint>,
}

impl Pose {
    pub fn kp(&self, id: PoseLandmark) -> Keypoint {
        self.landmarks[id as usize]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Face {
    pub landmarks: Vec<Keypoint>,
}

impl Face {
    pub fn kp(&self, id: FaceLandmark) -> Keypoint {
        self.landmarks[id as usize]
    }
}

/// A labelled box from the object detector. `bbox` is `[x1, y1, x2, y2]`, normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedObject {
    pub label: String,
    pub confidence: f32,
    pub bbox: [f32; 4],
}

impl DetectedObject {
    pub fn area(&self) -> f32 {
        let [x1, y1, x2, y2] = self.bbox;
        (x2 - x1).abs() * (y2 - y1).abs()
    }
}

/// Everything the detector saw in one camera frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionFrame {
    pub hands: Vec<Hand>,
    pub pose: Option<Pose>,
    pub faces: Vec<Face>,
    pub objects: Vec<DetectedObject>,
}

impl DetectionFrame {
    pub fn hand(&self) -> Option<&Hand> {
        self.hands.first()
    }

    pub fn face(&self) -> Option<&Face> {
        self.faces.first()
    }

    pub fn is_empty(&self) -> bool {
        self.hands.is_empty() && self.pose.is_none() && self.faces.is_empty() && self.objects.is_empty()
    }

    /// Drops subjects with too few landmarks for the classifiers to index.
    pub fn sanitize(mut self) -> Self {
        let hands_before = self.hands.len();
        self.hands.retain(|h| h.landmarks.len() >= HAND_POINTS);
        if self.hands.len() != hands_before {
            warn!(dropped = hands_before - self.hands.len(), "incomplete hand landmarks");
        }
        if self.pose.as_ref().is_some_and(|p| p.landmarks.len() < POSE_POINTS) {
            warn!("incomplete pose landmarks");
            self.pose = None;
        }
        let faces_before = self.faces.len();
        self.faces.retain(|f| f.landmarks.len() >= FACE_POINTS);
        if self.faces.len() != faces_before {
            warn!(dropped = faces_before - self.faces.len(), "incomplete face mesh");
        }
        self
    }

    /// Flips x so movement on screen follows the player like a mirror.
    pub fn mirrored(mut self) -> Self {
        let flip = |kp: &mut Keypoint| kp.x = 1.0 - kp.x;
        for hand in &mut self.hands {
            hand.landmarks.iter_mut().for_each(flip);
        }
        if let Some(pose) = &mut self.pose {
            pose.landmarks.iter_mut().for_each(flip);
        }
        for face in &mut self.faces {
            face.landmarks.iter_mut().for_each(flip);
        }
        for obj in &mut self.objects {
            let [x1, y1, x2, y2] = obj.bbox;
            obj.bbox = [1.0 - x2, y1, 1.0 - x1, y2];
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keypoints_parse_from_arrays_and_objects() {
        let kps: Vec<Keypoint> =
            serde_json::from_str(r#"[[0.1, 0.2], [0.1, 0.2, 0.3], [0.1, 0.2, 0.3, 0.9], {"x": 0.5, "y": 0.6}]"#)
                .unwrap();
        assert_eq!(kps[0], Keypoint::new(0.1, 0.2));
        assert_eq!(kps[1].z, 0.3);
        assert_eq!(kps[2].visibility, Some(0.9));
        assert_eq!(kps[3], Keypoint::new(0.5, 0.6));
    }

    #[test]
    fn short_keypoint_array_is_rejected() {
        assert!(serde_json::from_str::<Keypoint>("[0.1]").is_err());
    }

    #[test]
    fn sanitize_drops_incomplete_subjects() {
        let frame = DetectionFrame {
            hands: vec![Hand::new(vec![Keypoint::default(); 5])],
            pose: Some(Pose { landmarks: vec![Keypoint::default(); 10] }),
            ..Default::default()
        }
        .sanitize();
        assert!(frame.hands.is_empty());
        assert!(frame.pose.is_none());
    }

    #[test]
    fn mirroring_flips_x_and_boxes() {
        let frame = DetectionFrame {
            hands: vec![Hand::new(vec![Keypoint::new(0.2, 0.4); HAND_POINTS])],
            objects: vec![DetectedObject { label: "cup".into(), confidence: 0.9, bbox: [0.1, 0.1, 0.3, 0.2] }],
            ..Default::default()
        }
        .mirrored();
        assert!((frame.hands[0].landmarks[0].x - 0.8).abs() < 1e-6);
        let [x1, _, x2, _] = frame.objects[0].bbox;
        assert!((x1 - 0.7).abs() < 1e-6 && (x2 - 0.9).abs() < 1e-6);
    }
}
