/// Runtime configuration, loaded from an optional JSON file. Every field has a default.
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArcadeConfig {
    pub fps: u32,
    /// Flip detector frames horizontally.
    pub mirror: bool,
    /// Consecutive unreadable feed lines before the session aborts.
    pub max_failed_reads: u32,
    pub seed: Option<u64>,
    pub log_file: Option<PathBuf>,
    pub log_level: String,
    pub save_dir: PathBuf,
    /// Detector image size, used where thresholds are in pixels.
    pub frame_width: f32,
    pub frame_height: f32,
    /// Rounds needed to win rock-paper-scissors.
    pub rps_target: u32,
    /// What moves the paddle in classic pong.
    pub pong_control: PongControl,
    pub thresholds: Thresholds,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PongControl {
    #[default]
    Hand,
    Eyes,
}

impl Default for ArcadeConfig {
    fn default() -> Self {
        Self {
            fps: 60,
            mirror: true,
            max_failed_reads: 30,
            seed: None,
            log_file: None,
            log_level: "info".to_string(),
            save_dir: PathBuf::from("."),
            frame_width: 640.0,
            frame_height: 480.0,
            rps_target: 5,
            pong_control: PongControl::Hand,
            thresholds: Thresholds::default(),
        }
    }
}

impl ArcadeConfig {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_file.clone().unwrap_or_else(|| std::env::temp_dir().join("camterm.log"))
    }

    /// Seconds per tick.
    pub fn tick_secs(&self) -> f32 {
        1.0 / self.fps.max(1) as f32
    }

    /// Per-game generator, reproducible when `seed` is set.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }

    /// Whole ticks covering `seconds` at the configured rate.
    pub fn ticks(&self, seconds: f32) -> u32 {
        (seconds * self.fps.max(1) as f32).round() as u32
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub hand: HandThresholds,
    pub pose: PoseThresholds,
    pub face: FaceThresholds,
    pub snake_zone: SnakeZone,
    pub dance_similarity: DanceSimilarity,
    pub hunt: HuntThresholds,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandThresholds {
    /// Thumb-to-index tip distance for the OK sign.
    pub ok_pinch: f32,
}

impl Default for HandThresholds {
    fn default() -> Self {
        Self { ok_pinch: 0.08 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoseThresholds {
    pub t_elbow_angle: f32,
    pub squat_knee_angle: f32,
    pub warrior_ankle_gap: f32,
    pub star_leg_spread: f32,
    pub star_arm_spread: f32,
    pub flamingo_ankle_gap: f32,
    pub flamingo_knee_gap: f32,
    pub airplane_arm_level: f32,
    pub airplane_torso: f32,
    pub dab_reach: f32,
    pub jump_margin: f32,
    pub duck_margin: f32,
}

impl Default for PoseThresholds {
    fn default() -> Self {
        Self {
            t_elbow_angle: 160.0,
            squat_knee_angle: 120.0,
            warrior_ankle_gap: 0.15,
            star_leg_spread: 0.3,
            star_arm_spread: 0.6,
            flamingo_ankle_gap: 0.2,
            flamingo_knee_gap: 0.15,
            airplane_arm_level: 0.12,
            airplane_torso: 0.3,
            dab_reach: 0.2,
            jump_margin: 0.05,
            duck_margin: 0.15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaceThresholds {
    pub lane_left: f32,
    pub lane_right: f32,
    pub calibration_frames: usize,
    /// Pixels of nose travel ignored around the calibrated center.
    pub deadzone: f32,
    pub sensitivity: f32,
}

impl Default for FaceThresholds {
    fn default() -> Self {
        Self { lane_left: 0.35, lane_right: 0.65, calibration_frames: 30, deadzone: 30.0, sensitivity: 0.3 }
    }
}

/// Palm position zones that steer the snake.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SnakeZone(pub f32);

impl Default for SnakeZone {
    fn default() -> Self {
        Self(0.3)
    }
}

/// Mean normalized joint distance under which a dance pose matches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DanceSimilarity(pub f32);

impl Default for DanceSimilarity {
    fn default() -> Self {
        Self(0.3)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HuntThresholds {
    pub min_confidence: f32,
    /// Minimum box area as a fraction of the image.
    pub min_box_area: f32,
}

impl Default for HuntThresholds {
    fn default() -> Self {
        Self { min_confidence: 0.45, min_box_area: 0.005 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: ArcadeConfig =
            serde_json::from_str(r#"{"fps": 30, "thresholds": {"hand": {"ok_pinch": 0.1}, "snake_zone": 0.25}}"#)
                .unwrap();
        assert_eq!(cfg.fps, 30);
        assert_eq!(cfg.thresholds.hand.ok_pinch, 0.1);
        assert_eq!(cfg.thresholds.snake_zone, SnakeZone(0.25));
        assert_eq!(cfg.thresholds.face, FaceThresholds::default());
        assert!(cfg.mirror);
        assert_eq!(cfg.pong_control, PongControl::Hand);

        let cfg: ArcadeConfig = serde_json::from_str(r#"{"pong_control": "eyes"}"#).unwrap();
        assert_eq!(cfg.pong_control, PongControl::Eyes);
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let err = ArcadeConfig::load(Some(Path::new("/definitely/not/here.json"))).unwrap_err();
        assert!(err.to_string().contains("failed to read config"));
    }

    #[test]
    fn no_path_means_defaults() {
        assert_eq!(ArcadeConfig::load(None).unwrap(), ArcadeConfig::default());
        assert!((ArcadeConfig::default().tick_secs() - 1.0 / 60.0).abs() < 1e-6);
    }
}
