use rand::{rngs::StdRng, Rng};
use ratatui::{layout::Rect as Area, style::Color, Frame};
use tracing::debug;

use crate::core::config::{ArcadeConfig, PoseThresholds};
use crate::core::game::{ArcadeGame, Tracking};
use crate::core::landmarks::{DetectionFrame, Pose};
use crate::core::renderer::{draw_field, draw_hud, split_hud, stat, Playfield};
use crate::core::session::{rating, Outcome, Summary, Tick, Timer};
use crate::gesture::pose::{matching_poses, BodyPose};

pub const FIELD: Playfield = Playfield::new(1200.0, 800.0);
const ROUNDS: u32 = 10;
const POSE_SECS: f32 = 5.0;
const HOLD_SECS: f32 = 0.5;
const FEEDBACK_SECS: f32 = 1.5;
const POINTS: u64 = 100;
const RATINGS: [(f32, &str); 3] = [(90.0, "POSE MASTER"), (70.0, "VERY GOOD"), (50.0, "GOOD")];

/// Poses the body satisfies plus the skeleton to draw.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoseInput {
    pub matched: Vec<BodyPose>,
    pub pose: Option<Pose>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Stage {
    Posing { target: BodyPose, timer: Timer, held: f32 },
    Feedback { success: bool, timer: Timer },
}

pub struct SimonGame {
    rng: StdRng,
    thresholds: PoseThresholds,
    stage: Stage,
    round: u32,
    score: u64,
    completed: u32,
    skeleton: Option<Pose>,
}

impl SimonGame {
    pub fn new(config: &ArcadeConfig) -> Self {
        let mut game = Self {
            rng: config.rng(),
            thresholds: config.thresholds.pose.clone(),
            stage: Stage::Feedback { success: false, timer: Timer::new(0.0) },
            round: 0,
            score: 0,
            completed: 0,
            skeleton: None,
        };
        game.reset();
        game
    }

    fn next_round(&mut self) {
        self.round += 1;
        let target = BodyPose::ALL[self.rng.random_range(0..BodyPose::ALL.len())];
        debug!(round = self.round, pose = target.name(), "simon says");
        self.stage = Stage::Posing { target, timer: Timer::new(POSE_SECS), held: 0.0 };
    }

    fn accuracy(&self) -> f32 {
        self.score as f32 * 100.0 / (u64::from(ROUNDS) * POINTS) as f32
    }
}

impl ArcadeGame for SimonGame {
    type Input = PoseInput;

    fn tracking(&self) -> Tracking {
        Tracking::Pose
    }

    fn controls(&self) -> &'static [&'static str] {
        &[
            "Strike the pose Simon names and hold it for half a second",
            "5 seconds per pose, 10 rounds",
            "Emulator: Tab cycles through body presets",
        ]
    }

    fn reset(&mut self) {
        self.round = 0;
        self.score = 0;
        self.completed = 0;
        self.skeleton = None;
        self.next_round();
    }

    fn classify(&self, frame: &DetectionFrame) -> PoseInput {
        match &frame.pose {
            Some(pose) => PoseInput { matched: matching_poses(pose, &self.thresholds), pose: Some(pose.clone()) },
            None => PoseInput::default(),
        }
    }

    fn on_tick(&mut self, input: &PoseInput, tick: &Tick) -> Option<Outcome> {
        if tick.fresh {
            self.skeleton = input.pose.clone();
        }
        match &mut self.stage {
            Stage::Posing { target, timer, held } => {
                // Breaking the pose drains the hold instead of zeroing it.
                if input.matched.contains(target) {
                    *held += tick.dt;
                } else {
                    *held = (*held - tick.dt).max(0.0);
                }
                let timed_out = timer.tick(tick.dt);
                if *held >= HOLD_SECS {
                    self.score += POINTS;
                    self.completed += 1;
                    self.stage = Stage::Feedback { success: true, timer: Timer::new(FEEDBACK_SECS) };
                } else if timed_out {
                    self.stage = Stage::Feedback { success: false, timer: Timer::new(FEEDBACK_SECS) };
                }
            }
            Stage::Feedback { timer, .. } => {
                if timer.tick(tick.dt) {
                    if self.round >= ROUNDS {
                        return Some(Outcome::Victory);
                    }
                    self.next_round();
                }
            }
        }
        None
    }

    fn render(&self, frame: &mut Frame, area: Area) {
        let (hud, body) = split_hud(area);
        let time = match self.stage {
            Stage::Posing { timer, .. } => format!("{:.1}s", timer.remaining()),
            Stage::Feedback { .. } => "-".to_string(),
        };
        draw_hud(
            frame,
            hud,
            vec![stat("ROUND", format!("{}/{}", self.round, ROUNDS)), stat("SCORE", self.score), stat("TIME", time)],
        );
        draw_field(frame, body, FIELD, "SIMON SAYS", |p| {
            match self.stage {
                Stage::Posing { target, held, .. } => {
                    p.text(40.0, 60.0, format!("SIMON SAYS: {}", target.name()), Color::Yellow);
                    p.text(40.0, 110.0, target.hint(), Color::Gray);
                    let bar = 400.0;
                    p.rect(40.0, 700.0, bar, 30.0, Color::DarkGray);
                    p.fill_rect(40.0, 700.0, bar * (held / HOLD_SECS).min(1.0), 30.0, Color::Green);
                }
                Stage::Feedback { success: true, .. } => p.text(40.0, 60.0, "PERFECT!", Color::Green),
                Stage::Feedback { success: false, .. } => p.text(40.0, 60.0, "TIME'S UP", Color::Red),
            }
            match &self.skeleton {
                Some(pose) => p.skeleton(pose, 500.0, 100.0, 600.0, 650.0, Color::Cyan),
                None => p.text(600.0, 400.0, "No body in view", Color::DarkGray),
            }
        });
    }

    fn summary(&self) -> Summary {
        let accuracy = self.accuracy();
        Summary::default()
            .line(format!("Score: {} / {}", self.score, u64::from(ROUNDS) * POINTS))
            .line(format!("Poses held: {} of {}", self.completed, ROUNDS))
            .line(format!("Accuracy: {accuracy:.0}%"))
            .rated(rating(accuracy, &RATINGS, "KEEP PRACTICING"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::synthetic::{pose, PosePreset};

    fn game() -> SimonGame {
        SimonGame::new(&ArcadeConfig { seed: Some(9), ..Default::default() })
    }

    fn tick(dt: f32) -> Tick {
        Tick { index: 1, dt, fresh: true }
    }

    fn target(g: &SimonGame) -> BodyPose {
        match g.stage {
            Stage::Posing { target, .. } => target,
            other => panic!("not posing: {other:?}"),
        }
    }

    fn holding(target: BodyPose) -> PoseInput {
        PoseInput { matched: vec![target], pose: None }
    }

    #[test]
    fn holding_the_pose_scores() {
        let mut g = game();
        let t = target(&g);
        for _ in 0..6 {
            g.on_tick(&holding(t), &tick(0.1));
        }
        assert_eq!(g.score, POINTS);
        assert!(matches!(g.stage, Stage::Feedback { success: true, .. }));
    }

    #[test]
    fn breaking_the_pose_drains_the_hold() {
        let mut g = game();
        let t = target(&g);
        g.on_tick(&holding(t), &tick(0.3));
        g.on_tick(&PoseInput::default(), &tick(0.2));
        match g.stage {
            Stage::Posing { held, .. } => assert!((held - 0.1).abs() < 1e-5),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn running_out_of_time_fails_the_round() {
        let mut g = game();
        g.on_tick(&PoseInput::default(), &tick(POSE_SECS));
        assert!(matches!(g.stage, Stage::Feedback { success: false, .. }));
        g.on_tick(&PoseInput::default(), &tick(FEEDBACK_SECS));
        assert_eq!(g.round, 2);
    }

    #[test]
    fn ten_rounds_then_victory() {
        let mut g = game();
        let mut outcome = None;
        for _ in 0..ROUNDS {
            let t = target(&g);
            g.on_tick(&holding(t), &tick(HOLD_SECS));
            outcome = g.on_tick(&PoseInput::default(), &tick(FEEDBACK_SECS));
        }
        assert_eq!(outcome, Some(Outcome::Victory));
        assert_eq!(g.summary().rating, Some("POSE MASTER"));
    }

    #[test]
    fn classify_reads_the_body() {
        let g = game();
        let frame = DetectionFrame { pose: Some(pose(PosePreset::TPose)), ..Default::default() };
        let input = g.classify(&frame);
        assert!(input.matched.contains(&BodyPose::T));
        assert!(input.pose.is_some());
        assert_eq!(g.classify(&DetectionFrame::default()), PoseInput::default());
    }
}
