use rand::{rngs::StdRng, Rng};
use ratatui::{layout::Rect as Area, style::Color, Frame};
use tracing::debug;

use crate::core::config::{ArcadeConfig, DanceSimilarity};
use crate::core::game::{ArcadeGame, Tracking};
use crate::core::landmarks::{DetectionFrame, Pose};
use crate::core::renderer::{draw_field, draw_hud, split_hud, stat, Playfield};
use crate::core::session::{Outcome, Summary, Tick, Timer};
use crate::gesture::pose::{NormalizedPose, DANCE_JOINTS};
use crate::gesture::synthetic::{pose, PosePreset};

pub const FIELD: Playfield = Playfield::new(1200.0, 800.0);
const ROUNDS: u32 = 7;
const ROUND_SECS: f32 = 5.0;
const FEEDBACK_SECS: f32 = 1.0;

/// Reference choreography shapes.
const MOVES: [PosePreset; 7] = [
    PosePreset::TPose,
    PosePreset::YPose,
    PosePreset::ArmsUp,
    PosePreset::Star,
    PosePreset::Dab,
    PosePreset::Warrior,
    PosePreset::Squat,
];

struct Reference {
    name: &'static str,
    pose: Pose,
    normalized: NormalizedPose,
}

impl Reference {
    fn new(preset: PosePreset) -> Self {
        let pose = pose(preset);
        let normalized = NormalizedPose::from_pose(&pose, &DANCE_JOINTS);
        Self { name: preset.name(), pose, normalized }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DanceInput {
    pub normalized: Option<NormalizedPose>,
    pub pose: Option<Pose>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Stage {
    Dancing(Timer),
    Feedback { matched: bool, timer: Timer },
}

pub struct DanceGame {
    rng: StdRng,
    similarity: DanceSimilarity,
    references: Vec<Reference>,
    target: usize,
    stage: Stage,
    round: u32,
    score: u32,
    last_distance: Option<f32>,
    skeleton: Option<Pose>,
}

impl DanceGame {
    pub fn new(config: &ArcadeConfig) -> Self {
        let mut game = Self {
            rng: config.rng(),
            similarity: config.thresholds.dance_similarity,
            references: MOVES.into_iter().map(Reference::new).collect(),
            target: 0,
            stage: Stage::Dancing(Timer::new(ROUND_SECS)),
            round: 0,
            score: 0,
            last_distance: None,
            skeleton: None,
        };
        game.reset();
        game
    }

    fn next_round(&mut self) {
        self.round += 1;
        self.target = self.rng.random_range(0..self.references.len());
        self.last_distance = None;
        self.stage = Stage::Dancing(Timer::new(ROUND_SECS));
        debug!(round = self.round, pose = self.references[self.target].name, "new dance move");
    }
}

impl ArcadeGame for DanceGame {
    type Input = DanceInput;

    fn tracking(&self) -> Tracking {
        Tracking::Pose
    }

    fn controls(&self) -> &'static [&'static str] {
        &["Copy the reference figure with your whole body", "5 seconds per move, 7 moves", "Emulator: Tab cycles through body presets"]
    }

    fn reset(&mut self) {
        self.round = 0;
        self.score = 0;
        self.skeleton = None;
        self.next_round();
    }

    fn classify(&self, frame: &DetectionFrame) -> DanceInput {
        match &frame.pose {
            Some(pose) => DanceInput {
                normalized: Some(NormalizedPose::from_pose(pose, &DANCE_JOINTS)),
                pose: Some(pose.clone()),
            },
            None => DanceInput::default(),
        }
    }

    fn on_tick(&mut self, input: &DanceInput, tick: &Tick) -> Option<Outcome> {
        if tick.fresh {
            self.skeleton = input.pose.clone();
        }
        match &mut self.stage {
            Stage::Dancing(timer) => {
                let timed_out = timer.tick(tick.dt);
                let distance =
                    input.normalized.as_ref().and_then(|live| live.distance(&self.references[self.target].normalized));
                self.last_distance = distance;
                if distance.is_some_and(|d| d < self.similarity.0) {
                    self.score += 1;
                    self.stage = Stage::Feedback { matched: true, timer: Timer::new(FEEDBACK_SECS) };
                } else if timed_out {
                    self.stage = Stage::Feedback { matched: false, timer: Timer::new(FEEDBACK_SECS) };
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
            Stage::Dancing(timer) => format!("{}s", timer.remaining().ceil() as u32),
            Stage::Feedback { .. } => "-".to_string(),
        };
        let distance = self.last_distance.map_or("-".to_string(), |d| format!("{d:.2}"));
        draw_hud(
            frame,
            hud,
            vec![
                stat("ROUND", format!("{}/{}", self.round, ROUNDS)),
                stat("SCORE", self.score),
                stat("TIME", time),
                stat("DISTANCE", distance),
            ],
        );
        let reference = &self.references[self.target];
        draw_field(frame, body, FIELD, "DANCE MATCH", |p| {
            p.text(60.0, 60.0, format!("COPY: {}", reference.name), Color::Yellow);
            p.skeleton(&reference.pose, 50.0, 100.0, 500.0, 650.0, Color::Magenta);
            match &self.skeleton {
                Some(pose) => p.skeleton(pose, 650.0, 100.0, 500.0, 650.0, Color::Cyan),
                None => p.text(800.0, 400.0, "No body in view", Color::DarkGray),
            }
            match self.stage {
                Stage::Feedback { matched: true, .. } => p.text(520.0, 760.0, "MATCH!", Color::Green),
                Stage::Feedback { matched: false, .. } => p.text(520.0, 760.0, "TOO LATE", Color::Red),
                Stage::Dancing(_) => {}
            }
        });
    }

    fn summary(&self) -> Summary {
        Summary::default().line(format!("You matched {} of {} moves", self.score, ROUNDS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game() -> DanceGame {
        DanceGame::new(&ArcadeConfig { seed: Some(21), ..Default::default() })
    }

    fn tick(dt: f32) -> Tick {
        Tick { index: 1, dt, fresh: true }
    }

    fn input_for(g: &DanceGame, preset: PosePreset) -> DanceInput {
        let frame = DetectionFrame { pose: Some(pose(preset)), ..Default::default() };
        g.classify(&frame)
    }

    fn target_of(preset: PosePreset) -> usize {
        MOVES.iter().position(|m| *m == preset).unwrap_or_default()
    }

    #[test]
    fn copying_the_reference_scores() {
        let mut g = game();
        let preset = MOVES[g.target];
        let input = input_for(&g, preset);
        g.on_tick(&input, &tick(0.1));
        assert_eq!(g.score, 1);
        assert!(matches!(g.stage, Stage::Feedback { matched: true, .. }));
    }

    #[test]
    fn a_different_shape_does_not_match() {
        let mut g = game();
        g.target = target_of(PosePreset::Star);
        let input = input_for(&g, PosePreset::Squat);
        g.on_tick(&input, &tick(0.1));
        assert_eq!(g.score, 0);
        assert!(matches!(g.stage, Stage::Dancing(_)));
        g.on_tick(&input, &tick(ROUND_SECS));
        assert!(matches!(g.stage, Stage::Feedback { matched: false, .. }));
    }

    #[test]
    fn seven_moves_then_victory() {
        let mut g = game();
        let mut outcome = None;
        for _ in 0..ROUNDS {
            g.on_tick(&DanceInput::default(), &tick(ROUND_SECS));
            outcome = g.on_tick(&DanceInput::default(), &tick(FEEDBACK_SECS));
        }
        assert_eq!(outcome, Some(Outcome::Victory));
        assert_eq!(g.score, 0);
    }
}
