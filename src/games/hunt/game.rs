use rand::{rngs::StdRng, Rng};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect as Area},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};
use tracing::{debug, info};

use crate::core::config::{ArcadeConfig, HuntThresholds};
use crate::core::game::{ArcadeGame, Tracking};
use crate::core::landmarks::{DetectedObject, DetectionFrame};
use crate::core::renderer::{draw_hud, split_hud, stat};
use crate::core::session::{Outcome, Summary, Tick, Timer};

const ROUNDS: u32 = 10;
const ROUND_SECS: f32 = 20.0;
const PAUSE_SECS: f32 = 1.5;

/// Objects to find, with the detector class that counts for each.
pub const TARGETS: [(&str, &str); 19] = [
    ("Phone", "cell phone"),
    ("Mug", "cup"),
    ("Bottle", "bottle"),
    ("Backpack", "backpack"),
    ("Laptop", "laptop"),
    ("Keyboard", "keyboard"),
    ("Mouse", "mouse"),
    ("Book", "book"),
    ("Clock", "clock"),
    ("Remote", "remote"),
    ("Scissors", "scissors"),
    ("Person", "person"),
    ("Chair", "chair"),
    ("TV", "tv"),
    ("Vase", "vase"),
    ("Bowl", "bowl"),
    ("Banana", "banana"),
    ("Apple", "apple"),
    ("Orange", "orange"),
];

/// A detection worth judging: confident enough and large enough.
#[derive(Debug, Clone, PartialEq)]
pub struct Sighting {
    pub label: String,
    pub confidence: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sightings(pub Vec<Sighting>);

pub fn is_valid(object: &DetectedObject, th: &HuntThresholds) -> bool {
    object.confidence >= th.min_confidence && object.area() >= th.min_box_area
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Stage {
    Searching(Timer),
    Found(Timer),
    Missed(Timer),
}

pub struct HuntGame {
    rng: StdRng,
    thresholds: HuntThresholds,
    target: usize,
    stage: Stage,
    round: u32,
    found: u32,
    seen: Option<Sighting>,
}

impl HuntGame {
    pub fn new(config: &ArcadeConfig) -> Self {
        let mut game = Self {
            rng: config.rng(),
            thresholds: config.thresholds.hunt.clone(),
            target: 0,
            stage: Stage::Searching(Timer::new(ROUND_SECS)),
            round: 0,
            found: 0,
            seen: None,
        };
        game.reset();
        game
    }

    fn next_round(&mut self) {
        self.round += 1;
        self.target = self.rng.random_range(0..TARGETS.len());
        self.seen = None;
        self.stage = Stage::Searching(Timer::new(ROUND_SECS));
        debug!(round = self.round, target = TARGETS[self.target].0, "hunting");
    }
}

impl ArcadeGame for HuntGame {
    type Input = Sightings;

    fn tracking(&self) -> Tracking {
        Tracking::Objects
    }

    fn controls(&self) -> &'static [&'static str] {
        &[
            "Find the object named on screen and hold it up to the camera",
            "20 seconds per object, 10 rounds",
            "Emulator: Tab cycles through objects, the pointer moves them",
        ]
    }

    fn reset(&mut self) {
        self.round = 0;
        self.found = 0;
        self.next_round();
    }

    fn classify(&self, frame: &DetectionFrame) -> Sightings {
        Sightings(
            frame
                .objects
                .iter()
                .filter(|o| is_valid(o, &self.thresholds))
                .map(|o| Sighting { label: o.label.clone(), confidence: o.confidence })
                .collect(),
        )
    }

    fn on_tick(&mut self, input: &Sightings, tick: &Tick) -> Option<Outcome> {
        match &mut self.stage {
            Stage::Searching(timer) => {
                let timed_out = timer.tick(tick.dt);
                let label = TARGETS[self.target].1;
                let best = input
                    .0
                    .iter()
                    .filter(|s| s.label == label)
                    .max_by(|a, b| a.confidence.total_cmp(&b.confidence))
                    .cloned();
                if let Some(sighting) = best {
                    info!(label, confidence = sighting.confidence, "object found");
                    self.found += 1;
                    self.seen = Some(sighting);
                    self.stage = Stage::Found(Timer::new(PAUSE_SECS));
                } else if timed_out {
                    self.stage = Stage::Missed(Timer::new(PAUSE_SECS));
                }
            }
            Stage::Found(timer) | Stage::Missed(timer) => {
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
        draw_hud(
            frame,
            hud,
            vec![stat("ROUND", format!("{}/{}", self.round, ROUNDS)), stat("FOUND", self.found)],
        );
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(5), Constraint::Length(3)])
            .split(body);
        let bold = |color| Style::default().fg(color).add_modifier(Modifier::BOLD);
        let (name, _) = TARGETS[self.target];
        let mut lines = vec![Line::from("Find:"), Line::styled(name.to_uppercase(), bold(Color::Yellow)), Line::from("")];
        let ratio = match self.stage {
            Stage::Searching(timer) => {
                lines.push(Line::from("Show it to the camera"));
                timer.remaining() / ROUND_SECS
            }
            Stage::Found(_) => {
                let confidence = self.seen.as_ref().map_or(0.0, |s| s.confidence);
                lines.push(Line::styled(format!("FOUND! ({:.0}% sure)", confidence * 100.0), bold(Color::Green)));
                0.0
            }
            Stage::Missed(_) => {
                lines.push(Line::styled("TIME'S UP", bold(Color::Red)));
                0.0
            }
        };
        frame.render_widget(
            Paragraph::new(lines).alignment(Alignment::Center).block(Block::default().borders(Borders::ALL).title(" OBJECT HUNT ")),
            chunks[0],
        );
        frame.render_widget(
            Gauge::default()
                .block(Block::default().borders(Borders::ALL).title(" TIME "))
                .gauge_style(Style::default().fg(Color::Cyan))
                .ratio(f64::from(ratio.clamp(0.0, 1.0))),
            chunks[1],
        );
    }

    fn summary(&self) -> Summary {
        Summary::default().line(format!("You found {} of {} objects", self.found, ROUNDS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::Vec2;
    use crate::gesture::synthetic::object;

    fn game() -> HuntGame {
        HuntGame::new(&ArcadeConfig { seed: Some(4), ..Default::default() })
    }

    fn tick(dt: f32) -> Tick {
        Tick { index: 1, dt, fresh: true }
    }

    fn showing(g: &HuntGame, label: &str) -> Sightings {
        let frame = DetectionFrame { objects: vec![object(label, Vec2::new(0.5, 0.5))], ..Default::default() };
        g.classify(&frame)
    }

    #[test]
    fn weak_or_tiny_detections_are_ignored() {
        let th = HuntThresholds::default();
        let mut o = object("cup", Vec2::new(0.5, 0.5));
        assert!(is_valid(&o, &th));
        o.confidence = 0.3;
        assert!(!is_valid(&o, &th));
        o.confidence = 0.9;
        o.bbox = [0.5, 0.5, 0.55, 0.55];
        assert!(!is_valid(&o, &th));
    }

    #[test]
    fn showing_the_target_counts() {
        let mut g = game();
        let input = showing(&g, TARGETS[g.target].1);
        g.on_tick(&input, &tick(0.1));
        assert_eq!(g.found, 1);
        assert!(matches!(g.stage, Stage::Found(_)));
        g.on_tick(&Sightings::default(), &tick(PAUSE_SECS));
        assert_eq!(g.round, 2);
    }

    #[test]
    fn other_objects_do_not_count() {
        let mut g = game();
        g.target = 0;
        let input = showing(&g, "banana");
        g.on_tick(&input, &tick(ROUND_SECS));
        assert_eq!(g.found, 0);
        assert!(matches!(g.stage, Stage::Missed(_)));
    }

    #[test]
    fn ten_rounds_then_victory() {
        let mut g = game();
        let mut outcome = None;
        for _ in 0..ROUNDS {
            g.on_tick(&Sightings::default(), &tick(ROUND_SECS));
            outcome = g.on_tick(&Sightings::default(), &tick(PAUSE_SECS));
        }
        assert_eq!(outcome, Some(Outcome::Victory));
    }
}
