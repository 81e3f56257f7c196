use rand::{rngs::StdRng, Rng};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect as Area},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};
use tracing::debug;

use crate::core::config::{ArcadeConfig, HandThresholds};
use crate::core::game::{ArcadeGame, Tracking};
use crate::core::landmarks::{DetectionFrame, HandLandmark};
use crate::core::renderer::{draw_hud, split_hud, stat};
use crate::core::session::{rating, Outcome, Summary, Tick, Timer};
use crate::core::smoothing::MajorityWindow;
use crate::gesture::hand::{hand_sign, HandSign};

const START_LENGTH: usize = 3;
const SHOW_SECS: f32 = 1.5;
const SECS_PER_SIGN: f32 = 3.0;
const PAUSE_SECS: f32 = 2.0;
const WINDOW: usize = 10;
const MIN_SAMPLES: usize = 5;
const RATINGS: [(f32, &str); 3] = [(10.0, "EXCEPTIONAL MEMORY"), (7.0, "VERY GOOD"), (5.0, "GOOD")];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stage {
    /// Showing sign `index` of the sequence.
    Showing { index: usize, timer: Timer },
    /// Waiting for the player to make sign `index`.
    Repeating { index: usize, timer: Timer },
    Correct(Timer),
    Wrong(Timer),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SignInput(pub Option<HandSign>);

pub struct MemoryGame {
    rng: StdRng,
    thresholds: HandThresholds,
    sequence: Vec<HandSign>,
    stage: Stage,
    window: MajorityWindow<HandSign>,
    score: u64,
    rounds: u32,
    last_seen: Option<HandSign>,
}

impl MemoryGame {
    pub fn new(config: &ArcadeConfig) -> Self {
        let mut game = Self {
            rng: config.rng(),
            thresholds: config.thresholds.hand.clone(),
            sequence: Vec::new(),
            stage: Stage::Correct(Timer::new(0.0)),
            window: MajorityWindow::new(WINDOW),
            score: 0,
            rounds: 0,
            last_seen: None,
        };
        game.reset();
        game
    }

    fn random_sign(&mut self) -> HandSign {
        HandSign::ALL[self.rng.random_range(0..HandSign::ALL.len())]
    }

    fn show_from_start(&mut self) {
        self.stage = Stage::Showing { index: 0, timer: Timer::new(SHOW_SECS) };
    }

    fn answer_timer(&self) -> Timer {
        Timer::new(SECS_PER_SIGN * self.sequence.len() as f32)
    }

    /// Feeds one answer to the sequence; returns the next stage.
    fn judge(&mut self, index: usize, sign: HandSign) -> Stage {
        if sign != self.sequence[index] {
            debug!(expected = self.sequence[index].name(), got = sign.name(), "wrong sign");
            return Stage::Wrong(Timer::new(PAUSE_SECS));
        }
        self.window.clear();
        if index + 1 == self.sequence.len() {
            self.score += self.sequence.len() as u64 * 10;
            self.rounds += 1;
            return Stage::Correct(Timer::new(PAUSE_SECS));
        }
        Stage::Repeating { index: index + 1, timer: self.answer_timer() }
    }

    fn render_cards(&self, frame: &mut Frame, area: Area) {
        let n = self.sequence.len().max(1) as u32;
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints((0..n).map(|_| Constraint::Ratio(1, n)))
            .split(area);
        for (i, sign) in self.sequence.iter().enumerate() {
            let (text, color) = match self.stage {
                Stage::Showing { index, .. } if i == index => (sign.name().to_string(), Color::Yellow),
                Stage::Showing { .. } => ("?".to_string(), Color::DarkGray),
                Stage::Repeating { index, .. } if i < index => (sign.name().to_string(), Color::Green),
                Stage::Repeating { index, .. } if i == index => ("YOUR TURN".to_string(), Color::Cyan),
                Stage::Repeating { .. } => ("?".to_string(), Color::DarkGray),
                Stage::Correct(_) => (sign.name().to_string(), Color::Green),
                Stage::Wrong(_) => (sign.name().to_string(), Color::Red),
            };
            frame.render_widget(
                Paragraph::new(text)
                    .alignment(Alignment::Center)
                    .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
                    .block(Block::default().borders(Borders::ALL).title(format!(" {} ", i + 1))),
                cells[i],
            );
        }
    }
}

impl ArcadeGame for MemoryGame {
    type Input = SignInput;

    fn tracking(&self) -> Tracking {
        Tracking::Hands { anchor: HandLandmark::Wrist }
    }

    fn controls(&self) -> &'static [&'static str] {
        &[
            "Watch the sequence of hand signs",
            "Repeat it: thumbs up, peace, OK, rock or open hand",
            "Each round adds one more sign",
        ]
    }

    fn reset(&mut self) {
        self.sequence.clear();
        for _ in 0..START_LENGTH {
            let sign = self.random_sign();
            self.sequence.push(sign);
        }
        self.window.clear();
        self.score = 0;
        self.rounds = 0;
        self.last_seen = None;
        self.show_from_start();
    }

    fn classify(&self, frame: &DetectionFrame) -> SignInput {
        SignInput(frame.hand().and_then(|h| hand_sign(h, &self.thresholds)))
    }

    fn on_tick(&mut self, input: &SignInput, tick: &Tick) -> Option<Outcome> {
        if tick.fresh {
            self.last_seen = input.0;
            if let Some(sign) = input.0 {
                self.window.push(sign);
            }
        }
        self.stage = match self.stage {
            Stage::Showing { index, mut timer } => {
                if !timer.tick(tick.dt) {
                    Stage::Showing { index, timer }
                } else if index + 1 < self.sequence.len() {
                    Stage::Showing { index: index + 1, timer: Timer::new(SHOW_SECS) }
                } else {
                    self.window.clear();
                    Stage::Repeating { index: 0, timer: self.answer_timer() }
                }
            }
            Stage::Repeating { index, mut timer } => match self.window.decided(MIN_SAMPLES) {
                Some(sign) => self.judge(index, sign),
                None if timer.tick(tick.dt) => Stage::Wrong(Timer::new(PAUSE_SECS)),
                None => Stage::Repeating { index, timer },
            },
            Stage::Correct(mut timer) => {
                if timer.tick(tick.dt) {
                    let sign = self.random_sign();
                    self.sequence.push(sign);
                    self.show_from_start();
                    self.stage
                } else {
                    Stage::Correct(timer)
                }
            }
            Stage::Wrong(mut timer) => {
                if timer.tick(tick.dt) {
                    return Some(Outcome::GameOver);
                }
                Stage::Wrong(timer)
            }
        };
        None
    }

    fn render(&self, frame: &mut Frame, area: Area) {
        let (hud, body) = split_hud(area);
        let seen = self.last_seen.map_or("-", |s| s.name());
        draw_hud(
            frame,
            hud,
            vec![stat("SCORE", self.score), stat("SEQUENCE", self.sequence.len()), stat("SEEN", seen)],
        );
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Length(5), Constraint::Length(3), Constraint::Min(0)])
            .split(body);

        let (title, color) = match self.stage {
            Stage::Showing { .. } => ("MEMORIZE", Color::Yellow),
            Stage::Repeating { .. } => ("YOUR TURN", Color::Cyan),
            Stage::Correct(_) => ("CORRECT!", Color::Green),
            Stage::Wrong(_) => ("WRONG", Color::Red),
        };
        let mut line = vec![Span::styled(title, Style::default().fg(color).add_modifier(Modifier::BOLD))];
        if let Stage::Correct(_) = self.stage {
            line.push(Span::raw(format!("  +{} points", self.sequence.len() * 10)));
        }
        frame.render_widget(
            Paragraph::new(Line::from(line)).alignment(Alignment::Center).block(Block::default().borders(Borders::ALL)),
            chunks[0],
        );
        self.render_cards(frame, chunks[1]);
        if let Stage::Repeating { timer, .. } = self.stage {
            let total = SECS_PER_SIGN * self.sequence.len() as f32;
            let ratio = f64::from((timer.remaining() / total).clamp(0.0, 1.0));
            frame.render_widget(
                Gauge::default()
                    .block(Block::default().borders(Borders::ALL).title(" TIME "))
                    .gauge_style(Style::default().fg(Color::Cyan))
                    .ratio(ratio)
                    .label(format!("{:.1}s", timer.remaining())),
                chunks[2],
            );
        }
    }

    fn summary(&self) -> Summary {
        Summary::default()
            .line(format!("Score: {}", self.score))
            .line(format!("Rounds completed: {}", self.rounds))
            .line(format!("Longest sequence: {}", self.sequence.len()))
            .rated(rating(self.rounds as f32, &RATINGS, "KEEP PRACTICING"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game() -> MemoryGame {
        MemoryGame::new(&ArcadeConfig { seed: Some(12), ..Default::default() })
    }

    fn tick(dt: f32) -> Tick {
        Tick { index: 1, dt, fresh: true }
    }

    fn to_repeating(g: &mut MemoryGame) {
        for _ in 0..g.sequence.len() {
            g.on_tick(&SignInput(None), &tick(SHOW_SECS));
        }
        assert!(matches!(g.stage, Stage::Repeating { index: 0, .. }));
    }

    fn hold(g: &mut MemoryGame, sign: HandSign) {
        for _ in 0..MIN_SAMPLES {
            g.on_tick(&SignInput(Some(sign)), &tick(0.01));
        }
    }

    #[test]
    fn starts_with_three_signs() {
        let g = game();
        assert_eq!(g.sequence.len(), START_LENGTH);
        assert!(matches!(g.stage, Stage::Showing { index: 0, .. }));
    }

    #[test]
    fn repeating_the_sequence_scores_and_grows_it() {
        let mut g = game();
        to_repeating(&mut g);
        for sign in g.sequence.clone() {
            hold(&mut g, sign);
        }
        assert!(matches!(g.stage, Stage::Correct(_)));
        assert_eq!(g.score, 30);
        assert_eq!(g.rounds, 1);
        g.on_tick(&SignInput(None), &tick(PAUSE_SECS));
        assert_eq!(g.sequence.len(), START_LENGTH + 1);
        assert!(matches!(g.stage, Stage::Showing { index: 0, .. }));
    }

    #[test]
    fn wrong_sign_ends_after_a_pause() {
        let mut g = game();
        to_repeating(&mut g);
        let wrong = HandSign::ALL.into_iter().find(|s| *s != g.sequence[0]).unwrap();
        hold(&mut g, wrong);
        assert!(matches!(g.stage, Stage::Wrong(_)));
        assert_eq!(g.on_tick(&SignInput(None), &tick(1.0)), None);
        assert_eq!(g.on_tick(&SignInput(None), &tick(1.0)), Some(Outcome::GameOver));
    }

    #[test]
    fn running_out_of_time_is_wrong() {
        let mut g = game();
        to_repeating(&mut g);
        g.on_tick(&SignInput(None), &tick(SECS_PER_SIGN * START_LENGTH as f32));
        assert!(matches!(g.stage, Stage::Wrong(_)));
    }
}
