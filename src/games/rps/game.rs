use crossterm::event::{KeyCode, KeyEvent};
use rand::{rngs::StdRng, Rng};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect as Area},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use tracing::info;

use crate::core::config::ArcadeConfig;
use crate::core::game::{ArcadeGame, Tracking};
use crate::core::landmarks::{DetectionFrame, HandLandmark};
use crate::core::renderer::{draw_hud, split_hud, stat};
use crate::core::session::{Outcome, Summary, Tick, Timer};
use crate::core::smoothing::MajorityWindow;
use crate::gesture::hand::{rps_throw, Throw};

const COUNTDOWN_SECS: f32 = 3.0;
const RESULT_SECS: f32 = 3.0;
const WINDOW: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundResult {
    Win,
    Lose,
    Tie,
    /// No throw was recognised before the countdown ended.
    NoThrow,
}

pub fn judge(player: Option<Throw>, computer: Throw) -> RoundResult {
    match player {
        None => RoundResult::NoThrow,
        Some(p) if p == computer => RoundResult::Tie,
        Some(p) if p.beats(computer) => RoundResult::Win,
        Some(_) => RoundResult::Lose,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Stage {
    Waiting,
    Countdown(Timer),
    Showing { timer: Timer, player: Option<Throw>, computer: Throw, result: RoundResult },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ThrowInput(pub Option<Throw>);

pub struct RpsGame {
    rng: StdRng,
    target: u32,
    stage: Stage,
    window: MajorityWindow<Throw>,
    start_requested: bool,
    wins: u32,
    losses: u32,
    ties: u32,
    no_throws: u32,
}

impl RpsGame {
    pub fn new(config: &ArcadeConfig) -> Self {
        let mut game = Self {
            rng: config.rng(),
            target: config.rps_target.max(1),
            stage: Stage::Waiting,
            window: MajorityWindow::new(WINDOW),
            start_requested: false,
            wins: 0,
            losses: 0,
            ties: 0,
            no_throws: 0,
        };
        game.reset();
        game
    }

    fn record(&mut self, result: RoundResult) {
        match result {
            RoundResult::Win => self.wins += 1,
            RoundResult::Lose => self.losses += 1,
            RoundResult::Tie => self.ties += 1,
            RoundResult::NoThrow => self.no_throws += 1,
        }
    }

    fn throw_round(&mut self) -> Stage {
        let player = self.window.majority();
        let computer = Throw::ALL[self.rng.random_range(0..Throw::ALL.len())];
        let result = judge(player, computer);
        self.record(result);
        info!(player = ?player, computer = ?computer, ?result, "round played");
        Stage::Showing { timer: Timer::new(RESULT_SECS), player, computer, result }
    }
}

impl ArcadeGame for RpsGame {
    type Input = ThrowInput;

    fn tracking(&self) -> Tracking {
        Tracking::Hands { anchor: HandLandmark::Wrist }
    }

    fn controls(&self) -> &'static [&'static str] {
        &[
            "[SPACE] Start a round, then show your hand before the countdown ends",
            "Fist = rock, open hand = paper, two fingers = scissors",
            "First to the target score wins",
        ]
    }

    fn reset(&mut self) {
        self.stage = Stage::Waiting;
        self.window.clear();
        self.start_requested = false;
        self.wins = 0;
        self.losses = 0;
        self.ties = 0;
        self.no_throws = 0;
    }

    fn classify(&self, frame: &DetectionFrame) -> ThrowInput {
        ThrowInput(frame.hand().and_then(rps_throw))
    }

    fn on_tick(&mut self, input: &ThrowInput, tick: &Tick) -> Option<Outcome> {
        if tick.fresh {
            if let Some(throw) = input.0 {
                self.window.push(throw);
            }
        }
        let start = std::mem::take(&mut self.start_requested);
        self.stage = match self.stage {
            Stage::Waiting if start => {
                self.window.clear();
                Stage::Countdown(Timer::new(COUNTDOWN_SECS))
            }
            Stage::Waiting => Stage::Waiting,
            Stage::Countdown(mut timer) => {
                if timer.tick(tick.dt) {
                    self.throw_round()
                } else {
                    Stage::Countdown(timer)
                }
            }
            Stage::Showing { mut timer, player, computer, result } => {
                if !timer.tick(tick.dt) {
                    Stage::Showing { timer, player, computer, result }
                } else if self.wins >= self.target {
                    return Some(Outcome::Victory);
                } else if self.losses >= self.target {
                    return Some(Outcome::GameOver);
                } else {
                    Stage::Waiting
                }
            }
        };
        None
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char(' ') && self.stage == Stage::Waiting {
            self.start_requested = true;
        }
    }

    fn render(&self, frame: &mut Frame, area: Area) {
        let (hud, body) = split_hud(area);
        draw_hud(
            frame,
            hud,
            vec![
                stat("YOU", self.wins),
                stat("CPU", self.losses),
                stat("TIES", self.ties),
                stat("FIRST TO", self.target),
            ],
        );
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(body);
        let bold = |color| Style::default().fg(color).add_modifier(Modifier::BOLD);
        let name = |t: Option<Throw>| t.map_or("?", |t| t.name());

        let (left, right, banner): (Vec<Line>, Vec<Line>, Line) = match self.stage {
            Stage::Waiting => (
                vec![Line::from("Ready")],
                vec![Line::from("Ready")],
                Line::styled("[SPACE] Play a round", bold(Color::Yellow)),
            ),
            Stage::Countdown(timer) => (
                vec![Line::from(format!("Seen: {}", name(self.window.majority())))],
                vec![Line::from("...")],
                Line::styled(format!("{}", timer.remaining().ceil() as u32), bold(Color::Yellow)),
            ),
            Stage::Showing { player, computer, result, .. } => {
                let (text, color) = match result {
                    RoundResult::Win => ("YOU WIN!", Color::Green),
                    RoundResult::Lose => ("CPU WINS", Color::Red),
                    RoundResult::Tie => ("TIE", Color::Yellow),
                    RoundResult::NoThrow => ("NO THROW SEEN", Color::DarkGray),
                };
                (
                    vec![Line::styled(name(player), bold(Color::Cyan))],
                    vec![Line::styled(computer.name(), bold(Color::Magenta))],
                    Line::styled(text, bold(color)),
                )
            }
        };
        let mut left = left;
        left.push(Line::from(""));
        left.push(banner);
        frame.render_widget(
            Paragraph::new(left).alignment(Alignment::Center).block(Block::default().borders(Borders::ALL).title(" YOU ")),
            chunks[0],
        );
        frame.render_widget(
            Paragraph::new(right).alignment(Alignment::Center).block(Block::default().borders(Borders::ALL).title(" CPU ")),
            chunks[1],
        );
    }

    fn summary(&self) -> Summary {
        let played = self.wins + self.losses + self.ties;
        let win_rate = if played == 0 { 0.0 } else { self.wins as f32 * 100.0 / played as f32 };
        Summary::default()
            .line(format!("You {} - {} CPU", self.wins, self.losses))
            .line(format!("Ties: {}  Rounds without a throw: {}", self.ties, self.no_throws))
            .line(format!("Win rate: {win_rate:.0}%"))
    }
}
