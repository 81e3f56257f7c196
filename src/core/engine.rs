use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{
    DisableMouseCapture, EnableMouseCapture, Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
};
use crossterm::execute;
use futures_util::StreamExt;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    DefaultTerminal, Frame,
};
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::core::config::ArcadeConfig;
use crate::core::emulator::PointerEmulator;
use crate::core::feed::{FeedEvent, LandmarkFeed};
use crate::core::game::ArcadeGame;
use crate::core::landmarks::DetectionFrame;
use crate::core::menu;
use crate::core::session::{Outcome, Phase, Tick};
use crate::games::GameInfo;

/// Everything a game needs besides itself to run.
pub struct EngineOptions {
    pub info: GameInfo,
    pub config: ArcadeConfig,
    /// `None` runs the pointer emulator.
    pub feed: Option<LandmarkFeed>,
    pub feed_label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

pub struct Engine<G: ArcadeGame> {
    game: G,
    info: GameInfo,
    config: ArcadeConfig,
    feed: Option<LandmarkFeed>,
    feed_label: String,
    emulator: Option<PointerEmulator>,
    phase: Phase,
    latest: DetectionFrame,
    fresh: bool,
    input: G::Input,
    tick_index: u64,
    screen: Rect,
}

impl<G: ArcadeGame> Engine<G> {
    pub fn new(game: G, options: EngineOptions) -> Self {
        let emulator = options.feed.is_none().then(|| PointerEmulator::new(game.tracking()));
        Self {
            game,
            info: options.info,
            config: options.config,
            feed: options.feed,
            feed_label: options.feed_label,
            emulator,
            phase: Phase::Menu,
            latest: DetectionFrame::default(),
            fresh: false,
            input: G::Input::default(),
            tick_index: 0,
            screen: Rect::default(),
        }
    }

    pub async fn run(mut self, mut terminal: DefaultTerminal) -> Result<()> {
        execute!(std::io::stdout(), EnableMouseCapture).context("failed to enable mouse capture")?;
        let result = self.event_loop(&mut terminal).await;
        if let Err(e) = execute!(std::io::stdout(), DisableMouseCapture) {
            warn!(error = ?e, "failed to release mouse capture");
        }
        result
    }

    async fn event_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        let mut events = EventStream::new();
        let mut ticker = tokio::time::interval(Duration::from_secs_f32(self.config.tick_secs()));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut feed = self.feed.take();
        let paced = feed.as_ref().is_some_and(LandmarkFeed::is_paced);

        loop {
            tokio::select! {
                // 1. TICK: classify, step the game, draw
                _ = ticker.tick() => {
                    self.step(&mut feed).await?;
                    terminal.draw(|f| self.draw(f))?;
                }

                // 2. INPUT: keys for the engine/game, mouse for the emulator
                maybe_event = events.next() => match maybe_event {
                    Some(Ok(event)) => {
                        if self.handle_event(event) == Flow::Quit {
                            break;
                        }
                    }
                    Some(Err(e)) => return Err(e).context("terminal event stream failed"),
                    None => break,
                },

                // 3. FEED: newest live detections replace the previous frame
                event = next_feed_event(&mut feed), if !paced => {
                    self.on_feed_event(event?, &mut feed);
                }
            }
        }
        Ok(())
    }

    /// One tick. A paced feed gives up exactly one line per playing tick, so a
    /// replay runs at the recorded rate and waits on the menu.
    async fn step(&mut self, feed: &mut Option<LandmarkFeed>) -> Result<()> {
        if self.phase == Phase::Playing {
            if let Some(replay) = feed.as_mut().filter(|f| f.is_paced()) {
                let event = replay.next_event().await?;
                self.on_feed_event(event, feed);
            }
        }
        self.advance();
        Ok(())
    }

    fn on_feed_event(&mut self, event: FeedEvent, feed: &mut Option<LandmarkFeed>) {
        match event {
            FeedEvent::Frame(frame) => {
                self.latest = frame;
                self.fresh = true;
            }
            FeedEvent::Skipped => {}
            FeedEvent::Closed => {
                *feed = None;
                self.feed_label = format!("{} (ended)", self.feed_label);
                self.latest = DetectionFrame::default();
                self.finish(Outcome::Abandoned);
            }
        }
    }

    fn advance(&mut self) {
        if let Some(emulator) = &self.emulator {
            self.latest = emulator.frame();
            self.fresh = true;
        }
        if self.phase != Phase::Playing {
            return;
        }
        if self.fresh {
            self.input = self.game.classify(&self.latest);
        }
        self.tick_index += 1;
        let tick = Tick { index: self.tick_index, dt: self.config.tick_secs(), fresh: self.fresh };
        self.fresh = false;
        if let Some(outcome) = self.game.on_tick(&self.input, &tick) {
            self.finish(outcome);
        }
    }

    fn start(&mut self) {
        self.game.reset();
        self.input = G::Input::default();
        self.tick_index = 0;
        self.phase = self.phase.start();
        info!(game = self.info.id, "session started");
    }

    fn finish(&mut self, outcome: Outcome) {
        if self.phase != Phase::Playing {
            return;
        }
        self.phase = self.phase.finish(outcome);
        let summary = self.game.summary();
        info!(game = self.info.id, ?outcome, ticks = self.tick_index, results = ?summary.lines, "session finished");
    }

    fn handle_event(&mut self, event: Event) -> Flow {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
            Event::Mouse(mouse) => {
                if let Some(emulator) = &mut self.emulator {
                    emulator.handle_mouse(mouse, self.screen);
                }
                Flow::Continue
            }
            _ => Flow::Continue,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Flow {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Flow::Quit;
        }
        match self.phase {
            Phase::Menu => match key.code {
                KeyCode::Char(' ') | KeyCode::Enter => self.start(),
                KeyCode::Esc | KeyCode::Char('q') => return Flow::Quit,
                _ => {
                    self.emulator_key(key);
                }
            },
            Phase::Playing => match key.code {
                KeyCode::Esc => self.finish(Outcome::Abandoned),
                _ => {
                    if !self.emulator_key(key) {
                        self.game.handle_key(key);
                    }
                }
            },
            Phase::Results(_) => match key.code {
                KeyCode::Char(' ') | KeyCode::Enter => self.phase = self.phase.back_to_menu(),
                KeyCode::Esc | KeyCode::Char('q') => return Flow::Quit,
                _ => {}
            },
        }
        Flow::Continue
    }

    fn emulator_key(&mut self, key: KeyEvent) -> bool {
        self.emulator.as_mut().is_some_and(|emulator| emulator.handle_key(key))
    }

    fn draw(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(f.area());
        self.screen = chunks[0];

        match self.phase {
            Phase::Menu => menu::render_menu(f, chunks[0], &self.info, self.game.controls(), self.emulator.is_some()),
            Phase::Playing => self.game.render(f, chunks[0]),
            Phase::Results(outcome) => menu::render_results(f, chunks[0], &self.info, outcome, &self.game.summary()),
        }

        let preset = self.emulator.as_ref().map(|e| e.preset_name());
        menu::render_status(f, chunks[1], &self.feed_label, !self.latest.is_empty(), preset);
    }
}

/// Waits forever when there is no feed, so the branch never fires.
async fn next_feed_event(feed: &mut Option<LandmarkFeed>) -> Result<FeedEvent> {
    match feed {
        Some(feed) => feed.next_event().await,
        None => std::future::pending().await,
    }
}
