/// Session state shared by every game: phase, score and timers.

/// Where the engine is in a game's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Menu,
    Playing,
    Results(Outcome),
}

impl Phase {
    /// Menu → Playing.
    pub fn start(self) -> Phase {
        match self {
            Phase::Menu => Phase::Playing,
            other => other,
        }
    }

    /// Playing → Results.
    pub fn finish(self, outcome: Outcome) -> Phase {
        match self {
            Phase::Playing => Phase::Results(outcome),
            other => other,
        }
    }

    /// Results → Menu.
    pub fn back_to_menu(self) -> Phase {
        match self {
            Phase::Results(_) => Phase::Menu,
            other => other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    GameOver,
    Victory,
    Abandoned,
}

impl Outcome {
    pub fn title(&self) -> &'static str {
        match self {
            Outcome::GameOver => "GAME OVER",
            Outcome::Victory => "VICTORY",
            Outcome::Abandoned => "SESSION ENDED",
        }
    }
}

/// One engine step as seen by a game.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    pub index: u64,
    /// Seconds per tick.
    pub dt: f32,
    /// True when a new detection frame arrived since the previous tick.
    pub fresh: bool,
}

impl Tick {
    pub fn every(&self, ticks: u64) -> bool {
        ticks != 0 && self.index % ticks == 0
    }
}

/// Score, combo and lives for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scoreboard {
    pub score: u64,
    pub combo: u32,
    pub best_combo: u32,
    pub lives: u32,
}

impl Scoreboard {
    pub fn new(lives: u32) -> Self {
        Self { score: 0, combo: 0, best_combo: 0, lives }
    }

    /// Awards `base × (1 + 0.1 × combo)` and extends the combo. Returns the points awarded.
    pub fn hit(&mut self, base: u64) -> u64 {
        let points = self.award(base);
        self.bump_combo();
        points
    }

    /// Awards `base` scaled by the current combo without extending it.
    pub fn award(&mut self, base: u64) -> u64 {
        let points = base * (10 + u64::from(self.combo)) / 10;
        self.score += points;
        points
    }

    pub fn add(&mut self, points: u64) {
        self.score += points;
    }

    pub fn bump_combo(&mut self) {
        self.combo += 1;
        self.best_combo = self.best_combo.max(self.combo);
    }

    pub fn miss(&mut self) {
        self.combo = 0;
    }

    /// Takes a life and resets the combo. Returns whether any lives remain.
    pub fn lose_life(&mut self) -> bool {
        self.lives = self.lives.saturating_sub(1);
        self.combo = 0;
        self.lives > 0
    }
}

/// Countdown in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timer {
    remaining: f32,
    duration: f32,
}

impl Timer {
    pub fn new(seconds: f32) -> Self {
        Self { remaining: seconds, duration: seconds }
    }

    /// Counts down and reports whether the timer has run out.
    pub fn tick(&mut self, dt: f32) -> bool {
        self.remaining = (self.remaining - dt).max(0.0);
        self.finished()
    }

    pub fn finished(&self) -> bool {
        self.remaining <= 0.0
    }

    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    pub fn elapsed(&self) -> f32 {
        self.duration - self.remaining
    }

    pub fn restart(&mut self) {
        self.remaining = self.duration;
    }
}

/// Text for the results screen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    pub lines: Vec<String>,
    pub rating: Option<&'static str>,
}

impl Summary {
    pub fn line(mut self, text: impl Into<String>) -> Self {
        self.lines.push(text.into());
        self
    }

    pub fn rated(mut self, rating: &'static str) -> Self {
        self.rating = Some(rating);
        self
    }
}

/// Picks the first label whose threshold `value` reaches, thresholds in descending order.
pub fn rating(value: f32, tiers: &[(f32, &'static str)], fallback: &'static str) -> &'static str {
    tiers.iter().find(|(min, _)| value >= *min).map_or(fallback, |(_, label)| *label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combo_hits_sum_base_times_multiplier() {
        let mut board = Scoreboard::new(3);
        let base = 50;
        let n = 12u64;
        for _ in 0..n {
            board.hit(base);
        }
        let expected: u64 = (0..n).map(|combo| base * (10 + combo) / 10).sum();
        assert_eq!(board.score, expected);
        assert_eq!(board.combo, 12);
        assert_eq!(board.best_combo, 12);
    }

    #[test]
    fn miss_resets_combo_but_keeps_best() {
        let mut board = Scoreboard::new(1);
        board.hit(10);
        board.hit(10);
        board.miss();
        assert_eq!(board.combo, 0);
        assert_eq!(board.best_combo, 2);
        assert_eq!(board.hit(10), 10);
    }

    #[test]
    fn last_life_ends_session() {
        let mut board = Scoreboard::new(2);
        assert!(board.lose_life());
        assert!(!board.lose_life());
        assert!(!board.lose_life());
        assert_eq!(board.lives, 0);
    }

    #[test]
    fn phase_transitions() {
        let phase = Phase::Menu.start();
        assert_eq!(phase, Phase::Playing);
        let phase = phase.finish(Outcome::Victory);
        assert_eq!(phase, Phase::Results(Outcome::Victory));
        assert_eq!(phase.start(), phase);
        assert_eq!(phase.back_to_menu(), Phase::Menu);
    }

    #[test]
    fn timer_runs_out() {
        let mut t = Timer::new(0.05);
        assert!(!t.tick(0.02));
        assert!(!t.tick(0.02));
        assert!(t.tick(0.02));
        assert_eq!(t.remaining(), 0.0);
    }

    #[test]
    fn ratings_pick_first_reached_tier() {
        let tiers = [(1000.0, "LEGEND"), (500.0, "GREAT")];
        assert_eq!(rating(700.0, &tiers, "KEEP GOING"), "GREAT");
        assert_eq!(rating(10.0, &tiers, "KEEP GOING"), "KEEP GOING");
    }
}
