use temple_engine::{Countdown, CountdownStep};

use crate::boosts::{BoostKind, BoostManager};
use crate::config::LivesSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// Reviving, invincible or already dead.
    Ignored,
    ShieldAbsorbed,
    Reviving { lives_left: u32 },
    GameOver,
}

impl HitOutcome {
    pub fn code(self) -> f32 {
        match self {
            HitOutcome::Ignored => 0.0,
            HitOutcome::ShieldAbsorbed => 1.0,
            HitOutcome::Reviving { .. } => 2.0,
            HitOutcome::GameOver => 3.0,
        }
    }

    /// A hit that costs a life.
    pub fn is_fatal(self) -> bool {
        matches!(self, HitOutcome::Reviving { .. } | HitOutcome::GameOver)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevivalStep {
    /// Whole seconds left on the revival countdown.
    Tick(u32),
    Revived,
}

#[derive(Debug, Clone)]
pub struct Lives {
    lives: u32,
    max_lives: u32,
    invincible: bool,
    reviving: bool,
    dead: bool,
    revival_secs: u32,
    countdown: Countdown,
}

impl Lives {
    pub fn new(settings: &LivesSettings) -> Self {
        Self {
            lives: settings.max_lives,
            max_lives: settings.max_lives,
            invincible: false,
            reviving: false,
            dead: false,
            revival_secs: (settings.revival_ms / 1000.0).ceil().max(1.0) as u32,
            countdown: Countdown::new(),
        }
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn max_lives(&self) -> u32 {
        self.max_lives
    }

    pub fn is_reviving(&self) -> bool {
        self.reviving
    }

    pub fn is_invincible(&self) -> bool {
        self.invincible
    }

    pub fn is_game_over(&self) -> bool {
        self.dead
    }

    /// Seconds shown when a revival starts.
    pub fn revival_secs(&self) -> u32 {
        self.revival_secs
    }

    /// Apply an obstacle hit. An active shield is consumed instead of a life.
    pub fn register_hit(&mut self, boosts: &mut BoostManager, now_ms: f64) -> HitOutcome {
        if self.dead || self.reviving || self.invincible {
            return HitOutcome::Ignored;
        }
        if boosts.deactivate(BoostKind::Shield) {
            return HitOutcome::ShieldAbsorbed;
        }
        self.lives = self.lives.saturating_sub(1);
        if self.lives == 0 {
            self.dead = true;
            self.countdown.cancel();
            return HitOutcome::GameOver;
        }
        self.reviving = true;
        self.invincible = true;
        self.countdown.start(now_ms, self.revival_secs, 1000.0);
        HitOutcome::Reviving { lives_left: self.lives }
    }

    pub fn poll(&mut self, now_ms: f64) -> Option<RevivalStep> {
        match self.countdown.poll(now_ms)? {
            CountdownStep::Tick(secs) => Some(RevivalStep::Tick(secs)),
            CountdownStep::Done => {
                self.reviving = false;
                self.invincible = false;
                Some(RevivalStep::Revived)
            }
        }
    }

    pub fn reset(&mut self) {
        self.lives = self.max_lives;
        self.invincible = false;
        self.reviving = false;
        self.dead = false;
        self.countdown.cancel();
    }
}
