//! The end-game cipher: translation cinematics, five gesture locks,
//! the combined password and the closing stages.

use serde::Serialize;
use temple_engine::{Stage, StageChange, StageSequence};

use crate::config::{combined_password, LEVELS};

pub const CIPHER_STAGES: usize = 5;

const UNLOCK_STEPS: f64 = 6.0;
const UNLOCKING_MS: f64 = UNLOCK_STEPS * (420.0 + 250.0) + 700.0;
const CREDITS_MS: f64 = 30_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinaleStage {
    ShowMorse,
    KeyboardShuffle,
    LockEnglish,
    Analyze,
    HeartFill,
    Final,
    GestureUnlock,
    PasswordEntry,
    Unlocking,
    TempleWall,
    Credits,
    Dialog,
}

impl FinaleStage {
    pub fn code(self) -> f32 {
        match self {
            FinaleStage::ShowMorse => 0.0,
            FinaleStage::KeyboardShuffle => 1.0,
            FinaleStage::LockEnglish => 2.0,
            FinaleStage::Analyze => 3.0,
            FinaleStage::HeartFill => 4.0,
            FinaleStage::Final => 5.0,
            FinaleStage::GestureUnlock => 6.0,
            FinaleStage::PasswordEntry => 7.0,
            FinaleStage::Unlocking => 8.0,
            FinaleStage::TempleWall => 9.0,
            FinaleStage::Credits => 10.0,
            FinaleStage::Dialog => 11.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentState {
    /// Not enough characters typed yet.
    Pending,
    Matched,
    Mismatched,
}

impl SegmentState {
    pub fn code(self) -> f32 {
        match self {
            SegmentState::Pending => 0.0,
            SegmentState::Matched => 1.0,
            SegmentState::Mismatched => 2.0,
        }
    }
}

/// Per-password feedback while the combined password is typed.
pub fn segment_states(typed: &str) -> [SegmentState; CIPHER_STAGES] {
    let typed: Vec<char> = typed.trim().to_uppercase().chars().collect();
    let mut states = [SegmentState::Pending; CIPHER_STAGES];
    let mut offset = 0;
    for (state, level) in states.iter_mut().zip(LEVELS.iter()) {
        let segment: Vec<char> = level.password.to_uppercase().chars().collect();
        let end = offset + segment.len();
        if typed.len() >= end {
            *state = if typed[offset..end] == segment[..] {
                SegmentState::Matched
            } else {
                SegmentState::Mismatched
            };
        }
        offset = end;
    }
    states
}

pub fn password_matches(typed: &str) -> bool {
    typed.trim().to_uppercase() == combined_password().to_uppercase()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Yes,
    No,
}

impl Answer {
    pub fn as_str(self) -> &'static str {
        match self {
            Answer::Yes => "YES",
            Answer::No => "NO",
        }
    }
}

/// What the finish relay forwards: `{answer, score, level}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionReport {
    pub answer: String,
    pub score: u64,
    pub level: u32,
}

#[derive(Debug, Clone)]
pub struct Finale {
    sequence: StageSequence<FinaleStage>,
    verified: [bool; CIPHER_STAGES],
    answer: Option<Answer>,
}

impl Default for Finale {
    fn default() -> Self {
        Self::new()
    }
}

impl Finale {
    pub fn new() -> Self {
        Self {
            sequence: StageSequence::new(vec![
                Stage::timed(FinaleStage::ShowMorse, 2000.0),
                Stage::timed(FinaleStage::KeyboardShuffle, 3500.0),
                Stage::timed(FinaleStage::LockEnglish, 1500.0),
                Stage::timed(FinaleStage::Analyze, 2000.0),
                Stage::timed(FinaleStage::HeartFill, 2500.0),
                Stage::timed(FinaleStage::Final, 1500.0),
                Stage::manual(FinaleStage::GestureUnlock),
                Stage::manual(FinaleStage::PasswordEntry),
                Stage::timed(FinaleStage::Unlocking, UNLOCKING_MS),
                Stage::manual(FinaleStage::TempleWall),
                Stage::timed(FinaleStage::Credits, CREDITS_MS),
                Stage::manual(FinaleStage::Dialog),
            ]),
            verified: [false; CIPHER_STAGES],
            answer: None,
        }
    }

    pub fn start(&mut self, now_ms: f64) -> StageChange<FinaleStage> {
        self.verified = [false; CIPHER_STAGES];
        self.answer = None;
        log::info!("cipher finale started");
        self.sequence.start(now_ms)
    }

    pub fn current(&self) -> Option<FinaleStage> {
        self.sequence.current()
    }

    pub fn is_finished(&self) -> bool {
        self.sequence.is_finished()
    }

    pub fn poll(&mut self, now_ms: f64) -> Option<StageChange<FinaleStage>> {
        self.sequence.tick(now_ms)
    }

    pub fn verified(&self) -> &[bool; CIPHER_STAGES] {
        &self.verified
    }

    pub fn all_verified(&self) -> bool {
        self.verified.iter().all(|v| *v)
    }

    /// Mark one gesture lock open. Returns true only the first time.
    pub fn verify_stage(&mut self, index: usize) -> bool {
        if self.current() != Some(FinaleStage::GestureUnlock) {
            return false;
        }
        match self.verified.get_mut(index) {
            Some(v @ false) => {
                *v = true;
                true
            }
            _ => false,
        }
    }

    /// Password entry opens once every lock is verified.
    pub fn unlock_password_entry(&mut self, now_ms: f64) -> Option<StageChange<FinaleStage>> {
        if self.current() == Some(FinaleStage::GestureUnlock) && self.all_verified() {
            self.sequence.advance(now_ms)
        } else {
            None
        }
    }

    /// `None` when the password is wrong or entry is not open.
    pub fn submit_password(&mut self, typed: &str, now_ms: f64) -> Option<StageChange<FinaleStage>> {
        if self.current() != Some(FinaleStage::PasswordEntry) || !password_matches(typed) {
            return None;
        }
        self.sequence.advance(now_ms)
    }

    /// Leave the temple wall, or skip the credits.
    pub fn continue_stage(&mut self, now_ms: f64) -> Option<StageChange<FinaleStage>> {
        match self.current() {
            Some(FinaleStage::TempleWall | FinaleStage::Credits) => self.sequence.advance(now_ms),
            _ => None,
        }
    }

    /// Record the player's answer. Only the first answer in the dialog counts.
    pub fn answer(&mut self, answer: Answer, score: u64, level: u32, now_ms: f64) -> Option<CompletionReport> {
        if self.current() != Some(FinaleStage::Dialog) || self.answer.is_some() {
            return None;
        }
        self.answer = Some(answer);
        self.sequence.advance(now_ms);
        Some(CompletionReport { answer: answer.as_str().to_string(), score, level })
    }

    pub fn reset(&mut self) {
        self.sequence.reset();
        self.verified = [false; CIPHER_STAGES];
        self.answer = None;
    }
}
