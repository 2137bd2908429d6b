use crate::config::{level, LevelDef, LETTERS_REQUIRED, LEVELS};
use crate::spawner::LetterRequest;

/// Where the current level stands. Exactly one phase holds at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoryPhase {
    CollectingRunes,
    /// All runes held; waiting for the track ahead to empty.
    PathClearing,
    /// Story object placed, 3-2-1-GO running.
    StoryIntro,
    Chase,
    /// The object got away; the player may retry.
    Escaped,
    /// Caught; gesture, password and unlock stages run.
    Caught,
    /// Runner gameplay is over; the cipher finale runs.
    Finale,
}

impl StoryPhase {
    pub fn code(self) -> f32 {
        match self {
            StoryPhase::CollectingRunes => 0.0,
            StoryPhase::PathClearing => 1.0,
            StoryPhase::StoryIntro => 2.0,
            StoryPhase::Chase => 3.0,
            StoryPhase::Escaped => 4.0,
            StoryPhase::Caught => 5.0,
            StoryPhase::Finale => 6.0,
        }
    }

    /// Phases in which the track scrolls and the player runs.
    pub fn is_running(self) -> bool {
        matches!(self, StoryPhase::CollectingRunes | StoryPhase::PathClearing | StoryPhase::Chase)
    }
}

#[derive(Debug, Clone)]
pub struct Progress {
    level: usize,
    letters: [Option<char>; LETTERS_REQUIRED],
    phase: StoryPhase,
}

impl Default for Progress {
    fn default() -> Self {
        Self::new()
    }
}

impl Progress {
    pub fn new() -> Self {
        Self {
            level: 0,
            letters: [None; LETTERS_REQUIRED],
            phase: StoryPhase::CollectingRunes,
        }
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn level_def(&self) -> &'static LevelDef {
        level(self.level)
    }

    pub fn phase(&self) -> StoryPhase {
        self.phase
    }

    pub fn set_phase(&mut self, phase: StoryPhase) {
        if self.phase != phase {
            log::info!("level {}: {:?} -> {:?}", self.level + 1, self.phase, phase);
            self.phase = phase;
        }
    }

    pub fn letters(&self) -> &[Option<char>; LETTERS_REQUIRED] {
        &self.letters
    }

    pub fn letters_filled(&self) -> usize {
        self.letters.iter().filter(|l| l.is_some()).count()
    }

    pub fn all_collected(&self) -> bool {
        self.letters_filled() == LETTERS_REQUIRED
    }

    pub fn first_unfilled_slot(&self) -> Option<usize> {
        self.letters.iter().position(|l| l.is_none())
    }

    /// The rune to offer next, if runes are still being collected.
    pub fn next_letter(&self) -> Option<LetterRequest> {
        if self.phase != StoryPhase::CollectingRunes {
            return None;
        }
        let slot = self.first_unfilled_slot()?;
        let ch = self.level_def().password.chars().nth(slot)?;
        Some(LetterRequest { slot, ch })
    }

    /// Fill a slot. A slot that is already filled is left alone.
    pub fn collect_letter(&mut self, slot: usize, ch: char) -> bool {
        match self.letters.get_mut(slot) {
            Some(entry @ None) => {
                *entry = Some(ch);
                if self.all_collected() && self.phase == StoryPhase::CollectingRunes {
                    self.set_phase(StoryPhase::PathClearing);
                }
                true
            }
            _ => false,
        }
    }

    pub fn story_object_active(&self) -> bool {
        matches!(self.phase, StoryPhase::StoryIntro | StoryPhase::Chase)
    }

    pub fn waiting_for_clear_path(&self) -> bool {
        self.phase == StoryPhase::PathClearing
    }

    pub fn chase_started(&self) -> bool {
        self.phase == StoryPhase::Chase
    }

    /// Back to before the story event; collected runes are kept.
    pub fn reset_for_retry(&mut self) {
        let phase = if self.all_collected() {
            StoryPhase::PathClearing
        } else {
            StoryPhase::CollectingRunes
        };
        self.set_phase(phase);
    }

    /// Move to the next level. Returns false when the last level was done.
    pub fn advance_level(&mut self) -> bool {
        if self.level_def().is_final || self.level + 1 >= LEVELS.len() {
            self.set_phase(StoryPhase::Finale);
            return false;
        }
        self.level += 1;
        self.letters = [None; LETTERS_REQUIRED];
        self.set_phase(StoryPhase::CollectingRunes);
        true
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
