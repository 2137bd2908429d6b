use temple_engine::{Countdown, CountdownStep, Stage, StageChange, StageSequence};

const HACKING_MS: f64 = 2500.0;
const COUNTDOWN_FROM: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockStage {
    Hacking,
    /// Shows the level message in Morse until the player continues.
    Morse,
    NextLevelCountdown,
}

impl UnlockStage {
    pub fn code(self) -> f32 {
        match self {
            UnlockStage::Hacking => 0.0,
            UnlockStage::Morse => 1.0,
            UnlockStage::NextLevelCountdown => 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockStep {
    Entered(UnlockStage),
    /// Countdown value to show; 0 is GO.
    Countdown(u32),
    NextLevel,
    Finale,
}

/// Stages between a verified level and the next run.
#[derive(Debug, Clone)]
pub struct LevelUnlock {
    sequence: StageSequence<UnlockStage>,
    countdown: Countdown,
    is_final: bool,
}

impl Default for LevelUnlock {
    fn default() -> Self {
        Self::new()
    }
}

impl LevelUnlock {
    pub fn new() -> Self {
        Self {
            sequence: StageSequence::new(vec![
                Stage::timed(UnlockStage::Hacking, HACKING_MS),
                Stage::manual(UnlockStage::Morse),
                Stage::manual(UnlockStage::NextLevelCountdown),
            ]),
            countdown: Countdown::new(),
            is_final: false,
        }
    }

    pub fn current(&self) -> Option<UnlockStage> {
        self.sequence.current()
    }

    pub fn is_running(&self) -> bool {
        self.sequence.is_running()
    }

    pub fn start(&mut self, now_ms: f64, is_final: bool) -> UnlockStep {
        self.is_final = is_final;
        self.countdown.cancel();
        match self.sequence.start(now_ms) {
            StageChange::Entered(stage) => UnlockStep::Entered(stage),
            StageChange::Finished => UnlockStep::NextLevel,
        }
    }

    /// Continue from the Morse stage. Anything else ignores the request.
    pub fn continue_from_morse(&mut self, now_ms: f64) -> Vec<UnlockStep> {
        if self.sequence.current() != Some(UnlockStage::Morse) {
            return Vec::new();
        }
        if self.is_final {
            self.sequence.reset();
            return vec![UnlockStep::Finale];
        }
        let mut steps = Vec::new();
        if let Some(StageChange::Entered(stage)) = self.sequence.advance(now_ms) {
            steps.push(UnlockStep::Entered(stage));
            self.countdown.start(now_ms, COUNTDOWN_FROM, 1000.0);
            steps.push(UnlockStep::Countdown(COUNTDOWN_FROM));
        }
        steps
    }

    pub fn poll(&mut self, now_ms: f64) -> Vec<UnlockStep> {
        let mut steps = Vec::new();
        if let Some(StageChange::Entered(stage)) = self.sequence.tick(now_ms) {
            steps.push(UnlockStep::Entered(stage));
        }
        match self.countdown.poll(now_ms) {
            Some(CountdownStep::Tick(n)) => steps.push(UnlockStep::Countdown(n)),
            Some(CountdownStep::Done) => {
                steps.push(UnlockStep::Countdown(0));
                steps.push(UnlockStep::NextLevel);
                self.sequence.reset();
            }
            None => {}
        }
        steps
    }

    pub fn reset(&mut self) {
        self.sequence.reset();
        self.countdown.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hacking_then_morse_then_countdown() {
        let mut u = LevelUnlock::new();
        assert_eq!(u.start(0.0, false), UnlockStep::Entered(UnlockStage::Hacking));
        assert!(u.poll(2000.0).is_empty());
        assert_eq!(u.poll(2500.0), vec![UnlockStep::Entered(UnlockStage::Morse)]);
        assert!(u.poll(60_000.0).is_empty());

        let steps = u.continue_from_morse(60_000.0);
        assert_eq!(
            steps,
            vec![UnlockStep::Entered(UnlockStage::NextLevelCountdown), UnlockStep::Countdown(3)]
        );
        assert_eq!(u.poll(61_000.0), vec![UnlockStep::Countdown(2)]);
        assert_eq!(u.poll(62_000.0), vec![UnlockStep::Countdown(1)]);
        assert_eq!(u.poll(63_000.0), vec![UnlockStep::Countdown(0), UnlockStep::NextLevel]);
        assert!(!u.is_running());
    }

    #[test]
    fn final_level_skips_the_countdown() {
        let mut u = LevelUnlock::new();
        u.start(0.0, true);
        u.poll(2500.0);
        assert_eq!(u.continue_from_morse(3000.0), vec![UnlockStep::Finale]);
        assert!(u.poll(10_000.0).is_empty());
    }

    #[test]
    fn continue_is_ignored_while_hacking() {
        let mut u = LevelUnlock::new();
        u.start(0.0, false);
        assert!(u.continue_from_morse(100.0).is_empty());
        assert_eq!(u.current(), Some(UnlockStage::Hacking));
    }
}
