// extensions/sequence.rs
//
// Ordered presentation stages driven by game time.
//
// Usage:
//   let mut seq = StageSequence::new(vec![
//       Stage::timed(Unlock::Hacking, 2500.0),
//       Stage::manual(Unlock::Morse),
//   ]);
//   seq.start(now);
//   if let Some(StageChange::Entered(s)) = seq.tick(now) { ... }

/// One stage: timed stages advance on their own, manual stages wait for `advance`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stage<S> {
    pub id: S,
    pub duration_ms: Option<f64>,
}

impl<S> Stage<S> {
    pub fn timed(id: S, duration_ms: f64) -> Self {
        Self { id, duration_ms: Some(duration_ms) }
    }

    pub fn manual(id: S) -> Self {
        Self { id, duration_ms: None }
    }
}

/// A transition reported by the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageChange<S> {
    Entered(S),
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SequenceState {
    Idle,
    Running(usize),
    Finished,
}

#[derive(Debug, Clone)]
pub struct StageSequence<S> {
    stages: Vec<Stage<S>>,
    state: SequenceState,
    entered_at_ms: f64,
}

impl<S: Copy + PartialEq> StageSequence<S> {
    pub fn new(stages: Vec<Stage<S>>) -> Self {
        Self {
            stages,
            state: SequenceState::Idle,
            entered_at_ms: 0.0,
        }
    }

    /// Enter the first stage. Restarts a sequence that already ran.
    pub fn start(&mut self, now_ms: f64) -> StageChange<S> {
        self.enter(0, now_ms)
    }

    /// Drop back to idle without reporting anything.
    pub fn reset(&mut self) {
        self.state = SequenceState::Idle;
    }

    pub fn current(&self) -> Option<S> {
        match self.state {
            SequenceState::Running(i) => self.stages.get(i).map(|s| s.id),
            _ => None,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, SequenceState::Running(_))
    }

    pub fn is_finished(&self) -> bool {
        self.state == SequenceState::Finished
    }

    /// Advance past a timed stage whose duration has elapsed.
    /// At most one transition per call.
    pub fn tick(&mut self, now_ms: f64) -> Option<StageChange<S>> {
        let SequenceState::Running(i) = self.state else {
            return None;
        };
        let duration = self.stages.get(i)?.duration_ms?;
        if now_ms - self.entered_at_ms >= duration {
            Some(self.enter(i + 1, now_ms))
        } else {
            None
        }
    }

    /// Leave the current stage immediately (manual continue or skip).
    pub fn advance(&mut self, now_ms: f64) -> Option<StageChange<S>> {
        match self.state {
            SequenceState::Running(i) => Some(self.enter(i + 1, now_ms)),
            _ => None,
        }
    }

    /// Jump to the first stage with the given id.
    pub fn jump_to(&mut self, id: S, now_ms: f64) -> Option<StageChange<S>> {
        let idx = self.stages.iter().position(|s| s.id == id)?;
        Some(self.enter(idx, now_ms))
    }

    /// Fraction of the current timed stage that has elapsed, in [0, 1].
    /// Manual stages report 0.
    pub fn progress(&self, now_ms: f64) -> f32 {
        let SequenceState::Running(i) = self.state else {
            return if self.is_finished() { 1.0 } else { 0.0 };
        };
        match self.stages.get(i).and_then(|s| s.duration_ms) {
            Some(d) if d > 0.0 => ((now_ms - self.entered_at_ms) / d).clamp(0.0, 1.0) as f32,
            Some(_) => 1.0,
            None => 0.0,
        }
    }

    fn enter(&mut self, index: usize, now_ms: f64) -> StageChange<S> {
        self.entered_at_ms = now_ms;
        match self.stages.get(index) {
            Some(stage) => {
                self.state = SequenceState::Running(index);
                StageChange::Entered(stage.id)
            }
            None => {
                self.state = SequenceState::Finished;
                StageChange::Finished
            }
        }
    }
}
