use temple_engine::{TimerHandle, TimerSlot};

use crate::config::BoostSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoostKind {
    Speed,
    Shield,
    Magnet,
    Double,
}

impl BoostKind {
    pub const ALL: [BoostKind; 4] = [BoostKind::Speed, BoostKind::Shield, BoostKind::Magnet, BoostKind::Double];

    pub fn index(self) -> usize {
        match self {
            BoostKind::Speed => 0,
            BoostKind::Shield => 1,
            BoostKind::Magnet => 2,
            BoostKind::Double => 3,
        }
    }

    pub fn code(self) -> f32 {
        self.index() as f32
    }
}

#[derive(Debug, Clone, Default)]
struct BoostState {
    active: bool,
    expiry_ms: f64,
    timer: TimerSlot,
}

/// Timed status effects. Each kind owns one deactivation timer.
#[derive(Debug, Clone)]
pub struct BoostManager {
    states: [BoostState; 4],
    durations_ms: [f64; 4],
    speed_multiplier: f32,
    double_multiplier: u64,
}

impl BoostManager {
    pub fn new(settings: &BoostSettings) -> Self {
        Self {
            states: Default::default(),
            durations_ms: [settings.speed_ms, settings.shield_ms, settings.magnet_ms, settings.double_ms],
            speed_multiplier: settings.speed_multiplier,
            double_multiplier: settings.double_multiplier,
        }
    }

    pub fn duration_ms(&self, kind: BoostKind) -> f64 {
        self.durations_ms[kind.index()]
    }

    /// Turn a boost on, or refresh it. The previous deactivation is replaced.
    pub fn activate(&mut self, kind: BoostKind, now_ms: f64) -> TimerHandle {
        let duration = self.duration_ms(kind);
        let state = &mut self.states[kind.index()];
        state.active = true;
        state.expiry_ms = now_ms + duration;
        state.timer.schedule(now_ms, duration)
    }

    /// Returns false when the boost was already off.
    pub fn deactivate(&mut self, kind: BoostKind) -> bool {
        let state = &mut self.states[kind.index()];
        if !state.active {
            return false;
        }
        state.active = false;
        state.timer.cancel();
        true
    }

    pub fn is_active(&self, kind: BoostKind) -> bool {
        self.states[kind.index()].active
    }

    /// Time left for the HUD, clamped to [0, duration].
    pub fn remaining_ms(&self, kind: BoostKind, now_ms: f64) -> f64 {
        let state = &self.states[kind.index()];
        if !state.active {
            return 0.0;
        }
        (state.expiry_ms - now_ms).clamp(0.0, self.duration_ms(kind))
    }

    /// Deactivate every boost whose timer fired.
    pub fn poll_expired(&mut self, now_ms: f64) -> Vec<BoostKind> {
        let mut expired = Vec::new();
        for kind in BoostKind::ALL {
            let state = &mut self.states[kind.index()];
            if state.timer.poll(now_ms) {
                state.active = false;
                expired.push(kind);
            }
        }
        expired
    }

    /// Number of outstanding deactivation timers.
    pub fn pending_timers(&self) -> usize {
        self.states.iter().filter(|s| s.timer.is_pending()).count()
    }

    /// Obstacles are passed through while either of these is on.
    pub fn grants_pass_through(&self) -> bool {
        self.is_active(BoostKind::Shield) || self.is_active(BoostKind::Speed)
    }

    /// World scroll speed with the speed boost applied.
    pub fn effective_speed(&self, base: f32, max_speed: f32) -> f32 {
        if self.is_active(BoostKind::Speed) {
            (base * self.speed_multiplier).min(max_speed * 1.2)
        } else {
            base
        }
    }

    pub fn score_multiplier(&self) -> u64 {
        if self.is_active(BoostKind::Double) {
            self.double_multiplier
        } else {
            1
        }
    }

    pub fn reset(&mut self) {
        for kind in BoostKind::ALL {
            self.deactivate(kind);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> BoostManager {
        BoostManager::new(&BoostSettings::default())
    }

    #[test]
    fn reactivation_replaces_the_timer() {
        for kind in BoostKind::ALL {
            let mut boosts = manager();
            let d = boosts.duration_ms(kind);
            let first = boosts.activate(kind, 0.0);
            let second = boosts.activate(kind, 1000.0);
            assert_ne!(first, second);
            assert_eq!(boosts.pending_timers(), 1);
            assert!(boosts.poll_expired(d).is_empty(), "{kind:?} expired on the first schedule");
            assert!(boosts.is_active(kind));
            assert_eq!(boosts.poll_expired(1000.0 + d), vec![kind]);
            assert!(!boosts.is_active(kind));
            assert_eq!(boosts.pending_timers(), 0);
        }
    }

    #[test]
    fn deactivate_is_idempotent() {
        let mut boosts = manager();
        assert!(!boosts.deactivate(BoostKind::Magnet));
        boosts.activate(BoostKind::Magnet, 0.0);
        assert!(boosts.deactivate(BoostKind::Magnet));
        assert!(!boosts.deactivate(BoostKind::Magnet));
        assert!(boosts.poll_expired(1e9).is_empty());
    }

    #[test]
    fn remaining_time_is_clamped() {
        let mut boosts = manager();
        boosts.activate(BoostKind::Shield, 500.0);
        assert_eq!(boosts.remaining_ms(BoostKind::Shield, 0.0), 3000.0);
        assert_eq!(boosts.remaining_ms(BoostKind::Shield, 2000.0), 1500.0);
        assert_eq!(boosts.remaining_ms(BoostKind::Shield, 9000.0), 0.0);
        assert_eq!(boosts.remaining_ms(BoostKind::Double, 0.0), 0.0);
    }

    #[test]
    fn speed_boost_is_capped() {
        let mut boosts = manager();
        assert_eq!(boosts.effective_speed(0.32, 0.6), 0.32);
        boosts.activate(BoostKind::Speed, 0.0);
        assert!((boosts.effective_speed(0.32, 0.6) - 0.48).abs() < 1e-6);
        assert!((boosts.effective_speed(0.6, 0.6) - 0.72).abs() < 1e-6);
        assert!(boosts.grants_pass_through());
    }

    #[test]
    fn double_multiplies_and_reset_clears() {
        let mut boosts = manager();
        boosts.activate(BoostKind::Double, 0.0);
        boosts.activate(BoostKind::Shield, 0.0);
        assert_eq!(boosts.score_multiplier(), 2);
        boosts.reset();
        assert_eq!(boosts.score_multiplier(), 1);
        assert_eq!(boosts.pending_timers(), 0);
    }
}
