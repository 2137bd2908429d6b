use glam::{Vec2, Vec3};
use temple_engine::{Aabb, TimerSlot};

use crate::config::{PlayerSettings, CENTER_LANE, LANES, PLAYER_Z};

/// Discrete player intents produced by keys and swipes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    MoveLeft,
    MoveRight,
    Jump,
    Slide,
    TogglePause,
}

pub fn intent_for_key(key_code: u32) -> Option<Intent> {
    match key_code {
        37 | 65 => Some(Intent::MoveLeft),  // ArrowLeft, A
        39 | 68 => Some(Intent::MoveRight), // ArrowRight, D
        38 | 32 | 87 => Some(Intent::Jump), // ArrowUp, Space, W
        40 | 83 => Some(Intent::Slide),     // ArrowDown, S
        27 | 80 => Some(Intent::TogglePause), // Escape, P
        _ => None,
    }
}

/// Turns a pointer down/up pair into a move, jump or slide.
#[derive(Debug, Clone, Default)]
pub struct SwipeTracker {
    start: Option<Vec2>,
}

impl SwipeTracker {
    pub fn down(&mut self, x: f32, y: f32) {
        self.start = Some(Vec2::new(x, y));
    }

    pub fn up(&mut self, x: f32, y: f32, threshold: f32) -> Option<Intent> {
        let start = self.start.take()?;
        let d = Vec2::new(x, y) - start;
        if d.x.abs() > d.y.abs() {
            if d.x.abs() <= threshold {
                return None;
            }
            Some(if d.x > 0.0 { Intent::MoveRight } else { Intent::MoveLeft })
        } else if d.y.abs() > threshold {
            // Screen y grows downwards.
            Some(if d.y < 0.0 { Intent::Jump } else { Intent::Slide })
        } else {
            None
        }
    }
}

const STAND_HALF_HEIGHT: f32 = 1.45;
const HALF_WIDTH: f32 = 0.65;
const SLIDE_SCALE: f32 = 0.4;

#[derive(Debug, Clone)]
pub struct Player {
    pub lane: usize,
    /// Feet position; `y` is the height above the track.
    pub pos: Vec3,
    pub vy: f32,
    pub jumping: bool,
    pub sliding: bool,
    pub scale_y: f32,
    slide_timer: TimerSlot,
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

impl Player {
    pub fn new() -> Self {
        Self {
            lane: CENTER_LANE,
            pos: Vec3::new(LANES[CENTER_LANE], 0.0, PLAYER_Z),
            vy: 0.0,
            jumping: false,
            sliding: false,
            scale_y: 1.0,
            slide_timer: TimerSlot::new(),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn lane_x(&self) -> f32 {
        LANES[self.lane]
    }

    /// Apply a movement intent. Returns true when the player reacted.
    pub fn apply(&mut self, intent: Intent, now_ms: f64, settings: &PlayerSettings) -> bool {
        match intent {
            Intent::MoveLeft if self.lane > 0 => {
                self.lane -= 1;
                true
            }
            Intent::MoveRight if self.lane + 1 < LANES.len() => {
                self.lane += 1;
                true
            }
            Intent::Jump if !self.jumping && !self.sliding => {
                self.jumping = true;
                self.vy = settings.jump_velocity;
                true
            }
            Intent::Slide if !self.sliding => {
                self.sliding = true;
                self.scale_y = SLIDE_SCALE;
                self.slide_timer.schedule(now_ms, settings.slide_ms);
                true
            }
            _ => false,
        }
    }

    /// Advance jump physics, slide recovery and lane easing by `dt` frames.
    pub fn tick(&mut self, now_ms: f64, dt: f32, settings: &PlayerSettings) {
        if self.jumping {
            self.pos.y += self.vy * dt;
            self.vy -= settings.gravity * dt;
            if self.pos.y <= 0.0 {
                self.pos.y = 0.0;
                self.vy = 0.0;
                self.jumping = false;
            }
        }

        if self.slide_timer.poll(now_ms) {
            self.sliding = false;
        }
        if self.sliding {
            self.scale_y = SLIDE_SCALE;
        } else {
            self.scale_y = (self.scale_y + 0.15 * dt).min(1.0);
        }

        let ease = (settings.lane_ease * dt).min(1.0);
        self.pos.x += (self.lane_x() - self.pos.x) * ease;
    }

    /// Bounding box shrunk on the lateral and depth axes by `tolerance`.
    pub fn aabb(&self, tolerance: f32) -> Aabb {
        let half_h = STAND_HALF_HEIGHT * self.scale_y;
        let center = Vec3::new(self.pos.x, self.pos.y + half_h, self.pos.z);
        Aabb::from_center_half_extents(center, Vec3::new(HALF_WIDTH, half_h, HALF_WIDTH))
            .shrink_xz(tolerance)
    }
}
