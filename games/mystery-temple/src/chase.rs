use crate::config::{Difficulty, LANES};
use crate::objects::StoryObject;

/// Frames between lane changes of the story object.
const LANE_CHANGE_FRAMES: f32 = 60.0;
/// Story object approach speed relative to the track.
const APPROACH_FACTOR: f32 = 0.42;
const LANE_EASE: f32 = 0.03;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChaseStatus {
    Running,
    Escaped,
}

#[derive(Debug, Clone, Default)]
pub struct Chase {
    progress: f32,
}

impl Chase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Escape progress in percent, [0, threshold].
    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Distance readout in metres shown while chasing.
    pub fn distance_m(&self, threshold: f32) -> u32 {
        ((threshold - self.progress).max(0.0) * 2.0).floor() as u32
    }

    pub fn tick(&mut self, dt: f32, difficulty: &Difficulty) -> ChaseStatus {
        let threshold = difficulty.chase_escape_threshold;
        self.progress = (self.progress + difficulty.chase_fill_rate * dt).min(threshold);
        if self.progress >= threshold {
            ChaseStatus::Escaped
        } else {
            ChaseStatus::Running
        }
    }

    pub fn reset(&mut self) {
        self.progress = 0.0;
    }
}

/// Move the story object towards the player and weave it across lanes.
pub fn move_story_object(story: &mut StoryObject, speed: f32, dt: f32) {
    story.pos.z += speed * APPROACH_FACTOR * dt;

    story.move_timer += dt;
    if story.move_timer >= LANE_CHANGE_FRAMES {
        story.move_timer = 0.0;
        let next = story.target_lane as i32 + story.direction;
        if next < 0 || next >= LANES.len() as i32 {
            story.direction = -story.direction;
        }
        story.target_lane = (story.target_lane as i32 + story.direction).clamp(0, LANES.len() as i32 - 1) as usize;
    }

    let target_x = LANES[story.target_lane];
    story.pos.x += (target_x - story.pos.x) * (LANE_EASE * dt).min(1.0);
}
