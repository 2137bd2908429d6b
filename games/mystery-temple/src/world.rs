use temple_engine::Rng;

use crate::boosts::BoostManager;
use crate::chase::Chase;
use crate::config::GameSettings;
use crate::lives::Lives;
use crate::objects::{Category, GemTier, ObjectPools, StoryObject, WorldObject};
use crate::player::Player;
use crate::progression::Progress;
use crate::spawner::Spawner;

/// Obstacles inside this depth band block the story event.
const CLEAR_PATH_MIN_Z: f32 = -30.0;
const CLEAR_PATH_MAX_Z: f32 = 15.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub score: u64,
    pub blue_gems: u32,
    pub green_gems: u32,
    pub red_gems: u32,
}

impl RunStats {
    pub fn total_gems(&self) -> u32 {
        self.blue_gems + self.green_gems + self.red_gems
    }

    pub fn count_gem(&mut self, tier: GemTier) {
        match tier {
            GemTier::Blue => self.blue_gems += 1,
            GemTier::Green => self.green_gems += 1,
            GemTier::Red => self.red_gems += 1,
        }
    }
}

/// All per-run state, owned by the game loop.
pub struct World {
    pub settings: GameSettings,
    pub player: Player,
    pub pools: ObjectPools,
    pub story: Option<StoryObject>,
    pub boosts: BoostManager,
    pub lives: Lives,
    pub progress: Progress,
    pub chase: Chase,
    pub spawner: Spawner,
    pub stats: RunStats,
    pub rng: Rng,
    /// Current world scroll speed per frame.
    pub speed: f32,
    pub running: bool,
    pub paused: bool,
}

impl World {
    pub fn new(settings: GameSettings, seed: u64) -> Self {
        Self {
            player: Player::new(),
            pools: ObjectPools::new(),
            story: None,
            boosts: BoostManager::new(&settings.boosts),
            lives: Lives::new(&settings.lives),
            progress: Progress::new(),
            chase: Chase::new(),
            spawner: Spawner::new(settings.quality),
            stats: RunStats::default(),
            rng: Rng::new(seed),
            speed: settings.difficulty.base_speed,
            running: false,
            paused: false,
            settings,
        }
    }

    /// Fresh run: level 1, full lives, empty track. Settings and RNG carry over.
    pub fn reset(&mut self) -> Vec<WorldObject> {
        let removed = self.pools.clear();
        self.player.reset();
        self.story = None;
        self.boosts.reset();
        self.lives.reset();
        self.progress.reset();
        self.chase.reset();
        self.stats = RunStats::default();
        self.speed = self.settings.difficulty.base_speed;
        self.paused = false;
        removed
    }

    /// Speed from score alone, before boosts.
    pub fn base_speed(&self) -> f32 {
        let d = &self.settings.difficulty;
        let steps = (self.stats.score / d.speed_step_score.max(1)) as f32;
        (d.base_speed + steps * d.speed_increment).min(d.max_speed)
    }

    pub fn update_speed(&mut self) {
        self.speed = self.boosts.effective_speed(self.base_speed(), self.settings.difficulty.max_speed);
    }

    /// No obstacle in the stretch of track around the player.
    pub fn path_clear(&self) -> bool {
        !self
            .pools
            .get(Category::Obstacle)
            .iter()
            .any(|o| o.pos.z > CLEAR_PATH_MIN_Z && o.pos.z < CLEAR_PATH_MAX_Z)
    }

    /// Clear the track for a story event or a retry.
    pub fn clear_track(&mut self) -> Vec<WorldObject> {
        self.pools.clear()
    }
}
