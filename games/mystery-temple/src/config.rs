//! Tuning values, the level table and runtime settings.

use serde::Deserialize;

/// Lateral world X of each lane, left to right.
pub const LANES: [f32; 3] = [-4.0, 0.0, 4.0];
pub const CENTER_LANE: usize = 1;

pub const LETTERS_REQUIRED: usize = 4;
pub const RUNE_SYMBOLS: [char; LETTERS_REQUIRED] = ['★', '◆', '●', '▲'];

/// Depth at which new objects appear.
pub const SPAWN_Z: f32 = -80.0;
/// Objects whose depth passes this are behind the camera and removed.
pub const CULL_Z: f32 = 15.0;
/// Depth of the player's plane.
pub const PLAYER_Z: f32 = 5.0;

/// No two objects of one category spawn closer than this in the same lane.
pub const SPAWN_GAP: f32 = 6.0;

/// localStorage key of the persisted best score.
pub const HIGHSCORE_KEY: &str = "mysteryMagicHighscore";

pub struct LevelDef {
    pub icon: &'static str,
    pub name: &'static str,
    pub password: &'static str,
    pub english_message: &'static str,
    pub object_color: u32,
    pub is_final: bool,
}

pub static LEVELS: [LevelDef; 5] = [
    LevelDef {
        icon: "🔮",
        name: "Magic Orb",
        password: "LOVE",
        english_message: "When I first saw you... my heart changed from that day...",
        object_color: 0x00ffff,
        is_final: false,
    },
    LevelDef {
        icon: "📜",
        name: "Ancient Scroll",
        password: "ROYY",
        english_message: "When talking with you... it felt like being in another world...",
        object_color: 0xffcc00,
        is_final: false,
    },
    LevelDef {
        icon: "🗝️",
        name: "Golden Key",
        password: "SOUL",
        english_message: "I felt something I never felt before... it was love...",
        object_color: 0xffd700,
        is_final: false,
    },
    LevelDef {
        icon: "💎",
        name: "Crystal Heart",
        password: "HOPE",
        english_message: "I cant live without you... my heart is always with you...",
        object_color: 0xff69b4,
        is_final: false,
    },
    LevelDef {
        icon: "🎁",
        name: "Mystery Chest",
        password: "KISS",
        english_message: "I LOVE YOU... You are everything to me...",
        object_color: 0x00ff88,
        is_final: true,
    },
];

pub const FINAL_MESSAGE: &str =
    "I wanted to tell you I love you through this game... You are my world...";

/// Level definition, clamped to the last level.
pub fn level(index: usize) -> &'static LevelDef {
    &LEVELS[index.min(LEVELS.len() - 1)]
}

/// All level passwords in order, e.g. `LOVEROYYSOULHOPEKISS`.
pub fn combined_password() -> String {
    LEVELS.iter().map(|l| l.password).collect()
}

/// First letter of every level password, e.g. `LRSHK`.
pub fn combined_otp() -> String {
    LEVELS.iter().filter_map(|l| l.password.chars().next()).collect()
}

/// Device class chosen by the page; caps how many objects may be live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityTier {
    Low,
    #[default]
    High,
}

/// Maximum live objects per spawnable category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnCaps {
    pub obstacles: usize,
    pub blue_gems: usize,
    pub green_gems: usize,
    pub red_gems: usize,
    pub boosts: usize,
}

impl QualityTier {
    pub fn caps(self) -> SpawnCaps {
        match self {
            QualityTier::Low => SpawnCaps { obstacles: 4, blue_gems: 4, green_gems: 2, red_gems: 1, boosts: 1 },
            QualityTier::High => SpawnCaps { obstacles: 8, blue_gems: 7, green_gems: 4, red_gems: 3, boosts: 2 },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Difficulty {
    pub base_speed: f32,
    pub max_speed: f32,
    pub speed_increment: f32,
    /// Score needed per speed increment.
    pub speed_step_score: u64,
    pub obstacle_rate: f32,
    pub blue_gem_rate: f32,
    pub green_gem_rate: f32,
    pub red_gem_rate: f32,
    pub letter_rate: f32,
    pub boost_rate: f32,
    pub hitbox_tolerance: f32,
    /// Chase progress gained per frame.
    pub chase_fill_rate: f32,
    pub chase_escape_threshold: f32,
    pub catch_radius: f32,
}

impl Default for Difficulty {
    fn default() -> Self {
        Self {
            base_speed: 0.32,
            max_speed: 0.60,
            speed_increment: 0.035,
            speed_step_score: 800,
            obstacle_rate: 0.014,
            blue_gem_rate: 0.012,
            green_gem_rate: 0.008,
            red_gem_rate: 0.005,
            letter_rate: 0.04,
            boost_rate: 0.003,
            hitbox_tolerance: 0.35,
            chase_fill_rate: 0.06,
            chase_escape_threshold: 100.0,
            catch_radius: 3.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LivesSettings {
    pub max_lives: u32,
    pub revival_ms: f64,
}

impl Default for LivesSettings {
    fn default() -> Self {
        Self { max_lives: 4, revival_ms: 2000.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BoostSettings {
    pub speed_ms: f64,
    pub speed_multiplier: f32,
    pub shield_ms: f64,
    pub magnet_ms: f64,
    /// Lateral reach of the magnet.
    pub magnet_range: f32,
    /// How far ahead the magnet reaches, as a positive depth.
    pub magnet_depth: f32,
    pub double_ms: f64,
    pub double_multiplier: u64,
    /// Shield or speed lets the player run through obstacles untouched.
    /// When off, a shield absorbs one hit instead.
    pub pass_through: bool,
}

impl Default for BoostSettings {
    fn default() -> Self {
        Self {
            speed_ms: 5000.0,
            speed_multiplier: 1.5,
            shield_ms: 3000.0,
            magnet_ms: 8000.0,
            magnet_range: 8.0,
            magnet_depth: 28.0,
            double_ms: 10000.0,
            double_multiplier: 2,
            pass_through: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlayerSettings {
    pub jump_velocity: f32,
    pub gravity: f32,
    pub slide_ms: f64,
    /// Fraction of the remaining lateral distance covered per frame.
    pub lane_ease: f32,
    /// Minimum swipe length in pixels.
    pub swipe_threshold: f32,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            jump_velocity: 0.48,
            gravity: 0.028,
            slide_ms: 600.0,
            lane_ease: 0.12,
            swipe_threshold: 40.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GestureSettings {
    pub hold_ms: f64,
    /// Mean luma below which the low-light skip is offered.
    pub low_light_threshold: f32,
    /// Brightness is measured on every Nth camera frame.
    pub brightness_every: u32,
}

impl Default for GestureSettings {
    fn default() -> Self {
        Self { hold_ms: 2000.0, low_light_threshold: 40.0, brightness_every: 15 }
    }
}

/// Everything the page may tune. Missing fields keep their defaults.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    pub difficulty: Difficulty,
    pub lives: LivesSettings,
    pub boosts: BoostSettings,
    pub player: PlayerSettings,
    pub gesture: GestureSettings,
    pub quality: QualityTier,
}

impl GameSettings {
    /// Parse settings from a (possibly partial) JSON document.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
