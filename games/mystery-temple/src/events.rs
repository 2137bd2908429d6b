// Game event kinds (Rust → page). Payload fields noted per kind.

/// a: category code, b: points awarded, c: rune slot or -1
pub const EVENT_COLLECT: u32 = 1;
/// a: hit outcome code, b: lives left
pub const EVENT_HIT: u32 = 2;
/// a: boost code, b: 1 active / 0 expired, c: duration ms
pub const EVENT_BOOST: u32 = 3;
/// a: seconds left (0 = revived), b: lives left
pub const EVENT_REVIVAL: u32 = 4;
/// a: score, b: level reached (1-based), c: gems collected
pub const EVENT_GAME_OVER: u32 = 5;
/// a: phase code, b: level index
pub const EVENT_PHASE: u32 = 6;
/// a: countdown code, b: value shown (0 = GO)
pub const EVENT_COUNTDOWN: u32 = 7;
/// a: runes filled, b: slot just filled
pub const EVENT_LETTER: u32 = 8;
/// a: hold progress 0..100, b: 1 hand detected, c: pose code
pub const EVENT_GESTURE: u32 = 9;
/// a: 0 level unlock / 1 cipher stage, b: level or stage index, c: 1 when skipped
pub const EVENT_VERIFIED: u32 = 10;
/// a: 1 start camera / 0 stop camera / 2 live / -1 failed, b: error code when failed
pub const EVENT_CAMERA: u32 = 11;
/// a: 1 low light / 0 normal, b: measured brightness
pub const EVENT_LOW_LIGHT: u32 = 12;
/// a: sequence code, b: stage code (-1 = finished)
pub const EVENT_STAGE: u32 = 13;
/// a: 1 paused / 0 resumed
pub const EVENT_PAUSE: u32 = 14;
/// a: object id, b: render kind, c: lateral x
pub const EVENT_OBJECT_SPAWN: u32 = 15;
/// a: object id, b: despawn reason code
pub const EVENT_OBJECT_DESPAWN: u32 = 16;
/// a: 1 accepted / 0 rejected, b: 0 level password / 1 combined password
pub const EVENT_PASSWORD: u32 = 17;
/// a: 1 yes / 0 no, b: score, c: level (1-based)
pub const EVENT_FINISH: u32 = 18;
/// a: new best score
pub const EVENT_HIGHSCORE: u32 = 19;

// Custom event kinds (page → Rust)

/// Start a fresh run (also restarts after game over).
pub const CUSTOM_START: u32 = 1;
/// a: 0 low / 1 high
pub const CUSTOM_SET_QUALITY: u32 = 2;
/// Retry the chase after the story object escaped.
pub const CUSTOM_RETRY: u32 = 3;
/// Leave the current manual stage (Morse, temple wall, credits skip).
pub const CUSTOM_CONTINUE: u32 = 4;
/// a: -1 for the level gesture, 0..4 for a cipher stage
pub const CUSTOM_OPEN_GESTURE: u32 = 5;
pub const CUSTOM_CLOSE_GESTURE: u32 = 6;
/// a: 1 yes / 0 no
pub const CUSTOM_ANSWER: u32 = 7;
pub const CUSTOM_TOGGLE_PAUSE: u32 = 8;
/// Low-light skip of the open gesture session.
pub const CUSTOM_SKIP_GESTURE: u32 = 9;
/// Reopen the camera after a failure.
pub const CUSTOM_RETRY_CAMERA: u32 = 10;

// Despawn reasons

pub const DESPAWN_MISSED: f32 = 0.0;
pub const DESPAWN_CONSUMED: f32 = 1.0;
pub const DESPAWN_CLEARED: f32 = 2.0;

// Countdown codes

pub const COUNTDOWN_CHASE: f32 = 0.0;
pub const COUNTDOWN_NEXT_LEVEL: f32 = 1.0;

// Stage sequence codes

pub const SEQUENCE_UNLOCK: f32 = 0.0;
pub const SEQUENCE_FINALE: f32 = 1.0;

// Sounds

pub const SOUND_GEM: u32 = 0;
pub const SOUND_RUNE: u32 = 1;
pub const SOUND_BOOST: u32 = 2;
pub const SOUND_HIT: u32 = 3;
pub const SOUND_SHIELD: u32 = 4;
pub const SOUND_JUMP: u32 = 5;
pub const SOUND_CATCH: u32 = 6;
pub const SOUND_VERIFIED: u32 = 7;
