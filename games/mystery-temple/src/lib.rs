use wasm_bindgen::prelude::*;
use temple_engine::*;

mod boosts;
mod chase;
mod cipher;
mod collision;
mod config;
mod events;
mod game;
mod gesture;
mod highscore;
mod lives;
mod morse;
mod objects;
mod player;
mod progression;
mod spawner;
mod unlock;
mod world;

use boosts::BoostKind;
use config::{combined_otp, GameSettings, RUNE_SYMBOLS};
use game::MysteryTemple;
use gesture::{classify, gesture_for, landmarks_from_flat, CameraError};

temple_web::export_game!(MysteryTemple, "mystery-temple");

// ---- Game-specific exports ----

/// Replace the tuning from a JSON document. Unknown fields are ignored,
/// missing ones keep their defaults.
#[wasm_bindgen]
pub fn game_set_settings(json: &str) -> bool {
    match GameSettings::from_json(json) {
        Ok(settings) => {
            with_runner(|r| r.game_and_ctx().0.apply_settings(settings));
            true
        }
        Err(err) => {
            log::warn!("settings rejected: {err}");
            false
        }
    }
}

/// One hand-tracking result: 21 landmarks as flat x,y,z triples, or an
/// empty array when no hand is in view.
#[wasm_bindgen]
pub fn game_hand_frame(landmarks: &[f32]) {
    let pose = if landmarks.is_empty() {
        None
    } else {
        Some(classify(&landmarks_from_flat(landmarks)))
    };
    with_runner(|r| r.game_and_ctx().0.on_hand_frame(pose));
}

#[wasm_bindgen]
pub fn game_camera_ready() {
    with_runner(|r| r.game_and_ctx().0.on_camera_ready());
}

/// `code`: 1 permission denied, 2 no camera, 3 timeout, 4 classifier missing.
#[wasm_bindgen]
pub fn game_camera_failed(code: u32, message: &str) {
    let error = CameraError::from_code(code, message);
    with_runner(|r| r.game_and_ctx().0.on_camera_failed(error));
}

#[wasm_bindgen]
pub fn game_brightness_due() -> bool {
    with_runner(|r| r.game().brightness_due())
}

/// A downscaled RGBA frame from the camera.
#[wasm_bindgen]
pub fn game_brightness_sample(rgba: &[u8]) {
    let level = gesture::brightness(rgba);
    with_runner(|r| r.game_and_ctx().0.on_brightness(level));
}

#[wasm_bindgen]
pub fn game_submit_level_password(typed: &str) -> bool {
    with_runner(|r| r.game_and_ctx().0.submit_level_password(typed))
}

#[wasm_bindgen]
pub fn game_submit_cipher_password(typed: &str) -> bool {
    with_runner(|r| r.game_and_ctx().0.submit_cipher_password(typed))
}

/// Per-password typing feedback: 0 pending, 1 matched, 2 mismatched.
#[wasm_bindgen]
pub fn game_cipher_typing_state(typed: &str) -> Vec<u8> {
    with_runner(|r| {
        r.game()
            .cipher_typing_state(typed)
            .iter()
            .map(|s| s.code() as u8)
            .collect()
    })
}

#[wasm_bindgen]
pub fn game_level_morse() -> String {
    with_runner(|r| r.game().level_morse())
}

#[wasm_bindgen]
pub fn game_level_title(level: usize) -> String {
    game::level_title(level)
}

/// Emoji and name of the pose that unlocks `level`.
#[wasm_bindgen]
pub fn game_level_gesture(level: usize) -> String {
    let def = gesture_for(level);
    format!("{} {}", def.emoji, def.name)
}

#[wasm_bindgen]
pub fn game_rune_symbols() -> String {
    RUNE_SYMBOLS.iter().collect()
}

#[wasm_bindgen]
pub fn game_revealed_password() -> Option<String> {
    with_runner(|r| r.game().revealed_password().map(str::to_owned))
}

/// First letter of every level password, the hint on the cipher screen.
#[wasm_bindgen]
pub fn game_cipher_hint() -> String {
    combined_otp()
}

/// `{answer, score, level}` once the final question is answered.
#[wasm_bindgen]
pub fn game_completion_report() -> Option<String> {
    with_runner(|r| {
        let report = r.game().completion_report()?;
        match serde_json::to_string(report) {
            Ok(json) => Some(json),
            Err(err) => {
                log::error!("completion report not serializable: {err}");
                None
            }
        }
    })
}

// ---- HUD accessors ----

#[wasm_bindgen]
pub fn get_score() -> f64 {
    with_runner(|r| r.game().score() as f64)
}

#[wasm_bindgen]
pub fn get_highscore() -> f64 {
    with_runner(|r| r.game().highscore() as f64)
}

#[wasm_bindgen]
pub fn get_lives() -> u32 {
    with_runner(|r| r.game().lives())
}

#[wasm_bindgen]
pub fn get_level() -> u32 {
    with_runner(|r| r.game().level() as u32 + 1)
}

#[wasm_bindgen]
pub fn get_phase() -> f32 {
    with_runner(|r| r.game().phase().code())
}

#[wasm_bindgen]
pub fn get_speed() -> f32 {
    with_runner(|r| r.game().speed())
}

#[wasm_bindgen]
pub fn get_gems() -> u32 {
    with_runner(|r| r.game().gems())
}

#[wasm_bindgen]
pub fn get_letters() -> String {
    with_runner(|r| r.game().letters())
}

#[wasm_bindgen]
pub fn get_chase_progress() -> f32 {
    with_runner(|r| r.game().chase_progress())
}

#[wasm_bindgen]
pub fn get_chase_distance() -> u32 {
    with_runner(|r| r.game().chase_distance_m())
}

/// Remaining time of a boost by index: 0 speed, 1 shield, 2 magnet, 3 double.
#[wasm_bindgen]
pub fn get_boost_remaining_ms(index: usize) -> f64 {
    match BoostKind::ALL.get(index) {
        Some(kind) => with_runner(|r| r.game().boost_remaining_ms(*kind)),
        None => 0.0,
    }
}

#[wasm_bindgen]
pub fn get_hold_progress() -> f32 {
    with_runner(|r| r.game().hold_progress())
}

#[wasm_bindgen]
pub fn get_cipher_verified() -> Vec<u8> {
    with_runner(|r| r.game().cipher_verified().iter().map(|v| *v as u8).collect())
}

#[wasm_bindgen]
pub fn get_is_paused() -> bool {
    with_runner(|r| r.game().is_paused())
}

#[wasm_bindgen]
pub fn get_is_running() -> bool {
    with_runner(|r| r.game().is_running())
}
