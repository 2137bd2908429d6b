//! Hand pose classification and the hold-to-verify session.
//!
//! The page owns the camera and the landmark model. It feeds landmarks (or
//! "no hand") into [`GestureSession::on_frame`] and obeys the start/stop
//! camera signals the session emits. Every way out of a session releases
//! the camera exactly once.

use thiserror::Error;

use crate::config::GestureSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoseType {
    OpenPalm,
    Peace,
    Point,
    Fist,
    Love,
    Unknown,
}

impl PoseType {
    pub fn code(self) -> f32 {
        match self {
            PoseType::OpenPalm => 0.0,
            PoseType::Peace => 1.0,
            PoseType::Point => 2.0,
            PoseType::Fist => 3.0,
            PoseType::Love => 4.0,
            PoseType::Unknown => -1.0,
        }
    }
}

/// Normalised image coordinates; y grows downwards.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

pub const LANDMARK_COUNT: usize = 21;

const THUMB_TIP: usize = 4;
const THUMB_IP: usize = 3;
// (tip, pip) for index, middle, ring, pinky.
const FINGERS: [(usize, usize); 4] = [(8, 6), (12, 10), (16, 14), (20, 18)];

/// Parse a flat `[x, y, z, x, y, z, ...]` buffer.
pub fn landmarks_from_flat(flat: &[f32]) -> Vec<Landmark> {
    flat.chunks_exact(3).map(|c| Landmark { x: c[0], y: c[1], z: c[2] }).collect()
}

pub fn classify(landmarks: &[Landmark]) -> PoseType {
    if landmarks.len() < LANDMARK_COUNT {
        return PoseType::Unknown;
    }
    let thumb_out = landmarks[THUMB_TIP].x < landmarks[THUMB_IP].x;
    let up = FINGERS.map(|(tip, pip)| landmarks[tip].y < landmarks[pip].y);
    let down = FINGERS.map(|(tip, pip)| landmarks[tip].y > landmarks[pip].y);
    let [index_up, middle_up, _, pinky_up] = up;
    let [_, middle_down, ring_down, pinky_down] = down;

    if index_up && middle_down && ring_down && pinky_down {
        return PoseType::Point;
    }

    let count = up.iter().filter(|u| **u).count() + usize::from(thumb_out);
    match count {
        5 => PoseType::OpenPalm,
        2 if index_up && middle_up && ring_down && pinky_down => PoseType::Peace,
        0 => PoseType::Fist,
        3 if thumb_out && index_up && middle_down && ring_down && pinky_up => PoseType::Love,
        _ => PoseType::Unknown,
    }
}

pub struct GestureDef {
    pub pose: PoseType,
    pub emoji: &'static str,
    pub name: &'static str,
    pub fingers: u32,
}

/// Unlock gesture per level; cipher stage *i* reuses level *i*'s gesture.
pub static GESTURES: [GestureDef; 5] = [
    GestureDef { pose: PoseType::OpenPalm, emoji: "✋", name: "Open Palm", fingers: 5 },
    GestureDef { pose: PoseType::Peace, emoji: "✌️", name: "Peace Sign", fingers: 2 },
    GestureDef { pose: PoseType::Point, emoji: "☝️", name: "Index Point", fingers: 1 },
    GestureDef { pose: PoseType::Fist, emoji: "👊", name: "Power Fist", fingers: 0 },
    GestureDef { pose: PoseType::Love, emoji: "🤟", name: "Love Sign", fingers: 3 },
];

pub fn gesture_for(index: usize) -> &'static GestureDef {
    &GESTURES[index.min(GESTURES.len() - 1)]
}

/// What a verification unlocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureContext {
    LevelUnlock { level: usize },
    CipherStage(usize),
}

impl GestureContext {
    pub fn required_pose(self) -> PoseType {
        match self {
            GestureContext::LevelUnlock { level } => gesture_for(level).pose,
            GestureContext::CipherStage(stage) => gesture_for(stage).pose,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HoldUpdate {
    pub progress: f32,
    /// True on the single frame the hold completed.
    pub verified: bool,
}

/// Hold-to-verify timer. A mismatching frame drops progress to 0.
#[derive(Debug, Clone)]
pub struct HoldTracker {
    hold_ms: f64,
    started_at: Option<f64>,
    progress: f32,
    latched: bool,
}

impl HoldTracker {
    pub fn new(hold_ms: f64) -> Self {
        Self { hold_ms, started_at: None, progress: 0.0, latched: false }
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn update(&mut self, matching: bool, now_ms: f64) -> HoldUpdate {
        if !matching {
            self.reset();
            return HoldUpdate::default();
        }
        let start = *self.started_at.get_or_insert(now_ms);
        let elapsed = (now_ms - start).max(0.0);
        self.progress = if self.hold_ms <= 0.0 {
            100.0
        } else {
            ((elapsed / self.hold_ms) * 100.0).min(100.0) as f32
        };
        let verified = self.progress >= 100.0 && !self.latched;
        if verified {
            self.latched = true;
        }
        HoldUpdate { progress: self.progress, verified }
    }

    pub fn reset(&mut self) {
        self.started_at = None;
        self.progress = 0.0;
        self.latched = false;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CameraError {
    #[error("Camera permission denied. Allow it and press RETRY.")]
    PermissionDenied,
    #[error("No camera device found.")]
    NotFound,
    #[error("Camera timeout")]
    Timeout,
    #[error("Hand tracking is unavailable.")]
    ClassifierUnavailable,
    #[error("Camera error: {0}")]
    Other(String),
}

impl CameraError {
    pub fn from_code(code: u32, message: &str) -> Self {
        match code {
            1 => CameraError::PermissionDenied,
            2 => CameraError::NotFound,
            3 => CameraError::Timeout,
            4 => CameraError::ClassifierUnavailable,
            _ => CameraError::Other(message.to_string()),
        }
    }

    pub fn code(&self) -> f32 {
        match self {
            CameraError::PermissionDenied => 1.0,
            CameraError::NotFound => 2.0,
            CameraError::Timeout => 3.0,
            CameraError::ClassifierUnavailable => 4.0,
            CameraError::Other(_) => 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GestureError {
    #[error("no gesture session is open")]
    NoSession,
    #[error("camera permission was denied; skipping is not allowed")]
    PermissionBlocked,
    #[error("skipping is only offered in low light")]
    NotLowLight,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraState {
    Closed,
    Opening,
    Live,
    Failed(CameraError),
}

/// Everything the session asks of the page, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureSignal {
    StartCamera,
    StopCamera,
    CameraFailed(CameraError),
    Progress { progress: f32, detected: bool, pose: PoseType },
    LowLight { low: bool, brightness: f32 },
    Verified { context: GestureContext, skipped: bool },
}

/// Mean luma of every 40th RGBA pixel. 50 when there is nothing to sample.
pub fn brightness(rgba: &[u8]) -> f32 {
    let mut total = 0.0f32;
    let mut count = 0u32;
    for px in rgba.chunks_exact(4).step_by(40) {
        total += 0.299 * px[0] as f32 + 0.587 * px[1] as f32 + 0.114 * px[2] as f32;
        count += 1;
    }
    if count == 0 {
        50.0
    } else {
        total / count as f32
    }
}

#[derive(Debug, Clone)]
pub struct GestureSession {
    settings: GestureSettings,
    context: Option<GestureContext>,
    camera: CameraState,
    camera_held: bool,
    hold: HoldTracker,
    low_light: bool,
    frames: u32,
    outbox: Vec<GestureSignal>,
}

impl GestureSession {
    pub fn new(settings: &GestureSettings) -> Self {
        Self {
            settings: settings.clone(),
            context: None,
            camera: CameraState::Closed,
            camera_held: false,
            hold: HoldTracker::new(settings.hold_ms),
            low_light: false,
            frames: 0,
            outbox: Vec::new(),
        }
    }

    pub fn context(&self) -> Option<GestureContext> {
        self.context
    }

    pub fn camera(&self) -> &CameraState {
        &self.camera
    }

    pub fn is_open(&self) -> bool {
        self.context.is_some()
    }

    pub fn hold_progress(&self) -> f32 {
        self.hold.progress()
    }

    pub fn is_low_light(&self) -> bool {
        self.low_light
    }

    /// Open (or retarget) a session and ask the page for the camera.
    pub fn open(&mut self, context: GestureContext) {
        self.context = Some(context);
        self.hold.reset();
        self.low_light = false;
        self.frames = 0;
        if !self.camera_held {
            self.request_camera();
        }
        log::info!("gesture session opened for {:?}", context);
    }

    pub fn camera_ready(&mut self) {
        if self.camera == CameraState::Opening {
            self.camera = CameraState::Live;
        }
    }

    pub fn camera_failed(&mut self, error: CameraError) {
        log::warn!("camera failed: {error}");
        self.release_camera();
        self.hold.reset();
        self.camera = CameraState::Failed(error.clone());
        self.outbox.push(GestureSignal::CameraFailed(error));
    }

    /// Try the camera again after a failure.
    pub fn retry(&mut self) -> Result<(), GestureError> {
        if self.context.is_none() {
            return Err(GestureError::NoSession);
        }
        if matches!(self.camera, CameraState::Failed(_)) {
            self.request_camera();
        }
        Ok(())
    }

    /// Feed one classified camera frame; `None` means no hand in view.
    pub fn on_frame(&mut self, pose: Option<PoseType>, now_ms: f64) {
        let Some(context) = self.context else { return };
        if self.camera != CameraState::Live {
            return;
        }
        self.frames = self.frames.wrapping_add(1);
        let Some(pose) = pose else {
            self.hold.reset();
            self.outbox.push(GestureSignal::Progress { progress: 0.0, detected: false, pose: PoseType::Unknown });
            return;
        };
        let update = self.hold.update(pose == context.required_pose(), now_ms);
        self.outbox.push(GestureSignal::Progress { progress: update.progress, detected: true, pose });
        if update.verified {
            self.finish(context, false);
        }
    }

    /// True on the frames where the page should sample brightness.
    pub fn brightness_due(&self) -> bool {
        let every = self.settings.brightness_every.max(1);
        self.is_open() && self.camera == CameraState::Live && self.frames % every == 0
    }

    pub fn on_brightness(&mut self, level: f32) {
        if !self.is_open() {
            return;
        }
        let low = level < self.settings.low_light_threshold;
        if low != self.low_light {
            self.low_light = low;
            self.outbox.push(GestureSignal::LowLight { low, brightness: level });
        }
    }

    /// Low-light bypass. Needs a live camera; a denied permission blocks it.
    pub fn skip(&mut self) -> Result<GestureContext, GestureError> {
        let context = self.context.ok_or(GestureError::NoSession)?;
        match self.camera {
            CameraState::Failed(CameraError::PermissionDenied) => return Err(GestureError::PermissionBlocked),
            CameraState::Live => {}
            _ => return Err(GestureError::NoSession),
        }
        if !self.low_light {
            return Err(GestureError::NotLowLight);
        }
        self.finish(context, true);
        Ok(context)
    }

    pub fn close(&mut self) {
        if self.context.take().is_some() {
            log::info!("gesture session closed");
        }
        self.release_camera();
        self.camera = CameraState::Closed;
        self.hold.reset();
        self.low_light = false;
    }

    pub fn drain_signals(&mut self) -> Vec<GestureSignal> {
        std::mem::take(&mut self.outbox)
    }

    fn finish(&mut self, context: GestureContext, skipped: bool) {
        log::info!("gesture verified for {:?} (skipped: {})", context, skipped);
        self.outbox.push(GestureSignal::Verified { context, skipped });
        self.close();
    }

    fn request_camera(&mut self) {
        self.camera = CameraState::Opening;
        self.camera_held = true;
        self.outbox.push(GestureSignal::StartCamera);
    }

    fn release_camera(&mut self) {
        if self.camera_held {
            self.camera_held = false;
            self.outbox.push(GestureSignal::StopCamera);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a hand: thumb out or not, then index/middle/ring/pinky up or down.
    fn hand(thumb_out: bool, fingers: [bool; 4]) -> Vec<Landmark> {
        let mut lm = vec![Landmark::default(); LANDMARK_COUNT];
        lm[THUMB_IP].x = 0.5;
        lm[THUMB_TIP].x = if thumb_out { 0.4 } else { 0.6 };
        for ((tip, pip), up) in FINGERS.iter().zip(fingers) {
            lm[*pip].y = 0.5;
            lm[*tip].y = if up { 0.3 } else { 0.7 };
        }
        lm
    }

    fn stops(signals: &[GestureSignal]) -> usize {
        signals.iter().filter(|s| **s == GestureSignal::StopCamera).count()
    }

    fn live_session(context: GestureContext) -> GestureSession {
        let mut s = GestureSession::new(&GestureSettings::default());
        s.open(context);
        s.camera_ready();
        s
    }

    #[test]
    fn classifies_the_five_poses() {
        assert_eq!(classify(&hand(true, [true; 4])), PoseType::OpenPalm);
        assert_eq!(classify(&hand(false, [true, true, false, false])), PoseType::Peace);
        assert_eq!(classify(&hand(false, [true, false, false, false])), PoseType::Point);
        assert_eq!(classify(&hand(true, [true, false, false, false])), PoseType::Point);
        assert_eq!(classify(&hand(false, [false; 4])), PoseType::Fist);
        assert_eq!(classify(&hand(true, [true, false, false, true])), PoseType::Love);
        assert_eq!(classify(&hand(false, [true, true, true, false])), PoseType::Unknown);
        assert_eq!(classify(&[]), PoseType::Unknown);
    }

    #[test]
    fn flat_buffer_parses_triples() {
        let lm = landmarks_from_flat(&[0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 9.0]);
        assert_eq!(lm.len(), 2);
        assert_eq!(lm[1], Landmark { x: 0.4, y: 0.5, z: 0.6 });
    }

    #[test]
    fn hold_is_monotonic_and_resets_abruptly() {
        let mut hold = HoldTracker::new(2000.0);
        let mut last = 0.0;
        for t in 0..15 {
            let u = hold.update(true, t as f64 * 100.0);
            assert!(u.progress >= last);
            last = u.progress;
        }
        assert!(last > 0.0);
        assert_eq!(hold.update(false, 1600.0).progress, 0.0);
        assert_eq!(hold.update(true, 1700.0).progress, 0.0);
    }

    #[test]
    fn hold_latches_once() {
        let mut hold = HoldTracker::new(2000.0);
        hold.update(true, 0.0);
        assert!(hold.update(true, 2000.0).verified);
        assert!(!hold.update(true, 2100.0).verified);
        assert_eq!(hold.progress(), 100.0);
    }

    #[test]
    fn open_palm_at_level_zero_verifies_once() {
        let mut s = live_session(GestureContext::LevelUnlock { level: 0 });
        let palm = classify(&hand(true, [true; 4]));
        for t in (0..=3000).step_by(100) {
            s.on_frame(Some(palm), t as f64);
        }
        let signals = s.drain_signals();
        let verified: Vec<_> = signals
            .iter()
            .filter(|sig| matches!(sig, GestureSignal::Verified { .. }))
            .collect();
        assert_eq!(
            verified,
            vec![&GestureSignal::Verified { context: GestureContext::LevelUnlock { level: 0 }, skipped: false }]
        );
        assert_eq!(stops(&signals), 1);
        assert!(!s.is_open());
    }

    #[test]
    fn wrong_pose_never_verifies() {
        let mut s = live_session(GestureContext::CipherStage(3));
        for t in (0..=5000).step_by(100) {
            s.on_frame(Some(PoseType::OpenPalm), t as f64);
        }
        assert!(s.is_open());
        assert_eq!(s.hold_progress(), 0.0);
    }

    #[test]
    fn no_hand_resets_progress() {
        let mut s = live_session(GestureContext::CipherStage(0));
        s.on_frame(Some(PoseType::OpenPalm), 0.0);
        s.on_frame(Some(PoseType::OpenPalm), 1000.0);
        assert_eq!(s.hold_progress(), 50.0);
        s.on_frame(None, 1100.0);
        assert_eq!(s.hold_progress(), 0.0);
    }

    #[test]
    fn skip_needs_low_light_and_a_live_camera() {
        let mut s = live_session(GestureContext::LevelUnlock { level: 2 });
        assert_eq!(s.skip(), Err(GestureError::NotLowLight));
        s.on_brightness(12.0);
        assert!(s.is_low_light());
        assert_eq!(s.skip(), Ok(GestureContext::LevelUnlock { level: 2 }));
        assert_eq!(s.skip(), Err(GestureError::NoSession));
    }

    #[test]
    fn denied_permission_blocks_skip_and_releases_once() {
        let mut s = GestureSession::new(&GestureSettings::default());
        s.open(GestureContext::LevelUnlock { level: 0 });
        s.camera_failed(CameraError::PermissionDenied);
        s.on_brightness(5.0);
        assert_eq!(s.skip(), Err(GestureError::PermissionBlocked));
        s.close();
        let signals = s.drain_signals();
        assert_eq!(signals[0], GestureSignal::StartCamera);
        assert_eq!(stops(&signals), 1);
        assert!(signals.contains(&GestureSignal::CameraFailed(CameraError::PermissionDenied)));
    }

    #[test]
    fn retry_reopens_the_camera() {
        let mut s = GestureSession::new(&GestureSettings::default());
        assert_eq!(s.retry(), Err(GestureError::NoSession));
        s.open(GestureContext::CipherStage(1));
        s.camera_failed(CameraError::Timeout);
        assert_eq!(s.retry(), Ok(()));
        assert_eq!(s.camera(), &CameraState::Opening);
        s.camera_ready();
        s.close();
        let signals = s.drain_signals();
        let starts = signals.iter().filter(|sig| **sig == GestureSignal::StartCamera).count();
        assert_eq!(starts, 2);
        assert_eq!(stops(&signals), 2);
    }

    #[test]
    fn brightness_samples_every_fortieth_pixel() {
        assert_eq!(brightness(&[]), 50.0);
        let white = vec![255u8; 4 * 400];
        assert!((brightness(&white) - 255.0).abs() < 0.5);
        let dark = vec![10u8; 4 * 400];
        assert!(brightness(&dark) < 40.0);
    }

    #[test]
    fn brightness_is_due_every_fifteen_frames() {
        let mut s = live_session(GestureContext::LevelUnlock { level: 3 });
        let mut due = 0;
        for t in 0..30 {
            s.on_frame(None, t as f64);
            if s.brightness_due() {
                due += 1;
            }
        }
        assert_eq!(due, 2);
    }
}
