use temple_engine::*;

use crate::boosts::BoostKind;
use crate::chase::{move_story_object, ChaseStatus};
use crate::cipher::{segment_states, Answer, CompletionReport, Finale, FinaleStage, SegmentState, CIPHER_STAGES};
use crate::collision::{self, CollisionReport};
use crate::config::{level, GameSettings, QualityTier, CULL_Z};
use crate::events::*;
use crate::gesture::{CameraError, GestureContext, GestureSession, GestureSignal, PoseType};
use crate::highscore;
use crate::lives::{HitOutcome, RevivalStep};
use crate::morse::text_to_morse;
use crate::objects::{Category, ObjectKind, StoryObject, WorldObject, RENDER_PLAYER, RENDER_STORY};
use crate::player::{intent_for_key, Intent, SwipeTracker};
use crate::progression::StoryPhase;
use crate::unlock::{LevelUnlock, UnlockStep};
use crate::world::World;

const STORY_COUNTDOWN_FROM: u32 = 3;

pub struct MysteryTemple {
    world: World,
    swipe: SwipeTracker,
    gesture: GestureSession,
    unlock: LevelUnlock,
    finale: Finale,
    story_countdown: Countdown,
    highscore: u64,
    report: Option<CompletionReport>,
    /// Game time of the last update, for calls made between ticks.
    now_ms: f64,
    /// Events and sounds raised outside `update`, flushed on the next tick.
    events: Vec<GameEvent>,
    sounds: Vec<SoundEvent>,
}

impl Default for MysteryTemple {
    fn default() -> Self {
        Self::new()
    }
}

impl MysteryTemple {
    pub fn new() -> Self {
        Self::with_settings(GameSettings::default())
    }

    pub fn with_settings(settings: GameSettings) -> Self {
        Self {
            gesture: GestureSession::new(&settings.gesture),
            world: World::new(settings, 1),
            swipe: SwipeTracker::default(),
            unlock: LevelUnlock::new(),
            finale: Finale::new(),
            story_countdown: Countdown::new(),
            highscore: 0,
            report: None,
            now_ms: 0.0,
            events: Vec::new(),
            sounds: Vec::new(),
        }
    }

    /// Replace the tuning. Takes effect for the next run.
    pub fn apply_settings(&mut self, settings: GameSettings) {
        let seed = self.world.rng.next_u64();
        self.gesture.close();
        self.drain_gesture();
        self.gesture = GestureSession::new(&settings.gesture);
        self.world = World::new(settings, seed);
    }

    // ---- Accessors ----

    pub fn score(&self) -> u64 {
        self.world.stats.score
    }

    pub fn highscore(&self) -> u64 {
        self.highscore
    }

    pub fn lives(&self) -> u32 {
        self.world.lives.lives()
    }

    pub fn level(&self) -> usize {
        self.world.progress.level()
    }

    pub fn phase(&self) -> StoryPhase {
        self.world.progress.phase()
    }

    pub fn speed(&self) -> f32 {
        self.world.speed
    }

    pub fn gems(&self) -> u32 {
        self.world.stats.total_gems()
    }

    pub fn letters_filled(&self) -> usize {
        self.world.progress.letters_filled()
    }

    pub fn letters(&self) -> String {
        self.world.progress.letters().iter().map(|l| l.unwrap_or('_')).collect()
    }

    pub fn chase_progress(&self) -> f32 {
        self.world.chase.progress()
    }

    pub fn chase_distance_m(&self) -> u32 {
        self.world.chase.distance_m(self.world.settings.difficulty.chase_escape_threshold)
    }

    pub fn boost_remaining_ms(&self, kind: BoostKind) -> f64 {
        self.world.boosts.remaining_ms(kind, self.now_ms)
    }

    pub fn is_running(&self) -> bool {
        self.world.running
    }

    pub fn is_paused(&self) -> bool {
        self.world.paused
    }

    pub fn hold_progress(&self) -> f32 {
        self.gesture.hold_progress()
    }

    pub fn brightness_due(&self) -> bool {
        self.gesture.brightness_due()
    }

    pub fn cipher_verified(&self) -> [bool; CIPHER_STAGES] {
        *self.finale.verified()
    }

    pub fn finale_stage(&self) -> Option<FinaleStage> {
        self.finale.current()
    }

    /// Morse rendering of the current level's message.
    pub fn level_morse(&self) -> String {
        text_to_morse(self.world.progress.level_def().english_message)
    }

    /// The level password, shown once the level gesture is verified.
    pub fn revealed_password(&self) -> Option<&'static str> {
        self.unlock.is_running().then(|| self.world.progress.level_def().password)
    }

    pub fn completion_report(&self) -> Option<&CompletionReport> {
        self.report.as_ref()
    }

    // ---- Calls from the page between ticks ----

    pub fn on_hand_frame(&mut self, pose: Option<PoseType>) {
        self.gesture.on_frame(pose, self.now_ms);
        self.drain_gesture();
    }

    pub fn on_camera_ready(&mut self) {
        self.gesture.camera_ready();
        self.emit(EVENT_CAMERA, 2.0, 0.0, 0.0);
    }

    pub fn on_camera_failed(&mut self, error: CameraError) {
        self.gesture.camera_failed(error);
        self.drain_gesture();
    }

    pub fn on_brightness(&mut self, level: f32) {
        self.gesture.on_brightness(level);
        self.drain_gesture();
    }

    /// Typed fallback for the level password. Case and surrounding space are ignored.
    pub fn submit_level_password(&mut self, typed: &str) -> bool {
        let accepted = self.phase() == StoryPhase::Caught
            && !self.unlock.is_running()
            && typed.trim().eq_ignore_ascii_case(self.world.progress.level_def().password);
        self.emit(EVENT_PASSWORD, if accepted { 1.0 } else { 0.0 }, 0.0, 0.0);
        if accepted {
            self.gesture.close();
            self.drain_gesture();
            self.start_unlock();
        }
        accepted
    }

    pub fn submit_cipher_password(&mut self, typed: &str) -> bool {
        let change = self.finale.submit_password(typed, self.now_ms);
        self.emit(EVENT_PASSWORD, if change.is_some() { 1.0 } else { 0.0 }, 1.0, 0.0);
        if let Some(change) = change {
            self.emit_finale_change(change);
        }
        change.is_some()
    }

    pub fn cipher_typing_state(&self, typed: &str) -> [SegmentState; CIPHER_STAGES] {
        segment_states(typed)
    }

    // ---- Internals ----

    fn emit(&mut self, kind: u32, a: f32, b: f32, c: f32) {
        self.events.push(GameEvent::new(kind, a, b, c));
    }

    fn sound(&mut self, id: u32) {
        self.sounds.push(SoundEvent(id));
    }

    fn flush(&mut self, ctx: &mut EngineContext) {
        for event in self.events.drain(..) {
            ctx.emit_event(event);
        }
        for sound in self.sounds.drain(..) {
            ctx.emit_sound(sound);
        }
    }

    fn set_phase(&mut self, phase: StoryPhase) {
        self.world.progress.set_phase(phase);
        self.emit_phase();
    }

    fn emit_phase(&mut self) {
        let code = self.phase().code();
        let level = self.level() as f32;
        self.emit(EVENT_PHASE, code, level, 0.0);
    }

    fn despawn_all(&mut self, removed: Vec<WorldObject>, reason: f32) {
        for object in removed {
            self.emit(EVENT_OBJECT_DESPAWN, object.id.0 as f32, reason, 0.0);
        }
    }

    fn remove_story_object(&mut self) {
        if let Some(story) = self.world.story.take() {
            self.emit(EVENT_OBJECT_DESPAWN, story.id.0 as f32, DESPAWN_CLEARED, 0.0);
        }
    }

    fn start_run(&mut self) {
        let removed = self.world.reset();
        self.despawn_all(removed, DESPAWN_CLEARED);
        self.remove_story_object();
        self.gesture.close();
        self.drain_gesture();
        self.unlock.reset();
        self.finale.reset();
        self.story_countdown.cancel();
        self.report = None;
        self.world.running = true;
        log::info!("run started at level 1");
        self.emit_phase();
    }

    fn handle_input(&mut self, event: InputEvent, ctx: &mut EngineContext) {
        match event {
            InputEvent::KeyDown { key_code } => {
                if let Some(intent) = intent_for_key(key_code) {
                    self.handle_intent(intent);
                }
            }
            InputEvent::PointerDown { x, y } => self.swipe.down(x, y),
            InputEvent::PointerUp { x, y } => {
                let threshold = self.world.settings.player.swipe_threshold;
                if let Some(intent) = self.swipe.up(x, y, threshold) {
                    self.handle_intent(intent);
                }
            }
            InputEvent::Custom { kind, a, .. } => self.handle_custom(kind, a, ctx),
            InputEvent::PointerMove { .. } | InputEvent::KeyUp { .. } => {}
        }
    }

    fn handle_intent(&mut self, intent: Intent) {
        if !self.world.running {
            return;
        }
        if intent == Intent::TogglePause {
            self.world.paused = !self.world.paused;
            let paused = self.world.paused;
            self.emit(EVENT_PAUSE, if paused { 1.0 } else { 0.0 }, 0.0, 0.0);
            return;
        }
        if self.world.paused || !self.phase().is_running() {
            return;
        }
        let settings = self.world.settings.player.clone();
        if self.world.player.apply(intent, self.now_ms, &settings) && intent == Intent::Jump {
            self.sound(SOUND_JUMP);
        }
    }

    fn handle_custom(&mut self, kind: u32, a: f32, ctx: &mut EngineContext) {
        match kind {
            CUSTOM_START => self.start_run(),
            CUSTOM_SET_QUALITY => {
                let quality = if a >= 0.5 { QualityTier::High } else { QualityTier::Low };
                self.world.settings.quality = quality;
                self.world.spawner.set_quality(quality);
            }
            CUSTOM_RETRY => self.retry_level(),
            CUSTOM_CONTINUE => self.continue_stage(ctx),
            CUSTOM_OPEN_GESTURE => self.open_gesture(a),
            CUSTOM_CLOSE_GESTURE => {
                self.gesture.close();
                self.drain_gesture();
            }
            CUSTOM_ANSWER => self.answer(if a >= 0.5 { Answer::Yes } else { Answer::No }, ctx),
            CUSTOM_TOGGLE_PAUSE => self.handle_intent(Intent::TogglePause),
            CUSTOM_SKIP_GESTURE => {
                if let Err(err) = self.gesture.skip() {
                    log::warn!("gesture skip refused: {err}");
                }
                self.drain_gesture();
            }
            CUSTOM_RETRY_CAMERA => {
                if let Err(err) = self.gesture.retry() {
                    log::warn!("camera retry refused: {err}");
                }
                self.drain_gesture();
            }
            other => log::warn!("unknown custom event kind {other}"),
        }
    }

    fn open_gesture(&mut self, a: f32) {
        let context = if a < 0.0 {
            if self.phase() != StoryPhase::Caught || self.unlock.is_running() {
                log::warn!("level gesture requested outside the level-complete screen");
                return;
            }
            GestureContext::LevelUnlock { level: self.level() }
        } else {
            let stage = a as usize;
            if self.finale.current() != Some(FinaleStage::GestureUnlock) || stage >= CIPHER_STAGES {
                log::warn!("cipher gesture {stage} requested outside the gesture locks");
                return;
            }
            GestureContext::CipherStage(stage)
        };
        self.gesture.open(context);
        self.drain_gesture();
    }

    fn drain_gesture(&mut self) {
        for signal in self.gesture.drain_signals() {
            match signal {
                GestureSignal::StartCamera => self.emit(EVENT_CAMERA, 1.0, 0.0, 0.0),
                GestureSignal::StopCamera => self.emit(EVENT_CAMERA, 0.0, 0.0, 0.0),
                GestureSignal::CameraFailed(err) => self.emit(EVENT_CAMERA, -1.0, err.code(), 0.0),
                GestureSignal::Progress { progress, detected, pose } => {
                    self.emit(EVENT_GESTURE, progress, if detected { 1.0 } else { 0.0 }, pose.code())
                }
                GestureSignal::LowLight { low, brightness } => {
                    self.emit(EVENT_LOW_LIGHT, if low { 1.0 } else { 0.0 }, brightness, 0.0)
                }
                GestureSignal::Verified { context, skipped } => self.on_verified(context, skipped),
            }
        }
    }

    fn on_verified(&mut self, context: GestureContext, skipped: bool) {
        let skipped_flag = if skipped { 1.0 } else { 0.0 };
        self.sound(SOUND_VERIFIED);
        match context {
            GestureContext::LevelUnlock { level } => {
                self.emit(EVENT_VERIFIED, 0.0, level as f32, skipped_flag);
                if self.phase() == StoryPhase::Caught && !self.unlock.is_running() {
                    self.start_unlock();
                }
            }
            GestureContext::CipherStage(stage) => {
                if self.finale.verify_stage(stage) {
                    self.emit(EVENT_VERIFIED, 1.0, stage as f32, skipped_flag);
                }
                if let Some(change) = self.finale.unlock_password_entry(self.now_ms) {
                    self.emit_finale_change(change);
                }
            }
        }
    }

    fn start_unlock(&mut self) {
        let is_final = self.world.progress.level_def().is_final;
        let step = self.unlock.start(self.now_ms, is_final);
        self.handle_unlock_step(step, None);
    }

    fn handle_unlock_step(&mut self, step: UnlockStep, ctx: Option<&mut EngineContext>) {
        match step {
            UnlockStep::Entered(stage) => self.emit(EVENT_STAGE, SEQUENCE_UNLOCK, stage.code(), 0.0),
            UnlockStep::Countdown(n) => self.emit(EVENT_COUNTDOWN, COUNTDOWN_NEXT_LEVEL, n as f32, 0.0),
            UnlockStep::NextLevel => self.next_level(),
            UnlockStep::Finale => match ctx {
                Some(ctx) => self.enter_finale(ctx),
                None => log::warn!("finale requested without an engine context"),
            },
        }
    }

    fn continue_stage(&mut self, ctx: &mut EngineContext) {
        if self.unlock.is_running() {
            for step in self.unlock.continue_from_morse(self.now_ms) {
                self.handle_unlock_step(step, Some(&mut *ctx));
            }
        } else if let Some(change) = self.finale.continue_stage(self.now_ms) {
            self.emit_finale_change(change);
        }
    }

    fn retry_level(&mut self) {
        if self.phase() != StoryPhase::Escaped {
            return;
        }
        let removed = self.world.clear_track();
        self.despawn_all(removed, DESPAWN_CLEARED);
        self.world.player.reset();
        self.world.chase.reset();
        self.world.paused = false;
        self.world.progress.reset_for_retry();
        log::info!("retrying level {}", self.level() + 1);
        self.emit_phase();
    }

    fn next_level(&mut self) {
        if !self.world.progress.advance_level() {
            return;
        }
        let removed = self.world.clear_track();
        self.despawn_all(removed, DESPAWN_CLEARED);
        self.remove_story_object();
        self.world.player.reset();
        self.world.chase.reset();
        self.world.paused = false;
        log::info!("level {} started: {}", self.level() + 1, self.world.progress.level_def().name);
        self.emit_phase();
    }

    fn enter_finale(&mut self, ctx: &mut EngineContext) {
        self.world.progress.advance_level();
        self.emit_phase();
        self.record_highscore(ctx);
        let change = self.finale.start(self.now_ms);
        self.emit_finale_change(change);
    }

    fn emit_finale_change(&mut self, change: StageChange<FinaleStage>) {
        let code = match change {
            StageChange::Entered(stage) => stage.code(),
            StageChange::Finished => -1.0,
        };
        self.emit(EVENT_STAGE, SEQUENCE_FINALE, code, 0.0);
    }

    fn answer(&mut self, answer: Answer, ctx: &mut EngineContext) {
        let score = self.score();
        let level = self.level() as u32 + 1;
        let Some(report) = self.finale.answer(answer, score, level, self.now_ms) else {
            return;
        };
        let yes = if answer == Answer::Yes { 1.0 } else { 0.0 };
        self.emit(EVENT_FINISH, yes, score as f32, level as f32);
        self.emit(EVENT_STAGE, SEQUENCE_FINALE, -1.0, 0.0);
        self.report = Some(report);
        self.record_highscore(ctx);
        log::info!("finale answered {:?}", answer);
    }

    fn record_highscore(&mut self, ctx: &mut EngineContext) {
        let score = self.score();
        if highscore::record(ctx.store_mut(), score) {
            self.highscore = score;
            self.emit(EVENT_HIGHSCORE, score as f32, 0.0, 0.0);
        }
    }

    fn game_over(&mut self, ctx: &mut EngineContext) {
        self.world.running = false;
        self.gesture.close();
        self.drain_gesture();
        let stats = self.world.stats;
        log::info!("game over: score {} at level {}", stats.score, self.level() + 1);
        self.emit(EVENT_GAME_OVER, stats.score as f32, (self.level() + 1) as f32, stats.total_gems() as f32);
        self.record_highscore(ctx);
    }

    // ---- Timers ----

    fn poll_timers(&mut self, ctx: &mut EngineContext) {
        let now = self.now_ms;

        let expired = self.world.boosts.poll_expired(now);
        for kind in expired {
            self.emit(EVENT_BOOST, kind.code(), 0.0, 0.0);
        }

        match self.world.lives.poll(now) {
            Some(RevivalStep::Tick(secs)) => {
                let lives = self.lives() as f32;
                self.emit(EVENT_REVIVAL, secs as f32, lives, 0.0);
            }
            Some(RevivalStep::Revived) => {
                let lives = self.lives() as f32;
                self.emit(EVENT_REVIVAL, 0.0, lives, 0.0);
            }
            None => {}
        }

        match self.story_countdown.poll(now) {
            Some(CountdownStep::Tick(n)) => self.emit(EVENT_COUNTDOWN, COUNTDOWN_CHASE, n as f32, 0.0),
            Some(CountdownStep::Done) => {
                self.emit(EVENT_COUNTDOWN, COUNTDOWN_CHASE, 0.0, 0.0);
                self.start_chase();
            }
            None => {}
        }

        for step in self.unlock.poll(now) {
            self.handle_unlock_step(step, Some(&mut *ctx));
        }

        if let Some(change) = self.finale.poll(now) {
            self.emit_finale_change(change);
        }
    }

    // ---- Story ----

    fn trigger_story(&mut self, ctx: &mut EngineContext) {
        let removed = self.world.pools.clear_category(Category::Obstacle);
        self.despawn_all(removed, DESPAWN_CLEARED);
        let def = self.world.progress.level_def();
        let story = StoryObject::new(ctx.next_id(), def.object_color);
        self.emit(EVENT_OBJECT_SPAWN, story.id.0 as f32, RENDER_STORY, story.pos.x);
        self.world.story = Some(story);
        self.world.chase.reset();
        log::info!("story event: {} {}", def.icon, def.name);
        self.set_phase(StoryPhase::StoryIntro);
        self.story_countdown.start(self.now_ms, STORY_COUNTDOWN_FROM, 1000.0);
        self.emit(EVENT_COUNTDOWN, COUNTDOWN_CHASE, STORY_COUNTDOWN_FROM as f32, 0.0);
    }

    fn start_chase(&mut self) {
        if self.phase() != StoryPhase::StoryIntro {
            return;
        }
        self.world.chase.reset();
        self.set_phase(StoryPhase::Chase);
    }

    fn escape(&mut self) {
        self.remove_story_object();
        let removed = self.world.clear_track();
        self.despawn_all(removed, DESPAWN_CLEARED);
        log::info!("story object escaped at level {}", self.level() + 1);
        self.set_phase(StoryPhase::Escaped);
    }

    fn catch_story_object(&mut self) {
        self.remove_story_object();
        self.sound(SOUND_CATCH);
        log::info!("caught the {}", self.world.progress.level_def().name);
        self.set_phase(StoryPhase::Caught);
    }

    // ---- Simulation ----

    fn simulate(&mut self, dt: f32, ctx: &mut EngineContext) {
        let now = self.now_ms;
        self.world.stats.score += dt.max(0.0).floor() as u64;
        self.world.update_speed();

        let player_settings = self.world.settings.player.clone();
        self.world.player.tick(now, dt, &player_settings);

        let dz = self.world.speed * dt;
        self.world.pools.advance(dz);
        for object in self.world.pools.cull(CULL_Z) {
            let reason = if object.consumed { DESPAWN_CONSUMED } else { DESPAWN_MISSED };
            log::debug!("cull #{}", object.id.0);
            self.emit(EVENT_OBJECT_DESPAWN, object.id.0 as f32, reason, 0.0);
        }

        match self.phase() {
            StoryPhase::CollectingRunes => {
                let letter = self.world.progress.next_letter();
                let world = &mut self.world;
                world.spawner.tick(&mut world.pools, &mut world.rng, &world.settings.difficulty, letter, ctx);
            }
            StoryPhase::PathClearing => {
                if self.world.path_clear() {
                    self.trigger_story(ctx);
                    return;
                }
            }
            StoryPhase::Chase => {
                let speed = self.world.speed;
                if let Some(story) = self.world.story.as_mut() {
                    move_story_object(story, speed, dt);
                }
                let difficulty = self.world.settings.difficulty.clone();
                if self.world.chase.tick(dt, &difficulty) == ChaseStatus::Escaped {
                    self.escape();
                    return;
                }
            }
            _ => {}
        }

        let phase_before = self.phase();
        let report = collision::run(&mut self.world, now, dt);
        self.apply_collisions(report, ctx);
        if self.phase() != phase_before && self.phase() == StoryPhase::PathClearing {
            log::info!("all runes collected for level {}", self.level() + 1);
            self.emit_phase();
        }
    }

    fn apply_collisions(&mut self, report: CollisionReport, ctx: &mut EngineContext) {
        if let Some((_, outcome)) = report.hit {
            match outcome {
                HitOutcome::Ignored => {}
                HitOutcome::ShieldAbsorbed => {
                    self.emit(EVENT_HIT, outcome.code(), self.lives() as f32, 0.0);
                    self.emit(EVENT_BOOST, BoostKind::Shield.code(), 0.0, 0.0);
                    self.sound(SOUND_SHIELD);
                }
                HitOutcome::Reviving { lives_left } => {
                    self.emit(EVENT_HIT, outcome.code(), lives_left as f32, 0.0);
                    let secs = self.world.lives.revival_secs() as f32;
                    self.emit(EVENT_REVIVAL, secs, lives_left as f32, 0.0);
                    self.sound(SOUND_HIT);
                }
                HitOutcome::GameOver => {
                    self.emit(EVENT_HIT, outcome.code(), 0.0, 0.0);
                    self.sound(SOUND_HIT);
                    self.game_over(ctx);
                    return;
                }
            }
        }

        for item in report.collected {
            let slot = match item.kind {
                ObjectKind::Letter { slot, .. } => slot as f32,
                _ => -1.0,
            };
            self.emit(EVENT_COLLECT, item.category.code(), item.points as f32, slot);
            self.emit(EVENT_OBJECT_DESPAWN, item.id.0 as f32, DESPAWN_CONSUMED, 0.0);
            match item.kind {
                ObjectKind::Gem { .. } => self.sound(SOUND_GEM),
                ObjectKind::Boost { kind } => {
                    let duration = self.world.boosts.duration_ms(kind) as f32;
                    self.emit(EVENT_BOOST, kind.code(), 1.0, duration);
                    self.sound(SOUND_BOOST);
                }
                ObjectKind::Letter { .. } => {
                    let filled = self.letters_filled() as f32;
                    self.emit(EVENT_LETTER, filled, slot, 0.0);
                    self.sound(SOUND_RUNE);
                }
                ObjectKind::Obstacle { .. } => {}
            }
        }

        if report.caught {
            self.catch_story_object();
        }
    }
}

impl Game for MysteryTemple {
    fn config(&self) -> GameConfig {
        // A track clear despawns every pooled object in one frame.
        GameConfig { max_events: 128, ..GameConfig::default() }
    }

    fn init(&mut self, ctx: &mut EngineContext) {
        self.world.rng = Rng::new(ctx.seed);
        self.highscore = highscore::load(ctx.store());
        log::info!("mystery temple ready, best score {}", self.highscore);
    }

    fn update(&mut self, ctx: &mut EngineContext, input: &InputQueue) {
        self.now_ms = ctx.now_ms();
        let dt = ctx.clock.dt();

        for event in input.iter() {
            self.handle_input(*event, ctx);
        }

        self.poll_timers(ctx);

        let simulating = self.world.running
            && !self.world.paused
            && !self.world.lives.is_game_over()
            && self.phase().is_running();
        if simulating {
            self.simulate(dt, ctx);
        }

        self.flush(ctx);
    }

    fn render(&self, ctx: &mut RenderContext) {
        let spin = (self.now_ms * 0.003) as f32;
        let player = &self.world.player;
        let blink = self.world.lives.is_invincible() && (self.now_ms / 100.0) as u64 % 2 == 0;
        ctx.render_buffer.push(RenderInstance {
            id: 0.0,
            kind: RENDER_PLAYER,
            x: player.pos.x,
            y: player.pos.y,
            z: player.pos.z,
            rotation: 0.0,
            scale: player.scale_y,
            alpha: if blink { 0.4 } else { 1.0 },
        });

        for object in self.world.pools.iter().filter(|o| !o.consumed) {
            let rotation = match object.kind {
                ObjectKind::Obstacle { .. } => 0.0,
                _ => spin,
            };
            ctx.render_buffer.push(RenderInstance {
                id: object.id.0 as f32,
                kind: object.kind.render_kind(),
                x: object.pos.x,
                y: object.pos.y,
                z: object.pos.z,
                rotation,
                scale: 1.0,
                alpha: 1.0,
            });
        }

        if let Some(story) = &self.world.story {
            ctx.render_buffer.push(RenderInstance {
                id: story.id.0 as f32,
                kind: RENDER_STORY,
                x: story.pos.x,
                y: story.pos.y + (self.now_ms / 380.0).sin() as f32 * 0.45,
                z: story.pos.z,
                rotation: spin,
                scale: 1.0,
                alpha: 1.0,
            });
        }
    }
}

/// Name of the current level's object and its icon, for overlays.
pub fn level_title(index: usize) -> String {
    let def = level(index);
    format!("{} {}", def.icon, def.name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LivesSettings;
    use crate::objects::ObstacleShape;
    use glam::Vec3;
    use temple_engine::core::time::FRAME_MS;

    fn boot(game: &mut MysteryTemple) -> EngineContext {
        let mut ctx = EngineContext::new();
        ctx.configure(&game.config());
        game.init(&mut ctx);
        ctx
    }

    fn step(game: &mut MysteryTemple, ctx: &mut EngineContext, input: &[InputEvent]) -> Vec<GameEvent> {
        let mut queue = InputQueue::new();
        for event in input {
            queue.push(*event);
        }
        ctx.clear_frame_data();
        ctx.clock.advance(FRAME_MS);
        game.update(ctx, &queue);
        ctx.events.clone()
    }

    fn custom(kind: u32, a: f32) -> InputEvent {
        InputEvent::Custom { kind, a, b: 0.0, c: 0.0 }
    }

    fn has(events: &[GameEvent], kind: u32) -> bool {
        events.iter().any(|e| e.kind_code() == kind)
    }

    /// Run frames until `done` holds, collecting every event on the way.
    fn run_until(
        game: &mut MysteryTemple,
        ctx: &mut EngineContext,
        max_frames: usize,
        done: impl Fn(&MysteryTemple) -> bool,
    ) -> Vec<GameEvent> {
        let mut all = Vec::new();
        for _ in 0..max_frames {
            all.extend(step(game, ctx, &[]));
            if done(game) {
                return all;
            }
        }
        panic!("condition not reached in {max_frames} frames");
    }

    fn quiet_settings() -> GameSettings {
        let mut settings = GameSettings::default();
        let d = &mut settings.difficulty;
        d.obstacle_rate = 0.0;
        d.blue_gem_rate = 0.0;
        d.green_gem_rate = 0.0;
        d.red_gem_rate = 0.0;
        d.boost_rate = 0.0;
        d.letter_rate = 0.0;
        settings
    }

    fn fill_runes(game: &mut MysteryTemple) {
        let password = game.world.progress.level_def().password;
        for (slot, ch) in password.chars().enumerate() {
            game.world.progress.collect_letter(slot, ch);
        }
    }

    #[test]
    fn start_begins_collecting() {
        let mut game = MysteryTemple::new();
        let mut ctx = boot(&mut game);
        assert!(!game.is_running());
        let events = step(&mut game, &mut ctx, &[custom(CUSTOM_START, 0.0)]);
        assert!(game.is_running());
        assert!(has(&events, EVENT_PHASE));
        assert_eq!(game.phase(), StoryPhase::CollectingRunes);
        assert_eq!(game.score(), 1);
    }

    #[test]
    fn pause_freezes_the_run_but_not_timers() {
        let mut game = MysteryTemple::with_settings(quiet_settings());
        let mut ctx = boot(&mut game);
        step(&mut game, &mut ctx, &[custom(CUSTOM_START, 0.0)]);
        game.world.boosts.activate(BoostKind::Magnet, game.now_ms);
        let events = step(&mut game, &mut ctx, &[InputEvent::KeyDown { key_code: 80 }]);
        assert!(has(&events, EVENT_PAUSE));
        let score = game.score();
        step(&mut game, &mut ctx, &[InputEvent::KeyDown { key_code: 37 }]);
        assert_eq!(game.world.player.lane, 1);
        let events = run_until(&mut game, &mut ctx, 600, |g| !g.world.boosts.is_active(BoostKind::Magnet));
        assert!(has(&events, EVENT_BOOST));
        assert_eq!(game.score(), score);
    }

    #[test]
    fn movement_is_ignored_before_start() {
        let mut game = MysteryTemple::new();
        let mut ctx = boot(&mut game);
        step(&mut game, &mut ctx, &[InputEvent::KeyDown { key_code: 39 }]);
        assert_eq!(game.world.player.lane, 1);
        step(&mut game, &mut ctx, &[custom(CUSTOM_START, 0.0), InputEvent::KeyDown { key_code: 39 }]);
        assert_eq!(game.world.player.lane, 2);
    }

    #[test]
    fn swipe_moves_the_player() {
        let mut game = MysteryTemple::with_settings(quiet_settings());
        let mut ctx = boot(&mut game);
        step(&mut game, &mut ctx, &[custom(CUSTOM_START, 0.0)]);
        step(
            &mut game,
            &mut ctx,
            &[InputEvent::PointerDown { x: 200.0, y: 300.0 }, InputEvent::PointerUp { x: 100.0, y: 310.0 }],
        );
        assert_eq!(game.world.player.lane, 0);
    }

    #[test]
    fn last_life_ends_the_run_and_saves_the_best() {
        let settings = GameSettings {
            lives: LivesSettings { max_lives: 1, ..LivesSettings::default() },
            ..quiet_settings()
        };
        let mut game = MysteryTemple::with_settings(settings);
        let mut ctx = boot(&mut game);
        step(&mut game, &mut ctx, &[custom(CUSTOM_START, 0.0)]);
        game.world.stats.score = 500;
        let x = game.world.player.pos.x;
        game.world.pools.push(WorldObject::obstacle(EntityId(900), x, 4.5, ObstacleShape::Block));
        let events = step(&mut game, &mut ctx, &[]);
        assert!(has(&events, EVENT_GAME_OVER));
        assert!(has(&events, EVENT_HIGHSCORE));
        assert!(!game.is_running());
        assert_eq!(game.lives(), 0);
        assert_eq!(ctx.store().get_u64(crate::config::HIGHSCORE_KEY), Some(501));

        let mut fresh = MysteryTemple::new();
        fresh.init(&mut ctx);
        assert_eq!(fresh.highscore(), 501);
    }

    #[test]
    fn escape_keeps_runes_and_clears_the_track() {
        let mut settings = quiet_settings();
        settings.difficulty.chase_fill_rate = 5.0;
        let mut game = MysteryTemple::with_settings(settings);
        let mut ctx = boot(&mut game);
        step(&mut game, &mut ctx, &[custom(CUSTOM_START, 0.0)]);
        fill_runes(&mut game);
        run_until(&mut game, &mut ctx, 10, |g| g.phase() == StoryPhase::StoryIntro);
        run_until(&mut game, &mut ctx, 200, |g| g.phase() == StoryPhase::Chase);

        game.world.pools.push(WorldObject::obstacle(EntityId(901), 4.0, -50.0, ObstacleShape::Block));
        run_until(&mut game, &mut ctx, 40, |g| g.phase() == StoryPhase::Escaped);

        assert_eq!(game.letters_filled(), 4);
        assert_eq!(game.world.pools.count(Category::Obstacle), 0);
        assert!(game.world.story.is_none());
        assert_eq!(game.lives(), 4);

        step(&mut game, &mut ctx, &[custom(CUSTOM_RETRY, 0.0)]);
        assert_eq!(game.letters_filled(), 4);
        assert_eq!(game.chase_progress(), 0.0);
        assert!(matches!(game.phase(), StoryPhase::PathClearing | StoryPhase::StoryIntro));
    }

    #[test]
    fn caught_level_unlocks_with_a_held_gesture() {
        let mut game = MysteryTemple::with_settings(quiet_settings());
        let mut ctx = boot(&mut game);
        step(&mut game, &mut ctx, &[custom(CUSTOM_START, 0.0)]);
        fill_runes(&mut game);
        let events = run_until(&mut game, &mut ctx, 200, |g| g.phase() == StoryPhase::Chase);
        let countdown: Vec<f32> = events
            .iter()
            .filter(|e| e.kind_code() == EVENT_COUNTDOWN)
            .map(|e| e.b)
            .collect();
        assert_eq!(countdown, vec![3.0, 2.0, 1.0, 0.0]);

        // Put the object right in front of the player.
        let player = game.world.player.pos;
        if let Some(story) = game.world.story.as_mut() {
            story.pos = Vec3::new(player.x, 2.0, player.z - 1.0);
        }
        run_until(&mut game, &mut ctx, 5, |g| g.phase() == StoryPhase::Caught);

        let events = step(&mut game, &mut ctx, &[custom(CUSTOM_OPEN_GESTURE, -1.0)]);
        assert!(events.iter().any(|e| e.kind_code() == EVENT_CAMERA && e.a == 1.0));
        game.on_camera_ready();

        let mut verified = 0;
        for _ in 0..300 {
            game.on_hand_frame(Some(PoseType::OpenPalm));
            let events = step(&mut game, &mut ctx, &[]);
            verified += events.iter().filter(|e| e.kind_code() == EVENT_VERIFIED).count();
        }
        assert_eq!(verified, 1);
        assert_eq!(game.unlock.current(), Some(crate::unlock::UnlockStage::Morse));
        assert!(game.level_morse().starts_with(".-- .... . -."));

        step(&mut game, &mut ctx, &[custom(CUSTOM_CONTINUE, 0.0)]);
        run_until(&mut game, &mut ctx, 400, |g| g.level() == 1);
        assert_eq!(game.phase(), StoryPhase::CollectingRunes);
        assert_eq!(game.letters_filled(), 0);
    }

    #[test]
    fn typed_password_is_the_fallback() {
        let mut game = MysteryTemple::with_settings(quiet_settings());
        let mut ctx = boot(&mut game);
        step(&mut game, &mut ctx, &[custom(CUSTOM_START, 0.0)]);
        assert!(!game.submit_level_password("love"));
        game.world.progress.set_phase(StoryPhase::Caught);
        assert!(!game.submit_level_password("lover"));
        assert_eq!(game.revealed_password(), None);
        assert!(game.submit_level_password("  love "));
        assert!(game.unlock.is_running());
        assert_eq!(game.revealed_password(), Some("LOVE"));
    }

    #[test]
    fn last_level_routes_to_the_finale() {
        let mut game = MysteryTemple::with_settings(quiet_settings());
        let mut ctx = boot(&mut game);
        step(&mut game, &mut ctx, &[custom(CUSTOM_START, 0.0)]);
        for _ in 0..4 {
            game.world.progress.advance_level();
        }
        game.world.stats.score = 9000;
        game.world.progress.set_phase(StoryPhase::Caught);
        assert!(game.submit_level_password("KISS"));
        run_until(&mut game, &mut ctx, 400, |g| g.unlock.current() == Some(crate::unlock::UnlockStage::Morse));
        let events = step(&mut game, &mut ctx, &[custom(CUSTOM_CONTINUE, 0.0)]);
        assert_eq!(game.phase(), StoryPhase::Finale);
        assert_eq!(game.finale_stage(), Some(FinaleStage::ShowMorse));
        assert!(has(&events, EVENT_HIGHSCORE));

        run_until(&mut game, &mut ctx, 2000, |g| g.finale_stage() == Some(FinaleStage::GestureUnlock));
        for stage in 0..CIPHER_STAGES {
            game.finale.verify_stage(stage);
        }
        step(&mut game, &mut ctx, &[custom(CUSTOM_OPEN_GESTURE, 0.0)]);
        game.on_camera_ready();
        game.on_brightness(5.0);
        step(&mut game, &mut ctx, &[custom(CUSTOM_SKIP_GESTURE, 0.0)]);
        assert_eq!(game.finale_stage(), Some(FinaleStage::PasswordEntry));
        assert_eq!(game.cipher_typing_state("LOVE")[0], SegmentState::Matched);
        assert!(game.submit_cipher_password("loveroyysoulhopekiss"));

        run_until(&mut game, &mut ctx, 600, |g| g.finale_stage() == Some(FinaleStage::TempleWall));
        step(&mut game, &mut ctx, &[custom(CUSTOM_CONTINUE, 0.0)]);
        step(&mut game, &mut ctx, &[custom(CUSTOM_CONTINUE, 0.0)]);
        assert_eq!(game.finale_stage(), Some(FinaleStage::Dialog));
        let events = step(&mut game, &mut ctx, &[custom(CUSTOM_ANSWER, 1.0)]);
        assert!(has(&events, EVENT_FINISH));
        let report = game.completion_report().unwrap();
        assert_eq!(report.answer, "YES");
        assert_eq!(report.level, 5);
    }

    #[test]
    fn unknown_custom_events_are_ignored() {
        let mut game = MysteryTemple::new();
        let mut ctx = boot(&mut game);
        step(&mut game, &mut ctx, &[custom(999, 0.0)]);
        assert!(!game.is_running());
    }

    #[test]
    fn render_draws_player_and_objects() {
        let mut game = MysteryTemple::with_settings(quiet_settings());
        let mut ctx = boot(&mut game);
        step(&mut game, &mut ctx, &[custom(CUSTOM_START, 0.0)]);
        game.world.pools.push(WorldObject::obstacle(EntityId(77), 0.0, -40.0, ObstacleShape::Barrier));
        let mut buffer = RenderBuffer::new();
        game.render(&mut RenderContext { render_buffer: &mut buffer });
        assert_eq!(buffer.instance_count(), 2);
        assert_eq!(buffer.instances[0].kind, RENDER_PLAYER);
        assert_eq!(buffer.instances[1].id, 77.0);
        assert_eq!(level_title(0), "🔮 Magic Orb");
    }

    #[test]
    fn completion_report_feeds_the_finish_relay() {
        let report = CompletionReport { answer: "YES".into(), score: 4321, level: 5 };
        let json = serde_json::to_string(&report).unwrap();
        let request: temple_bridge::FinishRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(request.answer_text(), "YES");
        assert_eq!(request.score_text(), "4321");
        assert_eq!(request.level_text(), "5");
        assert_eq!(request.token(), "");
    }
}
