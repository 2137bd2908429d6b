use temple_engine::{
    Game, GameConfig, EngineContext, RenderContext,
    InputEvent, InputQueue, RenderBuffer,
    FixedTimestep, KeyValueStore, ProtocolLayout,
};

/// Generic runner that owns a game and drives the engine loop.
///
/// wasm-bindgen cannot export generic structs, so each game keeps one of
/// these in a `thread_local!` (see `export_game!`).
pub struct GameRunner<G: Game> {
    game: G,
    ctx: EngineContext,
    input: InputQueue,
    /// Always empty; handed to every fixed step after the first of a frame.
    no_input: InputQueue,
    render_buffer: RenderBuffer,
    timestep: FixedTimestep,
    config: GameConfig,
    layout: ProtocolLayout,
    initialized: bool,
    frame_counter: u64,
    /// Sound ids widened to f32 for shared-buffer reads.
    sound_buffer: Vec<f32>,
}

impl<G: Game> GameRunner<G> {
    pub fn new(game: G) -> Self {
        Self::with_context(game, EngineContext::new())
    }

    /// Runner whose context persists through the given store.
    pub fn with_store(game: G, store: Box<dyn KeyValueStore>) -> Self {
        Self::with_context(game, EngineContext::with_store(store))
    }

    fn with_context(game: G, mut ctx: EngineContext) -> Self {
        let config = game.config();
        ctx.configure(&config);
        Self {
            timestep: FixedTimestep::new(config.fixed_dt),
            layout: ProtocolLayout::from_config(&config),
            render_buffer: RenderBuffer::with_capacity(config.max_instances),
            sound_buffer: Vec::with_capacity(config.max_sounds),
            game,
            ctx,
            input: InputQueue::new(),
            no_input: InputQueue::new(),
            config,
            initialized: false,
            frame_counter: 0,
        }
    }

    /// Set the random seed. Must be called before `init`.
    pub fn seed(&mut self, seed: u64) {
        self.ctx.seed = seed;
    }

    /// Initialize the game. Call once after construction.
    pub fn init(&mut self) {
        self.game.init(&mut self.ctx);
        self.initialized = true;
    }

    pub fn push_input(&mut self, event: InputEvent) {
        self.input.push(event);
    }

    /// Run one display frame: fixed updates, then the render pass.
    ///
    /// Queued input is shown to the first fixed step only, and stays queued
    /// when the frame was too short to run any step.
    pub fn tick(&mut self, dt: f32) {
        if !self.initialized {
            return;
        }

        self.ctx.clear_frame_data();

        let steps = self.timestep.accumulate(dt);
        let step_ms = self.timestep.dt_ms();
        for step in 0..steps {
            self.ctx.clock.advance(step_ms);
            let input = if step == 0 { &self.input } else { &self.no_input };
            self.game.update(&mut self.ctx, input);
        }
        if steps > 0 {
            self.input.clear();
        }

        self.render_buffer.clear();
        {
            let mut render_ctx = RenderContext {
                render_buffer: &mut self.render_buffer,
            };
            self.game.render(&mut render_ctx);
        }

        self.sound_buffer.clear();
        self.sound_buffer
            .extend(self.ctx.sounds.iter().take(self.config.max_sounds).map(|s| s.0 as f32));
        self.frame_counter += 1;
    }

    /// The game together with its context, for game-specific exports.
    pub fn game_and_ctx(&mut self) -> (&mut G, &mut EngineContext) {
        (&mut self.game, &mut self.ctx)
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn ctx(&self) -> &EngineContext {
        &self.ctx
    }

    // ---- Pointer accessors for shared-buffer reads ----

    pub fn instances_ptr(&self) -> *const f32 {
        self.render_buffer.instances_ptr()
    }

    pub fn instance_count(&self) -> u32 {
        self.render_buffer.instance_count()
    }

    pub fn sound_events_ptr(&self) -> *const f32 {
        self.sound_buffer.as_ptr()
    }

    pub fn sound_events_len(&self) -> u32 {
        self.sound_buffer.len() as u32
    }

    pub fn game_events_ptr(&self) -> *const f32 {
        self.ctx.events.as_ptr() as *const f32
    }

    pub fn game_events_len(&self) -> u32 {
        self.ctx.events.len() as u32
    }

    pub fn frame_counter(&self) -> u64 {
        self.frame_counter
    }

    pub fn game_time_ms(&self) -> f64 {
        self.ctx.now_ms()
    }

    pub fn alpha(&self) -> f32 {
        self.timestep.alpha()
    }

    pub fn world_width(&self) -> f32 {
        self.config.world_width
    }

    pub fn world_depth(&self) -> f32 {
        self.config.world_depth
    }

    // ---- Capacity accessors ----

    pub fn max_instances(&self) -> u32 {
        self.layout.max_instances as u32
    }

    pub fn max_sounds(&self) -> u32 {
        self.layout.max_sounds as u32
    }

    pub fn max_events(&self) -> u32 {
        self.layout.max_events as u32
    }

    pub fn buffer_total_floats(&self) -> u32 {
        self.layout.buffer_total_floats as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use temple_engine::GameEvent;

    /// Counts steps and the input events each step saw.
    struct Probe {
        steps: u32,
        inputs_seen: Vec<usize>,
        now_at_update: Vec<f64>,
    }

    impl Game for Probe {
        fn init(&mut self, _ctx: &mut EngineContext) {}

        fn update(&mut self, ctx: &mut EngineContext, input: &InputQueue) {
            self.steps += 1;
            self.inputs_seen.push(input.len());
            self.now_at_update.push(ctx.now_ms());
            ctx.emit_event(GameEvent::signal(1));
        }
    }

    fn runner() -> GameRunner<Probe> {
        let mut r = GameRunner::new(Probe { steps: 0, inputs_seen: Vec::new(), now_at_update: Vec::new() });
        r.init();
        r
    }

    #[test]
    fn input_reaches_only_the_first_step() {
        let mut r = runner();
        r.push_input(InputEvent::KeyDown { key_code: 37 });
        r.tick(3.0 / 60.0 + 0.001);
        assert_eq!(r.game().inputs_seen, vec![1, 0, 0]);
    }

    #[test]
    fn input_survives_a_frame_without_steps() {
        let mut r = runner();
        r.push_input(InputEvent::KeyDown { key_code: 37 });
        r.tick(0.001);
        assert_eq!(r.game().steps, 0);
        r.tick(1.0 / 60.0);
        assert_eq!(r.game().inputs_seen, vec![1]);
    }

    #[test]
    fn clock_advances_before_each_update() {
        let mut r = runner();
        r.tick(2.0 / 60.0 + 0.001);
        let times = &r.game().now_at_update;
        assert_eq!(times.len(), 2);
        assert!(times[0] > 0.0 && times[1] > times[0]);
    }

    #[test]
    fn events_are_per_frame() {
        let mut r = runner();
        r.tick(1.0 / 60.0);
        assert_eq!(r.game_events_len(), 1);
        r.tick(0.0);
        assert_eq!(r.game_events_len(), 0);
    }

    #[test]
    fn uninitialized_runner_does_nothing() {
        let mut r = GameRunner::new(Probe { steps: 0, inputs_seen: Vec::new(), now_at_update: Vec::new() });
        r.tick(1.0);
        assert_eq!(r.game().steps, 0);
        assert_eq!(r.frame_counter(), 0);
    }
}
