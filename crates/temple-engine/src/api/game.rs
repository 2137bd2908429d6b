use crate::api::types::{EntityId, SoundEvent, GameEvent};
use crate::core::time::GameClock;
use crate::input::queue::InputQueue;
use crate::renderer::instance::RenderBuffer;
use crate::storage::{KeyValueStore, MemoryStore};

/// Configuration for the engine, provided by the game.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Fixed timestep in seconds (default: 1/60).
    pub fixed_dt: f32,
    /// Lateral extent of the playfield in world units.
    pub world_width: f32,
    /// Track length from spawn depth to cull depth in world units.
    pub world_depth: f32,
    /// Maximum number of render instances (default: 128).
    pub max_instances: usize,
    /// Maximum number of sound events per frame (default: 32).
    pub max_sounds: usize,
    /// Maximum number of game events per frame (default: 64).
    pub max_events: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            world_width: 12.0,
            world_depth: 95.0,
            max_instances: 128,
            max_sounds: 32,
            max_events: 64,
        }
    }
}

/// The core contract every game must fulfill.
pub trait Game {
    /// Return engine configuration. Called once before init.
    fn config(&self) -> GameConfig {
        GameConfig::default()
    }

    /// Setup initial state, read persisted values, prepare the world.
    fn init(&mut self, ctx: &mut EngineContext);

    /// The game loop tick. Consume intents, advance the simulation, emit events.
    fn update(&mut self, ctx: &mut EngineContext, input: &InputQueue);

    /// Optional read-only render pass writing instances for the page renderer.
    fn render(&self, _ctx: &mut RenderContext) {}
}

/// Mutable access to engine state, passed to Game::init and Game::update.
pub struct EngineContext {
    pub sounds: Vec<SoundEvent>,
    pub events: Vec<GameEvent>,
    pub clock: GameClock,
    /// Seed for the game's random generator; the web runner sets it from the page clock.
    pub seed: u64,
    store: Box<dyn KeyValueStore>,
    max_events: usize,
    next_id: u32,
}

impl EngineContext {
    pub fn new() -> Self {
        Self::with_store(Box::new(MemoryStore::new()))
    }

    /// Create a context backed by a specific persistence store.
    pub fn with_store(store: Box<dyn KeyValueStore>) -> Self {
        Self {
            sounds: Vec::new(),
            events: Vec::new(),
            clock: GameClock::new(),
            seed: 0x2545_f491_4f6c_dd1d,
            store,
            max_events: GameConfig::default().max_events,
            next_id: 1,
        }
    }

    /// Apply capacities from the game's configuration.
    pub fn configure(&mut self, config: &GameConfig) {
        self.max_events = config.max_events;
        self.events.reserve(config.max_events);
        self.sounds.reserve(config.max_sounds);
    }

    /// Generate the next unique entity ID.
    pub fn next_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Current game time in milliseconds.
    pub fn now_ms(&self) -> f64 {
        self.clock.now_ms()
    }

    /// Emit a sound event to be forwarded to the page.
    pub fn emit_sound(&mut self, event: SoundEvent) {
        self.sounds.push(event);
    }

    /// Emit a game event to be forwarded to the page.
    /// Events beyond the per-frame capacity are dropped.
    pub fn emit_event(&mut self, event: GameEvent) {
        if self.events.len() >= self.max_events {
            log::warn!("event buffer full, dropping event kind {}", event.kind_code());
            return;
        }
        self.events.push(event);
    }

    /// Persistence store (high scores, linked tokens).
    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    pub fn store_mut(&mut self) -> &mut dyn KeyValueStore {
        self.store.as_mut()
    }

    /// Clear per-frame transient data (sounds, events).
    pub fn clear_frame_data(&mut self) {
        self.sounds.clear();
        self.events.clear();
    }
}

impl Default for EngineContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Render context for optional custom render commands.
pub struct RenderContext<'a> {
    pub render_buffer: &'a mut RenderBuffer,
}
