pub mod api;
pub mod core;
pub mod renderer;
pub mod bridge;
pub mod input;
pub mod storage;
pub mod extensions;

// Re-export key types at crate root for convenience
pub use api::game::{Game, GameConfig, EngineContext, RenderContext};
pub use api::types::{EntityId, SoundEvent, GameEvent};
pub use core::time::{FixedTimestep, GameClock};
pub use core::timer::{TimerSlot, TimerHandle, Countdown, CountdownStep};
pub use core::rng::Rng;
pub use core::bounds::Aabb;
pub use renderer::instance::{RenderInstance, RenderBuffer};
pub use input::queue::{InputEvent, InputQueue};
pub use bridge::protocol::ProtocolLayout;
pub use storage::{KeyValueStore, MemoryStore};

// Extensions: optional systems the game opts into
pub use extensions::{Stage, StageSequence, StageChange};
