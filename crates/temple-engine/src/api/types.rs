use bytemuck::{Pod, Zeroable};

/// Unique identifier for a world object spawned by the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct EntityId(pub u32);

/// A sound event emitted by the game logic.
/// The numeric value maps to a game-defined sound in the page's audio layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct SoundEvent(pub u32);

/// A game event communicated from Rust to the page through shared memory.
/// Generic container: `kind` identifies the event, `a/b/c` carry payload.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct GameEvent {
    pub kind: f32,
    pub a: f32,
    pub b: f32,
    pub c: f32,
}

impl GameEvent {
    pub const FLOATS: usize = 4;

    pub fn new(kind: u32, a: f32, b: f32, c: f32) -> Self {
        Self { kind: kind as f32, a, b, c }
    }

    /// Event carrying only a kind.
    pub fn signal(kind: u32) -> Self {
        Self::new(kind, 0.0, 0.0, 0.0)
    }

    /// The event kind as the integer the game defined it with.
    pub fn kind_code(&self) -> u32 {
        self.kind as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn game_event_is_4_floats() {
        assert_eq!(std::mem::size_of::<GameEvent>(), GameEvent::FLOATS * 4);
    }

    #[test]
    fn kind_code_round_trips_small_integers() {
        let ev = GameEvent::new(17, 1.0, 2.0, 3.0);
        assert_eq!(ev.kind_code(), 17);
        assert_eq!(GameEvent::signal(4).a, 0.0);
    }
}
