// extensions/mod.rs
//
// Optional, decoupled systems that games can use independently.

pub mod sequence;

pub use sequence::{Stage, StageSequence, StageChange};
