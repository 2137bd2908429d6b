//! Bot bridge for the temple runner.
//!
//! Two endpoints, written against traits so any serverless host can mount them:
//! - `POST /api/webhook` mints a link token when a chat sends a start command.
//! - `POST /api/finish` relays the game's completion report to that chat once.
//!
//! The `relay` module is the page-side counterpart that posts the report.

pub mod error;
pub mod finish;
pub mod messenger;
pub mod relay;
pub mod response;
pub mod store;
pub mod webhook;

pub use error::{BridgeError, RelayError};
pub use finish::{handle_finish, handle_finish_options, FinishOutcome, FinishRequest};
pub use messenger::{Messenger, OutboundMessage, RecordingMessenger};
pub use relay::{notify_finish, RelayOutcome, Transport};
pub use response::HttpResponse;
pub use store::{MemorySessionStore, SessionRecord, SessionStore};
pub use webhook::handle_webhook;

/// Everything a handler needs from its deployment.
pub struct BridgeEnv<S: SessionStore, M: Messenger> {
    pub store: S,
    pub messenger: M,
    /// Public URL of the game page.
    pub game_url: String,
}

impl<S: SessionStore, M: Messenger> BridgeEnv<S, M> {
    pub fn new(store: S, messenger: M, game_url: impl Into<String>) -> Self {
        Self {
            store,
            messenger,
            game_url: game_url.into(),
        }
    }
}
