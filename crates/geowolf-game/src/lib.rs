//! Session orchestration core.
//!
//! A [`GameSession`] owns the store, the realtime broadcaster, the mission
//! catalog, and the meeting timer, and exposes every game operation. All
//! process-wide state lives in the session object injected from `main`;
//! there are no hidden singletons, so tests can run independent sessions
//! side by side.

pub mod broadcast;
pub mod clock;
pub mod config;

mod chat;
mod kill;
mod meeting;
mod session;
mod tasks;
mod win;

pub use meeting::{ExecutedPlayer, KillLog, MeetingOutcome};
pub use session::GameSession;
pub use tasks::AssignReason;
pub use win::{GameOutcome, ProgressSnapshot, WinState, Winner};
