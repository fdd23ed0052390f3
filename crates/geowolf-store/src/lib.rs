//! SQLite-backed session store.
//!
//! All other components read and write game state through [`SessionStore`].
//! Every operation is atomic at the single-statement level; multi-step
//! workflows layered on top must tolerate interleaving at statement
//! boundaries.

mod bodies;
mod meeting;
mod messages;
mod players;
mod reports;
mod rows;
mod store;
mod tasks;
mod votes;

pub use store::SessionStore;
