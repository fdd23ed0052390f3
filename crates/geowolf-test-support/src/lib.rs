//! Shared test mocks and utilities for the Geowolf game server.

mod clock;
mod rng;

pub use clock::FixedClock;
pub use rng::{MockRng, SequenceRng};
