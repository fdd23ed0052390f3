//! Shared domain types and abstractions for the Geowolf game server.

pub mod clock;
pub mod error;
pub mod geo;
pub mod model;
pub mod rng;
