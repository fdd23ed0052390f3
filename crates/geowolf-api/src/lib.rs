//! HTTP and WebSocket surface for the Geowolf game server.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod ws;
