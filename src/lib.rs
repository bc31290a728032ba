//! Neon Snake - grid snake with wrap-around and walled modes
//!
//! This library provides:
//! - Pure game engine (game module)
//! - Game driver with buffered steering (session module)
//! - Local leaderboard and saved games (leaderboard, persistence modules)
//! - Terminal front end for human play and autopilot spectating (modes module)

pub mod autopilot;
pub mod game;
pub mod input;
pub mod leaderboard;
pub mod logging;
pub mod metrics;
pub mod modes;
pub mod persistence;
pub mod render;
pub mod session;
