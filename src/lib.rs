//! devops-dashboard: process health, host metrics, request telemetry and
//! CI/CD pipeline status over a small JSON API.
//!
//! The binary in `main.rs` wires configuration, logging and the listener;
//! everything the handlers share is an explicit [`state::AppState`].

pub mod auth;
pub mod ci;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod handlers;
pub mod history;
pub mod router;
pub mod state;
pub mod system;
pub mod telemetry;

pub use router::create_router;
pub use state::{AppState, SharedState};
