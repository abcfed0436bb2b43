//! HTTP front end of the URL shortener.
//!
//! Exposes `POST /` (create) and `GET /{code}` (redirect) on top of the
//! shortener and redirector services, plus the process wiring used by the
//! `pinhole` binary.

pub mod app;
pub mod cli;
pub mod error;
pub mod handlers;
pub mod model;
pub mod startup;
pub mod state;
pub mod telemetry;

pub use app::App;
pub use state::AppState;
