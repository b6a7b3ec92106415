//! CV extraction and job matching portal.
//!
//! A typed client for the remote CV service, the list/detail/match state
//! machines that drive each screen, and an axum server exposing every remote
//! call as an action that always answers with an `ActionResult`.
//!
//! The binary only serves the action routes. `panel` and `views` are the
//! library surface a renderer drives: it calls their async actions and draws
//! from their snapshots.

pub mod api;
pub mod cache;
pub mod config;
pub mod errors;
pub mod matching;
pub mod panel;
pub mod routes;
pub mod state;
pub mod views;
