//! bucket-browser — an object-store-backed file manager API.
//!
//! The server exposes prefix listing with cursor pagination, folder
//! emulation over a flat key space, and presigned-URL transfer
//! authorization. The `client` module holds the browser-side listing
//! state machine, kept here so its invariants are testable without a
//! UI shell.

pub mod auth;
pub mod client;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
