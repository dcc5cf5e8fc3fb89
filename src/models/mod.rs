//! Wire-level data models for the file manager API.
//!
//! These types mirror the JSON the browser client exchanges with the
//! server: listing pages over a flat key space and upload grants. They
//! carry no store-side state of their own.

pub mod grant;
pub mod listing;
