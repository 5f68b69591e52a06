//! Shared types and models for the AgriLens platform
//!
//! This crate contains the domain models and the pure computations shared
//! between the backend and the browser client (via WASM): plot geometry,
//! dashboard derivation, GeoJSON export and chart rendering.

pub mod chart;
pub mod dashboard;
pub mod geojson;
pub mod geometry;
pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
