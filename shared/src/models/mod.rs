//! Domain models for the AgriLens platform

mod analysis;
mod plot;
mod user;

pub use analysis::*;
pub use plot::*;
pub use user::*;
