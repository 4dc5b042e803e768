// Application layer - use cases over the tracker domain
// Presentation layer - wiring for embedders

pub mod application;
pub mod presentation;

pub use presentation::state::AppState;
