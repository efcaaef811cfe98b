//! Domain layer - Pure business logic.

pub mod hls;
pub mod stream;
